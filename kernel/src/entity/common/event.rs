use serde::{Deserialize, Serialize};
use std::marker::PhantomData;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventVersion<T> {
    /*
     * Nothing means that the entity has not been persisted yet
     */
    Nothing,
    /*
     * Exact means the number of events applied since the entity was stored
     */
    Exact(i64, PhantomData<T>),
}

impl<T> EventVersion<T> {
    pub fn new(version: i64) -> Self {
        if version < 0 {
            Self::Nothing
        } else {
            Self::Exact(version, PhantomData)
        }
    }

    pub fn next(&self) -> Self {
        Self::new(self.as_ref() + 1)
    }
}

impl<T> From<i64> for EventVersion<T> {
    fn from(version: i64) -> Self {
        Self::new(version)
    }
}

impl<T> AsRef<i64> for EventVersion<T> {
    fn as_ref(&self) -> &i64 {
        match self {
            Self::Nothing => &-1,
            Self::Exact(version, _) => version,
        }
    }
}

#[cfg(test)]
mod test {
    use crate::entity::EventVersion;

    #[test]
    fn next_starts_from_zero() {
        let version = EventVersion::<()>::Nothing;
        assert_eq!(version.next(), EventVersion::new(0));
        assert_eq!(*version.next().next().as_ref(), 1);
    }
}
