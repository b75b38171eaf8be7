use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

use kernel::interface::database::{DatabaseConnection, Transaction};
use kernel::prelude::entity::{Booking, Listing, Profile};
use kernel::KernelError;

pub use self::{booking::*, listing::*, profile::*};

mod booking;
mod listing;
mod profile;

/// Rows in insertion order.
#[derive(Debug, Clone, Default)]
pub struct Store {
    pub(in crate::database) profiles: Vec<Profile>,
    pub(in crate::database) listings: Vec<Listing>,
    pub(in crate::database) bookings: Vec<Booking>,
}

/// Process-local store. A transaction holds the whole store, so transactions
/// run one at a time.
#[derive(Clone, Default)]
pub struct InMemoryDatabase {
    store: Arc<Mutex<Store>>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl DatabaseConnection for InMemoryDatabase {
    type Transaction = InMemoryTransaction;
    async fn transact(&self) -> error_stack::Result<InMemoryTransaction, KernelError> {
        let guard = self.store.clone().lock_owned().await;
        let snapshot = guard.clone();
        Ok(InMemoryTransaction {
            guard,
            snapshot: Some(snapshot),
        })
    }
}

pub struct InMemoryTransaction {
    guard: OwnedMutexGuard<Store>,
    snapshot: Option<Store>,
}

impl Deref for InMemoryTransaction {
    type Target = Store;
    fn deref(&self) -> &Self::Target {
        &self.guard
    }
}

impl DerefMut for InMemoryTransaction {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.guard
    }
}

impl Drop for InMemoryTransaction {
    fn drop(&mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            *self.guard = snapshot;
        }
    }
}

#[async_trait::async_trait]
impl Transaction for InMemoryTransaction {
    async fn commit(mut self) -> error_stack::Result<(), KernelError> {
        self.snapshot = None;
        Ok(())
    }

    async fn roll_back(self) -> error_stack::Result<(), KernelError> {
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use uuid::Uuid;

    use kernel::interface::database::{DatabaseConnection, Transaction};
    use kernel::interface::query::ProfileQuery;
    use kernel::interface::update::ProfileModifier;
    use kernel::prelude::entity::{Profile, UserId, Username};
    use kernel::KernelError;

    use crate::database::{InMemoryDatabase, InMemoryProfileRepository};

    #[tokio::test]
    async fn uncommitted_writes_are_discarded() -> error_stack::Result<(), KernelError> {
        let db = InMemoryDatabase::new();
        let committed = Profile::new(
            UserId::new(Uuid::new_v4()),
            Username::new("kept"),
            None,
            None,
        );
        let dropped = Profile::new(
            UserId::new(Uuid::new_v4()),
            Username::new("dropped"),
            None,
            None,
        );

        let mut con = db.transact().await?;
        InMemoryProfileRepository.create(&mut con, &committed).await?;
        con.commit().await?;

        let mut con = db.transact().await?;
        InMemoryProfileRepository.create(&mut con, &dropped).await?;
        con.roll_back().await?;

        let mut con = db.transact().await?;
        InMemoryProfileRepository.create(&mut con, &dropped).await?;
        drop(con);

        let mut con = db.transact().await?;
        assert!(InMemoryProfileRepository
            .find_by_id(&mut con, committed.id())
            .await?
            .is_some());
        assert!(InMemoryProfileRepository
            .find_by_id(&mut con, dropped.id())
            .await?
            .is_none());
        Ok(())
    }
}
