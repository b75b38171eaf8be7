use uuid::Uuid;

use kernel::prelude::entity::{DestructProfile, Profile};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileDto {
    pub id: Uuid,
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl From<Profile> for ProfileDto {
    fn from(value: Profile) -> Self {
        let DestructProfile {
            id,
            username,
            first_name,
            last_name,
        } = value.into_destruct();
        Self {
            id: id.into(),
            username: username.into(),
            first_name: first_name.map(Into::into),
            last_name: last_name.map(Into::into),
        }
    }
}

pub struct GetProfileDto {
    pub id: Uuid,
}

pub struct GetProfileByUsernameDto {
    pub username: String,
}
