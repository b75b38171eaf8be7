use kernel::interface::database::DatabaseConnection;
use kernel::interface::query::{DependOnProfileQuery, ProfileQuery};
use kernel::prelude::entity::{UserId, Username};
use kernel::KernelError;

use crate::transfer::{GetProfileByUsernameDto, GetProfileDto, ProfileDto};

#[async_trait::async_trait]
pub trait GetProfileService: 'static + Sync + Send + DependOnProfileQuery {
    async fn get_profile(
        &self,
        dto: GetProfileDto,
    ) -> error_stack::Result<Option<ProfileDto>, KernelError> {
        let mut connection = self.database_connection().transact().await?;
        let profile = self
            .profile_query()
            .find_by_id(&mut connection, &UserId::new(dto.id))
            .await?;
        Ok(profile.map(ProfileDto::from))
    }

    async fn get_profile_by_username(
        &self,
        dto: GetProfileByUsernameDto,
    ) -> error_stack::Result<Option<ProfileDto>, KernelError> {
        let mut connection = self.database_connection().transact().await?;
        let profile = self
            .profile_query()
            .find_by_username(&mut connection, &Username::new(dto.username))
            .await?;
        Ok(profile.map(ProfileDto::from))
    }
}

impl<T> GetProfileService for T where T: DependOnProfileQuery {}
