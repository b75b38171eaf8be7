use error_stack::Report;

use kernel::interface::query::ProfileQuery;
use kernel::interface::update::ProfileModifier;
use kernel::prelude::entity::{Profile, UserId, Username};
use kernel::{ConflictKind, KernelError};

use crate::database::memory::InMemoryTransaction;

pub struct InMemoryProfileRepository;

#[async_trait::async_trait]
impl ProfileQuery for InMemoryProfileRepository {
    type Transaction = InMemoryTransaction;
    async fn find_by_id(
        &self,
        con: &mut InMemoryTransaction,
        id: &UserId,
    ) -> error_stack::Result<Option<Profile>, KernelError> {
        Ok(con.profiles.iter().find(|p| p.id() == id).cloned())
    }

    async fn find_by_username(
        &self,
        con: &mut InMemoryTransaction,
        username: &Username,
    ) -> error_stack::Result<Option<Profile>, KernelError> {
        Ok(con
            .profiles
            .iter()
            .find(|p| p.username() == username)
            .cloned())
    }
}

#[async_trait::async_trait]
impl ProfileModifier for InMemoryProfileRepository {
    type Transaction = InMemoryTransaction;
    async fn create(
        &self,
        con: &mut InMemoryTransaction,
        profile: &Profile,
    ) -> error_stack::Result<(), KernelError> {
        let taken = con
            .profiles
            .iter()
            .any(|p| p.id() == profile.id() || p.username() == profile.username());
        if taken {
            return Err(Report::new(KernelError::Conflict)
                .attach_printable(ConflictKind::AlreadyExists)
                .attach_printable(format!("Profile {:?} already exists", profile.username())));
        }
        con.profiles.push(profile.clone());
        Ok(())
    }
}
