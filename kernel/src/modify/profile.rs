use crate::database::{DatabaseConnection, DependOnDatabaseConnection, Transaction};
use crate::entity::Profile;
use crate::KernelError;

#[async_trait::async_trait]
pub trait ProfileModifier: 'static + Sync + Send {
    type Transaction: Transaction;
    /// Fails with `Conflict` + `ConflictKind::AlreadyExists` on a taken username.
    async fn create(
        &self,
        con: &mut Self::Transaction,
        profile: &Profile,
    ) -> error_stack::Result<(), KernelError>;
}

pub trait DependOnProfileModifier: 'static + Sync + Send + DependOnDatabaseConnection {
    type ProfileModifier: ProfileModifier<
        Transaction = <Self::DatabaseConnection as DatabaseConnection>::Transaction,
    >;
    fn profile_modifier(&self) -> &Self::ProfileModifier;
}
