use crate::database::{DatabaseConnection, DependOnDatabaseConnection, Transaction};
use crate::entity::{Profile, UserId, Username};
use crate::KernelError;

#[async_trait::async_trait]
pub trait ProfileQuery: 'static + Sync + Send {
    type Transaction: Transaction;
    async fn find_by_id(
        &self,
        con: &mut Self::Transaction,
        id: &UserId,
    ) -> error_stack::Result<Option<Profile>, KernelError>;

    async fn find_by_username(
        &self,
        con: &mut Self::Transaction,
        username: &Username,
    ) -> error_stack::Result<Option<Profile>, KernelError>;
}

pub trait DependOnProfileQuery: 'static + Sync + Send + DependOnDatabaseConnection {
    type ProfileQuery: ProfileQuery<
        Transaction = <Self::DatabaseConnection as DatabaseConnection>::Transaction,
    >;
    fn profile_query(&self) -> &Self::ProfileQuery;
}
