use crate::database::{DatabaseConnection, DependOnDatabaseConnection, Transaction};
use crate::entity::{Listing, ListingDetail, ListingId, UserId};
use crate::KernelError;

/// Every list read is ordered newest first.
#[async_trait::async_trait]
pub trait ListingQuery: 'static + Sync + Send {
    type Transaction: Transaction;
    async fn find_by_id(
        &self,
        con: &mut Self::Transaction,
        id: &ListingId,
    ) -> error_stack::Result<Option<Listing>, KernelError>;

    async fn find_detail_by_id(
        &self,
        con: &mut Self::Transaction,
        id: &ListingId,
    ) -> error_stack::Result<Option<ListingDetail>, KernelError>;

    async fn find_all(
        &self,
        con: &mut Self::Transaction,
    ) -> error_stack::Result<Vec<Listing>, KernelError>;

    /// Case-insensitive substring match on the title.
    async fn search_by_title(
        &self,
        con: &mut Self::Transaction,
        needle: &str,
    ) -> error_stack::Result<Vec<Listing>, KernelError>;

    async fn find_by_owner(
        &self,
        con: &mut Self::Transaction,
        owner: &UserId,
    ) -> error_stack::Result<Vec<Listing>, KernelError>;
}

pub trait DependOnListingQuery: 'static + Sync + Send + DependOnDatabaseConnection {
    type ListingQuery: ListingQuery<
        Transaction = <Self::DatabaseConnection as DatabaseConnection>::Transaction,
    >;
    fn listing_query(&self) -> &Self::ListingQuery;
}
