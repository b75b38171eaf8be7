use crate::database::{DatabaseConnection, DependOnDatabaseConnection, Transaction};
use crate::entity::{Listing, ListingId};
use crate::KernelError;

#[async_trait::async_trait]
pub trait ListingModifier: 'static + Sync + Send {
    type Transaction: Transaction;
    async fn create(
        &self,
        con: &mut Self::Transaction,
        listing: &Listing,
    ) -> error_stack::Result<(), KernelError>;
    async fn update(
        &self,
        con: &mut Self::Transaction,
        listing: &Listing,
    ) -> error_stack::Result<(), KernelError>;
    /// Bookings of the listing are removed with it.
    async fn delete(
        &self,
        con: &mut Self::Transaction,
        listing_id: &ListingId,
    ) -> error_stack::Result<(), KernelError>;
}

pub trait DependOnListingModifier: 'static + Sync + Send + DependOnDatabaseConnection {
    type ListingModifier: ListingModifier<
        Transaction = <Self::DatabaseConnection as DatabaseConnection>::Transaction,
    >;
    fn listing_modifier(&self) -> &Self::ListingModifier;
}
