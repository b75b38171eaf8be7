use time::Date;

use crate::database::{DatabaseConnection, DependOnDatabaseConnection, Transaction};
use crate::entity::{Booking, BookingId, ListingId, UserId};
use crate::KernelError;

#[async_trait::async_trait]
pub trait BookingQuery: 'static + Sync + Send {
    type Transaction: Transaction;
    async fn find_by_id(
        &self,
        con: &mut Self::Transaction,
        id: &BookingId,
    ) -> error_stack::Result<Option<Booking>, KernelError>;

    /// Ordered by start date.
    async fn find_by_listing(
        &self,
        con: &mut Self::Transaction,
        listing_id: &ListingId,
    ) -> error_stack::Result<Vec<Booking>, KernelError>;

    /// `approved` and `completed` bookings, ordered by start date.
    async fn find_blocking_by_listing(
        &self,
        con: &mut Self::Transaction,
        listing_id: &ListingId,
    ) -> error_stack::Result<Vec<Booking>, KernelError>;

    async fn find_pending(
        &self,
        con: &mut Self::Transaction,
        listing_id: &ListingId,
        borrower_id: &UserId,
    ) -> error_stack::Result<Option<Booking>, KernelError>;

    /// Newest first, without rows the borrower removed from their list.
    async fn find_visible_by_borrower(
        &self,
        con: &mut Self::Transaction,
        borrower_id: &UserId,
    ) -> error_stack::Result<Vec<Booking>, KernelError>;

    /// Bookings on listings owned by `owner_id`, newest first, without rows
    /// the owner removed from their list.
    async fn find_visible_by_owner(
        &self,
        con: &mut Self::Transaction,
        owner_id: &UserId,
    ) -> error_stack::Result<Vec<Booking>, KernelError>;

    /// `approved` bookings whose last day is before `today`.
    async fn find_finished(
        &self,
        con: &mut Self::Transaction,
        today: &Date,
    ) -> error_stack::Result<Vec<Booking>, KernelError>;
}

pub trait DependOnBookingQuery: 'static + Sync + Send + DependOnDatabaseConnection {
    type BookingQuery: BookingQuery<
        Transaction = <Self::DatabaseConnection as DatabaseConnection>::Transaction,
    >;
    fn booking_query(&self) -> &Self::BookingQuery;
}
