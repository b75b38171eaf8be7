use crate::database::{DatabaseConnection, DependOnDatabaseConnection, Transaction};
use crate::entity::{Booking, BookingId, EventVersion};
use crate::KernelError;

#[async_trait::async_trait]
pub trait BookingModifier: 'static + Sync + Send {
    type Transaction: Transaction;
    /// Fails with `Conflict` + `ConflictKind::DatesAlreadyBooked` when the
    /// period overlaps an `approved`/`completed` booking of the same listing.
    /// The check and the insert are atomic against concurrent creators.
    async fn create(
        &self,
        con: &mut Self::Transaction,
        booking: &Booking,
    ) -> error_stack::Result<(), KernelError>;

    /// Compare-and-set on `expected`; a stale version fails with `Concurrency`.
    /// Moving into a date-blocking status is subject to the same overlap rule
    /// as `create`.
    async fn update(
        &self,
        con: &mut Self::Transaction,
        booking: &Booking,
        expected: &EventVersion<Booking>,
    ) -> error_stack::Result<(), KernelError>;

    async fn delete(
        &self,
        con: &mut Self::Transaction,
        booking_id: &BookingId,
    ) -> error_stack::Result<(), KernelError>;
}

pub trait DependOnBookingModifier: 'static + Sync + Send + DependOnDatabaseConnection {
    type BookingModifier: BookingModifier<
        Transaction = <Self::DatabaseConnection as DatabaseConnection>::Transaction,
    >;
    fn booking_modifier(&self) -> &Self::BookingModifier;
}
