use error_stack::Report;
use time::Date;

use kernel::interface::query::BookingQuery;
use kernel::interface::update::BookingModifier;
use kernel::prelude::entity::{Booking, BookingId, BookingStatus, EventVersion, ListingId, UserId};
use kernel::{rejected, ConflictKind, KernelError};

use crate::database::memory::{InMemoryTransaction, Store};

pub struct InMemoryBookingRepository;

fn newest_first<'a>(bookings: impl DoubleEndedIterator<Item = &'a Booking>) -> Vec<Booking> {
    let mut bookings = bookings.rev().cloned().collect::<Vec<_>>();
    bookings.sort_by(|a, b| b.created_at().as_ref().cmp(a.created_at().as_ref()));
    bookings
}

fn by_start_date<'a>(bookings: impl Iterator<Item = &'a Booking>) -> Vec<Booking> {
    let mut bookings = bookings.cloned().collect::<Vec<_>>();
    bookings.sort_by_key(|b| *b.period().start());
    bookings
}

fn overlaps_confirmed(store: &Store, booking: &Booking) -> bool {
    store.bookings.iter().any(|other| {
        other.id() != booking.id()
            && other.listing_id() == booking.listing_id()
            && other.status().blocks_dates()
            && other.period().overlaps(booking.period())
    })
}

fn dates_already_booked() -> Report<KernelError> {
    Report::new(KernelError::Conflict).attach_printable(ConflictKind::DatesAlreadyBooked)
}

#[async_trait::async_trait]
impl BookingQuery for InMemoryBookingRepository {
    type Transaction = InMemoryTransaction;
    async fn find_by_id(
        &self,
        con: &mut InMemoryTransaction,
        id: &BookingId,
    ) -> error_stack::Result<Option<Booking>, KernelError> {
        Ok(con.bookings.iter().find(|b| b.id() == id).cloned())
    }

    async fn find_by_listing(
        &self,
        con: &mut InMemoryTransaction,
        listing_id: &ListingId,
    ) -> error_stack::Result<Vec<Booking>, KernelError> {
        Ok(by_start_date(
            con.bookings.iter().filter(|b| b.listing_id() == listing_id),
        ))
    }

    async fn find_blocking_by_listing(
        &self,
        con: &mut InMemoryTransaction,
        listing_id: &ListingId,
    ) -> error_stack::Result<Vec<Booking>, KernelError> {
        Ok(by_start_date(con.bookings.iter().filter(|b| {
            b.listing_id() == listing_id && b.status().blocks_dates()
        })))
    }

    async fn find_pending(
        &self,
        con: &mut InMemoryTransaction,
        listing_id: &ListingId,
        borrower_id: &UserId,
    ) -> error_stack::Result<Option<Booking>, KernelError> {
        Ok(newest_first(con.bookings.iter().filter(|b| {
            b.listing_id() == listing_id
                && b.borrower_id() == borrower_id
                && b.status() == &BookingStatus::Pending
        }))
        .into_iter()
        .next())
    }

    async fn find_visible_by_borrower(
        &self,
        con: &mut InMemoryTransaction,
        borrower_id: &UserId,
    ) -> error_stack::Result<Vec<Booking>, KernelError> {
        Ok(newest_first(con.bookings.iter().filter(|b| {
            b.borrower_id() == borrower_id && !b.visibility().borrower_deleted()
        })))
    }

    async fn find_visible_by_owner(
        &self,
        con: &mut InMemoryTransaction,
        owner_id: &UserId,
    ) -> error_stack::Result<Vec<Booking>, KernelError> {
        let owned = con
            .listings
            .iter()
            .filter(|l| l.is_owned_by(owner_id))
            .map(|l| l.id().clone())
            .collect::<Vec<_>>();
        Ok(newest_first(con.bookings.iter().filter(|b| {
            owned.contains(b.listing_id()) && !b.visibility().owner_deleted()
        })))
    }

    async fn find_finished(
        &self,
        con: &mut InMemoryTransaction,
        today: &Date,
    ) -> error_stack::Result<Vec<Booking>, KernelError> {
        Ok(con
            .bookings
            .iter()
            .filter(|b| b.status() == &BookingStatus::Approved && b.period().has_ended(today))
            .cloned()
            .collect())
    }
}

#[async_trait::async_trait]
impl BookingModifier for InMemoryBookingRepository {
    type Transaction = InMemoryTransaction;
    async fn create(
        &self,
        con: &mut InMemoryTransaction,
        booking: &Booking,
    ) -> error_stack::Result<(), KernelError> {
        if !con.listings.iter().any(|l| l.id() == booking.listing_id()) {
            return Err(rejected(KernelError::NotFound, "Listing not found"));
        }
        if overlaps_confirmed(con, booking) {
            return Err(dates_already_booked());
        }
        con.bookings.push(booking.clone());
        Ok(())
    }

    async fn update(
        &self,
        con: &mut InMemoryTransaction,
        booking: &Booking,
        expected: &EventVersion<Booking>,
    ) -> error_stack::Result<(), KernelError> {
        if booking.status().blocks_dates() && overlaps_confirmed(con, booking) {
            return Err(dates_already_booked());
        }
        let stored = con
            .bookings
            .iter_mut()
            .find(|b| b.id() == booking.id() && b.version() == expected)
            .ok_or_else(|| {
                Report::new(KernelError::Concurrency).attach_printable(format!(
                    "Booking {} changed since version {}",
                    booking.id(),
                    expected.as_ref()
                ))
            })?;
        *stored = booking.clone();
        Ok(())
    }

    async fn delete(
        &self,
        con: &mut InMemoryTransaction,
        booking_id: &BookingId,
    ) -> error_stack::Result<(), KernelError> {
        con.bookings.retain(|b| b.id() != booking_id);
        Ok(())
    }
}
