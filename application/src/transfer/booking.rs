use time::{Date, OffsetDateTime};
use uuid::Uuid;

use kernel::prelude::entity::{Booking, BookingStatus, DestructBooking};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingDto {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub borrower_id: Uuid,
    pub start_date: Date,
    pub end_date: Date,
    pub status: BookingStatus,
    pub price_per_day: i64,
    pub total_price: i64,
    pub owner_deleted: bool,
    pub borrower_deleted: bool,
    pub created_at: OffsetDateTime,
    pub version: i64,
}

impl From<Booking> for BookingDto {
    fn from(value: Booking) -> Self {
        let DestructBooking {
            id,
            listing_id,
            borrower_id,
            period,
            status,
            price_per_day,
            total_price,
            visibility,
            created_at,
            version,
        } = value.into_destruct();
        Self {
            id: id.into(),
            listing_id: listing_id.into(),
            borrower_id: borrower_id.into(),
            start_date: *period.start(),
            end_date: *period.end(),
            status,
            price_per_day: price_per_day.into(),
            total_price: total_price.into(),
            owner_deleted: visibility.owner_deleted(),
            borrower_deleted: visibility.borrower_deleted(),
            created_at: *created_at.as_ref(),
            version: *version.as_ref(),
        }
    }
}

pub struct CreateBookingDto {
    pub actor: Uuid,
    pub listing_id: Uuid,
    pub start_date: Date,
    pub end_date: Date,
    pub today: Date,
}

pub struct GetBookingDto {
    pub actor: Uuid,
    pub id: Uuid,
}

pub struct GetListingBookingsDto {
    pub listing_id: Uuid,
}

pub struct GetOwnedListingBookingsDto {
    pub actor: Uuid,
    pub listing_id: Uuid,
}

pub struct GetPendingBookingDto {
    pub actor: Uuid,
    pub listing_id: Uuid,
}

pub struct GetUserBookingsDto {
    pub actor: Uuid,
}

pub struct GetUnavailableDaysDto {
    pub listing_id: Uuid,
    pub today: Date,
}

/// Calendar days a new request cannot cover: everything before `before`
/// plus each day in `days`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnavailableDaysDto {
    pub before: Date,
    pub days: Vec<Date>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingAction {
    Approve,
    Decline,
    Cancel,
    Remove,
}

pub struct UpdateBookingStatusDto {
    pub actor: Uuid,
    pub id: Uuid,
    pub today: Date,
}

pub struct DeletePendingBookingDto {
    pub actor: Uuid,
    pub id: Uuid,
}

pub struct CompleteBookingsDto {
    pub today: Date,
}
