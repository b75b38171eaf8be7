use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use kernel::prelude::entity::BookingStatus;

/// Booking as returned by the HTTP API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BookingView {
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

impl BookingView {
    pub fn with_status(&self, status: BookingStatus) -> Self {
        Self {
            status,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NewBooking {
    pub listing_id: Uuid,
    pub start_date: Date,
    pub end_date: Date,
}

/// Who the gateway is acting for. `session_version` scopes per-user cache
/// entries so a sign-in or sign-out never serves another session's data.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionContext {
    pub user_id: Option<Uuid>,
    pub session_version: String,
}

impl SessionContext {
    pub fn anonymous() -> Self {
        Self {
            user_id: None,
            session_version: "anon:0".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Approve,
    Decline,
    Cancel,
    Remove,
}

impl Transition {
    pub fn segment(&self) -> &'static str {
        match self {
            Transition::Approve => "approve",
            Transition::Decline => "decline",
            Transition::Cancel => "cancel",
            Transition::Remove => "remove",
        }
    }

    /// Status the booking is expected to reach. `Remove` only hides it.
    pub fn target(&self) -> Option<BookingStatus> {
        match self {
            Transition::Approve => Some(BookingStatus::Approved),
            Transition::Decline => Some(BookingStatus::Declined),
            Transition::Cancel => Some(BookingStatus::Cancelled),
            Transition::Remove => None,
        }
    }
}
