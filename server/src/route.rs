use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use time::{Date, OffsetDateTime};

pub use self::{
    auth::AuthRouter, booking::BookingRouter, listing::ListingRouter, profile::ProfileRouter,
};

mod auth;
mod booking;
mod listing;
mod profile;

/// Body of a `201 Created` response.
pub struct Created<T>(pub T);

impl<T: Serialize> IntoResponse for Created<T> {
    fn into_response(self) -> Response {
        (StatusCode::CREATED, Json(self.0)).into_response()
    }
}

/// Calendar day used for date rules, in UTC.
pub fn today() -> Date {
    OffsetDateTime::now_utc().date()
}
