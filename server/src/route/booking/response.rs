use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use application::transfer::{BookingDto, UnavailableDaysDto};
use kernel::prelude::entity::BookingStatus;

use crate::controller::Exhaust;
use crate::route::Created;

#[derive(Debug, Serialize)]
pub struct BookingResponse {
    id: Uuid,
    listing_id: Uuid,
    borrower_id: Uuid,
    start_date: Date,
    end_date: Date,
    status: BookingStatus,
    price_per_day: i64,
    total_price: i64,
    owner_deleted: bool,
    borrower_deleted: bool,
    created_at: OffsetDateTime,
    version: i64,
}

impl From<BookingDto> for BookingResponse {
    fn from(value: BookingDto) -> Self {
        Self {
            id: value.id,
            listing_id: value.listing_id,
            borrower_id: value.borrower_id,
            start_date: value.start_date,
            end_date: value.end_date,
            status: value.status,
            price_per_day: value.price_per_day,
            total_price: value.total_price,
            owner_deleted: value.owner_deleted,
            borrower_deleted: value.borrower_deleted,
            created_at: value.created_at,
            version: value.version,
        }
    }
}

impl IntoResponse for BookingResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct UnavailableDaysResponse {
    before: Date,
    days: Vec<Date>,
}

pub struct Presenter;

impl Exhaust<BookingDto> for Presenter {
    type To = BookingResponse;
    fn emit(&self, input: BookingDto) -> Self::To {
        BookingResponse::from(input)
    }
}

/// No pending request is a normal answer, so it is `null` rather than 404.
impl Exhaust<Option<BookingDto>> for Presenter {
    type To = Json<Option<BookingResponse>>;
    fn emit(&self, input: Option<BookingDto>) -> Self::To {
        Json(input.map(BookingResponse::from))
    }
}

impl Exhaust<Vec<BookingDto>> for Presenter {
    type To = Json<Vec<BookingResponse>>;
    fn emit(&self, input: Vec<BookingDto>) -> Self::To {
        Json(input.into_iter().map(BookingResponse::from).collect())
    }
}

impl Exhaust<UnavailableDaysDto> for Presenter {
    type To = Json<UnavailableDaysResponse>;
    fn emit(&self, input: UnavailableDaysDto) -> Self::To {
        Json(UnavailableDaysResponse {
            before: input.before,
            days: input.days,
        })
    }
}

impl Exhaust<()> for Presenter {
    type To = StatusCode;
    fn emit(&self, _: ()) -> Self::To {
        StatusCode::NO_CONTENT
    }
}

pub struct CreatedPresenter;

impl Exhaust<BookingDto> for CreatedPresenter {
    type To = Created<BookingResponse>;
    fn emit(&self, input: BookingDto) -> Self::To {
        Created(BookingResponse::from(input))
    }
}
