use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use application::transfer::ListingDto;

use crate::controller::Exhaust;
use crate::route::Created;

#[derive(Debug, Serialize)]
pub struct ListingResponse {
    id: Uuid,
    owner_id: Uuid,
    owner_username: Option<String>,
    title: String,
    description: Option<String>,
    price_per_day: i64,
    condition: String,
    location: String,
    category: String,
    image_url: Option<String>,
    created_at: OffsetDateTime,
}

impl From<ListingDto> for ListingResponse {
    fn from(value: ListingDto) -> Self {
        Self {
            id: value.id,
            owner_id: value.owner_id,
            owner_username: value.owner_username,
            title: value.title,
            description: value.description,
            price_per_day: value.price_per_day,
            condition: value.condition,
            location: value.location,
            category: value.category,
            image_url: value.image_url,
            created_at: value.created_at,
        }
    }
}

impl IntoResponse for ListingResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

pub struct Presenter;

impl Exhaust<Vec<ListingDto>> for Presenter {
    type To = Json<Vec<ListingResponse>>;
    fn emit(&self, input: Vec<ListingDto>) -> Self::To {
        Json(input.into_iter().map(ListingResponse::from).collect())
    }
}

impl Exhaust<Option<ListingDto>> for Presenter {
    type To = Option<ListingResponse>;
    fn emit(&self, input: Option<ListingDto>) -> Self::To {
        input.map(ListingResponse::from)
    }
}

impl Exhaust<ListingDto> for Presenter {
    type To = ListingResponse;
    fn emit(&self, input: ListingDto) -> Self::To {
        ListingResponse::from(input)
    }
}

impl Exhaust<()> for Presenter {
    type To = StatusCode;
    fn emit(&self, _: ()) -> Self::To {
        StatusCode::NO_CONTENT
    }
}

pub struct CreatedPresenter;

impl Exhaust<ListingDto> for CreatedPresenter {
    type To = Created<ListingResponse>;
    fn emit(&self, input: ListingDto) -> Self::To {
        Created(ListingResponse::from(input))
    }
}
