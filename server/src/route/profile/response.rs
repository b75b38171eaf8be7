use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use application::transfer::ProfileDto;

use crate::controller::Exhaust;

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    id: Uuid,
    username: String,
    first_name: Option<String>,
    last_name: Option<String>,
}

impl IntoResponse for ProfileResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

pub struct Presenter;

impl Exhaust<Option<ProfileDto>> for Presenter {
    type To = Option<ProfileResponse>;
    fn emit(&self, input: Option<ProfileDto>) -> Self::To {
        input.map(|profile| ProfileResponse {
            id: profile.id,
            username: profile.username,
            first_name: profile.first_name,
            last_name: profile.last_name,
        })
    }
}
