use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use application::transfer::{AuthContextDto, ProfileDto, SessionDto};

use crate::controller::Exhaust;
use crate::route::Created;

#[derive(Debug, Serialize)]
pub struct AccountResponse {
    id: Uuid,
    username: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    user_id: Uuid,
    access_token: String,
    expires_at: Option<OffsetDateTime>,
    session_version: String,
}

impl IntoResponse for SessionResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct AuthContextResponse {
    user_id: Option<Uuid>,
    session_version: String,
}

impl IntoResponse for AuthContextResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

pub struct Presenter;

impl Exhaust<ProfileDto> for Presenter {
    type To = Created<AccountResponse>;
    fn emit(&self, input: ProfileDto) -> Self::To {
        Created(AccountResponse {
            id: input.id,
            username: input.username,
        })
    }
}

impl Exhaust<SessionDto> for Presenter {
    type To = SessionResponse;
    fn emit(&self, input: SessionDto) -> Self::To {
        SessionResponse {
            user_id: input.user_id,
            access_token: input.access_token,
            expires_at: input.expires_at,
            session_version: input.session_version,
        }
    }
}

impl Exhaust<()> for Presenter {
    type To = StatusCode;
    fn emit(&self, _: ()) -> Self::To {
        StatusCode::NO_CONTENT
    }
}

impl Exhaust<AuthContextDto> for Presenter {
    type To = AuthContextResponse;
    fn emit(&self, input: AuthContextDto) -> Self::To {
        AuthContextResponse {
            user_id: input.user_id,
            session_version: input.session_version,
        }
    }
}
