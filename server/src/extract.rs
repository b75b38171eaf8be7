use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::Authorization;
use axum_extra::TypedHeader;
use uuid::Uuid;

use application::service::AuthenticateService;

use crate::error::ErrorStatus;
use crate::handler::AppModule;

async fn bearer<S: Send + Sync>(parts: &mut Parts, state: &S) -> Option<String> {
    TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
        .await
        .ok()
        .map(|TypedHeader(Authorization(bearer))| bearer.token().to_string())
}

/// Access token from `Authorization: Bearer`, if the caller sent one.
pub struct BearerToken(pub Option<String>);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for BearerToken {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(bearer(parts, state).await))
    }
}

/// Signed-in caller. Rejects with 401 when the token is missing or expired.
pub struct CurrentUser(pub Uuid);

#[async_trait]
impl FromRequestParts<AppModule> for CurrentUser {
    type Rejection = ErrorStatus;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppModule,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer(parts, state).await;
        let user = state.authenticate(token).await?;
        Ok(Self(user))
    }
}
