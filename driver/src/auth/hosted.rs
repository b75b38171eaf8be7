use std::time::Duration;

use error_stack::{Report, ResultExt};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use time::OffsetDateTime;
use uuid::Uuid;

use kernel::interface::auth::AuthService;
use kernel::prelude::entity::{AccessToken, Credentials, Session, UserId};
use kernel::{rejected, KernelError};

use crate::env;
use crate::error::ConvertError;

static AUTH_URL: &str = "AUTH_URL";
static AUTH_API_KEY: &str = "AUTH_API_KEY";

/// Client for a GoTrue-compatible identity API.
#[derive(Clone)]
pub struct HostedAuthClient {
    client: Client,
    base_url: String,
    api_key: String,
}

#[derive(Deserialize)]
struct UserBody {
    id: Uuid,
}

#[derive(Deserialize)]
struct SignUpBody {
    id: Option<Uuid>,
    user: Option<UserBody>,
}

#[derive(Deserialize)]
struct TokenBody {
    access_token: String,
    expires_at: Option<i64>,
    user: UserBody,
}

impl HostedAuthClient {
    pub fn new() -> error_stack::Result<Self, KernelError> {
        let base_url = env(AUTH_URL)?;
        let api_key = env(AUTH_API_KEY)?;
        Self::with_endpoint(base_url, api_key)
    }

    pub fn with_endpoint(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> error_stack::Result<Self, KernelError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .convert_error()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }
}

#[async_trait::async_trait]
impl AuthService for HostedAuthClient {
    #[tracing::instrument(skip_all)]
    async fn sign_up(&self, credentials: &Credentials) -> error_stack::Result<UserId, KernelError> {
        let response = self
            .client
            .post(self.url("signup"))
            .header("apikey", &self.api_key)
            .json(&json!({
                "email": credentials.email().as_ref(),
                "password": credentials.password().as_ref(),
            }))
            .send()
            .await
            .convert_error()?;

        let status = response.status();
        if status.is_client_error() {
            let reason = response.text().await.unwrap_or_default();
            tracing::warn!("sign up rejected with {status}: {reason}");
            return Err(rejected(KernelError::Validation, "Failed to create account"));
        }
        let body = response
            .error_for_status()
            .convert_error()?
            .json::<SignUpBody>()
            .await
            .convert_error()?;
        body.id
            .or(body.user.map(|user| user.id))
            .map(UserId::new)
            .ok_or_else(|| {
                Report::new(KernelError::Internal)
                    .attach_printable("Sign up response carried no user id")
            })
    }

    #[tracing::instrument(skip_all)]
    async fn sign_in(
        &self,
        credentials: &Credentials,
    ) -> error_stack::Result<Session, KernelError> {
        let response = self
            .client
            .post(self.url("token?grant_type=password"))
            .header("apikey", &self.api_key)
            .json(&json!({
                "email": credentials.email().as_ref(),
                "password": credentials.password().as_ref(),
            }))
            .send()
            .await
            .convert_error()?;

        if matches!(
            response.status(),
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED
        ) {
            return Err(rejected(
                KernelError::Unauthenticated,
                "Invalid email or password",
            ));
        }
        let body = response
            .error_for_status()
            .convert_error()?
            .json::<TokenBody>()
            .await
            .convert_error()?;
        let expires_at = body
            .expires_at
            .map(OffsetDateTime::from_unix_timestamp)
            .transpose()
            .change_context_lazy(|| KernelError::Internal)
            .attach_printable("Invalid session expiry")?;
        Ok(Session::new(
            UserId::new(body.user.id),
            AccessToken::new(body.access_token),
            expires_at,
        ))
    }

    #[tracing::instrument(skip_all)]
    async fn sign_out(&self, token: &AccessToken) -> error_stack::Result<(), KernelError> {
        self.client
            .post(self.url("logout"))
            .header("apikey", &self.api_key)
            .bearer_auth(token.as_ref())
            .send()
            .await
            .convert_error()?
            .error_for_status()
            .convert_error()?;
        Ok(())
    }

    async fn current_session(
        &self,
        token: &AccessToken,
    ) -> error_stack::Result<Option<Session>, KernelError> {
        let response = self
            .client
            .get(self.url("user"))
            .header("apikey", &self.api_key)
            .bearer_auth(token.as_ref())
            .send()
            .await
            .convert_error()?;
        if matches!(
            response.status(),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
        ) {
            return Ok(None);
        }
        let user = response
            .error_for_status()
            .convert_error()?
            .json::<UserBody>()
            .await
            .convert_error()?;
        // the user endpoint does not echo the expiry
        Ok(Some(Session::new(
            UserId::new(user.id),
            token.clone(),
            None,
        )))
    }
}
