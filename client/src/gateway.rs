use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use kernel::prelude::entity::{BookingId, ListingId};

use crate::error::{ClientError, ClientResult};
use crate::model::{BookingView, NewBooking, SessionContext, Transition};

/// Booking-related calls against the marketplace API.
#[async_trait::async_trait]
pub trait MarketplaceGateway: 'static + Send + Sync {
    async fn session(&self) -> ClientResult<SessionContext>;
    async fn booking(&self, id: &BookingId) -> ClientResult<BookingView>;
    async fn approved_bookings(&self, listing: &ListingId) -> ClientResult<Vec<BookingView>>;
    async fn pending_booking(&self, listing: &ListingId) -> ClientResult<Option<BookingView>>;
    async fn create_booking(&self, booking: &NewBooking) -> ClientResult<BookingView>;
    async fn transition(
        &self,
        id: &BookingId,
        transition: Transition,
    ) -> ClientResult<BookingView>;
    async fn delete_booking(&self, id: &BookingId) -> ClientResult<()>;
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpGateway {
    pub fn new(base_url: impl Into<String>) -> ClientResult<Self> {
        let base_url = base_url.into();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ClientError::InvalidUrl(base_url));
        }
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    pub fn with_token(self, token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            ..self
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .client
            .request(method, format!("{}{path}", self.base_url));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn checked(builder: RequestBuilder) -> ClientResult<Response> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.error,
            Err(_) => status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string(),
        };
        tracing::debug!("{status}: {message}");
        Err(ClientError::Api { status, message })
    }

    async fn json<T: DeserializeOwned>(builder: RequestBuilder) -> ClientResult<T> {
        Ok(Self::checked(builder).await?.json::<T>().await?)
    }
}

#[async_trait::async_trait]
impl MarketplaceGateway for HttpGateway {
    async fn session(&self) -> ClientResult<SessionContext> {
        Self::json(self.request(Method::GET, "/auth/session")).await
    }

    async fn booking(&self, id: &BookingId) -> ClientResult<BookingView> {
        Self::json(self.request(Method::GET, &format!("/bookings/{id}"))).await
    }

    async fn approved_bookings(&self, listing: &ListingId) -> ClientResult<Vec<BookingView>> {
        let path = format!("/listings/{listing}/bookings/approved");
        Self::json(self.request(Method::GET, &path)).await
    }

    async fn pending_booking(&self, listing: &ListingId) -> ClientResult<Option<BookingView>> {
        let path = format!("/listings/{listing}/bookings/pending");
        Self::json(self.request(Method::GET, &path)).await
    }

    async fn create_booking(&self, booking: &NewBooking) -> ClientResult<BookingView> {
        Self::json(self.request(Method::POST, "/bookings").json(booking)).await
    }

    async fn transition(
        &self,
        id: &BookingId,
        transition: Transition,
    ) -> ClientResult<BookingView> {
        let path = format!("/bookings/{id}/{}", transition.segment());
        Self::json(self.request(Method::POST, &path)).await
    }

    async fn delete_booking(&self, id: &BookingId) -> ClientResult<()> {
        Self::checked(self.request(Method::DELETE, &format!("/bookings/{id}"))).await?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use crate::error::ClientError;
    use crate::gateway::HttpGateway;

    #[test]
    fn base_url_needs_a_scheme() {
        assert!(matches!(
            HttpGateway::new("localhost:8080"),
            Err(ClientError::InvalidUrl(_))
        ));
        let gateway = HttpGateway::new("http://localhost:8080/").unwrap();
        assert_eq!(gateway.base_url, "http://localhost:8080");
        assert!(gateway.with_token("t").token.is_some());
    }
}
