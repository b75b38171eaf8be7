use crate::entity::{AccessToken, Credentials, Session, UserId};
use crate::KernelError;

/// Hosted identity provider. Accounts live outside the relational store.
#[async_trait::async_trait]
pub trait AuthService: 'static + Sync + Send {
    async fn sign_up(&self, credentials: &Credentials) -> error_stack::Result<UserId, KernelError>;

    /// Fails with `Unauthenticated` on bad credentials.
    async fn sign_in(&self, credentials: &Credentials)
        -> error_stack::Result<Session, KernelError>;

    async fn sign_out(&self, token: &AccessToken) -> error_stack::Result<(), KernelError>;

    /// `None` when the token is unknown or expired.
    async fn current_session(
        &self,
        token: &AccessToken,
    ) -> error_stack::Result<Option<Session>, KernelError>;
}

pub trait DependOnAuthService: 'static + Sync + Send {
    type AuthService: AuthService;
    fn auth_service(&self) -> &Self::AuthService;
}
