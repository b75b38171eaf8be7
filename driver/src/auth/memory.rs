use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use error_stack::Report;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use kernel::interface::auth::AuthService;
use kernel::prelude::entity::{AccessToken, Credentials, Email, Password, Session, UserId};
use kernel::{rejected, ConflictKind, KernelError};

#[derive(Default)]
struct Accounts {
    users: HashMap<Email, (Password, UserId)>,
    sessions: HashMap<AccessToken, Session>,
}

/// Identity provider kept in process memory.
#[derive(Default)]
pub struct InMemoryAuth {
    accounts: Mutex<Accounts>,
}

impl InMemoryAuth {
    pub fn new() -> Self {
        Self::default()
    }

    fn accounts(&self) -> error_stack::Result<MutexGuard<'_, Accounts>, KernelError> {
        self.accounts.lock().map_err(|_| {
            Report::new(KernelError::Internal).attach_printable("Auth store lock poisoned")
        })
    }
}

#[async_trait::async_trait]
impl AuthService for InMemoryAuth {
    async fn sign_up(&self, credentials: &Credentials) -> error_stack::Result<UserId, KernelError> {
        let mut accounts = self.accounts()?;
        if accounts.users.contains_key(credentials.email()) {
            return Err(rejected(KernelError::Conflict, "Email is already registered")
                .attach_printable(ConflictKind::AlreadyExists));
        }
        let id = UserId::new(Uuid::new_v4());
        accounts.users.insert(
            credentials.email().clone(),
            (credentials.password().clone(), id.clone()),
        );
        Ok(id)
    }

    async fn sign_in(
        &self,
        credentials: &Credentials,
    ) -> error_stack::Result<Session, KernelError> {
        let mut accounts = self.accounts()?;
        let id = match accounts.users.get(credentials.email()) {
            Some((password, id)) if password == credentials.password() => id.clone(),
            _ => {
                return Err(rejected(
                    KernelError::Unauthenticated,
                    "Invalid email or password",
                ))
            }
        };
        let token = AccessToken::new(Uuid::new_v4().to_string());
        let session = Session::new(
            id,
            token.clone(),
            Some(OffsetDateTime::now_utc() + Duration::hours(1)),
        );
        accounts.sessions.insert(token, session.clone());
        Ok(session)
    }

    async fn sign_out(&self, token: &AccessToken) -> error_stack::Result<(), KernelError> {
        self.accounts()?.sessions.remove(token);
        Ok(())
    }

    async fn current_session(
        &self,
        token: &AccessToken,
    ) -> error_stack::Result<Option<Session>, KernelError> {
        let now = OffsetDateTime::now_utc();
        Ok(self
            .accounts()?
            .sessions
            .get(token)
            .filter(|session| session.expires_at().map_or(true, |expiry| expiry > now))
            .cloned())
    }
}

#[cfg(test)]
mod test {
    use kernel::interface::auth::AuthService;
    use kernel::prelude::entity::{Credentials, Email, Password};
    use kernel::KernelError;

    use crate::auth::InMemoryAuth;

    fn credentials(password: &str) -> Credentials {
        Credentials::new(Email::new("ada@example.com"), Password::new(password))
    }

    #[tokio::test]
    async fn session_lifecycle() -> error_stack::Result<(), KernelError> {
        let auth = InMemoryAuth::new();
        let id = auth.sign_up(&credentials("hunter2")).await?;

        let wrong = auth.sign_in(&credentials("nope")).await.unwrap_err();
        assert!(matches!(
            wrong.current_context(),
            KernelError::Unauthenticated
        ));

        let session = auth.sign_in(&credentials("hunter2")).await?;
        assert_eq!(session.user_id(), &id);
        let current = auth.current_session(session.token()).await?;
        assert_eq!(current, Some(session.clone()));

        auth.sign_out(session.token()).await?;
        assert_eq!(auth.current_session(session.token()).await?, None);
        Ok(())
    }
}
