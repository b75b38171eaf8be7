use time::OffsetDateTime;
use uuid::Uuid;

use kernel::prelude::entity::{DestructSession, Session};

pub struct SignUpDto {
    pub email: String,
    pub password: String,
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

pub struct SignInDto {
    pub email: String,
    pub password: String,
}

#[derive(Debug)]
pub struct SignOutDto {
    pub token: String,
}

#[derive(Debug, Clone)]
pub struct SessionDto {
    pub user_id: Uuid,
    pub access_token: String,
    pub expires_at: Option<OffsetDateTime>,
    pub session_version: String,
}

impl From<Session> for SessionDto {
    fn from(value: Session) -> Self {
        let session_version = value.version().to_string();
        let DestructSession {
            user_id,
            token,
            expires_at,
        } = value.into_destruct();
        Self {
            user_id: user_id.into(),
            access_token: token.into(),
            expires_at,
            session_version,
        }
    }
}

/// Who is calling, if anyone. `session_version` changes whenever the
/// session does, so per-user caches can key on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContextDto {
    pub user_id: Option<Uuid>,
    pub session_version: String,
}
