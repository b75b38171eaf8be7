mod credentials;
mod token;

pub use self::{credentials::*, token::*};
use destructure::Destructure;
use serde::Serialize;
use std::fmt::{Display, Formatter};
use time::OffsetDateTime;
use vodca::References;

use crate::entity::UserId;

#[derive(Debug, Clone, Eq, PartialEq, References, Destructure)]
pub struct Session {
    user_id: UserId,
    token: AccessToken,
    expires_at: Option<OffsetDateTime>,
}

impl Session {
    pub fn new(user_id: UserId, token: AccessToken, expires_at: Option<OffsetDateTime>) -> Self {
        Self {
            user_id,
            token,
            expires_at,
        }
    }

    pub fn version(&self) -> SessionVersion {
        SessionVersion::of(Some(self))
    }
}

/// Non-sensitive token that changes whenever the signed-in user or the session
/// expiry changes. Used only to partition cached reads between sessions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SessionVersion(String);

impl SessionVersion {
    pub fn of(session: Option<&Session>) -> Self {
        match session {
            None => Self(String::from("anon:0")),
            Some(session) => {
                let expiry = session
                    .expires_at
                    .map_or(0, |time| time.unix_timestamp());
                Self(format!("{}:{}", session.user_id, expiry))
            }
        }
    }
}

impl AsRef<str> for SessionVersion {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for SessionVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
