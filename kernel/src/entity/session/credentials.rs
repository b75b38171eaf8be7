use std::fmt::{Debug, Formatter};

use destructure::Destructure;
use vodca::{AsRefln, Fromln, References};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Fromln, AsRefln)]
pub struct Email(String);

impl Email {
    pub fn new(email: impl Into<String>) -> Self {
        Self(email.into())
    }
}

#[derive(Clone, PartialEq, Eq, Fromln, AsRefln)]
pub struct Password(String);

impl Password {
    pub fn new(password: impl Into<String>) -> Self {
        Self(password.into())
    }
}

impl Debug for Password {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("Password(***)")
    }
}

#[derive(Debug, Clone, References, Destructure)]
pub struct Credentials {
    email: Email,
    password: Password,
}

impl Credentials {
    pub fn new(email: Email, password: Password) -> Self {
        Self { email, password }
    }
}
