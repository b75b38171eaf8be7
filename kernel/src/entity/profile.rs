mod id;
mod name;

pub use self::{id::*, name::*};
use destructure::Destructure;
use serde::{Deserialize, Serialize};
use vodca::References;

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize, Destructure, References)]
pub struct Profile {
    id: UserId,
    username: Username,
    first_name: Option<FirstName>,
    last_name: Option<LastName>,
}

impl Profile {
    pub fn new(
        id: UserId,
        username: Username,
        first_name: Option<FirstName>,
        last_name: Option<LastName>,
    ) -> Self {
        Self {
            id,
            username,
            first_name,
            last_name,
        }
    }
}
