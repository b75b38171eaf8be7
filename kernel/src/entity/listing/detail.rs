use destructure::Destructure;
use vodca::References;

use crate::entity::{Listing, Username};

/// A listing read together with its owner's public username.
#[derive(Debug, Clone, Eq, PartialEq, References, Destructure)]
pub struct ListingDetail {
    listing: Listing,
    owner_username: Option<Username>,
}

impl ListingDetail {
    pub fn new(listing: Listing, owner_username: Option<Username>) -> Self {
        Self {
            listing,
            owner_username,
        }
    }
}
