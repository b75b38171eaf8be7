use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingParty {
    Owner,
    Borrower,
}

/// Per-party "removed from my list" bits. Not a status transition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Visibility {
    owner_deleted: bool,
    borrower_deleted: bool,
}

impl Visibility {
    pub fn new(owner_deleted: bool, borrower_deleted: bool) -> Self {
        Self {
            owner_deleted,
            borrower_deleted,
        }
    }

    pub fn owner_deleted(&self) -> bool {
        self.owner_deleted
    }

    pub fn borrower_deleted(&self) -> bool {
        self.borrower_deleted
    }

    pub fn is_hidden_for(&self, party: &BookingParty) -> bool {
        match party {
            BookingParty::Owner => self.owner_deleted,
            BookingParty::Borrower => self.borrower_deleted,
        }
    }

    pub fn hide(&mut self, party: &BookingParty) {
        match party {
            BookingParty::Owner => self.owner_deleted = true,
            BookingParty::Borrower => self.borrower_deleted = true,
        }
    }
}
