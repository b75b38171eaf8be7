mod booking;
mod listing;
mod profile;

pub use self::{booking::*, listing::*, profile::*};
