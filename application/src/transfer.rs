mod auth;
mod booking;
mod listing;
mod profile;

pub use self::{auth::*, booking::*, listing::*, profile::*};
