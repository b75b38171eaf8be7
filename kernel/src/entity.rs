mod booking;
mod common;
mod listing;
mod profile;
mod session;

pub use self::{booking::*, common::*, listing::*, profile::*, session::*};
