mod booking;
mod cache;
mod error;
mod gateway;
mod key;
mod model;

pub use self::{booking::*, cache::*, error::*, gateway::*, key::*, model::*};
