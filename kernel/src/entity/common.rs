mod event;
mod time;

pub use self::{event::*, time::*};
