mod hosted;
mod memory;

pub use self::{hosted::*, memory::*};
