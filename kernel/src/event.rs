mod booking;

pub use self::booking::*;

pub trait Applier<T> {
    fn apply(&mut self, event: T);
}
