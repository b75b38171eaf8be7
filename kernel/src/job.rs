use destructure::Mutation;
use std::time::Duration;
use vodca::References;

/// Schedule of the background pass that completes finished bookings.
#[derive(Debug, Clone, References, Mutation)]
pub struct SweepConfig {
    interval: Duration,
}

impl SweepConfig {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(3600),
        }
    }
}
