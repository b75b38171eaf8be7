use serde::{Deserialize, Serialize};
use vodca::{AsRefln, Fromln};

use crate::entity::BookingPeriod;
use crate::{rejected, KernelError};

/// Daily rate in whole currency units.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize, Fromln, AsRefln)]
pub struct PricePerDay(i64);

impl PricePerDay {
    pub fn new(price: impl Into<i64>) -> Self {
        Self(price.into())
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize, Fromln, AsRefln)]
pub struct TotalPrice(i64);

impl TotalPrice {
    pub fn new(price: impl Into<i64>) -> Self {
        Self(price.into())
    }

    /// `price_per_day * inclusive day count`
    pub fn calculate(
        price: &PricePerDay,
        period: &BookingPeriod,
    ) -> error_stack::Result<Self, KernelError> {
        price
            .0
            .checked_mul(period.days())
            .map(Self)
            .ok_or_else(|| rejected(KernelError::Validation, "Price is too large"))
    }
}

#[cfg(test)]
mod test {
    use time::macros::date;

    use crate::entity::{BookingPeriod, PricePerDay, TotalPrice};

    #[test]
    fn three_days_at_hundred() {
        let period = BookingPeriod::new(date!(2024 - 01 - 01), date!(2024 - 01 - 03)).unwrap();
        let total = TotalPrice::calculate(&PricePerDay::new(100), &period).unwrap();
        assert_eq!(total, TotalPrice::new(300));
    }

    #[test]
    fn single_day_counts_once() {
        let period = BookingPeriod::new(date!(2024 - 02 - 29), date!(2024 - 02 - 29)).unwrap();
        let total = TotalPrice::calculate(&PricePerDay::new(75), &period).unwrap();
        assert_eq!(*total.as_ref(), 75);
    }

    #[test]
    fn overflow_is_rejected() {
        let period = BookingPeriod::new(date!(2024 - 01 - 01), date!(2024 - 01 - 02)).unwrap();
        assert!(TotalPrice::calculate(&PricePerDay::new(i64::MAX), &period).is_err());
    }
}
