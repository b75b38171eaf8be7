use serde::Serialize;
use time::Date;

use crate::{rejected, KernelError};

/// Rental range where both `start` and `end` are occupied days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct BookingPeriod {
    start: Date,
    end: Date,
}

impl BookingPeriod {
    pub fn new(start: Date, end: Date) -> error_stack::Result<Self, KernelError> {
        if end < start {
            return Err(rejected(
                KernelError::Validation,
                "End date must not be before start date",
            ));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> &Date {
        &self.start
    }

    pub fn end(&self) -> &Date {
        &self.end
    }

    pub fn days(&self) -> i64 {
        (self.end - self.start).whole_days() + 1
    }

    pub fn overlaps(&self, other: &BookingPeriod) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    pub fn has_started(&self, today: &Date) -> bool {
        &self.start <= today
    }

    pub fn has_passed_start(&self, today: &Date) -> bool {
        &self.start < today
    }

    pub fn has_ended(&self, today: &Date) -> bool {
        &self.end < today
    }

    pub fn iter_days(&self) -> impl Iterator<Item = Date> {
        let end = self.end;
        std::iter::successors(Some(self.start), move |day| {
            day.next_day().filter(|next| next <= &end)
        })
    }
}

#[cfg(test)]
mod test {
    use time::macros::date;

    use crate::entity::BookingPeriod;

    #[test]
    fn reversed_range_is_rejected() {
        assert!(BookingPeriod::new(date!(2024 - 01 - 03), date!(2024 - 01 - 01)).is_err());
    }

    #[test]
    fn inclusive_endpoints_overlap() {
        let first = BookingPeriod::new(date!(2024 - 01 - 01), date!(2024 - 01 - 03)).unwrap();
        let touching = BookingPeriod::new(date!(2024 - 01 - 03), date!(2024 - 01 - 05)).unwrap();
        let after = BookingPeriod::new(date!(2024 - 01 - 04), date!(2024 - 01 - 05)).unwrap();
        assert!(first.overlaps(&touching));
        assert!(touching.overlaps(&first));
        assert!(!first.overlaps(&after));
    }

    #[test]
    fn days_cross_month_boundary() {
        let period = BookingPeriod::new(date!(2024 - 01 - 30), date!(2024 - 02 - 02)).unwrap();
        assert_eq!(period.days(), 4);
        let days = period.iter_days().collect::<Vec<_>>();
        assert_eq!(
            days,
            vec![
                date!(2024 - 01 - 30),
                date!(2024 - 01 - 31),
                date!(2024 - 02 - 01),
                date!(2024 - 02 - 02)
            ]
        );
    }

    #[test]
    fn start_day_counts_as_started() {
        let period = BookingPeriod::new(date!(2024 - 01 - 10), date!(2024 - 01 - 12)).unwrap();
        assert!(!period.has_started(&date!(2024 - 01 - 09)));
        assert!(period.has_started(&date!(2024 - 01 - 10)));
        assert!(!period.has_passed_start(&date!(2024 - 01 - 10)));
        assert!(period.has_passed_start(&date!(2024 - 01 - 11)));
        assert!(period.has_ended(&date!(2024 - 01 - 13)));
    }
}
