use kernel::prelude::entity::{BookingId, ListingId, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Booking(BookingId),
    ApprovedBookings(ListingId),
    PendingBooking {
        listing: ListingId,
        user: UserId,
        session_version: String,
    },
}

/// Selects cache entries for cancellation or invalidation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryFilter {
    Exact(QueryKey),
    /// Every pending-request entry of the listing, whoever asked.
    PendingOf(ListingId),
}

impl QueryFilter {
    pub fn matches(&self, key: &QueryKey) -> bool {
        match (self, key) {
            (QueryFilter::Exact(expected), key) => expected == key,
            (QueryFilter::PendingOf(listing), QueryKey::PendingBooking { listing: other, .. }) => {
                listing == other
            }
            (QueryFilter::PendingOf(_), _) => false,
        }
    }
}

#[cfg(test)]
mod test {
    use uuid::Uuid;

    use kernel::prelude::entity::{BookingId, ListingId, UserId};

    use crate::key::{QueryFilter, QueryKey};

    #[test]
    fn pending_filter_spans_users_and_sessions() {
        let listing = ListingId::new(Uuid::new_v4());
        let pending = |version: &str| QueryKey::PendingBooking {
            listing: listing.clone(),
            user: UserId::new(Uuid::new_v4()),
            session_version: version.to_string(),
        };
        let filter = QueryFilter::PendingOf(listing.clone());
        assert!(filter.matches(&pending("a:1")));
        assert!(filter.matches(&pending("b:2")));
        assert!(!filter.matches(&QueryKey::ApprovedBookings(listing.clone())));
        assert!(!QueryFilter::PendingOf(ListingId::new(Uuid::new_v4())).matches(&pending("a:1")));

        let booking = QueryKey::Booking(BookingId::new(Uuid::new_v4()));
        assert!(QueryFilter::Exact(booking.clone()).matches(&booking));
    }
}
