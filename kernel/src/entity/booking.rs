mod id;
mod period;
mod status;
mod visibility;

pub use self::{id::*, period::*, status::*, visibility::*};
use crate::entity::{CreatedAt, EventVersion, ListingId, PricePerDay, TotalPrice, UserId};
use crate::KernelError;
use destructure::{Destructure, Mutation};
use vodca::References;

#[derive(Debug, Clone, Eq, PartialEq, References, Destructure, Mutation)]
pub struct Booking {
    id: BookingId,
    listing_id: ListingId,
    borrower_id: UserId,
    period: BookingPeriod,
    status: BookingStatus,
    price_per_day: PricePerDay,
    total_price: TotalPrice,
    visibility: Visibility,
    created_at: CreatedAt<Booking>,
    version: EventVersion<Booking>,
}

impl Booking {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: BookingId,
        listing_id: ListingId,
        borrower_id: UserId,
        period: BookingPeriod,
        status: BookingStatus,
        price_per_day: PricePerDay,
        total_price: TotalPrice,
        visibility: Visibility,
        created_at: CreatedAt<Booking>,
        version: EventVersion<Booking>,
    ) -> Self {
        Self {
            id,
            listing_id,
            borrower_id,
            period,
            status,
            price_per_day,
            total_price,
            visibility,
            created_at,
            version,
        }
    }

    /// A fresh `pending` request priced from the listing's current rate.
    pub fn request(
        id: BookingId,
        listing_id: ListingId,
        borrower_id: UserId,
        period: BookingPeriod,
        price_per_day: PricePerDay,
    ) -> error_stack::Result<Self, KernelError> {
        let total_price = TotalPrice::calculate(&price_per_day, &period)?;
        Ok(Self::new(
            id,
            listing_id,
            borrower_id,
            period,
            BookingStatus::Pending,
            price_per_day,
            total_price,
            Visibility::default(),
            CreatedAt::now(),
            EventVersion::new(0),
        ))
    }

    /// Which side of the booking `user` stands on, given the listing's owner.
    pub fn party_of(&self, user: &UserId, owner: &UserId) -> Option<BookingParty> {
        if &self.borrower_id == user {
            Some(BookingParty::Borrower)
        } else if owner == user {
            Some(BookingParty::Owner)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod test {
    use time::macros::date;
    use uuid::Uuid;

    use crate::entity::{
        Booking, BookingId, BookingParty, BookingPeriod, BookingStatus, ListingId, PricePerDay,
        UserId,
    };

    #[test]
    fn request_is_pending_and_priced() {
        let borrower = UserId::new(Uuid::new_v4());
        let booking = Booking::request(
            BookingId::new(Uuid::new_v4()),
            ListingId::new(Uuid::new_v4()),
            borrower.clone(),
            BookingPeriod::new(date!(2024 - 01 - 01), date!(2024 - 01 - 03)).unwrap(),
            PricePerDay::new(100),
        )
        .unwrap();
        assert_eq!(booking.status(), &BookingStatus::Pending);
        assert_eq!(*booking.total_price().as_ref(), 300);

        let owner = UserId::new(Uuid::new_v4());
        let stranger = UserId::new(Uuid::new_v4());
        assert_eq!(
            booking.party_of(&borrower, &owner),
            Some(BookingParty::Borrower)
        );
        assert_eq!(booking.party_of(&owner, &owner), Some(BookingParty::Owner));
        assert_eq!(booking.party_of(&stranger, &owner), None);
    }
}
