use serde::Deserialize;
use time::Date;
use uuid::Uuid;

use application::transfer::{
    CreateBookingDto, DeletePendingBookingDto, GetBookingDto, GetListingBookingsDto,
    GetOwnedListingBookingsDto, GetPendingBookingDto, GetUnavailableDaysDto, GetUserBookingsDto,
    UpdateBookingStatusDto,
};

use crate::controller::Intake;
use crate::route::today;

#[derive(Debug, Deserialize)]
pub struct CreateRequest {
    listing_id: Uuid,
    start_date: Date,
    end_date: Date,
}

#[derive(Debug)]
pub struct GetRequest {
    actor: Uuid,
    id: Uuid,
}

impl GetRequest {
    pub fn new(actor: Uuid, id: Uuid) -> Self {
        Self { actor, id }
    }
}

#[derive(Debug)]
pub struct DeleteRequest {
    actor: Uuid,
    id: Uuid,
}

impl DeleteRequest {
    pub fn new(actor: Uuid, id: Uuid) -> Self {
        Self { actor, id }
    }
}

#[derive(Debug)]
pub struct TransitionRequest {
    actor: Uuid,
    id: Uuid,
}

impl TransitionRequest {
    pub fn new(actor: Uuid, id: Uuid) -> Self {
        Self { actor, id }
    }
}

#[derive(Debug)]
pub struct ListingBookingsRequest {
    listing_id: Uuid,
}

impl ListingBookingsRequest {
    pub fn new(listing_id: Uuid) -> Self {
        Self { listing_id }
    }
}

#[derive(Debug)]
pub struct OwnedListingBookingsRequest {
    actor: Uuid,
    listing_id: Uuid,
}

impl OwnedListingBookingsRequest {
    pub fn new(actor: Uuid, listing_id: Uuid) -> Self {
        Self { actor, listing_id }
    }
}

#[derive(Debug)]
pub struct PendingRequest {
    actor: Uuid,
    listing_id: Uuid,
}

impl PendingRequest {
    pub fn new(actor: Uuid, listing_id: Uuid) -> Self {
        Self { actor, listing_id }
    }
}

#[derive(Debug)]
pub struct UnavailableDaysRequest {
    listing_id: Uuid,
}

impl UnavailableDaysRequest {
    pub fn new(listing_id: Uuid) -> Self {
        Self { listing_id }
    }
}

#[derive(Debug)]
pub struct OwnBookingsRequest {
    actor: Uuid,
}

impl OwnBookingsRequest {
    pub fn new(actor: Uuid) -> Self {
        Self { actor }
    }
}

pub struct Transformer;

impl Intake<(Uuid, CreateRequest)> for Transformer {
    type To = CreateBookingDto;
    fn emit(&self, input: (Uuid, CreateRequest)) -> Self::To {
        let (actor, input) = input;
        CreateBookingDto {
            actor,
            listing_id: input.listing_id,
            start_date: input.start_date,
            end_date: input.end_date,
            today: today(),
        }
    }
}

impl Intake<GetRequest> for Transformer {
    type To = GetBookingDto;
    fn emit(&self, input: GetRequest) -> Self::To {
        GetBookingDto {
            actor: input.actor,
            id: input.id,
        }
    }
}

impl Intake<DeleteRequest> for Transformer {
    type To = DeletePendingBookingDto;
    fn emit(&self, input: DeleteRequest) -> Self::To {
        DeletePendingBookingDto {
            actor: input.actor,
            id: input.id,
        }
    }
}

impl Intake<TransitionRequest> for Transformer {
    type To = UpdateBookingStatusDto;
    fn emit(&self, input: TransitionRequest) -> Self::To {
        UpdateBookingStatusDto {
            actor: input.actor,
            id: input.id,
            today: today(),
        }
    }
}

impl Intake<ListingBookingsRequest> for Transformer {
    type To = GetListingBookingsDto;
    fn emit(&self, input: ListingBookingsRequest) -> Self::To {
        GetListingBookingsDto {
            listing_id: input.listing_id,
        }
    }
}

impl Intake<OwnedListingBookingsRequest> for Transformer {
    type To = GetOwnedListingBookingsDto;
    fn emit(&self, input: OwnedListingBookingsRequest) -> Self::To {
        GetOwnedListingBookingsDto {
            actor: input.actor,
            listing_id: input.listing_id,
        }
    }
}

impl Intake<PendingRequest> for Transformer {
    type To = GetPendingBookingDto;
    fn emit(&self, input: PendingRequest) -> Self::To {
        GetPendingBookingDto {
            actor: input.actor,
            listing_id: input.listing_id,
        }
    }
}

impl Intake<UnavailableDaysRequest> for Transformer {
    type To = GetUnavailableDaysDto;
    fn emit(&self, input: UnavailableDaysRequest) -> Self::To {
        GetUnavailableDaysDto {
            listing_id: input.listing_id,
            today: today(),
        }
    }
}

impl Intake<OwnBookingsRequest> for Transformer {
    type To = GetUserBookingsDto;
    fn emit(&self, input: OwnBookingsRequest) -> Self::To {
        GetUserBookingsDto { actor: input.actor }
    }
}

#[cfg(test)]
mod test {
    use time::macros::date;
    use uuid::Uuid;

    use crate::controller::Intake;
    use crate::route::booking::request::{CreateRequest, Transformer};

    #[test]
    fn dates_are_read_as_calendar_days() {
        let listing = Uuid::new_v4();
        let req: CreateRequest = serde_json::from_value(serde_json::json!({
            "listing_id": listing,
            "start_date": "2024-03-10",
            "end_date": "2024-03-12",
        }))
        .unwrap();
        let actor = Uuid::new_v4();
        let dto = Intake::emit(&Transformer, (actor, req));
        assert_eq!(dto.actor, actor);
        assert_eq!(dto.listing_id, listing);
        assert_eq!(dto.start_date, date!(2024 - 03 - 10));
        assert_eq!(dto.end_date, date!(2024 - 03 - 12));
    }
}
