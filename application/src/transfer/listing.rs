use time::OffsetDateTime;
use uuid::Uuid;

use kernel::prelude::entity::{DestructListing, DestructListingDetail, Listing, ListingDetail};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingDto {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub owner_username: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub price_per_day: i64,
    pub condition: String,
    pub location: String,
    pub category: String,
    pub image_url: Option<String>,
    pub created_at: OffsetDateTime,
}

impl From<Listing> for ListingDto {
    fn from(value: Listing) -> Self {
        let DestructListing {
            id,
            owner_id,
            title,
            description,
            price_per_day,
            condition,
            location,
            category,
            image_url,
            created_at,
        } = value.into_destruct();
        Self {
            id: id.into(),
            owner_id: owner_id.into(),
            owner_username: None,
            title: title.into(),
            description: description.map(Into::into),
            price_per_day: price_per_day.into(),
            condition: condition.into(),
            location: location.into(),
            category: category.into(),
            image_url: image_url.map(Into::into),
            created_at: *created_at.as_ref(),
        }
    }
}

impl From<ListingDetail> for ListingDto {
    fn from(value: ListingDetail) -> Self {
        let DestructListingDetail {
            listing,
            owner_username,
        } = value.into_destruct();
        Self {
            owner_username: owner_username.map(Into::into),
            ..Self::from(listing)
        }
    }
}

#[derive(Debug)]
pub struct ImageUploadDto {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug)]
pub struct CreateListingDto {
    pub owner: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub price_per_day: Option<i64>,
    pub condition: String,
    pub location: String,
    pub category: String,
    pub image: Option<ImageUploadDto>,
}

pub struct GetListingDto {
    pub id: Uuid,
}

pub struct SearchListingsDto {
    pub query: String,
}

pub struct GetListingsByUsernameDto {
    pub username: String,
}

/// `None` leaves a field as it is. `description: Some(None)` clears it.
pub struct UpdateListingDto {
    pub actor: Uuid,
    pub id: Uuid,
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub price_per_day: Option<i64>,
    pub condition: Option<String>,
    pub location: Option<String>,
    pub category: Option<String>,
}

pub struct DeleteListingDto {
    pub actor: Uuid,
    pub id: Uuid,
}
