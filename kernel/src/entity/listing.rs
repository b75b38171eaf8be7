mod detail;
mod id;
mod image;
mod price;
mod text;

pub use self::{detail::*, id::*, image::*, price::*, text::*};
use crate::entity::{CreatedAt, UserId};
use destructure::{Destructure, Mutation};
use vodca::References;

#[derive(Debug, Clone, Eq, PartialEq, References, Destructure, Mutation)]
pub struct Listing {
    id: ListingId,
    owner_id: UserId,
    title: ListingTitle,
    description: Option<ListingDescription>,
    price_per_day: PricePerDay,
    condition: Condition,
    location: Location,
    category: Category,
    image_url: Option<ImageUrl>,
    created_at: CreatedAt<Listing>,
}

impl Listing {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: ListingId,
        owner_id: UserId,
        title: ListingTitle,
        description: Option<ListingDescription>,
        price_per_day: PricePerDay,
        condition: Condition,
        location: Location,
        category: Category,
        image_url: Option<ImageUrl>,
        created_at: CreatedAt<Listing>,
    ) -> Self {
        Self {
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
        }
    }

    pub fn is_owned_by(&self, user: &UserId) -> bool {
        &self.owner_id == user
    }

    /// Case-insensitive substring match on the title.
    pub fn title_contains(&self, needle: &str) -> bool {
        self.title
            .as_ref()
            .to_lowercase()
            .contains(&needle.to_lowercase())
    }
}
