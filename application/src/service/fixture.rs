use driver::memory::InMemoryModule;
use uuid::Uuid;

use crate::service::{CreateListingService, SignUpService};
use crate::transfer::{CreateListingDto, ImageUploadDto, ListingDto, SignUpDto};

pub async fn user(module: &InMemoryModule, username: &str) -> Uuid {
    module
        .sign_up(SignUpDto {
            email: format!("{username}@example.com"),
            password: "password".to_string(),
            username: username.to_string(),
            first_name: None,
            last_name: None,
        })
        .await
        .unwrap()
        .id
}

pub fn listing_dto(owner: Uuid, title: &str) -> CreateListingDto {
    CreateListingDto {
        owner,
        title: title.to_string(),
        description: Some("Barely used".to_string()),
        price_per_day: Some(100),
        condition: "good".to_string(),
        location: "Berlin".to_string(),
        category: "tools".to_string(),
        image: Some(ImageUploadDto {
            file_name: "photo.png".to_string(),
            content_type: "image/png".to_string(),
            bytes: vec![0x89, 0x50, 0x4e, 0x47],
        }),
    }
}

pub async fn listing(module: &InMemoryModule, owner: Uuid, title: &str) -> ListingDto {
    module
        .create_listing(listing_dto(owner, title))
        .await
        .unwrap()
}
