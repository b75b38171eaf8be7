use time::OffsetDateTime;
use uuid::Uuid;

use kernel::interface::database::{DatabaseConnection, Transaction};
use kernel::interface::query::{
    DependOnListingQuery, DependOnProfileQuery, ListingQuery, ProfileQuery,
};
use kernel::interface::storage::{DependOnImageStorage, ImageStorage};
use kernel::interface::update::{DependOnListingModifier, ListingModifier};
use kernel::prelude::entity::{
    Category, Condition, CreatedAt, ImageFile, ImagePath, Listing, ListingDescription, ListingId,
    ListingTitle, Location, PricePerDay, UserId, Username,
};
use kernel::{rejected, KernelError, UserMessage};

use crate::transfer::{
    CreateListingDto, DeleteListingDto, GetListingDto, GetListingsByUsernameDto, ListingDto,
    SearchListingsDto, UpdateListingDto,
};

fn required(value: String) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

#[async_trait::async_trait]
pub trait CreateListingService:
    'static + Sync + Send + DependOnListingModifier + DependOnImageStorage
{
    /// Inserts the listing, then uploads its image. A failed upload removes
    /// the listing again.
    async fn create_listing(
        &self,
        dto: CreateListingDto,
    ) -> error_stack::Result<ListingDto, KernelError> {
        let (Some(title), Some(condition), Some(location), Some(category), Some(price)) = (
            required(dto.title),
            required(dto.condition),
            required(dto.location),
            required(dto.category),
            dto.price_per_day,
        ) else {
            return Err(rejected(KernelError::Validation, "Missing required fields"));
        };
        let price = PricePerDay::new(price);
        if !price.is_positive() {
            return Err(rejected(
                KernelError::Validation,
                "Price per day must be positive",
            ));
        }
        let image = dto
            .image
            .map(|image| ImageFile::new(image.file_name, image.content_type, image.bytes))
            .filter(|image| !image.is_empty())
            .ok_or_else(|| rejected(KernelError::Validation, "Image is required"))?;

        let owner = UserId::new(dto.owner);
        let listing = Listing::new(
            ListingId::new(Uuid::new_v4()),
            owner.clone(),
            ListingTitle::new(title),
            dto.description
                .and_then(required)
                .map(ListingDescription::new),
            price,
            Condition::new(condition),
            Location::new(location),
            Category::new(category),
            None,
            CreatedAt::now(),
        );

        let mut connection = self.database_connection().transact().await?;
        self.listing_modifier()
            .create(&mut connection, &listing)
            .await?;
        connection.commit().await?;

        let millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
        let path = ImagePath::new(
            &owner,
            listing.id(),
            &format!("{millis}.{}", image.extension()),
        );
        let url = match self.image_storage().upload(&path, &image).await {
            Ok(url) => url,
            Err(report) => {
                tracing::warn!("image upload for listing {} failed", listing.id());
                let mut connection = self.database_connection().transact().await?;
                self.listing_modifier()
                    .delete(&mut connection, listing.id())
                    .await?;
                connection.commit().await?;
                return Err(report.attach_printable(UserMessage::new("Failed to upload image")));
            }
        };

        let mut listing = listing;
        listing.substitute(|listing| *listing.image_url = Some(url));
        let mut connection = self.database_connection().transact().await?;
        self.listing_modifier()
            .update(&mut connection, &listing)
            .await?;
        connection.commit().await?;

        tracing::info!("listing {} created by {}", listing.id(), owner);
        Ok(ListingDto::from(listing))
    }
}

impl<T> CreateListingService for T where T: DependOnListingModifier + DependOnImageStorage {}

#[async_trait::async_trait]
pub trait GetListingService:
    'static + Sync + Send + DependOnListingQuery + DependOnProfileQuery
{
    async fn get_all_listings(&self) -> error_stack::Result<Vec<ListingDto>, KernelError> {
        let mut connection = self.database_connection().transact().await?;
        let listings = self.listing_query().find_all(&mut connection).await?;
        Ok(listings.into_iter().map(ListingDto::from).collect())
    }

    /// Blank queries return every listing.
    async fn search_listings(
        &self,
        dto: SearchListingsDto,
    ) -> error_stack::Result<Vec<ListingDto>, KernelError> {
        let needle = dto.query.trim();
        if needle.is_empty() {
            return self.get_all_listings().await;
        }
        let mut connection = self.database_connection().transact().await?;
        let listings = self
            .listing_query()
            .search_by_title(&mut connection, needle)
            .await?;
        Ok(listings.into_iter().map(ListingDto::from).collect())
    }

    async fn get_listing(
        &self,
        dto: GetListingDto,
    ) -> error_stack::Result<Option<ListingDto>, KernelError> {
        let mut connection = self.database_connection().transact().await?;
        let detail = self
            .listing_query()
            .find_detail_by_id(&mut connection, &ListingId::new(dto.id))
            .await?;
        Ok(detail.map(ListingDto::from))
    }

    async fn get_listings_by_username(
        &self,
        dto: GetListingsByUsernameDto,
    ) -> error_stack::Result<Vec<ListingDto>, KernelError> {
        let mut connection = self.database_connection().transact().await?;
        let Some(profile) = self
            .profile_query()
            .find_by_username(&mut connection, &Username::new(dto.username))
            .await?
        else {
            return Ok(Vec::new());
        };
        let listings = self
            .listing_query()
            .find_by_owner(&mut connection, profile.id())
            .await?;
        Ok(listings.into_iter().map(ListingDto::from).collect())
    }
}

impl<T> GetListingService for T where T: DependOnListingQuery + DependOnProfileQuery {}

#[async_trait::async_trait]
pub trait UpdateListingService:
    'static + Sync + Send + DependOnListingQuery + DependOnListingModifier
{
    async fn update_listing(
        &self,
        dto: UpdateListingDto,
    ) -> error_stack::Result<ListingDto, KernelError> {
        let mut connection = self.database_connection().transact().await?;
        let listing = self
            .listing_query()
            .find_by_id(&mut connection, &ListingId::new(dto.id))
            .await?
            .ok_or_else(|| rejected(KernelError::NotFound, "Listing not found"))?;
        if !listing.is_owned_by(&UserId::new(dto.actor)) {
            return Err(rejected(
                KernelError::Forbidden,
                "You are not authorized to edit this listing",
            ));
        }

        let blank = || rejected(KernelError::Validation, "Missing required fields");
        let title = dto.title.map(|t| required(t).ok_or_else(blank)).transpose()?;
        let condition = dto
            .condition
            .map(|c| required(c).ok_or_else(blank))
            .transpose()?;
        let location = dto
            .location
            .map(|l| required(l).ok_or_else(blank))
            .transpose()?;
        let category = dto
            .category
            .map(|c| required(c).ok_or_else(blank))
            .transpose()?;
        let price = dto.price_per_day.map(PricePerDay::new);
        if price.is_some_and(|price| !price.is_positive()) {
            return Err(rejected(
                KernelError::Validation,
                "Price per day must be positive",
            ));
        }

        let mut listing = listing;
        listing.substitute(|listing| {
            if let Some(title) = title {
                *listing.title = ListingTitle::new(title);
            }
            if let Some(description) = dto.description {
                *listing.description = description
                    .and_then(required)
                    .map(ListingDescription::new);
            }
            if let Some(price) = price {
                *listing.price_per_day = price;
            }
            if let Some(condition) = condition {
                *listing.condition = Condition::new(condition);
            }
            if let Some(location) = location {
                *listing.location = Location::new(location);
            }
            if let Some(category) = category {
                *listing.category = Category::new(category);
            }
        });
        self.listing_modifier()
            .update(&mut connection, &listing)
            .await?;
        connection.commit().await?;
        Ok(ListingDto::from(listing))
    }
}

impl<T> UpdateListingService for T where T: DependOnListingQuery + DependOnListingModifier {}

#[async_trait::async_trait]
pub trait DeleteListingService:
    'static + Sync + Send + DependOnListingQuery + DependOnListingModifier + DependOnImageStorage
{
    async fn delete_listing(&self, dto: DeleteListingDto) -> error_stack::Result<(), KernelError> {
        let mut connection = self.database_connection().transact().await?;
        let listing = self
            .listing_query()
            .find_by_id(&mut connection, &ListingId::new(dto.id))
            .await?
            .ok_or_else(|| rejected(KernelError::NotFound, "Listing not found"))?;
        if !listing.is_owned_by(&UserId::new(dto.actor)) {
            return Err(rejected(
                KernelError::Forbidden,
                "You are not authorized to delete this listing",
            ));
        }

        if listing.image_url().is_some() {
            let prefix = ImagePath::prefix(listing.owner_id(), listing.id());
            if let Err(report) = self.image_storage().remove_prefix(&prefix).await {
                tracing::error!("failed to remove images of listing {}: {report:?}", listing.id());
            }
        }

        self.listing_modifier()
            .delete(&mut connection, listing.id())
            .await?;
        connection.commit().await?;
        tracing::info!("listing {} deleted", listing.id());
        Ok(())
    }
}

impl<T> DeleteListingService for T where
    T: DependOnListingQuery + DependOnListingModifier + DependOnImageStorage
{
}

#[cfg(test)]
mod test {
    use driver::memory::InMemoryModule;
    use kernel::{KernelError, ReportExt};

    use crate::service::fixture::{listing, listing_dto, user};
    use crate::service::{
        CreateBookingService, CreateListingService, DeleteListingService, GetBookingService,
        GetListingService, UpdateListingService,
    };
    use crate::transfer::{
        CreateBookingDto, DeleteListingDto, GetListingDto, GetListingsByUsernameDto,
        GetPendingBookingDto, SearchListingsDto, UpdateListingDto,
    };

    #[tokio::test]
    async fn create_uploads_image_under_owner_folder() -> error_stack::Result<(), KernelError> {
        let module = InMemoryModule::new();
        let owner = user(&module, "owner").await;
        let created = listing(&module, owner, "Cordless Drill").await;

        let url = created.image_url.expect("image url");
        assert!(url.contains(&format!("{owner}/{}/", created.id)));
        assert!(url.ends_with(".png"));
        assert_eq!(module.storage().paths().len(), 1);

        let found = module
            .get_listing(GetListingDto { id: created.id })
            .await?
            .expect("listing");
        assert_eq!(found.owner_username.as_deref(), Some("owner"));
        Ok(())
    }

    #[tokio::test]
    async fn create_requires_fields_and_image() {
        let module = InMemoryModule::new();
        let owner = user(&module, "owner").await;

        let mut dto = listing_dto(owner, "  ");
        let report = module.create_listing(dto).await.unwrap_err();
        assert_eq!(report.user_message().as_deref(), Some("Missing required fields"));

        dto = listing_dto(owner, "Drill");
        dto.image = None;
        let report = module.create_listing(dto).await.unwrap_err();
        assert!(matches!(report.current_context(), KernelError::Validation));
        assert_eq!(report.user_message().as_deref(), Some("Image is required"));
    }

    #[tokio::test]
    async fn failed_upload_leaves_no_listing() -> error_stack::Result<(), KernelError> {
        let module = InMemoryModule::new();
        let owner = user(&module, "owner").await;
        module.storage().fail_uploads(true);

        let report = module
            .create_listing(listing_dto(owner, "Drill"))
            .await
            .unwrap_err();
        assert_eq!(report.user_message().as_deref(), Some("Failed to upload image"));
        assert!(module.get_all_listings().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn search_trims_and_ignores_case() -> error_stack::Result<(), KernelError> {
        let module = InMemoryModule::new();
        let owner = user(&module, "owner").await;
        let drill = listing(&module, owner, "Cordless Drill").await;
        let ladder = listing(&module, owner, "Ladder").await;

        let found = module
            .search_listings(SearchListingsDto {
                query: "  drill ".to_string(),
            })
            .await?;
        assert_eq!(found.into_iter().map(|l| l.id).collect::<Vec<_>>(), vec![drill.id]);

        let all = module
            .search_listings(SearchListingsDto {
                query: "   ".to_string(),
            })
            .await?;
        assert_eq!(
            all.into_iter().map(|l| l.id).collect::<Vec<_>>(),
            vec![ladder.id, drill.id]
        );
        Ok(())
    }

    #[tokio::test]
    async fn listings_by_unknown_username_are_empty() -> error_stack::Result<(), KernelError> {
        let module = InMemoryModule::new();
        let owner = user(&module, "owner").await;
        listing(&module, owner, "Drill").await;

        let owned = module
            .get_listings_by_username(GetListingsByUsernameDto {
                username: "owner".to_string(),
            })
            .await?;
        assert_eq!(owned.len(), 1);
        let unknown = module
            .get_listings_by_username(GetListingsByUsernameDto {
                username: "nobody".to_string(),
            })
            .await?;
        assert!(unknown.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn only_owner_updates() -> error_stack::Result<(), KernelError> {
        let module = InMemoryModule::new();
        let owner = user(&module, "owner").await;
        let stranger = user(&module, "stranger").await;
        let created = listing(&module, owner, "Drill").await;
        let update = |actor| UpdateListingDto {
            actor,
            id: created.id,
            title: None,
            description: Some(None),
            price_per_day: Some(250),
            condition: None,
            location: None,
            category: None,
        };

        let report = module.update_listing(update(stranger)).await.unwrap_err();
        assert!(matches!(report.current_context(), KernelError::Forbidden));

        let updated = module.update_listing(update(owner)).await?;
        assert_eq!(updated.price_per_day, 250);
        assert_eq!(updated.description, None);
        assert_eq!(updated.title, "Drill");
        Ok(())
    }

    #[tokio::test]
    async fn delete_removes_images_and_bookings() -> error_stack::Result<(), KernelError> {
        let module = InMemoryModule::new();
        let owner = user(&module, "owner").await;
        let borrower = user(&module, "borrower").await;
        let created = listing(&module, owner, "Drill").await;
        module
            .create_booking(CreateBookingDto {
                actor: borrower,
                listing_id: created.id,
                start_date: time::macros::date!(2030 - 01 - 01),
                end_date: time::macros::date!(2030 - 01 - 02),
                today: time::macros::date!(2029 - 12 - 01),
            })
            .await?;

        let report = module
            .delete_listing(DeleteListingDto {
                actor: borrower,
                id: created.id,
            })
            .await
            .unwrap_err();
        assert_eq!(
            report.user_message().as_deref(),
            Some("You are not authorized to delete this listing")
        );

        module
            .delete_listing(DeleteListingDto {
                actor: owner,
                id: created.id,
            })
            .await?;
        assert!(module
            .get_listing(GetListingDto { id: created.id })
            .await?
            .is_none());
        assert!(module.storage().paths().is_empty());
        let pending = module
            .get_pending_booking_for_listing(GetPendingBookingDto {
                actor: borrower,
                listing_id: created.id,
            })
            .await?;
        assert!(pending.is_none());

        let report = module
            .delete_listing(DeleteListingDto {
                actor: owner,
                id: created.id,
            })
            .await
            .unwrap_err();
        assert!(matches!(report.current_context(), KernelError::NotFound));
        Ok(())
    }
}
