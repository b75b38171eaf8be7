use sqlx::types::Uuid;
use sqlx::PgConnection;
use time::OffsetDateTime;

use kernel::interface::query::ListingQuery;
use kernel::interface::update::ListingModifier;
use kernel::prelude::entity::{
    Category, Condition, CreatedAt, ImageUrl, Listing, ListingDescription, ListingDetail,
    ListingId, ListingTitle, Location, PricePerDay, UserId, Username,
};
use kernel::KernelError;

use crate::database::postgres::PostgresTransaction;
use crate::error::ConvertError;

pub struct PostgresListingRepository;

#[async_trait::async_trait]
impl ListingQuery for PostgresListingRepository {
    type Transaction = PostgresTransaction;
    async fn find_by_id(
        &self,
        con: &mut PostgresTransaction,
        id: &ListingId,
    ) -> error_stack::Result<Option<Listing>, KernelError> {
        PgListingInternal::find_by_id(con, id).await
    }

    async fn find_detail_by_id(
        &self,
        con: &mut PostgresTransaction,
        id: &ListingId,
    ) -> error_stack::Result<Option<ListingDetail>, KernelError> {
        PgListingInternal::find_detail_by_id(con, id).await
    }

    async fn find_all(
        &self,
        con: &mut PostgresTransaction,
    ) -> error_stack::Result<Vec<Listing>, KernelError> {
        PgListingInternal::find_all(con).await
    }

    async fn search_by_title(
        &self,
        con: &mut PostgresTransaction,
        needle: &str,
    ) -> error_stack::Result<Vec<Listing>, KernelError> {
        PgListingInternal::search_by_title(con, needle).await
    }

    async fn find_by_owner(
        &self,
        con: &mut PostgresTransaction,
        owner: &UserId,
    ) -> error_stack::Result<Vec<Listing>, KernelError> {
        PgListingInternal::find_by_owner(con, owner).await
    }
}

#[async_trait::async_trait]
impl ListingModifier for PostgresListingRepository {
    type Transaction = PostgresTransaction;
    async fn create(
        &self,
        con: &mut PostgresTransaction,
        listing: &Listing,
    ) -> error_stack::Result<(), KernelError> {
        PgListingInternal::create(con, listing).await
    }

    async fn update(
        &self,
        con: &mut PostgresTransaction,
        listing: &Listing,
    ) -> error_stack::Result<(), KernelError> {
        PgListingInternal::update(con, listing).await
    }

    async fn delete(
        &self,
        con: &mut PostgresTransaction,
        listing_id: &ListingId,
    ) -> error_stack::Result<(), KernelError> {
        PgListingInternal::delete(con, listing_id).await
    }
}

#[derive(sqlx::FromRow)]
struct ListingRow {
    id: Uuid,
    owner_id: Uuid,
    title: String,
    description: Option<String>,
    price_per_day: i64,
    condition: String,
    location: String,
    category: String,
    image_url: Option<String>,
    created_at: OffsetDateTime,
}

impl From<ListingRow> for Listing {
    fn from(row: ListingRow) -> Self {
        Listing::new(
            ListingId::new(row.id),
            UserId::new(row.owner_id),
            ListingTitle::new(row.title),
            row.description.map(ListingDescription::new),
            PricePerDay::new(row.price_per_day),
            Condition::new(row.condition),
            Location::new(row.location),
            Category::new(row.category),
            row.image_url.map(ImageUrl::new),
            CreatedAt::new(row.created_at),
        )
    }
}

#[derive(sqlx::FromRow)]
struct ListingDetailRow {
    #[sqlx(flatten)]
    listing: ListingRow,
    owner_username: Option<String>,
}

impl From<ListingDetailRow> for ListingDetail {
    fn from(row: ListingDetailRow) -> Self {
        ListingDetail::new(
            Listing::from(row.listing),
            row.owner_username.map(Username::new),
        )
    }
}

/// Escapes `LIKE` wildcards so the needle matches literally.
fn like_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

pub(in crate::database) struct PgListingInternal;

impl PgListingInternal {
    async fn find_by_id(
        con: &mut PgConnection,
        id: &ListingId,
    ) -> error_stack::Result<Option<Listing>, KernelError> {
        let row = sqlx::query_as::<_, ListingRow>(
            // language=postgresql
            r#"
            SELECT id, owner_id, title, description, price_per_day, condition, location, category, image_url, created_at
            FROM listings
            WHERE id = $1
            "#,
        )
        .bind(id.as_ref())
        .fetch_optional(con)
        .await
        .convert_error()?;
        Ok(row.map(Listing::from))
    }

    async fn find_detail_by_id(
        con: &mut PgConnection,
        id: &ListingId,
    ) -> error_stack::Result<Option<ListingDetail>, KernelError> {
        let row = sqlx::query_as::<_, ListingDetailRow>(
            // language=postgresql
            r#"
            SELECT l.id, l.owner_id, l.title, l.description, l.price_per_day, l.condition, l.location, l.category, l.image_url, l.created_at,
                   p.username AS owner_username
            FROM listings l
            LEFT JOIN profiles p ON p.id = l.owner_id
            WHERE l.id = $1
            "#,
        )
        .bind(id.as_ref())
        .fetch_optional(con)
        .await
        .convert_error()?;
        Ok(row.map(ListingDetail::from))
    }

    async fn find_all(con: &mut PgConnection) -> error_stack::Result<Vec<Listing>, KernelError> {
        let rows = sqlx::query_as::<_, ListingRow>(
            // language=postgresql
            r#"
            SELECT id, owner_id, title, description, price_per_day, condition, location, category, image_url, created_at
            FROM listings
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(con)
        .await
        .convert_error()?;
        Ok(rows.into_iter().map(Listing::from).collect())
    }

    async fn search_by_title(
        con: &mut PgConnection,
        needle: &str,
    ) -> error_stack::Result<Vec<Listing>, KernelError> {
        let rows = sqlx::query_as::<_, ListingRow>(
            // language=postgresql
            r#"
            SELECT id, owner_id, title, description, price_per_day, condition, location, category, image_url, created_at
            FROM listings
            WHERE title ILIKE $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(like_pattern(needle))
        .fetch_all(con)
        .await
        .convert_error()?;
        Ok(rows.into_iter().map(Listing::from).collect())
    }

    async fn find_by_owner(
        con: &mut PgConnection,
        owner: &UserId,
    ) -> error_stack::Result<Vec<Listing>, KernelError> {
        let rows = sqlx::query_as::<_, ListingRow>(
            // language=postgresql
            r#"
            SELECT id, owner_id, title, description, price_per_day, condition, location, category, image_url, created_at
            FROM listings
            WHERE owner_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(owner.as_ref())
        .fetch_all(con)
        .await
        .convert_error()?;
        Ok(rows.into_iter().map(Listing::from).collect())
    }

    async fn create(
        con: &mut PgConnection,
        listing: &Listing,
    ) -> error_stack::Result<(), KernelError> {
        sqlx::query(
            // language=postgresql
            r#"
            INSERT INTO listings (id, owner_id, title, description, price_per_day, condition, location, category, image_url, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(listing.id().as_ref())
        .bind(listing.owner_id().as_ref())
        .bind(listing.title().as_ref())
        .bind(listing.description().as_ref().map(AsRef::<String>::as_ref))
        .bind(listing.price_per_day().as_ref())
        .bind(listing.condition().as_ref())
        .bind(listing.location().as_ref())
        .bind(listing.category().as_ref())
        .bind(listing.image_url().as_ref().map(AsRef::<String>::as_ref))
        .bind(listing.created_at().as_ref())
        .execute(con)
        .await
        .convert_error()?;
        Ok(())
    }

    async fn update(
        con: &mut PgConnection,
        listing: &Listing,
    ) -> error_stack::Result<(), KernelError> {
        sqlx::query(
            // language=postgresql
            r#"
            UPDATE listings
            SET title = $2, description = $3, price_per_day = $4, condition = $5, location = $6, category = $7, image_url = $8
            WHERE id = $1
            "#,
        )
        .bind(listing.id().as_ref())
        .bind(listing.title().as_ref())
        .bind(listing.description().as_ref().map(AsRef::<String>::as_ref))
        .bind(listing.price_per_day().as_ref())
        .bind(listing.condition().as_ref())
        .bind(listing.location().as_ref())
        .bind(listing.category().as_ref())
        .bind(listing.image_url().as_ref().map(AsRef::<String>::as_ref))
        .execute(con)
        .await
        .convert_error()?;
        Ok(())
    }

    async fn delete(
        con: &mut PgConnection,
        listing_id: &ListingId,
    ) -> error_stack::Result<(), KernelError> {
        // bookings go with the listing through ON DELETE CASCADE
        sqlx::query(
            // language=postgresql
            r#"
            DELETE FROM listings
            WHERE id = $1
            "#,
        )
        .bind(listing_id.as_ref())
        .execute(con)
        .await
        .convert_error()?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use kernel::interface::database::DatabaseConnection;
    use kernel::interface::query::ListingQuery;
    use kernel::interface::update::ListingModifier;
    use kernel::prelude::entity::ListingTitle;
    use kernel::KernelError;

    use crate::database::postgres::listing::like_pattern;
    use crate::database::postgres::test::{connect, seed_listing, seed_profile};
    use crate::database::PostgresListingRepository;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }

    #[test_with::env(POSTGRES_TEST)]
    #[tokio::test]
    async fn create_update_delete() -> error_stack::Result<(), KernelError> {
        let db = connect().await?;
        let mut con = db.transact().await?;
        let owner = seed_profile(&mut con).await?;
        let listing = seed_listing(&mut con, owner.id(), "Cordless Drill").await?;

        let detail = PostgresListingRepository
            .find_detail_by_id(&mut con, listing.id())
            .await?
            .expect("listing exists");
        assert_eq!(detail.owner_username(), &Some(owner.username().clone()));

        let listing =
            listing.reconstruct(|l| l.title = ListingTitle::new("Hammer Drill"));
        PostgresListingRepository.update(&mut con, &listing).await?;
        let found = PostgresListingRepository
            .find_by_id(&mut con, listing.id())
            .await?
            .expect("listing exists");
        assert_eq!(found.title(), listing.title());

        PostgresListingRepository
            .delete(&mut con, listing.id())
            .await?;
        let found = PostgresListingRepository
            .find_by_id(&mut con, listing.id())
            .await?;
        assert!(found.is_none());
        Ok(())
    }

    #[test_with::env(POSTGRES_TEST)]
    #[tokio::test]
    async fn search_is_case_insensitive() -> error_stack::Result<(), KernelError> {
        let db = connect().await?;
        let mut con = db.transact().await?;
        let owner = seed_profile(&mut con).await?;
        let tag = rand::random::<u32>();
        let drill = seed_listing(&mut con, owner.id(), &format!("Cordless Drill {tag}")).await?;
        seed_listing(&mut con, owner.id(), &format!("Ladder {tag}")).await?;

        let found = PostgresListingRepository
            .search_by_title(&mut con, &format!("drill {tag}"))
            .await?;
        let ids = found.iter().map(|listing| listing.id()).collect::<Vec<_>>();
        assert_eq!(ids, vec![drill.id()]);

        let owned = PostgresListingRepository
            .find_by_owner(&mut con, owner.id())
            .await?;
        assert_eq!(owned.len(), 2);
        Ok(())
    }
}
