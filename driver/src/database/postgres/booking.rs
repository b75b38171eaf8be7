use error_stack::Report;
use sqlx::types::Uuid;
use sqlx::PgConnection;
use time::{Date, OffsetDateTime};

use kernel::interface::query::BookingQuery;
use kernel::interface::update::BookingModifier;
use kernel::prelude::entity::{
    Booking, BookingId, BookingPeriod, BookingStatus, CreatedAt, EventVersion, ListingId,
    PricePerDay, TotalPrice, UserId, Visibility,
};
use kernel::{ConflictKind, KernelError};

use crate::database::postgres::PostgresTransaction;
use crate::error::ConvertError;

pub struct PostgresBookingRepository;

#[async_trait::async_trait]
impl BookingQuery for PostgresBookingRepository {
    type Transaction = PostgresTransaction;
    async fn find_by_id(
        &self,
        con: &mut PostgresTransaction,
        id: &BookingId,
    ) -> error_stack::Result<Option<Booking>, KernelError> {
        PgBookingInternal::find_by_id(con, id).await
    }

    async fn find_by_listing(
        &self,
        con: &mut PostgresTransaction,
        listing_id: &ListingId,
    ) -> error_stack::Result<Vec<Booking>, KernelError> {
        PgBookingInternal::find_by_listing(con, listing_id, false).await
    }

    async fn find_blocking_by_listing(
        &self,
        con: &mut PostgresTransaction,
        listing_id: &ListingId,
    ) -> error_stack::Result<Vec<Booking>, KernelError> {
        PgBookingInternal::find_by_listing(con, listing_id, true).await
    }

    async fn find_pending(
        &self,
        con: &mut PostgresTransaction,
        listing_id: &ListingId,
        borrower_id: &UserId,
    ) -> error_stack::Result<Option<Booking>, KernelError> {
        PgBookingInternal::find_pending(con, listing_id, borrower_id).await
    }

    async fn find_visible_by_borrower(
        &self,
        con: &mut PostgresTransaction,
        borrower_id: &UserId,
    ) -> error_stack::Result<Vec<Booking>, KernelError> {
        PgBookingInternal::find_visible_by_borrower(con, borrower_id).await
    }

    async fn find_visible_by_owner(
        &self,
        con: &mut PostgresTransaction,
        owner_id: &UserId,
    ) -> error_stack::Result<Vec<Booking>, KernelError> {
        PgBookingInternal::find_visible_by_owner(con, owner_id).await
    }

    async fn find_finished(
        &self,
        con: &mut PostgresTransaction,
        today: &Date,
    ) -> error_stack::Result<Vec<Booking>, KernelError> {
        PgBookingInternal::find_finished(con, today).await
    }
}

#[async_trait::async_trait]
impl BookingModifier for PostgresBookingRepository {
    type Transaction = PostgresTransaction;
    async fn create(
        &self,
        con: &mut PostgresTransaction,
        booking: &Booking,
    ) -> error_stack::Result<(), KernelError> {
        PgBookingInternal::create(con, booking).await
    }

    async fn update(
        &self,
        con: &mut PostgresTransaction,
        booking: &Booking,
        expected: &EventVersion<Booking>,
    ) -> error_stack::Result<(), KernelError> {
        PgBookingInternal::update(con, booking, expected).await
    }

    async fn delete(
        &self,
        con: &mut PostgresTransaction,
        booking_id: &BookingId,
    ) -> error_stack::Result<(), KernelError> {
        PgBookingInternal::delete(con, booking_id).await
    }
}

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    listing_id: Uuid,
    borrower_id: Uuid,
    start_date: Date,
    end_date: Date,
    status: String,
    price_per_day_at_booking: i64,
    total_price: i64,
    owner_deleted: bool,
    borrower_deleted: bool,
    created_at: OffsetDateTime,
    version: i64,
}

impl TryFrom<BookingRow> for Booking {
    type Error = Report<KernelError>;
    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        Ok(Booking::new(
            BookingId::new(row.id),
            ListingId::new(row.listing_id),
            UserId::new(row.borrower_id),
            BookingPeriod::new(row.start_date, row.end_date)?,
            row.status.parse::<BookingStatus>()?,
            PricePerDay::new(row.price_per_day_at_booking),
            TotalPrice::new(row.total_price),
            Visibility::new(row.owner_deleted, row.borrower_deleted),
            CreatedAt::new(row.created_at),
            EventVersion::new(row.version),
        ))
    }
}

fn into_bookings(rows: Vec<BookingRow>) -> error_stack::Result<Vec<Booking>, KernelError> {
    rows.into_iter().map(Booking::try_from).collect()
}

pub(in crate::database) struct PgBookingInternal;

impl PgBookingInternal {
    async fn find_by_id(
        con: &mut PgConnection,
        id: &BookingId,
    ) -> error_stack::Result<Option<Booking>, KernelError> {
        let row = sqlx::query_as::<_, BookingRow>(
            // language=postgresql
            r#"
            SELECT id, listing_id, borrower_id, start_date, end_date, status, price_per_day_at_booking,
                   total_price, owner_deleted, borrower_deleted, created_at, version
            FROM bookings
            WHERE id = $1
            "#,
        )
        .bind(id.as_ref())
        .fetch_optional(con)
        .await
        .convert_error()?;
        row.map(Booking::try_from).transpose()
    }

    async fn find_by_listing(
        con: &mut PgConnection,
        listing_id: &ListingId,
        blocking_only: bool,
    ) -> error_stack::Result<Vec<Booking>, KernelError> {
        let rows = sqlx::query_as::<_, BookingRow>(
            // language=postgresql
            r#"
            SELECT id, listing_id, borrower_id, start_date, end_date, status, price_per_day_at_booking,
                   total_price, owner_deleted, borrower_deleted, created_at, version
            FROM bookings
            WHERE listing_id = $1 AND (NOT $2 OR status IN ('approved', 'completed'))
            ORDER BY start_date
            "#,
        )
        .bind(listing_id.as_ref())
        .bind(blocking_only)
        .fetch_all(con)
        .await
        .convert_error()?;
        into_bookings(rows)
    }

    async fn find_pending(
        con: &mut PgConnection,
        listing_id: &ListingId,
        borrower_id: &UserId,
    ) -> error_stack::Result<Option<Booking>, KernelError> {
        let row = sqlx::query_as::<_, BookingRow>(
            // language=postgresql
            r#"
            SELECT id, listing_id, borrower_id, start_date, end_date, status, price_per_day_at_booking,
                   total_price, owner_deleted, borrower_deleted, created_at, version
            FROM bookings
            WHERE listing_id = $1 AND borrower_id = $2 AND status = 'pending'
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(listing_id.as_ref())
        .bind(borrower_id.as_ref())
        .fetch_optional(con)
        .await
        .convert_error()?;
        row.map(Booking::try_from).transpose()
    }

    async fn find_visible_by_borrower(
        con: &mut PgConnection,
        borrower_id: &UserId,
    ) -> error_stack::Result<Vec<Booking>, KernelError> {
        let rows = sqlx::query_as::<_, BookingRow>(
            // language=postgresql
            r#"
            SELECT id, listing_id, borrower_id, start_date, end_date, status, price_per_day_at_booking,
                   total_price, owner_deleted, borrower_deleted, created_at, version
            FROM bookings
            WHERE borrower_id = $1 AND NOT borrower_deleted
            ORDER BY created_at DESC
            "#,
        )
        .bind(borrower_id.as_ref())
        .fetch_all(con)
        .await
        .convert_error()?;
        into_bookings(rows)
    }

    async fn find_visible_by_owner(
        con: &mut PgConnection,
        owner_id: &UserId,
    ) -> error_stack::Result<Vec<Booking>, KernelError> {
        let rows = sqlx::query_as::<_, BookingRow>(
            // language=postgresql
            r#"
            SELECT b.id, b.listing_id, b.borrower_id, b.start_date, b.end_date, b.status, b.price_per_day_at_booking,
                   b.total_price, b.owner_deleted, b.borrower_deleted, b.created_at, b.version
            FROM bookings b
            JOIN listings l ON l.id = b.listing_id
            WHERE l.owner_id = $1 AND NOT b.owner_deleted
            ORDER BY b.created_at DESC
            "#,
        )
        .bind(owner_id.as_ref())
        .fetch_all(con)
        .await
        .convert_error()?;
        into_bookings(rows)
    }

    async fn find_finished(
        con: &mut PgConnection,
        today: &Date,
    ) -> error_stack::Result<Vec<Booking>, KernelError> {
        let rows = sqlx::query_as::<_, BookingRow>(
            // language=postgresql
            r#"
            SELECT id, listing_id, borrower_id, start_date, end_date, status, price_per_day_at_booking,
                   total_price, owner_deleted, borrower_deleted, created_at, version
            FROM bookings
            WHERE status = 'approved' AND end_date < $1
            "#,
        )
        .bind(today)
        .fetch_all(con)
        .await
        .convert_error()?;
        into_bookings(rows)
    }

    async fn create(
        con: &mut PgConnection,
        booking: &Booking,
    ) -> error_stack::Result<(), KernelError> {
        let overlapping = sqlx::query_as::<_, (Uuid,)>(
            // language=postgresql
            r#"
            SELECT id
            FROM bookings
            WHERE listing_id = $1
              AND status IN ('approved', 'completed')
              AND start_date <= $3
              AND end_date >= $2
            LIMIT 1
            "#,
        )
        .bind(booking.listing_id().as_ref())
        .bind(booking.period().start())
        .bind(booking.period().end())
        .fetch_optional(&mut *con)
        .await
        .convert_error()?;
        if overlapping.is_some() {
            return Err(Report::new(KernelError::Conflict)
                .attach_printable(ConflictKind::DatesAlreadyBooked));
        }

        sqlx::query(
            // language=postgresql
            r#"
            INSERT INTO bookings (id, listing_id, borrower_id, start_date, end_date, status, price_per_day_at_booking,
                                  total_price, owner_deleted, borrower_deleted, created_at, version)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(booking.id().as_ref())
        .bind(booking.listing_id().as_ref())
        .bind(booking.borrower_id().as_ref())
        .bind(booking.period().start())
        .bind(booking.period().end())
        .bind(booking.status().as_str())
        .bind(booking.price_per_day().as_ref())
        .bind(booking.total_price().as_ref())
        .bind(booking.visibility().owner_deleted())
        .bind(booking.visibility().borrower_deleted())
        .bind(booking.created_at().as_ref())
        .bind(booking.version().as_ref())
        .execute(con)
        .await
        .convert_error()?;
        Ok(())
    }

    async fn update(
        con: &mut PgConnection,
        booking: &Booking,
        expected: &EventVersion<Booking>,
    ) -> error_stack::Result<(), KernelError> {
        // the exclusion constraint rejects confirmed overlaps with 23P01
        let result = sqlx::query(
            // language=postgresql
            r#"
            UPDATE bookings
            SET status = $2, owner_deleted = $3, borrower_deleted = $4, version = $5
            WHERE id = $1 AND version = $6
            "#,
        )
        .bind(booking.id().as_ref())
        .bind(booking.status().as_str())
        .bind(booking.visibility().owner_deleted())
        .bind(booking.visibility().borrower_deleted())
        .bind(booking.version().as_ref())
        .bind(expected.as_ref())
        .execute(con)
        .await
        .convert_error()?;
        if result.rows_affected() == 0 {
            return Err(Report::new(KernelError::Concurrency).attach_printable(format!(
                "Booking {} changed since version {}",
                booking.id(),
                expected.as_ref()
            )));
        }
        Ok(())
    }

    async fn delete(
        con: &mut PgConnection,
        booking_id: &BookingId,
    ) -> error_stack::Result<(), KernelError> {
        sqlx::query(
            // language=postgresql
            r#"
            DELETE FROM bookings
            WHERE id = $1
            "#,
        )
        .bind(booking_id.as_ref())
        .execute(con)
        .await
        .convert_error()?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use time::macros::date;
    use uuid::Uuid;

    use kernel::interface::database::{DatabaseConnection, Transaction};
    use kernel::interface::event::{Applier, BookingEvent};
    use kernel::interface::query::BookingQuery;
    use kernel::interface::update::BookingModifier;
    use kernel::prelude::entity::{
        Booking, BookingId, BookingPeriod, BookingStatus, Listing, UserId,
    };
    use kernel::{ConflictKind, KernelError, ReportExt};

    use crate::database::postgres::test::{connect, seed_listing, seed_profile};
    use crate::database::{PostgresBookingRepository, PostgresDatabase};

    fn request(listing: &Listing, borrower: &UserId, start: time::Date, end: time::Date) -> Booking {
        Booking::request(
            BookingId::new(Uuid::new_v4()),
            listing.id().clone(),
            borrower.clone(),
            BookingPeriod::new(start, end).unwrap(),
            *listing.price_per_day(),
        )
        .unwrap()
    }

    async fn approve(
        db: &PostgresDatabase,
        booking: &Booking,
    ) -> error_stack::Result<(), KernelError> {
        let mut con = db.transact().await?;
        let expected = booking.version().clone();
        let mut approved = booking.clone();
        approved.apply(BookingEvent::Approve);
        PostgresBookingRepository
            .update(&mut con, &approved, &expected)
            .await?;
        con.commit().await
    }

    #[test_with::env(POSTGRES_TEST)]
    #[tokio::test]
    async fn create_and_find() -> error_stack::Result<(), KernelError> {
        let db = connect().await?;
        let mut con = db.transact().await?;
        let owner = seed_profile(&mut con).await?;
        let borrower = seed_profile(&mut con).await?;
        let listing = seed_listing(&mut con, owner.id(), "Tent").await?;
        let booking = request(&listing, borrower.id(), date!(2024 - 01 - 10), date!(2024 - 01 - 12));
        PostgresBookingRepository.create(&mut con, &booking).await?;

        let found = PostgresBookingRepository
            .find_pending(&mut con, listing.id(), borrower.id())
            .await?
            .expect("pending booking");
        assert_eq!(found.id(), booking.id());
        assert_eq!(*found.total_price().as_ref(), 300);

        let mine = PostgresBookingRepository
            .find_visible_by_borrower(&mut con, borrower.id())
            .await?;
        assert_eq!(mine.len(), 1);
        let requests = PostgresBookingRepository
            .find_visible_by_owner(&mut con, owner.id())
            .await?;
        assert_eq!(requests.len(), 1);
        Ok(())
    }

    #[test_with::env(POSTGRES_TEST)]
    #[tokio::test]
    async fn stale_version_is_rejected() -> error_stack::Result<(), KernelError> {
        let db = connect().await?;
        let mut con = db.transact().await?;
        let owner = seed_profile(&mut con).await?;
        let borrower = seed_profile(&mut con).await?;
        let listing = seed_listing(&mut con, owner.id(), "Kayak").await?;
        let booking = request(&listing, borrower.id(), date!(2024 - 02 - 01), date!(2024 - 02 - 02));
        PostgresBookingRepository.create(&mut con, &booking).await?;

        let mut declined = booking.clone();
        declined.apply(BookingEvent::Decline);
        PostgresBookingRepository
            .update(&mut con, &declined, booking.version())
            .await?;
        let report = PostgresBookingRepository
            .update(&mut con, &declined, booking.version())
            .await
            .unwrap_err();
        assert!(matches!(report.current_context(), KernelError::Concurrency));
        Ok(())
    }

    #[test_with::env(POSTGRES_TEST)]
    #[tokio::test]
    async fn overlapping_approvals_race() -> error_stack::Result<(), KernelError> {
        let db = connect().await?;
        let mut con = db.transact().await?;
        let owner = seed_profile(&mut con).await?;
        let first = seed_profile(&mut con).await?;
        let second = seed_profile(&mut con).await?;
        let listing = seed_listing(&mut con, owner.id(), "Projector").await?;
        let a = request(&listing, first.id(), date!(2024 - 03 - 01), date!(2024 - 03 - 05));
        let b = request(&listing, second.id(), date!(2024 - 03 - 04), date!(2024 - 03 - 08));
        PostgresBookingRepository.create(&mut con, &a).await?;
        PostgresBookingRepository.create(&mut con, &b).await?;
        con.commit().await?;

        let (left, right) = tokio::join!(approve(&db, &a), approve(&db, &b));
        let failures = [&left, &right]
            .into_iter()
            .filter_map(|result| result.as_ref().err())
            .collect::<Vec<_>>();
        assert_eq!(failures.len(), 1);
        assert_eq!(
            failures[0].conflict_kind(),
            Some(ConflictKind::DatesAlreadyBooked)
        );

        let mut con = db.transact().await?;
        let approved = PostgresBookingRepository
            .find_blocking_by_listing(&mut con, listing.id())
            .await?;
        assert_eq!(approved.len(), 1);
        assert_eq!(approved[0].status(), &BookingStatus::Approved);

        let c = request(&listing, first.id(), date!(2024 - 03 - 05), date!(2024 - 03 - 06));
        let report = PostgresBookingRepository
            .create(&mut con, &c)
            .await
            .unwrap_err();
        assert_eq!(report.conflict_kind(), Some(ConflictKind::DatesAlreadyBooked));
        Ok(())
    }
}
