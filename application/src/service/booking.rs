use std::collections::BTreeSet;

use uuid::Uuid;

use kernel::interface::database::{DatabaseConnection, Transaction};
use kernel::interface::event::{check_withdrawal, Actor, Applier, BookingEvent};
use kernel::interface::query::{
    BookingQuery, DependOnBookingQuery, DependOnListingQuery, ListingQuery,
};
use kernel::interface::update::{BookingModifier, DependOnBookingModifier};
use kernel::prelude::entity::{Booking, BookingId, BookingPeriod, ListingId, UserId};
use kernel::{rejected, KernelError};

use crate::transfer::{
    BookingAction, BookingDto, CompleteBookingsDto, CreateBookingDto, DeletePendingBookingDto,
    GetBookingDto, GetListingBookingsDto, GetOwnedListingBookingsDto, GetPendingBookingDto,
    GetUnavailableDaysDto, GetUserBookingsDto, UnavailableDaysDto, UpdateBookingStatusDto,
};

fn into_dtos(bookings: Vec<Booking>) -> Vec<BookingDto> {
    bookings.into_iter().map(BookingDto::from).collect()
}

#[async_trait::async_trait]
pub trait CreateBookingService:
    'static + Sync + Send + DependOnListingQuery + DependOnBookingModifier
{
    /// Records a `pending` request priced from the listing's current rate.
    async fn create_booking(
        &self,
        dto: CreateBookingDto,
    ) -> error_stack::Result<BookingDto, KernelError> {
        let period = BookingPeriod::new(dto.start_date, dto.end_date)?;
        if period.has_passed_start(&dto.today) {
            return Err(rejected(
                KernelError::Validation,
                "Start date cannot be in the past",
            ));
        }

        let mut connection = self.database_connection().transact().await?;
        let listing_id = ListingId::new(dto.listing_id);
        let listing = self
            .listing_query()
            .find_by_id(&mut connection, &listing_id)
            .await?
            .ok_or_else(|| rejected(KernelError::NotFound, "Listing not found"))?;
        let borrower = UserId::new(dto.actor);
        if listing.is_owned_by(&borrower) {
            return Err(rejected(
                KernelError::Forbidden,
                "You cannot book your own listing",
            ));
        }

        let booking = Booking::request(
            BookingId::new(Uuid::new_v4()),
            listing_id,
            borrower,
            period,
            *listing.price_per_day(),
        )?;
        self.booking_modifier()
            .create(&mut connection, &booking)
            .await?;
        connection.commit().await?;

        tracing::info!(
            "booking {} requested on listing {}",
            booking.id(),
            booking.listing_id()
        );
        Ok(BookingDto::from(booking))
    }
}

impl<T> CreateBookingService for T where T: DependOnListingQuery + DependOnBookingModifier {}

#[async_trait::async_trait]
pub trait GetBookingService:
    'static + Sync + Send + DependOnBookingQuery + DependOnListingQuery
{
    /// Visible to the borrower and the listing owner only.
    async fn get_booking(&self, dto: GetBookingDto) -> error_stack::Result<BookingDto, KernelError> {
        let mut connection = self.database_connection().transact().await?;
        let booking = self
            .booking_query()
            .find_by_id(&mut connection, &BookingId::new(dto.id))
            .await?
            .ok_or_else(|| rejected(KernelError::NotFound, "Booking not found"))?;
        let listing = self
            .listing_query()
            .find_by_id(&mut connection, booking.listing_id())
            .await?
            .ok_or_else(|| rejected(KernelError::NotFound, "Listing not found"))?;
        if booking
            .party_of(&UserId::new(dto.actor), listing.owner_id())
            .is_none()
        {
            return Err(rejected(
                KernelError::Forbidden,
                "You are not part of this booking",
            ));
        }
        Ok(BookingDto::from(booking))
    }

    /// Every booking on a listing, for its owner.
    async fn get_bookings_by_listing(
        &self,
        dto: GetOwnedListingBookingsDto,
    ) -> error_stack::Result<Vec<BookingDto>, KernelError> {
        let mut connection = self.database_connection().transact().await?;
        let listing = self
            .listing_query()
            .find_by_id(&mut connection, &ListingId::new(dto.listing_id))
            .await?
            .ok_or_else(|| rejected(KernelError::NotFound, "Listing not found"))?;
        if !listing.is_owned_by(&UserId::new(dto.actor)) {
            return Err(rejected(
                KernelError::Forbidden,
                "Only the owner can view this listing's bookings",
            ));
        }
        let bookings = self
            .booking_query()
            .find_by_listing(&mut connection, listing.id())
            .await?;
        Ok(into_dtos(bookings))
    }

    async fn get_approved_bookings_by_listing(
        &self,
        dto: GetListingBookingsDto,
    ) -> error_stack::Result<Vec<BookingDto>, KernelError> {
        let mut connection = self.database_connection().transact().await?;
        let bookings = self
            .booking_query()
            .find_blocking_by_listing(&mut connection, &ListingId::new(dto.listing_id))
            .await?;
        Ok(into_dtos(bookings))
    }

    async fn get_unavailable_days(
        &self,
        dto: GetUnavailableDaysDto,
    ) -> error_stack::Result<UnavailableDaysDto, KernelError> {
        let mut connection = self.database_connection().transact().await?;
        let bookings = self
            .booking_query()
            .find_blocking_by_listing(&mut connection, &ListingId::new(dto.listing_id))
            .await?;
        let days = bookings
            .iter()
            .flat_map(|booking| booking.period().iter_days())
            .collect::<BTreeSet<_>>();
        Ok(UnavailableDaysDto {
            before: dto.today,
            days: days.into_iter().collect(),
        })
    }

    /// `None` simply means the caller has no open request on the listing.
    async fn get_pending_booking_for_listing(
        &self,
        dto: GetPendingBookingDto,
    ) -> error_stack::Result<Option<BookingDto>, KernelError> {
        let mut connection = self.database_connection().transact().await?;
        let booking = self
            .booking_query()
            .find_pending(
                &mut connection,
                &ListingId::new(dto.listing_id),
                &UserId::new(dto.actor),
            )
            .await?;
        Ok(booking.map(BookingDto::from))
    }

    async fn get_bookings_as_borrower(
        &self,
        dto: GetUserBookingsDto,
    ) -> error_stack::Result<Vec<BookingDto>, KernelError> {
        let mut connection = self.database_connection().transact().await?;
        let bookings = self
            .booking_query()
            .find_visible_by_borrower(&mut connection, &UserId::new(dto.actor))
            .await?;
        Ok(into_dtos(bookings))
    }

    async fn get_bookings_as_owner(
        &self,
        dto: GetUserBookingsDto,
    ) -> error_stack::Result<Vec<BookingDto>, KernelError> {
        let mut connection = self.database_connection().transact().await?;
        let bookings = self
            .booking_query()
            .find_visible_by_owner(&mut connection, &UserId::new(dto.actor))
            .await?;
        Ok(into_dtos(bookings))
    }
}

impl<T> GetBookingService for T where T: DependOnBookingQuery + DependOnListingQuery {}

#[async_trait::async_trait]
pub trait UpdateBookingStatusService:
    'static + Sync + Send + DependOnBookingQuery + DependOnListingQuery + DependOnBookingModifier
{
    async fn update_booking_status(
        &self,
        dto: UpdateBookingStatusDto,
        action: BookingAction,
    ) -> error_stack::Result<BookingDto, KernelError> {
        let mut connection = self.database_connection().transact().await?;
        let booking = self
            .booking_query()
            .find_by_id(&mut connection, &BookingId::new(dto.id))
            .await?
            .ok_or_else(|| rejected(KernelError::NotFound, "Booking not found"))?;
        let listing = self
            .listing_query()
            .find_by_id(&mut connection, booking.listing_id())
            .await?
            .ok_or_else(|| rejected(KernelError::NotFound, "Listing not found"))?;

        let user = UserId::new(dto.actor);
        let event = match action {
            BookingAction::Approve => BookingEvent::Approve,
            BookingAction::Decline => BookingEvent::Decline,
            BookingAction::Cancel => BookingEvent::Cancel,
            BookingAction::Remove => {
                let party = booking
                    .party_of(&user, listing.owner_id())
                    .ok_or_else(|| {
                        rejected(KernelError::Forbidden, "You are not part of this booking")
                    })?;
                BookingEvent::Hide { party }
            }
        };
        event.check(&booking, listing.owner_id(), &Actor::User(user), &dto.today)?;

        let expected = booking.version().clone();
        let mut booking = booking;
        booking.apply(event);
        self.booking_modifier()
            .update(&mut connection, &booking, &expected)
            .await?;
        connection.commit().await?;

        tracing::info!("booking {} -> {:?}", booking.id(), action);
        Ok(BookingDto::from(booking))
    }

    async fn approve_booking(
        &self,
        dto: UpdateBookingStatusDto,
    ) -> error_stack::Result<BookingDto, KernelError> {
        self.update_booking_status(dto, BookingAction::Approve).await
    }

    async fn decline_booking(
        &self,
        dto: UpdateBookingStatusDto,
    ) -> error_stack::Result<BookingDto, KernelError> {
        self.update_booking_status(dto, BookingAction::Decline).await
    }

    async fn cancel_booking(
        &self,
        dto: UpdateBookingStatusDto,
    ) -> error_stack::Result<BookingDto, KernelError> {
        self.update_booking_status(dto, BookingAction::Cancel).await
    }

    /// Hides a declined or cancelled booking from the caller's own list.
    async fn remove_booking_from_list(
        &self,
        dto: UpdateBookingStatusDto,
    ) -> error_stack::Result<BookingDto, KernelError> {
        self.update_booking_status(dto, BookingAction::Remove).await
    }
}

impl<T> UpdateBookingStatusService for T where
    T: DependOnBookingQuery + DependOnListingQuery + DependOnBookingModifier
{
}

#[async_trait::async_trait]
pub trait DeletePendingBookingService:
    'static + Sync + Send + DependOnBookingQuery + DependOnBookingModifier
{
    async fn delete_pending_booking(
        &self,
        dto: DeletePendingBookingDto,
    ) -> error_stack::Result<(), KernelError> {
        let mut connection = self.database_connection().transact().await?;
        let id = BookingId::new(dto.id);
        let booking = self
            .booking_query()
            .find_by_id(&mut connection, &id)
            .await?
            .ok_or_else(|| rejected(KernelError::NotFound, "Booking not found"))?;
        check_withdrawal(&booking, &UserId::new(dto.actor))?;
        self.booking_modifier().delete(&mut connection, &id).await?;
        connection.commit().await?;
        tracing::info!("pending booking {} withdrawn", id);
        Ok(())
    }
}

impl<T> DeletePendingBookingService for T where T: DependOnBookingQuery + DependOnBookingModifier {}

#[async_trait::async_trait]
pub trait CompleteBookingsService:
    'static + Sync + Send + DependOnBookingQuery + DependOnListingQuery + DependOnBookingModifier
{
    /// Marks approved bookings that ended before `today` as completed and
    /// returns how many changed.
    async fn complete_finished_bookings(
        &self,
        dto: CompleteBookingsDto,
    ) -> error_stack::Result<usize, KernelError> {
        let mut connection = self.database_connection().transact().await?;
        let finished = self
            .booking_query()
            .find_finished(&mut connection, &dto.today)
            .await?;

        let mut completed = 0;
        for booking in finished {
            let Some(listing) = self
                .listing_query()
                .find_by_id(&mut connection, booking.listing_id())
                .await?
            else {
                continue;
            };
            BookingEvent::Complete.check(
                &booking,
                listing.owner_id(),
                &Actor::System,
                &dto.today,
            )?;
            let expected = booking.version().clone();
            let mut booking = booking;
            booking.apply(BookingEvent::Complete);
            match self
                .booking_modifier()
                .update(&mut connection, &booking, &expected)
                .await
            {
                Ok(()) => completed += 1,
                Err(report) if matches!(report.current_context(), KernelError::Concurrency) => {
                    tracing::warn!("booking {} changed during completion", booking.id());
                }
                Err(report) => return Err(report),
            }
        }
        connection.commit().await?;
        if completed > 0 {
            tracing::info!("completed {completed} finished bookings");
        }
        Ok(completed)
    }
}

impl<T> CompleteBookingsService for T where
    T: DependOnBookingQuery + DependOnListingQuery + DependOnBookingModifier
{
}
