use kernel::prelude::entity::{BookingId, ListingId, UserId};

use crate::cache::QueryCache;
use crate::error::ClientResult;
use crate::gateway::MarketplaceGateway;
use crate::key::{QueryFilter, QueryKey};
use crate::model::{BookingView, NewBooking, SessionContext, Transition};

fn pending_key(listing: &ListingId, session: &SessionContext) -> Option<QueryKey> {
    session.user_id.map(|user| QueryKey::PendingBooking {
        listing: listing.clone(),
        user: UserId::new(user),
        session_version: session.session_version.clone(),
    })
}

/// Booking reads and mutations with a shared query cache.
///
/// Status changes show up in the cache as soon as they are sent, are undone
/// when the server rejects them, and are re-read from the server once they
/// settle.
pub struct BookingClient<G> {
    gateway: G,
    bookings: QueryCache<BookingView>,
    approved: QueryCache<Vec<BookingView>>,
    pending: QueryCache<Option<BookingView>>,
}

impl<G: MarketplaceGateway> BookingClient<G> {
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            bookings: QueryCache::new(),
            approved: QueryCache::new(),
            pending: QueryCache::new(),
        }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn cached_booking(&self, id: &BookingId) -> Option<BookingView> {
        self.bookings.peek(&QueryKey::Booking(id.clone()))
    }

    pub async fn session(&self) -> ClientResult<SessionContext> {
        self.gateway.session().await
    }

    pub async fn booking(&self, id: &BookingId) -> ClientResult<BookingView> {
        self.bookings
            .fetch(&QueryKey::Booking(id.clone()), || self.gateway.booking(id))
            .await
    }

    pub async fn approved_bookings(&self, listing: &ListingId) -> ClientResult<Vec<BookingView>> {
        self.approved
            .fetch(&QueryKey::ApprovedBookings(listing.clone()), || {
                self.gateway.approved_bookings(listing)
            })
            .await
    }

    /// The caller's pending request for `listing`. Anonymous sessions have none.
    pub async fn pending_booking(
        &self,
        listing: &ListingId,
        session: &SessionContext,
    ) -> ClientResult<Option<BookingView>> {
        let Some(key) = pending_key(listing, session) else {
            return Ok(None);
        };
        self.pending
            .fetch(&key, || self.gateway.pending_booking(listing))
            .await
    }

    fn cancel_listing(&self, listing: &ListingId) {
        self.approved
            .cancel(&QueryFilter::Exact(QueryKey::ApprovedBookings(listing.clone())));
        self.pending.cancel(&QueryFilter::PendingOf(listing.clone()));
    }

    fn invalidate_listing(&self, listing: &ListingId) {
        self.approved
            .invalidate(&QueryFilter::Exact(QueryKey::ApprovedBookings(listing.clone())));
        self.pending
            .invalidate(&QueryFilter::PendingOf(listing.clone()));
    }

    pub async fn create_booking(
        &self,
        request: &NewBooking,
        session: &SessionContext,
    ) -> ClientResult<BookingView> {
        let listing = ListingId::new(request.listing_id);
        self.cancel_listing(&listing);
        let result = self.gateway.create_booking(request).await;
        if let (Ok(created), Some(key)) = (&result, pending_key(&listing, session)) {
            self.pending.set(&key, Some(created.clone()));
        }
        self.invalidate_listing(&listing);
        result
    }

    pub async fn transition(
        &self,
        booking: &BookingView,
        transition: Transition,
    ) -> ClientResult<BookingView> {
        let id = BookingId::new(booking.id);
        let listing = ListingId::new(booking.listing_id);
        let key = QueryKey::Booking(id.clone());
        if self.bookings.peek(&key).is_none() {
            self.bookings.set(&key, booking.clone());
        }

        self.cancel_listing(&listing);
        let result = self
            .bookings
            .mutate(
                &key,
                move |current| match transition.target() {
                    Some(status) => current.with_status(status),
                    None => current.clone(),
                },
                || self.gateway.transition(&id, transition),
                &[QueryFilter::Exact(key.clone())],
            )
            .await;
        self.invalidate_listing(&listing);
        if let Err(error) = &result {
            tracing::debug!("{} {} rolled back: {error}", transition.segment(), id);
        }
        result
    }

    pub async fn approve(&self, booking: &BookingView) -> ClientResult<BookingView> {
        self.transition(booking, Transition::Approve).await
    }

    pub async fn decline(&self, booking: &BookingView) -> ClientResult<BookingView> {
        self.transition(booking, Transition::Decline).await
    }

    pub async fn cancel(&self, booking: &BookingView) -> ClientResult<BookingView> {
        self.transition(booking, Transition::Cancel).await
    }

    pub async fn remove_from_list(&self, booking: &BookingView) -> ClientResult<BookingView> {
        self.transition(booking, Transition::Remove).await
    }

    /// Withdraws the caller's pending request, clearing it from the cache
    /// up front.
    pub async fn delete_pending(
        &self,
        booking: &BookingView,
        session: &SessionContext,
    ) -> ClientResult<()> {
        let id = BookingId::new(booking.id);
        let listing = ListingId::new(booking.listing_id);
        let settle = [QueryFilter::PendingOf(listing.clone())];
        let result = match pending_key(&listing, session) {
            Some(key) => {
                self.pending
                    .mutate(&key, |_| None, || self.gateway.delete_booking(&id), &settle)
                    .await
            }
            None => self.gateway.delete_booking(&id).await,
        };
        self.bookings
            .invalidate(&QueryFilter::Exact(QueryKey::Booking(id)));
        self.invalidate_listing(&listing);
        result
    }
}

#[cfg(test)]
mod test {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    use reqwest::StatusCode;
    use time::macros::date;
    use time::OffsetDateTime;
    use uuid::Uuid;

    use kernel::prelude::entity::{BookingId, BookingStatus, ListingId};

    use crate::booking::BookingClient;
    use crate::error::{ClientError, ClientResult};
    use crate::gateway::MarketplaceGateway;
    use crate::model::{BookingView, NewBooking, SessionContext, Transition};

    /// Scripted stand-in for the HTTP API.
    #[derive(Default)]
    struct FakeGateway {
        bookings: Mutex<HashMap<Uuid, BookingView>>,
        reads: AtomicUsize,
        conflict: AtomicBool,
    }

    fn raw<T: AsRef<Uuid>>(id: &T) -> Uuid {
        *id.as_ref()
    }

    impl FakeGateway {
        fn reads(&self) -> usize {
            self.reads.load(Ordering::SeqCst)
        }

        fn not_found() -> ClientError {
            ClientError::Api {
                status: StatusCode::NOT_FOUND,
                message: "Booking not found".into(),
            }
        }
    }

    #[async_trait::async_trait]
    impl MarketplaceGateway for FakeGateway {
        async fn session(&self) -> ClientResult<SessionContext> {
            Ok(SessionContext::anonymous())
        }

        async fn booking(&self, id: &BookingId) -> ClientResult<BookingView> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            let bookings = self.bookings.lock().unwrap();
            bookings.get(&raw(id)).cloned().ok_or_else(Self::not_found)
        }

        async fn approved_bookings(&self, listing: &ListingId) -> ClientResult<Vec<BookingView>> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            let bookings = self.bookings.lock().unwrap();
            Ok(bookings
                .values()
                .filter(|b| b.listing_id == raw(listing) && b.status.blocks_dates())
                .cloned()
                .collect())
        }

        async fn pending_booking(&self, listing: &ListingId) -> ClientResult<Option<BookingView>> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            let bookings = self.bookings.lock().unwrap();
            Ok(bookings
                .values()
                .find(|b| b.listing_id == raw(listing) && b.status == BookingStatus::Pending)
                .cloned())
        }

        async fn create_booking(&self, booking: &NewBooking) -> ClientResult<BookingView> {
            let view = BookingView {
                listing_id: booking.listing_id,
                start_date: booking.start_date,
                end_date: booking.end_date,
                ..view(booking.listing_id)
            };
            self.bookings.lock().unwrap().insert(view.id, view.clone());
            Ok(view)
        }

        async fn transition(
            &self,
            id: &BookingId,
            transition: Transition,
        ) -> ClientResult<BookingView> {
            if self.conflict.load(Ordering::SeqCst) {
                return Err(ClientError::Api {
                    status: StatusCode::CONFLICT,
                    message: "These dates are already booked. Please select different dates."
                        .into(),
                });
            }
            let mut bookings = self.bookings.lock().unwrap();
            let booking = bookings.get_mut(&raw(id)).ok_or_else(Self::not_found)?;
            if let Some(status) = transition.target() {
                booking.status = status;
            }
            booking.version += 1;
            Ok(booking.clone())
        }

        async fn delete_booking(&self, id: &BookingId) -> ClientResult<()> {
            self.bookings
                .lock()
                .unwrap()
                .remove(&raw(id))
                .map(|_| ())
                .ok_or_else(Self::not_found)
        }
    }

    fn view(listing: Uuid) -> BookingView {
        BookingView {
            id: Uuid::new_v4(),
            listing_id: listing,
            borrower_id: Uuid::new_v4(),
            start_date: date!(2024 - 03 - 10),
            end_date: date!(2024 - 03 - 12),
            status: BookingStatus::Pending,
            price_per_day: 100,
            total_price: 300,
            owner_deleted: false,
            borrower_deleted: false,
            created_at: OffsetDateTime::UNIX_EPOCH,
            version: 0,
        }
    }

    fn seeded() -> (BookingClient<FakeGateway>, BookingView) {
        let booking = view(Uuid::new_v4());
        let gateway = FakeGateway::default();
        gateway
            .bookings
            .lock()
            .unwrap()
            .insert(booking.id, booking.clone());
        (BookingClient::new(gateway), booking)
    }

    fn signed_in(version: &str) -> SessionContext {
        SessionContext {
            user_id: Some(Uuid::new_v4()),
            session_version: version.to_string(),
        }
    }

    #[tokio::test]
    async fn approval_is_reread_after_settling() -> ClientResult<()> {
        let (client, booking) = seeded();
        let id = BookingId::new(booking.id);

        client.booking(&id).await?;
        client.booking(&id).await?;
        assert_eq!(client.gateway().reads(), 1);

        client.approve(&booking).await?;
        assert_eq!(
            client.cached_booking(&id).map(|b| b.status),
            Some(BookingStatus::Approved)
        );

        let fresh = client.booking(&id).await?;
        assert_eq!(client.gateway().reads(), 2);
        assert_eq!(fresh.status, BookingStatus::Approved);
        assert_eq!(fresh.version, 1);

        let listing = ListingId::new(booking.listing_id);
        assert_eq!(client.approved_bookings(&listing).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn rejected_approval_rolls_back() -> ClientResult<()> {
        let (client, booking) = seeded();
        let id = BookingId::new(booking.id);
        client.booking(&id).await?;
        client.gateway().conflict.store(true, Ordering::SeqCst);

        let error = client.approve(&booking).await.unwrap_err();
        assert!(error.is_conflict());
        assert_eq!(
            client.cached_booking(&id).map(|b| b.status),
            Some(BookingStatus::Pending)
        );
        Ok(())
    }

    #[tokio::test]
    async fn pending_request_is_scoped_to_session() -> ClientResult<()> {
        let client = BookingClient::new(FakeGateway::default());
        let listing = Uuid::new_v4();
        let listing_id = ListingId::new(listing);
        let session = signed_in("alice:1700000000");

        assert_eq!(
            client
                .pending_booking(&listing_id, &SessionContext::anonymous())
                .await?,
            None
        );
        assert_eq!(client.gateway().reads(), 0);

        let created = client
            .create_booking(
                &NewBooking {
                    listing_id: listing,
                    start_date: date!(2024 - 04 - 01),
                    end_date: date!(2024 - 04 - 02),
                },
                &session,
            )
            .await?;
        let pending = client.pending_booking(&listing_id, &session).await?;
        assert_eq!(pending.map(|b| b.id), Some(created.id));
        assert_eq!(client.gateway().reads(), 1);

        client
            .pending_booking(&listing_id, &signed_in("bob:1700000001"))
            .await?;
        assert_eq!(client.gateway().reads(), 2);

        client.delete_pending(&created, &session).await?;
        assert_eq!(client.pending_booking(&listing_id, &session).await?, None);
        Ok(())
    }
}
