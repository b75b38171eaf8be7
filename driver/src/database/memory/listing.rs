use kernel::interface::query::ListingQuery;
use kernel::interface::update::ListingModifier;
use kernel::prelude::entity::{Listing, ListingDetail, ListingId, UserId};
use kernel::{rejected, KernelError};

use crate::database::memory::InMemoryTransaction;

pub struct InMemoryListingRepository;

fn newest_first<'a>(listings: impl DoubleEndedIterator<Item = &'a Listing>) -> Vec<Listing> {
    let mut listings = listings.rev().cloned().collect::<Vec<_>>();
    listings.sort_by(|a, b| b.created_at().as_ref().cmp(a.created_at().as_ref()));
    listings
}

#[async_trait::async_trait]
impl ListingQuery for InMemoryListingRepository {
    type Transaction = InMemoryTransaction;
    async fn find_by_id(
        &self,
        con: &mut InMemoryTransaction,
        id: &ListingId,
    ) -> error_stack::Result<Option<Listing>, KernelError> {
        Ok(con.listings.iter().find(|l| l.id() == id).cloned())
    }

    async fn find_detail_by_id(
        &self,
        con: &mut InMemoryTransaction,
        id: &ListingId,
    ) -> error_stack::Result<Option<ListingDetail>, KernelError> {
        let Some(listing) = con.listings.iter().find(|l| l.id() == id).cloned() else {
            return Ok(None);
        };
        let owner_username = con
            .profiles
            .iter()
            .find(|p| p.id() == listing.owner_id())
            .map(|p| p.username().clone());
        Ok(Some(ListingDetail::new(listing, owner_username)))
    }

    async fn find_all(
        &self,
        con: &mut InMemoryTransaction,
    ) -> error_stack::Result<Vec<Listing>, KernelError> {
        Ok(newest_first(con.listings.iter()))
    }

    async fn search_by_title(
        &self,
        con: &mut InMemoryTransaction,
        needle: &str,
    ) -> error_stack::Result<Vec<Listing>, KernelError> {
        Ok(newest_first(
            con.listings.iter().filter(|l| l.title_contains(needle)),
        ))
    }

    async fn find_by_owner(
        &self,
        con: &mut InMemoryTransaction,
        owner: &UserId,
    ) -> error_stack::Result<Vec<Listing>, KernelError> {
        Ok(newest_first(
            con.listings.iter().filter(|l| l.is_owned_by(owner)),
        ))
    }
}

#[async_trait::async_trait]
impl ListingModifier for InMemoryListingRepository {
    type Transaction = InMemoryTransaction;
    async fn create(
        &self,
        con: &mut InMemoryTransaction,
        listing: &Listing,
    ) -> error_stack::Result<(), KernelError> {
        con.listings.push(listing.clone());
        Ok(())
    }

    async fn update(
        &self,
        con: &mut InMemoryTransaction,
        listing: &Listing,
    ) -> error_stack::Result<(), KernelError> {
        let stored = con
            .listings
            .iter_mut()
            .find(|l| l.id() == listing.id())
            .ok_or_else(|| rejected(KernelError::NotFound, "Listing not found"))?;
        *stored = listing.clone();
        Ok(())
    }

    async fn delete(
        &self,
        con: &mut InMemoryTransaction,
        listing_id: &ListingId,
    ) -> error_stack::Result<(), KernelError> {
        con.listings.retain(|l| l.id() != listing_id);
        con.bookings.retain(|b| b.listing_id() != listing_id);
        Ok(())
    }
}
