use std::sync::Arc;

use kernel::interface::auth::DependOnAuthService;
use kernel::interface::database::DependOnDatabaseConnection;
use kernel::interface::query::{DependOnBookingQuery, DependOnListingQuery, DependOnProfileQuery};
use kernel::interface::storage::DependOnImageStorage;
use kernel::interface::update::{
    DependOnBookingModifier, DependOnListingModifier, DependOnProfileModifier,
};

use crate::auth::InMemoryAuth;
use crate::database::{
    InMemoryBookingRepository, InMemoryDatabase, InMemoryListingRepository,
    InMemoryProfileRepository,
};
use crate::storage::InMemoryImageStorage;

/// Every dependency backed by process memory.
#[derive(Clone, Default)]
pub struct InMemoryModule {
    database: InMemoryDatabase,
    auth: Arc<InMemoryAuth>,
    storage: Arc<InMemoryImageStorage>,
}

impl InMemoryModule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn storage(&self) -> &InMemoryImageStorage {
        &self.storage
    }
}

impl DependOnDatabaseConnection for InMemoryModule {
    type DatabaseConnection = InMemoryDatabase;
    fn database_connection(&self) -> &Self::DatabaseConnection {
        &self.database
    }
}

impl DependOnAuthService for InMemoryModule {
    type AuthService = InMemoryAuth;
    fn auth_service(&self) -> &Self::AuthService {
        &self.auth
    }
}

impl DependOnImageStorage for InMemoryModule {
    type ImageStorage = InMemoryImageStorage;
    fn image_storage(&self) -> &Self::ImageStorage {
        &self.storage
    }
}

impl DependOnListingQuery for InMemoryModule {
    type ListingQuery = InMemoryListingRepository;
    fn listing_query(&self) -> &Self::ListingQuery {
        &InMemoryListingRepository
    }
}

impl DependOnListingModifier for InMemoryModule {
    type ListingModifier = InMemoryListingRepository;
    fn listing_modifier(&self) -> &Self::ListingModifier {
        &InMemoryListingRepository
    }
}

impl DependOnBookingQuery for InMemoryModule {
    type BookingQuery = InMemoryBookingRepository;
    fn booking_query(&self) -> &Self::BookingQuery {
        &InMemoryBookingRepository
    }
}

impl DependOnBookingModifier for InMemoryModule {
    type BookingModifier = InMemoryBookingRepository;
    fn booking_modifier(&self) -> &Self::BookingModifier {
        &InMemoryBookingRepository
    }
}

impl DependOnProfileQuery for InMemoryModule {
    type ProfileQuery = InMemoryProfileRepository;
    fn profile_query(&self) -> &Self::ProfileQuery {
        &InMemoryProfileRepository
    }
}

impl DependOnProfileModifier for InMemoryModule {
    type ProfileModifier = InMemoryProfileRepository;
    fn profile_modifier(&self) -> &Self::ProfileModifier {
        &InMemoryProfileRepository
    }
}
