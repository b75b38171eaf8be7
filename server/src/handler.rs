use std::ops::Deref;
use std::sync::Arc;

use vodca::References;

use driver::auth::HostedAuthClient;
use driver::database::{
    PostgresBookingRepository, PostgresDatabase, PostgresListingRepository,
    PostgresProfileRepository,
};
use driver::storage::HostedImageStorage;
use kernel::interface::auth::DependOnAuthService;
use kernel::interface::database::DependOnDatabaseConnection;
use kernel::interface::job::SweepConfig;
use kernel::interface::query::{DependOnBookingQuery, DependOnListingQuery, DependOnProfileQuery};
use kernel::interface::storage::DependOnImageStorage;
use kernel::interface::update::{
    DependOnBookingModifier, DependOnListingModifier, DependOnProfileModifier,
};
use kernel::KernelError;

use crate::config::ServerConfig;

#[derive(Clone)]
pub struct AppModule(Arc<Handler>);

impl AppModule {
    pub async fn new(config: &ServerConfig) -> error_stack::Result<Self, KernelError> {
        Ok(Self(Arc::new(Handler::init(config).await?)))
    }
}

impl Deref for AppModule {
    type Target = Handler;
    fn deref(&self) -> &Self::Target {
        Deref::deref(&self.0)
    }
}

#[derive(References)]
pub struct Handler {
    pgpool: PostgresDatabase,
    auth: HostedAuthClient,
    storage: HostedImageStorage,
    sweep: SweepConfig,
}

impl Handler {
    pub async fn init(config: &ServerConfig) -> error_stack::Result<Self, KernelError> {
        let pgpool = PostgresDatabase::new().await?;
        pgpool.migrate().await?;
        let auth = HostedAuthClient::new()?;
        let storage = HostedImageStorage::new()?;

        Ok(Self {
            pgpool,
            auth,
            storage,
            sweep: config.sweep().clone(),
        })
    }
}

impl DependOnDatabaseConnection for AppModule {
    type DatabaseConnection = PostgresDatabase;
    fn database_connection(&self) -> &Self::DatabaseConnection {
        self.pgpool()
    }
}

impl DependOnAuthService for AppModule {
    type AuthService = HostedAuthClient;
    fn auth_service(&self) -> &Self::AuthService {
        self.auth()
    }
}

impl DependOnImageStorage for AppModule {
    type ImageStorage = HostedImageStorage;
    fn image_storage(&self) -> &Self::ImageStorage {
        self.storage()
    }
}

impl DependOnListingQuery for AppModule {
    type ListingQuery = PostgresListingRepository;
    fn listing_query(&self) -> &Self::ListingQuery {
        &PostgresListingRepository
    }
}

impl DependOnListingModifier for AppModule {
    type ListingModifier = PostgresListingRepository;
    fn listing_modifier(&self) -> &Self::ListingModifier {
        &PostgresListingRepository
    }
}

impl DependOnBookingQuery for AppModule {
    type BookingQuery = PostgresBookingRepository;
    fn booking_query(&self) -> &Self::BookingQuery {
        &PostgresBookingRepository
    }
}

impl DependOnBookingModifier for AppModule {
    type BookingModifier = PostgresBookingRepository;
    fn booking_modifier(&self) -> &Self::BookingModifier {
        &PostgresBookingRepository
    }
}

impl DependOnProfileQuery for AppModule {
    type ProfileQuery = PostgresProfileRepository;
    fn profile_query(&self) -> &Self::ProfileQuery {
        &PostgresProfileRepository
    }
}

impl DependOnProfileModifier for AppModule {
    type ProfileModifier = PostgresProfileRepository;
    fn profile_modifier(&self) -> &Self::ProfileModifier {
        &PostgresProfileRepository
    }
}
