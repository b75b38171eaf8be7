use std::ops::{Deref, DerefMut};

use error_stack::{Report, ResultExt};
use sqlx::postgres::PgPoolOptions;
use sqlx::{Error, PgConnection, Pool, Postgres};

use kernel::interface::database::{DatabaseConnection, Transaction};
use kernel::{ConflictKind, KernelError};

use crate::env;
use crate::error::ConvertError;

pub use self::{booking::*, listing::*, profile::*};

mod booking;
mod listing;
mod profile;

static POSTGRES_URL: &str = "POSTGRES_URL";

const EXCLUSION_VIOLATION: &str = "23P01";
const UNIQUE_VIOLATION: &str = "23505";

#[derive(Clone)]
pub struct PostgresDatabase {
    pool: Pool<Postgres>,
}

impl PostgresDatabase {
    pub async fn new() -> error_stack::Result<Self, KernelError> {
        let url = env(POSTGRES_URL)?;
        let pool = PgPoolOptions::new()
            .max_connections(16)
            .connect(&url)
            .await
            .convert_error()?;
        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> error_stack::Result<(), KernelError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .change_context_lazy(|| KernelError::Internal)
            .attach_printable("Failed to run migrations")
    }
}

#[async_trait::async_trait]
impl DatabaseConnection for PostgresDatabase {
    type Transaction = PostgresTransaction;
    async fn transact(&self) -> error_stack::Result<PostgresTransaction, KernelError> {
        let transaction = self.pool.begin().await.convert_error()?;
        Ok(PostgresTransaction(transaction))
    }
}

pub struct PostgresTransaction(sqlx::Transaction<'static, Postgres>);

impl Deref for PostgresTransaction {
    type Target = PgConnection;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for PostgresTransaction {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

#[async_trait::async_trait]
impl Transaction for PostgresTransaction {
    async fn commit(self) -> error_stack::Result<(), KernelError> {
        self.0.commit().await.convert_error()
    }

    async fn roll_back(self) -> error_stack::Result<(), KernelError> {
        self.0.rollback().await.convert_error()
    }
}

impl<T: 'static> ConvertError for Result<T, Error> {
    type Ok = T;
    fn convert_error(self) -> error_stack::Result<T, KernelError> {
        self.map_err(|error| {
            let code = match &error {
                Error::Database(database) => database.code().map(|code| code.into_owned()),
                _ => None,
            };
            let timed_out = matches!(error, Error::PoolTimedOut);
            match (timed_out, code.as_deref()) {
                (true, _) => Report::from(error).change_context(KernelError::Timeout),
                (_, Some(EXCLUSION_VIOLATION)) => Report::from(error)
                    .change_context(KernelError::Conflict)
                    .attach_printable(ConflictKind::DatesAlreadyBooked),
                (_, Some(UNIQUE_VIOLATION)) => Report::from(error)
                    .change_context(KernelError::Conflict)
                    .attach_printable(ConflictKind::AlreadyExists),
                _ => Report::from(error).change_context(KernelError::Internal),
            }
        })
    }
}

#[cfg(test)]
pub(in crate::database) mod test {
    use error_stack::ResultExt;
    use uuid::Uuid;

    use kernel::interface::database::DatabaseConnection;
    use kernel::interface::update::{ListingModifier, ProfileModifier};
    use kernel::prelude::entity::{
        Category, Condition, CreatedAt, Listing, ListingId, ListingTitle, Location, PricePerDay,
        Profile, UserId, Username,
    };
    use kernel::KernelError;

    use crate::database::{
        PostgresDatabase, PostgresListingRepository, PostgresProfileRepository,
        PostgresTransaction,
    };

    pub async fn connect() -> error_stack::Result<PostgresDatabase, KernelError> {
        let db = PostgresDatabase::new()
            .await
            .change_context_lazy(|| KernelError::Internal)?;
        db.migrate().await?;
        Ok(db)
    }

    pub async fn seed_profile(
        con: &mut PostgresTransaction,
    ) -> error_stack::Result<Profile, KernelError> {
        let id = Uuid::new_v4();
        let profile = Profile::new(
            UserId::new(id),
            Username::new(format!("user-{}", rand::random::<u32>())),
            None,
            None,
        );
        PostgresProfileRepository.create(con, &profile).await?;
        Ok(profile)
    }

    pub async fn seed_listing(
        con: &mut PostgresTransaction,
        owner: &UserId,
        title: &str,
    ) -> error_stack::Result<Listing, KernelError> {
        let listing = Listing::new(
            ListingId::new(Uuid::new_v4()),
            owner.clone(),
            ListingTitle::new(title),
            None,
            PricePerDay::new(100),
            Condition::new("good"),
            Location::new("Berlin"),
            Category::new("tools"),
            None,
            CreatedAt::now(),
        );
        PostgresListingRepository.create(con, &listing).await?;
        Ok(listing)
    }

    #[test_with::env(POSTGRES_TEST)]
    #[tokio::test]
    async fn dropped_transaction_discards_writes() -> error_stack::Result<(), KernelError> {
        use kernel::interface::query::ProfileQuery;

        let db = connect().await?;
        let mut con = db.transact().await?;
        let profile = seed_profile(&mut con).await?;
        drop(con);

        let mut con = db.transact().await?;
        let found = PostgresProfileRepository
            .find_by_id(&mut con, profile.id())
            .await?;
        assert!(found.is_none());
        Ok(())
    }
}
