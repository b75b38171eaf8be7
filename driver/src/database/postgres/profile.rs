use sqlx::types::Uuid;
use sqlx::PgConnection;

use kernel::interface::query::ProfileQuery;
use kernel::interface::update::ProfileModifier;
use kernel::prelude::entity::{FirstName, LastName, Profile, UserId, Username};
use kernel::KernelError;

use crate::database::postgres::PostgresTransaction;
use crate::error::ConvertError;

pub struct PostgresProfileRepository;

#[async_trait::async_trait]
impl ProfileQuery for PostgresProfileRepository {
    type Transaction = PostgresTransaction;
    async fn find_by_id(
        &self,
        con: &mut PostgresTransaction,
        id: &UserId,
    ) -> error_stack::Result<Option<Profile>, KernelError> {
        PgProfileInternal::find_by_id(con, id).await
    }

    async fn find_by_username(
        &self,
        con: &mut PostgresTransaction,
        username: &Username,
    ) -> error_stack::Result<Option<Profile>, KernelError> {
        PgProfileInternal::find_by_username(con, username).await
    }
}

#[async_trait::async_trait]
impl ProfileModifier for PostgresProfileRepository {
    type Transaction = PostgresTransaction;
    async fn create(
        &self,
        con: &mut PostgresTransaction,
        profile: &Profile,
    ) -> error_stack::Result<(), KernelError> {
        PgProfileInternal::create(con, profile).await
    }
}

#[derive(sqlx::FromRow)]
struct ProfileRow {
    id: Uuid,
    username: String,
    first_name: Option<String>,
    last_name: Option<String>,
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        Profile::new(
            UserId::new(row.id),
            Username::new(row.username),
            row.first_name.map(FirstName::new),
            row.last_name.map(LastName::new),
        )
    }
}

pub(in crate::database) struct PgProfileInternal;

impl PgProfileInternal {
    async fn find_by_id(
        con: &mut PgConnection,
        id: &UserId,
    ) -> error_stack::Result<Option<Profile>, KernelError> {
        let row = sqlx::query_as::<_, ProfileRow>(
            // language=postgresql
            r#"
            SELECT id, username, first_name, last_name
            FROM profiles
            WHERE id = $1
            "#,
        )
        .bind(id.as_ref())
        .fetch_optional(con)
        .await
        .convert_error()?;
        Ok(row.map(Profile::from))
    }

    async fn find_by_username(
        con: &mut PgConnection,
        username: &Username,
    ) -> error_stack::Result<Option<Profile>, KernelError> {
        let row = sqlx::query_as::<_, ProfileRow>(
            // language=postgresql
            r#"
            SELECT id, username, first_name, last_name
            FROM profiles
            WHERE username = $1
            "#,
        )
        .bind(username.as_ref())
        .fetch_optional(con)
        .await
        .convert_error()?;
        Ok(row.map(Profile::from))
    }

    async fn create(
        con: &mut PgConnection,
        profile: &Profile,
    ) -> error_stack::Result<(), KernelError> {
        sqlx::query(
            // language=postgresql
            r#"
            INSERT INTO profiles (id, username, first_name, last_name)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(profile.id().as_ref())
        .bind(profile.username().as_ref())
        .bind(profile.first_name().as_ref().map(AsRef::<String>::as_ref))
        .bind(profile.last_name().as_ref().map(AsRef::<String>::as_ref))
        .execute(con)
        .await
        .convert_error()?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use uuid::Uuid;

    use kernel::interface::database::DatabaseConnection;
    use kernel::interface::query::ProfileQuery;
    use kernel::interface::update::ProfileModifier;
    use kernel::prelude::entity::{FirstName, Profile, UserId, Username};
    use kernel::{ConflictKind, KernelError, ReportExt};

    use crate::database::postgres::test::connect;
    use crate::database::PostgresProfileRepository;

    #[test_with::env(POSTGRES_TEST)]
    #[tokio::test]
    async fn find_by_username() -> error_stack::Result<(), KernelError> {
        let db = connect().await?;
        let mut con = db.transact().await?;
        let name = format!("profile-{}", rand::random::<u32>());
        let profile = Profile::new(
            UserId::new(Uuid::new_v4()),
            Username::new(name.clone()),
            Some(FirstName::new("Ada")),
            None,
        );
        PostgresProfileRepository.create(&mut con, &profile).await?;

        let found = PostgresProfileRepository
            .find_by_username(&mut con, &Username::new(name))
            .await?;
        assert_eq!(found, Some(profile.clone()));
        let found = PostgresProfileRepository
            .find_by_id(&mut con, profile.id())
            .await?;
        assert_eq!(found, Some(profile));
        Ok(())
    }

    #[test_with::env(POSTGRES_TEST)]
    #[tokio::test]
    async fn taken_username_conflicts() -> error_stack::Result<(), KernelError> {
        let db = connect().await?;
        let mut con = db.transact().await?;
        let name = Username::new(format!("profile-{}", rand::random::<u32>()));
        let first = Profile::new(UserId::new(Uuid::new_v4()), name.clone(), None, None);
        let second = Profile::new(UserId::new(Uuid::new_v4()), name, None, None);
        PostgresProfileRepository.create(&mut con, &first).await?;

        let report = PostgresProfileRepository
            .create(&mut con, &second)
            .await
            .unwrap_err();
        assert!(matches!(report.current_context(), KernelError::Conflict));
        assert_eq!(report.conflict_kind(), Some(ConflictKind::AlreadyExists));
        Ok(())
    }
}
