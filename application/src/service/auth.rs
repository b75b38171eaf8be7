use uuid::Uuid;

use kernel::interface::auth::{AuthService, DependOnAuthService};
use kernel::interface::database::{DatabaseConnection, Transaction};
use kernel::interface::query::{DependOnProfileQuery, ProfileQuery};
use kernel::interface::update::{DependOnProfileModifier, ProfileModifier};
use kernel::prelude::entity::{
    AccessToken, Credentials, Email, FirstName, LastName, Password, Profile, Session,
    SessionVersion, Username,
};
use kernel::{rejected, ConflictKind, KernelError};

use crate::transfer::{AuthContextDto, ProfileDto, SessionDto, SignInDto, SignOutDto, SignUpDto};

const MIN_PASSWORD_LENGTH: usize = 6;

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[async_trait::async_trait]
pub trait SignUpService:
    'static + Sync + Send + DependOnAuthService + DependOnProfileQuery + DependOnProfileModifier
{
    async fn sign_up(&self, dto: SignUpDto) -> error_stack::Result<ProfileDto, KernelError> {
        let username = dto.username.trim();
        if dto.email.trim().is_empty() || username.is_empty() {
            return Err(rejected(KernelError::Validation, "Missing required fields"));
        }
        if dto.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(rejected(
                KernelError::Validation,
                "Password must be at least 6 characters",
            ));
        }
        let username = Username::new(username);

        let mut connection = self.database_connection().transact().await?;
        let taken = self
            .profile_query()
            .find_by_username(&mut connection, &username)
            .await?;
        if taken.is_some() {
            return Err(rejected(
                KernelError::Conflict,
                "This username is already taken. Please choose another.",
            )
            .attach_printable(ConflictKind::AlreadyExists));
        }

        let credentials = Credentials::new(
            Email::new(dto.email.trim()),
            Password::new(dto.password),
        );
        let id = self.auth_service().sign_up(&credentials).await?;
        let profile = Profile::new(
            id,
            username,
            non_blank(dto.first_name).map(FirstName::new),
            non_blank(dto.last_name).map(LastName::new),
        );
        self.profile_modifier()
            .create(&mut connection, &profile)
            .await?;
        connection.commit().await?;

        tracing::info!("signed up user {}", profile.id());
        Ok(ProfileDto::from(profile))
    }
}

impl<T> SignUpService for T where
    T: DependOnAuthService + DependOnProfileQuery + DependOnProfileModifier
{
}

#[async_trait::async_trait]
pub trait SignInService: 'static + Sync + Send + DependOnAuthService {
    async fn sign_in(&self, dto: SignInDto) -> error_stack::Result<SessionDto, KernelError> {
        let credentials = Credentials::new(Email::new(dto.email.trim()), Password::new(dto.password));
        let session = self.auth_service().sign_in(&credentials).await?;
        Ok(SessionDto::from(session))
    }
}

impl<T> SignInService for T where T: DependOnAuthService {}

#[async_trait::async_trait]
pub trait SignOutService: 'static + Sync + Send + DependOnAuthService {
    async fn sign_out(&self, dto: SignOutDto) -> error_stack::Result<(), KernelError> {
        self.auth_service()
            .sign_out(&AccessToken::new(dto.token))
            .await
    }
}

impl<T> SignOutService for T where T: DependOnAuthService {}

#[async_trait::async_trait]
pub trait AuthenticateService: 'static + Sync + Send + DependOnAuthService {
    async fn current_session(
        &self,
        token: Option<String>,
    ) -> error_stack::Result<Option<Session>, KernelError> {
        match token {
            None => Ok(None),
            Some(token) => {
                self.auth_service()
                    .current_session(&AccessToken::new(token))
                    .await
            }
        }
    }

    /// Fails with `Unauthenticated` unless the token names a live session.
    async fn authenticate(&self, token: Option<String>) -> error_stack::Result<Uuid, KernelError> {
        self.current_session(token)
            .await?
            .map(|session| *session.user_id().as_ref())
            .ok_or_else(|| rejected(KernelError::Unauthenticated, "You must be signed in"))
    }

    async fn auth_context(
        &self,
        token: Option<String>,
    ) -> error_stack::Result<AuthContextDto, KernelError> {
        let session = self.current_session(token).await?;
        Ok(AuthContextDto {
            user_id: session.as_ref().map(|session| *session.user_id().as_ref()),
            session_version: SessionVersion::of(session.as_ref()).to_string(),
        })
    }
}

impl<T> AuthenticateService for T where T: DependOnAuthService {}

#[cfg(test)]
mod test {
    use driver::memory::InMemoryModule;
    use kernel::{ConflictKind, KernelError, ReportExt};

    use crate::service::{AuthenticateService, SignInService, SignOutService, SignUpService};
    use crate::transfer::{SignInDto, SignOutDto, SignUpDto};

    fn sign_up_dto(email: &str, username: &str) -> SignUpDto {
        SignUpDto {
            email: email.to_string(),
            password: "hunter22".to_string(),
            username: username.to_string(),
            first_name: Some("Ada".to_string()),
            last_name: Some("  ".to_string()),
        }
    }

    #[tokio::test]
    async fn sign_up_then_sign_in() -> error_stack::Result<(), KernelError> {
        let module = InMemoryModule::new();
        let profile = module.sign_up(sign_up_dto("ada@example.com", "ada")).await?;
        assert_eq!(profile.first_name.as_deref(), Some("Ada"));
        assert_eq!(profile.last_name, None);

        let session = module
            .sign_in(SignInDto {
                email: "ada@example.com".to_string(),
                password: "hunter22".to_string(),
            })
            .await?;
        assert_eq!(session.user_id, profile.id);

        let context = module
            .auth_context(Some(session.access_token.clone()))
            .await?;
        assert_eq!(context.user_id, Some(profile.id));
        assert_eq!(context.session_version, session.session_version);

        module
            .sign_out(SignOutDto {
                token: session.access_token.clone(),
            })
            .await?;
        let context = module.auth_context(Some(session.access_token)).await?;
        assert_eq!(context.user_id, None);
        assert_eq!(context.session_version, "anon:0");
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_username_conflicts() -> error_stack::Result<(), KernelError> {
        let module = InMemoryModule::new();
        module.sign_up(sign_up_dto("a@example.com", "ada")).await?;
        let report = module
            .sign_up(sign_up_dto("b@example.com", "ada"))
            .await
            .unwrap_err();
        assert!(matches!(report.current_context(), KernelError::Conflict));
        assert_eq!(report.conflict_kind(), Some(ConflictKind::AlreadyExists));
        Ok(())
    }

    #[tokio::test]
    async fn short_password_is_rejected() {
        let module = InMemoryModule::new();
        let mut dto = sign_up_dto("a@example.com", "ada");
        dto.password = "123".to_string();
        let report = module.sign_up(dto).await.unwrap_err();
        assert!(matches!(report.current_context(), KernelError::Validation));
    }

    #[tokio::test]
    async fn missing_token_is_unauthenticated() {
        let module = InMemoryModule::new();
        let report = module.authenticate(None).await.unwrap_err();
        assert!(matches!(
            report.current_context(),
            KernelError::Unauthenticated
        ));
    }
}
