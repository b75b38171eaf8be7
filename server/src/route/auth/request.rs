use serde::Deserialize;

use application::transfer::{SignInDto, SignOutDto, SignUpDto};
use kernel::{rejected, KernelError};

use crate::controller::{Intake, TryIntake};

#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    email: String,
    password: String,
    username: String,
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    email: String,
    password: String,
}

#[derive(Debug)]
pub struct SignOutRequest {
    token: Option<String>,
}

impl SignOutRequest {
    pub fn new(token: Option<String>) -> Self {
        Self { token }
    }
}

#[derive(Debug)]
pub struct SessionRequest {
    token: Option<String>,
}

impl SessionRequest {
    pub fn new(token: Option<String>) -> Self {
        Self { token }
    }
}

pub struct Transformer;

impl Intake<SignUpRequest> for Transformer {
    type To = SignUpDto;
    fn emit(&self, input: SignUpRequest) -> Self::To {
        SignUpDto {
            email: input.email,
            password: input.password,
            username: input.username,
            first_name: input.first_name,
            last_name: input.last_name,
        }
    }
}

impl Intake<SignInRequest> for Transformer {
    type To = SignInDto;
    fn emit(&self, input: SignInRequest) -> Self::To {
        SignInDto {
            email: input.email,
            password: input.password,
        }
    }
}

impl TryIntake<SignOutRequest> for Transformer {
    type To = SignOutDto;
    type Error = error_stack::Report<KernelError>;
    fn emit(&self, input: SignOutRequest) -> Result<Self::To, Self::Error> {
        input
            .token
            .map(|token| SignOutDto { token })
            .ok_or_else(|| rejected(KernelError::Unauthenticated, "You must be signed in"))
    }
}

impl Intake<SessionRequest> for Transformer {
    type To = Option<String>;
    fn emit(&self, input: SessionRequest) -> Self::To {
        input.token
    }
}

#[cfg(test)]
mod test {
    use kernel::KernelError;

    use crate::controller::TryIntake;
    use crate::route::auth::request::{SignOutRequest, SignUpRequest, Transformer};

    #[test]
    fn sign_out_needs_a_token() {
        let report = TryIntake::emit(&Transformer, SignOutRequest::new(None)).unwrap_err();
        assert!(matches!(
            report.current_context(),
            KernelError::Unauthenticated
        ));
        let dto = TryIntake::emit(&Transformer, SignOutRequest::new(Some("t".into()))).unwrap();
        assert_eq!(dto.token, "t");
    }

    #[test]
    fn names_are_optional_on_sign_up() {
        let req: SignUpRequest = serde_json::from_str(
            r#"{"email":"a@example.com","password":"secret","username":"alice"}"#,
        )
        .unwrap();
        assert_eq!(req.first_name, None);
        assert_eq!(req.last_name, None);
    }
}
