use std::process::{ExitCode, Termination};

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use error_stack::Report;
use serde_json::json;

use kernel::{KernelError, ReportExt};

#[derive(Debug)]
pub struct StackTrace(Report<KernelError>);

impl From<Report<KernelError>> for StackTrace {
    fn from(e: Report<KernelError>) -> Self {
        StackTrace(e)
    }
}

impl Termination for StackTrace {
    fn report(self) -> ExitCode {
        self.0.report()
    }
}

#[derive(Debug)]
pub struct ErrorStatus(Report<KernelError>);

impl From<Report<KernelError>> for ErrorStatus {
    fn from(e: Report<KernelError>) -> Self {
        ErrorStatus(e)
    }
}

impl ErrorStatus {
    fn status(&self) -> StatusCode {
        match self.0.current_context() {
            KernelError::Unauthenticated => StatusCode::UNAUTHORIZED,
            KernelError::Forbidden => StatusCode::FORBIDDEN,
            KernelError::Validation => StatusCode::BAD_REQUEST,
            KernelError::NotFound => StatusCode::NOT_FOUND,
            KernelError::Conflict => StatusCode::CONFLICT,
            KernelError::Concurrency => StatusCode::CONFLICT,
            KernelError::Timeout => StatusCode::REQUEST_TIMEOUT,
            KernelError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Text shown to the caller. Internal details stay in the log.
    fn message(&self) -> String {
        if let Some(message) = self.0.user_message() {
            return message;
        }
        if let Some(kind) = self.0.conflict_kind() {
            return kind.to_string();
        }
        match self.0.current_context() {
            KernelError::Concurrency => {
                "This booking was changed by someone else. Please reload.".to_string()
            }
            KernelError::Internal | KernelError::Timeout => {
                "An unexpected error occurred".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ErrorStatus {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{:?}", self.0);
        } else {
            tracing::debug!("{:?}", self.0);
        }
        (status, Json(json!({ "error": self.message() }))).into_response()
    }
}

#[cfg(test)]
mod test {
    use axum::http::StatusCode;
    use error_stack::Report;

    use kernel::{rejected, ConflictKind, KernelError};

    use crate::error::ErrorStatus;

    #[test]
    fn conflicts_carry_their_reason() {
        let status = ErrorStatus::from(
            Report::new(KernelError::Conflict).attach_printable(ConflictKind::DatesAlreadyBooked),
        );
        assert_eq!(status.status(), StatusCode::CONFLICT);
        assert_eq!(
            status.message(),
            "These dates are already booked. Please select different dates."
        );
    }

    #[test]
    fn internal_details_are_hidden() {
        let status = ErrorStatus::from(
            Report::new(KernelError::Internal).attach_printable("connection refused"),
        );
        assert_eq!(status.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(status.message(), "An unexpected error occurred");
    }

    #[test]
    fn user_messages_win() {
        let status = ErrorStatus::from(rejected(
            KernelError::Forbidden,
            "You are not authorized to delete this listing",
        ));
        assert_eq!(status.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            status.message(),
            "You are not authorized to delete this listing"
        );
    }
}
