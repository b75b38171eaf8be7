use std::borrow::Cow;
use std::fmt::Display;

use error_stack::{Context, Report};

#[derive(Debug)]
pub enum KernelError {
    Unauthenticated,
    Forbidden,
    Validation,
    NotFound,
    Conflict,
    Concurrency,
    Timeout,
    Internal,
}

impl Display for KernelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KernelError::Unauthenticated => write!(f, "Authentication required"),
            KernelError::Forbidden => write!(f, "Operation not permitted"),
            KernelError::Validation => write!(f, "Invalid input"),
            KernelError::NotFound => write!(f, "Resource not found"),
            KernelError::Conflict => write!(f, "Resource conflict"),
            KernelError::Concurrency => write!(f, "Concurrency error"),
            KernelError::Timeout => write!(f, "Process timed out"),
            KernelError::Internal => write!(f, "Internal kernel error"),
        }
    }
}

impl Context for KernelError {}

/// Distinguishes the storage rule that rejected a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    /// Date range overlaps a confirmed booking of the same listing.
    DatesAlreadyBooked,
    /// A unique key (e.g. username) is already taken.
    AlreadyExists,
}

impl Display for ConflictKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConflictKind::DatesAlreadyBooked => {
                write!(
                    f,
                    "These dates are already booked. Please select different dates."
                )
            }
            ConflictKind::AlreadyExists => write!(f, "This entry already exists."),
        }
    }
}

/// Message safe to show next to the control that triggered the failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserMessage(Cow<'static, str>);

impl UserMessage {
    pub fn new(message: impl Into<Cow<'static, str>>) -> Self {
        Self(message.into())
    }
}

impl Display for UserMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

pub trait ReportExt {
    fn conflict_kind(&self) -> Option<ConflictKind>;
    fn user_message(&self) -> Option<String>;
}

impl ReportExt for Report<KernelError> {
    fn conflict_kind(&self) -> Option<ConflictKind> {
        self.frames()
            .find_map(|frame| frame.downcast_ref::<ConflictKind>())
            .copied()
    }

    fn user_message(&self) -> Option<String> {
        self.frames()
            .find_map(|frame| frame.downcast_ref::<UserMessage>())
            .map(ToString::to_string)
    }
}

pub fn rejected(context: KernelError, message: &'static str) -> Report<KernelError> {
    Report::new(context).attach_printable(UserMessage::new(message))
}

#[cfg(test)]
mod test {
    use error_stack::Report;

    use crate::{rejected, ConflictKind, KernelError, ReportExt};

    #[test]
    fn conflict_kind_is_found_in_attachments() {
        let report = Report::new(KernelError::Conflict)
            .attach_printable(ConflictKind::DatesAlreadyBooked)
            .attach_printable("while inserting booking");
        assert_eq!(
            report.conflict_kind(),
            Some(ConflictKind::DatesAlreadyBooked)
        );
        assert_eq!(report.user_message(), None);
    }

    #[test]
    fn user_message_survives_context_change() {
        let report = rejected(KernelError::Validation, "Missing required fields")
            .change_context(KernelError::Internal);
        assert_eq!(
            report.user_message().as_deref(),
            Some("Missing required fields")
        );
    }
}
