use error_stack::ResultExt;
use kernel::KernelError;

use crate::error::ConvertError;

pub mod auth;
pub mod database;
pub mod error;
pub mod memory;
pub mod storage;

pub(crate) fn env(key: &str) -> error_stack::Result<String, KernelError> {
    dotenvy::var(key)
        .convert_error()
        .attach_printable_lazy(|| format!("Failed to read env: {key}"))
}

pub(crate) fn env_or(key: &str, default: &str) -> String {
    dotenvy::var(key).unwrap_or_else(|_| default.to_string())
}
