//! Library Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction. Only conditions that stop an operation live here: markup
//! that doesn't match the expected shape is skipped and counted in
//! [`Diagnostics`](crate::Diagnostics) instead.

use derive_more::{Display, Error};
use std::io::Error as IoError;
use std::path::PathBuf;

/// A library error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// File or folder expected to exist does not. Reported per book while
    /// loading a library, so one missing book never aborts the rest.
    #[display("not found: {}", _0.display())]
    NotFound(#[error(not(source))] PathBuf),
    /// Access denied
    #[display("permission denied: {}", _0.display())]
    PermissionDenied(#[error(not(source))] PathBuf),
    /// Underlying I/O error
    #[display("I/O error: {_0}")]
    Io(IoError),
    /// Persisted library data could not be read or written as JSON
    #[display("invalid library data")]
    InvalidData,
    /// The extraction options were rejected
    #[display("invalid extraction options")]
    Extract,
}
impl From<IoError> for ErrorKind {
    fn from(err: IoError) -> Self {
        Self::Io(err)
    }
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}
