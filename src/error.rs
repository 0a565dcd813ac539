//! Error types shared across the crate.
//!
//! Internally everything is an `anyhow::Error`. Errors that need to reach a user with a specific
//! meaning (a bad request, a missing record, a broken data file) are tagged with an `ErrorType`
//! using `IntoResult::pub_result` or the `pub_bail!` macro. The HTTP layer reads that tag back
//! out of the error chain to pick a status code.

use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};

pub type Error = anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Returns early with an error tagged with the given `ErrorType`.
///
/// ```ignore
/// pub_bail!(ErrorType::NotFound, "Expense {id} not found");
/// ```
#[macro_export]
macro_rules! pub_bail {
    ($error_type:expr, $($arg:tt)+) => {
        return Err($crate::error::PubError::new($error_type, anyhow::anyhow!($($arg)+)).into())
    };
}

/// The classification of an error that is reported to a user or an API caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// The caller sent missing or malformed input.
    Validation,
    /// The caller referenced a record that does not exist.
    NotFound,
    /// The caller sent a request body larger than the server accepts.
    TooLarge,
    /// The expenses document exists but cannot be decoded.
    CorruptStore,
    /// The expenses document could not be written.
    Persistence,
    /// The data directory or its configuration file is missing or invalid.
    Config,
    /// The HTTP server or the HTTP client failed.
    Service,
}

serde_plain::derive_display_from_serialize!(ErrorType);
serde_plain::derive_fromstr_from_deserialize!(ErrorType);

/// An error that carries an `ErrorType`.
pub struct PubError {
    error_type: ErrorType,
    inner: Error,
}

impl PubError {
    pub fn new(error_type: ErrorType, inner: impl Into<Error>) -> Self {
        Self {
            error_type,
            inner: inner.into(),
        }
    }

    pub fn error_type(&self) -> ErrorType {
        self.error_type
    }
}

impl Debug for PubError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} error: {:?}", self.error_type, self.inner)
    }
}

impl Display for PubError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.inner, f)
    }
}

impl std::error::Error for PubError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.inner.source()
    }
}

/// Tags the error side of a `Result` with an `ErrorType`.
pub trait IntoResult<T> {
    fn pub_result(self, error_type: ErrorType) -> Result<T>;
}

impl<T, E> IntoResult<T> for std::result::Result<T, E>
where
    E: Into<Error>,
{
    fn pub_result(self, error_type: ErrorType) -> Result<T> {
        self.map_err(|e| {
            let e: Error = e.into();
            // Keep the innermost classification if the error was already tagged.
            if find_error_type(&e).is_some() {
                e
            } else {
                PubError::new(error_type, e).into()
            }
        })
    }
}

/// Finds the first `ErrorType` tag in the chain of `e`.
pub fn find_error_type(e: &Error) -> Option<ErrorType> {
    e.chain()
        .find_map(|cause| cause.downcast_ref::<PubError>())
        .map(PubError::error_type)
}
