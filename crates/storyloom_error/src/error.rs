//! Top-level error wrapper types.

use crate::{
    ConfigError, IntegrityError, JsonError, ModelError, NarrativeError, RetryableError,
    StorageError, ValidationError,
};
use std::time::Duration;

/// Every error condition storyloom can report.
///
/// # Examples
///
/// ```
/// use storyloom_error::{StoryloomError, StoryloomErrorKind, JsonError};
///
/// let err: StoryloomError = JsonError::new("unexpected end of input").into();
/// assert!(matches!(err.kind(), StoryloomErrorKind::Json(_)));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum StoryloomErrorKind {
    /// JSON serialization/deserialization error
    #[from(JsonError)]
    Json(JsonError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Malformed scenelet or model response
    #[from(ValidationError)]
    Validation(ValidationError),
    /// Persisted tree cannot be resumed
    #[from(IntegrityError)]
    Integrity(IntegrityError),
    /// Model transport failure
    #[from(ModelError)]
    Model(ModelError),
    /// Persistence failure
    #[from(StorageError)]
    Storage(StorageError),
    /// Story engine failure
    #[from(NarrativeError)]
    Narrative(NarrativeError),
}

/// Storyloom error with kind discrimination.
///
/// # Examples
///
/// ```
/// use storyloom_error::{StoryloomResult, ConfigError};
///
/// fn might_fail() -> StoryloomResult<()> {
///     Err(ConfigError::new("Missing field"))?
/// }
///
/// match might_fail() {
///     Ok(_) => println!("Success"),
///     Err(e) => println!("Error: {}", e),
/// }
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Storyloom Error: {}", _0)]
pub struct StoryloomError(Box<StoryloomErrorKind>);

impl StoryloomError {
    /// Create a new error from a kind.
    pub fn new(kind: StoryloomErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &StoryloomErrorKind {
        &self.0
    }

    /// True for malformed scenelet content or response shapes.
    pub fn is_validation(&self) -> bool {
        matches!(self.kind(), StoryloomErrorKind::Validation(_))
    }

    /// True for persisted trees that cannot be resumed.
    pub fn is_integrity(&self) -> bool {
        matches!(self.kind(), StoryloomErrorKind::Integrity(_))
    }
}

// Generic From implementation for any type that converts to StoryloomErrorKind
impl<T> From<T> for StoryloomError
where
    T: Into<StoryloomErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

impl RetryableError for StoryloomError {
    fn is_retryable(&self) -> bool {
        match self.kind() {
            StoryloomErrorKind::Model(e) => e.is_retryable(),
            _ => false,
        }
    }

    fn retry_after(&self) -> Option<Duration> {
        match self.kind() {
            StoryloomErrorKind::Model(e) => e.retry_after(),
            _ => None,
        }
    }
}

/// Result type for storyloom operations.
pub type StoryloomResult<T> = std::result::Result<T, StoryloomError>;
