//! Model client error types and retry classification.

use std::time::Duration;

/// Model transport error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum ModelErrorKind {
    /// API key not found in environment
    #[display("{} environment variable not set", _0)]
    MissingApiKey(String),
    /// Failed to create the HTTP client
    #[display("Failed to create model client: {}", _0)]
    ClientCreation(String),
    /// The model returned no usable text
    #[display("Model returned an empty response")]
    EmptyResponse,
    /// The provider is throttling requests
    #[display("Rate limited by provider: {}", message)]
    RateLimited {
        /// Server supplied retry hint in milliseconds
        retry_after_ms: Option<u64>,
        /// Error message
        message: String,
    },
    /// The provider rejected or failed the request
    #[display("Model API error (status {:?}): {}", status_code, message)]
    Api {
        /// HTTP status code, when one was received
        status_code: Option<u16>,
        /// Error message
        message: String,
        /// Whether the request may succeed if repeated
        retryable: bool,
    },
    /// The call exceeded its configured timeout
    #[display("Model call timed out after {}ms", _0)]
    Timeout(u64),
    /// Connection-level failure before a response was received
    #[display("Model transport failure: {}", _0)]
    Transport(String),
    /// The provider answered with a body that could not be decoded
    #[display("Malformed provider response: {}", _0)]
    MalformedResponse(String),
}

impl ModelErrorKind {
    /// Check if this error type should be retried.
    ///
    /// Empty output is fatal for the call: repeating the same prompt is the
    /// caller's decision, not the retry wrapper's.
    pub fn is_retryable(&self) -> bool {
        match self {
            ModelErrorKind::RateLimited { .. } => true,
            ModelErrorKind::Api { retryable, .. } => *retryable,
            ModelErrorKind::Timeout(_) => true,
            ModelErrorKind::Transport(_) => true,
            _ => false,
        }
    }

    /// Server supplied delay before the next attempt, if any.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            ModelErrorKind::RateLimited {
                retry_after_ms: Some(ms),
                ..
            } => Some(Duration::from_millis(*ms)),
            _ => None,
        }
    }
}

/// Model error with source location tracking.
///
/// # Examples
///
/// ```
/// use storyloom_error::{ModelError, ModelErrorKind, RetryableError};
///
/// let err = ModelError::new(ModelErrorKind::RateLimited {
///     retry_after_ms: Some(3000),
///     message: "quota exceeded".to_string(),
/// });
/// assert!(err.is_retryable());
/// assert_eq!(err.retry_after().map(|d| d.as_millis()), Some(3000));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Model Error: {} at line {} in {}", kind, line, file)]
pub struct ModelError {
    /// The kind of error that occurred
    pub kind: ModelErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl ModelError {
    /// Create a new ModelError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ModelErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

/// Trait for errors that support retry logic.
///
/// The retry wrapper asks the error whether another attempt makes sense and
/// whether the server asked for a specific delay.
pub trait RetryableError {
    /// Returns true if this error should trigger a retry.
    ///
    /// Transient errors like 503 (service unavailable), 429 (rate limit),
    /// or network timeouts should return true. Permanent errors like 401
    /// (unauthorized) or 400 (bad request) should return false.
    fn is_retryable(&self) -> bool;

    /// Delay requested by the server before retrying.
    fn retry_after(&self) -> Option<Duration> {
        None
    }
}

impl RetryableError for ModelError {
    fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }

    fn retry_after(&self) -> Option<Duration> {
        self.kind.retry_after()
    }
}
