//! Validation error types.
//!
//! Raised when model output or scenelet content does not satisfy the scenelet
//! schema. A validation failure is fatal to the task that produced it and is
//! never retried automatically.

/// Specific validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum ValidationErrorKind {
    /// A scenelet field is missing or malformed
    #[display("Scenelet '{}' has invalid field '{}': {}", scenelet_id, field, reason)]
    InvalidScenelet {
        /// Identifier of the scenelet being validated
        scenelet_id: String,
        /// Path of the offending field, e.g. `dialogue[2].line`
        field: String,
        /// What is wrong with the field
        reason: String,
    },
    /// The model response does not match any known response shape
    #[display("Invalid model response for {}: {}", context, reason)]
    InvalidResponse {
        /// Which task produced the response
        context: String,
        /// Why the response was rejected
        reason: String,
    },
    /// The story constitution is empty after trimming
    #[display("Story constitution for '{}' is empty", _0)]
    EmptyConstitution(String),
}

/// Validation error with location tracking.
///
/// # Examples
///
/// ```
/// use storyloom_error::{ValidationError, ValidationErrorKind};
///
/// let err = ValidationError::new(ValidationErrorKind::InvalidScenelet {
///     scenelet_id: "root".to_string(),
///     field: "dialogue[2].line".to_string(),
///     reason: "must be a non-empty string".to_string(),
/// });
/// assert!(format!("{}", err).contains("dialogue[2].line"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Validation Error: {} at line {} in {}", kind, line, file)]
pub struct ValidationError {
    /// The kind of error that occurred
    pub kind: ValidationErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl ValidationError {
    /// Create a new validation error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ValidationErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Shorthand for an [`ValidationErrorKind::InvalidScenelet`] error.
    #[track_caller]
    pub fn scenelet(
        scenelet_id: impl Into<String>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::new(ValidationErrorKind::InvalidScenelet {
            scenelet_id: scenelet_id.into(),
            field: field.into(),
            reason: reason.into(),
        })
    }

    /// Shorthand for an [`ValidationErrorKind::InvalidResponse`] error.
    #[track_caller]
    pub fn response(context: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(ValidationErrorKind::InvalidResponse {
            context: context.into(),
            reason: reason.into(),
        })
    }
}
