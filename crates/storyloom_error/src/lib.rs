//! Error types for storyloom.
//!
//! This crate provides the error taxonomy shared by every storyloom crate.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! The categories map onto how the story engine reacts to a failure:
//!
//! - [`ValidationError`]: malformed scenelet content or model response, fatal to one task
//! - [`IntegrityError`]: persisted tree cannot be resumed, fatal to a resume computation
//! - [`ModelError`]: model transport failure, classified retryable or not
//! - [`StorageError`]: persistence failure, fatal to one task
//!
//! # Examples
//!
//! ```
//! use storyloom_error::{StoryloomResult, ConfigError};
//!
//! fn load() -> StoryloomResult<String> {
//!     Err(ConfigError::new("missing [model] section"))?
//! }
//!
//! assert!(load().is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod integrity;
mod json;
mod model;
mod narrative;
mod storage;
mod validation;

pub use config::ConfigError;
pub use error::{StoryloomError, StoryloomErrorKind, StoryloomResult};
pub use integrity::{IntegrityError, IntegrityErrorKind};
pub use json::JsonError;
pub use model::{ModelError, ModelErrorKind, RetryableError};
pub use narrative::{NarrativeError, NarrativeErrorKind};
pub use storage::{StorageError, StorageErrorKind};
pub use validation::{ValidationError, ValidationErrorKind};
