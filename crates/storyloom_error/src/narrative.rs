//! Story engine error types.

/// Engine-level failures that are neither validation nor integrity problems.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum NarrativeErrorKind {
    /// A fresh run was requested for a story that already has scenelets
    #[display("Story '{}' already has scenelets; resume it instead", _0)]
    StoryAlreadyStarted(String),
    /// A path reached the configured maximum length without concluding
    #[display(
        "Path ending at scenelet '{}' holds {} scenelets, the maximum is {}",
        scenelet_id,
        length,
        max
    )]
    PathLengthExceeded {
        /// Last scenelet on the path
        scenelet_id: String,
        /// Number of scenelets on the path
        length: usize,
        /// Configured maximum
        max: usize,
    },
    /// Failed to load a prompt template
    #[display("Failed to load prompt '{}': {}", name, message)]
    PromptLoad {
        /// Prompt name
        name: String,
        /// Error message
        message: String,
    },
    /// Configuration error
    #[display("Configuration error: {}", _0)]
    ConfigurationError(String),
}

/// Error type for story engine operations.
///
/// # Examples
///
/// ```
/// use storyloom_error::{NarrativeError, NarrativeErrorKind};
///
/// let err = NarrativeError::new(NarrativeErrorKind::StoryAlreadyStarted("s1".into()));
/// assert!(format!("{}", err).contains("resume"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Narrative Error: {} at line {} in {}", kind, line, file)]
pub struct NarrativeError {
    /// The specific error condition
    pub kind: NarrativeErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl NarrativeError {
    /// Create a new NarrativeError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: NarrativeErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
