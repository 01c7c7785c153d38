//! Integrity error types.

/// Conditions under which a persisted story tree cannot be resumed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum IntegrityErrorKind {
    /// Scenelets exist but none of them is a root
    #[display("Story '{}' has scenelets but no root scenelet", story_id)]
    MissingRoot {
        /// Story identifier
        story_id: String,
    },
    /// More than one scenelet has no parent
    #[display("Story '{}' has {} root scenelets, expected exactly one", story_id, count)]
    MultipleRoots {
        /// Story identifier
        story_id: String,
        /// Number of parentless scenelets found
        count: usize,
    },
    /// A branch point was persisted without any choices
    #[display("Branch point '{}' in story '{}' has no children", scenelet_id, story_id)]
    BranchWithoutChildren {
        /// Story identifier
        story_id: String,
        /// The branch point scenelet
        scenelet_id: String,
    },
    /// A linear scenelet has more than one continuation
    #[display(
        "Linear scenelet '{}' in story '{}' has {} children, expected at most one",
        scenelet_id,
        story_id,
        count
    )]
    AmbiguousContinuation {
        /// Story identifier
        story_id: String,
        /// The linear scenelet
        scenelet_id: String,
        /// Number of children found
        count: usize,
    },
    /// A terminal scenelet has children
    #[display("Terminal scenelet '{}' in story '{}' has children", scenelet_id, story_id)]
    TerminalWithChildren {
        /// Story identifier
        story_id: String,
        /// The terminal scenelet
        scenelet_id: String,
    },
}

/// Integrity error with location tracking.
///
/// # Examples
///
/// ```
/// use storyloom_error::{IntegrityError, IntegrityErrorKind};
///
/// let err = IntegrityError::new(IntegrityErrorKind::MultipleRoots {
///     story_id: "story-1".to_string(),
///     count: 2,
/// });
/// assert!(format!("{}", err).contains("story-1"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Integrity Error: {} at line {} in {}", kind, line, file)]
pub struct IntegrityError {
    /// The kind of error that occurred
    pub kind: IntegrityErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl IntegrityError {
    /// Create a new integrity error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: IntegrityErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
