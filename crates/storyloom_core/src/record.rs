//! Persisted scenelet records.

use crate::ScriptwriterScenelet;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity of a persisted scenelet, assigned by the repository.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[serde(transparent)]
pub struct SceneletId(String);

impl SceneletId {
    /// Wrap an existing identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh random identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SceneletId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Input for creating a scenelet.
///
/// # Examples
///
/// ```
/// use storyloom_core::{NewSceneletBuilder, ScriptwriterScenelet};
///
/// let new = NewSceneletBuilder::default()
///     .story_id("story-1")
///     .content(ScriptwriterScenelet {
///         description: "Dawn.".to_string(),
///         dialogue: vec![],
///         shot_suggestions: vec!["Sunrise".to_string()],
///         choice_label: None,
///     })
///     .build()
///     .unwrap();
///
/// assert!(new.parent_id.is_none());
/// assert!(!new.is_terminal_node);
/// ```
#[derive(Debug, Clone, PartialEq, derive_builder::Builder)]
#[builder(setter(into))]
pub struct NewScenelet {
    /// Story the scenelet belongs to
    pub story_id: String,
    /// Parent scenelet, `None` only for the root
    #[builder(default)]
    pub parent_id: Option<SceneletId>,
    /// Label of the choice leading here when the parent is a branch point
    #[builder(default)]
    pub choice_label_from_parent: Option<String>,
    /// Narrative payload
    pub content: ScriptwriterScenelet,
    /// Store the scenelet already flagged as the end of its path
    #[builder(default)]
    pub is_terminal_node: bool,
}

/// A scenelet as stored by a repository.
///
/// Records are created once and afterwards only receive the branch point or
/// terminal flag; they are never otherwise mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneletRecord {
    /// Identity assigned by persistence
    pub id: SceneletId,
    /// Story the scenelet belongs to
    pub story_id: String,
    /// Parent scenelet, `None` only for the root
    pub parent_id: Option<SceneletId>,
    /// Label of the choice leading here when the parent is a branch point
    pub choice_label_from_parent: Option<String>,
    /// Question shown to the reader when this scenelet is a branch point
    pub choice_prompt: Option<String>,
    /// Narrative payload
    pub content: ScriptwriterScenelet,
    /// Whether the reader chooses between the children of this scenelet
    pub is_branch_point: bool,
    /// Whether this scenelet ends its path
    pub is_terminal_node: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl SceneletRecord {
    /// Materialize a new scenelet with the identity and timestamp chosen by
    /// the repository.
    pub fn from_new(id: SceneletId, new: NewScenelet, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            story_id: new.story_id,
            parent_id: new.parent_id,
            choice_label_from_parent: new.choice_label_from_parent,
            choice_prompt: None,
            content: new.content,
            is_branch_point: false,
            is_terminal_node: new.is_terminal_node,
            created_at,
        }
    }

    /// True for the single parentless scenelet of a story.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}
