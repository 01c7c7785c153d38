//! Units of pending generation work.

use crate::{SceneletId, ScriptwriterScenelet};
use serde::{Deserialize, Serialize};

/// One scenelet continuation waiting to be generated.
///
/// `path_context` holds the content of every scenelet from the root down to
/// (and including) the parent, root first. A task without a parent generates
/// the root of the story.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
pub struct GenerationTask {
    story_id: String,
    parent_scenelet_id: Option<SceneletId>,
    path_context: Vec<ScriptwriterScenelet>,
}

impl GenerationTask {
    /// Task that generates the root of an empty story.
    pub fn root(story_id: impl Into<String>) -> Self {
        Self {
            story_id: story_id.into(),
            parent_scenelet_id: None,
            path_context: Vec::new(),
        }
    }

    /// Task that continues the story below `parent`.
    pub fn continuation(
        story_id: impl Into<String>,
        parent: SceneletId,
        path_context: Vec<ScriptwriterScenelet>,
    ) -> Self {
        Self {
            story_id: story_id.into(),
            parent_scenelet_id: Some(parent),
            path_context,
        }
    }

    /// Whether this task generates the root.
    pub fn is_root(&self) -> bool {
        self.parent_scenelet_id.is_none()
    }

    /// Task for the continuation of a freshly persisted child of this task's
    /// parent: the path grows by the child's own content.
    pub fn descend(&self, child: SceneletId, child_content: &ScriptwriterScenelet) -> Self {
        let mut path_context = self.path_context.clone();
        path_context.push(crate::clone_scenelet(child_content));
        Self::continuation(self.story_id.clone(), child, path_context)
    }

    /// Label used in logs and error messages.
    pub fn label(&self) -> String {
        match &self.parent_scenelet_id {
            Some(parent) => format!("story '{}' below scenelet '{}'", self.story_id, parent),
            None => format!("story '{}' root", self.story_id),
        }
    }
}

/// A branch whose children were only partly written.
///
/// The parent never received its branch point flag, so the stored children
/// are leftovers of a response that did not finish persisting. The parent is
/// planned for regeneration and the leftovers are discarded before it runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterruptedBranch {
    /// Scenelet that was being expanded
    pub parent_scenelet_id: SceneletId,
    /// Children stored before the write stopped
    pub partial_children: Vec<SceneletId>,
}

/// Open work reconstructed from a persisted story.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeState {
    /// Tasks in depth-first discovery order
    pub pending_tasks: Vec<GenerationTask>,
    /// Branches to repair before their parents are regenerated
    #[serde(default)]
    pub interrupted_branches: Vec<InterruptedBranch>,
}

impl ResumeState {
    /// True when every path of the story has concluded.
    pub fn is_complete(&self) -> bool {
        self.pending_tasks.is_empty()
    }
}
