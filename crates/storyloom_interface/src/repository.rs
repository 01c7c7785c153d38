//! Repository trait for scenelet persistence.

use async_trait::async_trait;
use std::sync::Arc;
use storyloom_core::{NewScenelet, SceneletId, SceneletRecord};
use storyloom_error::StoryloomResult;

/// Persistence for story trees.
///
/// The engine writes the children of a branch with [`create_scenelets`] and
/// flags the parent afterwards, so a reader never sees a branch point whose
/// children are not yet stored.
///
/// [`create_scenelets`]: SceneletRepository::create_scenelets
#[async_trait]
pub trait SceneletRepository: Send + Sync {
    /// Store a new scenelet and return it with its assigned identity.
    async fn create_scenelet(&self, scenelet: NewScenelet) -> StoryloomResult<SceneletRecord>;

    /// Store several scenelets as one unit.
    ///
    /// Either every scenelet is stored or, when an error is returned, none
    /// of them is. Records come back in input order.
    async fn create_scenelets(
        &self,
        scenelets: Vec<NewScenelet>,
    ) -> StoryloomResult<Vec<SceneletRecord>>;

    /// Remove scenelets, used to discard the leftovers of an interrupted
    /// branch write.
    async fn delete_scenelets(&self, ids: &[SceneletId]) -> StoryloomResult<()>;

    /// Flag a scenelet as a branch point with the question shown to the reader.
    async fn mark_scenelet_as_branch_point(
        &self,
        id: &SceneletId,
        choice_prompt: &str,
    ) -> StoryloomResult<()>;

    /// Flag a scenelet as the end of its path.
    async fn mark_scenelet_as_terminal(&self, id: &SceneletId) -> StoryloomResult<()>;

    /// Whether any scenelet exists for the story.
    async fn has_scenelets_for_story(&self, story_id: &str) -> StoryloomResult<bool>;

    /// Every scenelet of the story, in a stable order.
    async fn list_scenelets_by_story(&self, story_id: &str)
    -> StoryloomResult<Vec<SceneletRecord>>;
}

#[async_trait]
impl<T: SceneletRepository + ?Sized> SceneletRepository for Arc<T> {
    async fn create_scenelet(&self, scenelet: NewScenelet) -> StoryloomResult<SceneletRecord> {
        (**self).create_scenelet(scenelet).await
    }

    async fn create_scenelets(
        &self,
        scenelets: Vec<NewScenelet>,
    ) -> StoryloomResult<Vec<SceneletRecord>> {
        (**self).create_scenelets(scenelets).await
    }

    async fn delete_scenelets(&self, ids: &[SceneletId]) -> StoryloomResult<()> {
        (**self).delete_scenelets(ids).await
    }

    async fn mark_scenelet_as_branch_point(
        &self,
        id: &SceneletId,
        choice_prompt: &str,
    ) -> StoryloomResult<()> {
        (**self).mark_scenelet_as_branch_point(id, choice_prompt).await
    }

    async fn mark_scenelet_as_terminal(&self, id: &SceneletId) -> StoryloomResult<()> {
        (**self).mark_scenelet_as_terminal(id).await
    }

    async fn has_scenelets_for_story(&self, story_id: &str) -> StoryloomResult<bool> {
        (**self).has_scenelets_for_story(story_id).await
    }

    async fn list_scenelets_by_story(
        &self,
        story_id: &str,
    ) -> StoryloomResult<Vec<SceneletRecord>> {
        (**self).list_scenelets_by_story(story_id).await
    }
}
