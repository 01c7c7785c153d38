//! Repository wrapper that fails one chosen write.

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use storyloom_core::{NewScenelet, SceneletId, SceneletRecord};
use storyloom_error::{StorageError, StorageErrorKind, StoryloomResult};
use storyloom_interface::SceneletRepository;
use storyloom_storage::InMemorySceneletRepository;

/// Delegates to an in-memory repository, except that the `fail_on`-th write
/// (1-based, counting every create, batch, flag and delete call) returns a
/// storage error without touching the store.
#[derive(Debug, Clone)]
pub struct FailingRepository {
    inner: InMemorySceneletRepository,
    fail_on: usize,
    writes: Arc<AtomicUsize>,
}

impl FailingRepository {
    /// Wrap `inner`, failing its `fail_on`-th write.
    pub fn new(inner: InMemorySceneletRepository, fail_on: usize) -> Self {
        Self {
            inner,
            fail_on,
            writes: Arc::default(),
        }
    }

    fn check_write(&self) -> StoryloomResult<()> {
        let write = self.writes.fetch_add(1, Ordering::SeqCst) + 1;
        if write == self.fail_on {
            return Err(StorageError::new(StorageErrorKind::Unavailable(format!(
                "write {} rejected",
                write
            )))
            .into());
        }
        Ok(())
    }
}

#[async_trait]
impl SceneletRepository for FailingRepository {
    async fn create_scenelet(&self, scenelet: NewScenelet) -> StoryloomResult<SceneletRecord> {
        self.check_write()?;
        self.inner.create_scenelet(scenelet).await
    }

    async fn create_scenelets(
        &self,
        scenelets: Vec<NewScenelet>,
    ) -> StoryloomResult<Vec<SceneletRecord>> {
        self.check_write()?;
        self.inner.create_scenelets(scenelets).await
    }

    async fn delete_scenelets(&self, ids: &[SceneletId]) -> StoryloomResult<()> {
        self.check_write()?;
        self.inner.delete_scenelets(ids).await
    }

    async fn mark_scenelet_as_branch_point(
        &self,
        id: &SceneletId,
        choice_prompt: &str,
    ) -> StoryloomResult<()> {
        self.check_write()?;
        self.inner
            .mark_scenelet_as_branch_point(id, choice_prompt)
            .await
    }

    async fn mark_scenelet_as_terminal(&self, id: &SceneletId) -> StoryloomResult<()> {
        self.check_write()?;
        self.inner.mark_scenelet_as_terminal(id).await
    }

    async fn has_scenelets_for_story(&self, story_id: &str) -> StoryloomResult<bool> {
        self.inner.has_scenelets_for_story(story_id).await
    }

    async fn list_scenelets_by_story(
        &self,
        story_id: &str,
    ) -> StoryloomResult<Vec<SceneletRecord>> {
        self.inner.list_scenelets_by_story(story_id).await
    }
}
