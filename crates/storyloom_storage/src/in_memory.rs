//! In-memory implementation of SceneletRepository for testing.
//!
//! Stores scenelets in insertion order in a `Vec` behind an RwLock. All data
//! is lost when the repository is dropped.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use storyloom_core::{NewScenelet, SceneletId, SceneletRecord};
use storyloom_error::{StorageError, StorageErrorKind, StoryloomResult};
use storyloom_interface::SceneletRepository;
use tokio::sync::RwLock;

/// A write observed by the repository, in the order it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositoryOperation {
    /// A scenelet was created
    Create {
        /// New scenelet
        id: SceneletId,
        /// Its parent
        parent_id: Option<SceneletId>,
    },
    /// A scenelet was flagged as a branch point
    MarkBranchPoint {
        /// Flagged scenelet
        id: SceneletId,
    },
    /// A scenelet was flagged as terminal
    MarkTerminal {
        /// Flagged scenelet
        id: SceneletId,
    },
    /// A scenelet was removed
    Delete {
        /// Removed scenelet
        id: SceneletId,
    },
}

/// In-memory repository for scenelets.
///
/// # Example
/// ```no_run
/// use storyloom_storage::InMemorySceneletRepository;
///
/// #[tokio::main]
/// async fn main() {
///     let repo = InMemorySceneletRepository::new();
///     assert!(repo.is_empty().await);
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemorySceneletRepository {
    records: Arc<RwLock<Vec<SceneletRecord>>>,
    journal: Arc<RwLock<Vec<RepositoryOperation>>>,
}

impl InMemorySceneletRepository {
    /// Create a new empty in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the repository with existing records, e.g. a partial tree.
    pub fn with_records(records: Vec<SceneletRecord>) -> Self {
        Self {
            records: Arc::new(RwLock::new(records)),
            journal: Arc::default(),
        }
    }

    /// Number of stored scenelets across all stories.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Check if the repository is empty.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Snapshot of every write performed so far.
    pub async fn journal(&self) -> Vec<RepositoryOperation> {
        self.journal.read().await.clone()
    }

    /// Look up a single scenelet.
    pub async fn get(&self, id: &SceneletId) -> Option<SceneletRecord> {
        self.records
            .read()
            .await
            .iter()
            .find(|record| &record.id == id)
            .cloned()
    }

    /// Clear all scenelets and the journal.
    pub async fn clear(&self) {
        self.records.write().await.clear();
        self.journal.write().await.clear();
    }

    async fn update<F>(&self, id: &SceneletId, apply: F) -> StoryloomResult<()>
    where
        F: FnOnce(&mut SceneletRecord),
    {
        let mut records = self.records.write().await;
        let record = records
            .iter_mut()
            .find(|record| &record.id == id)
            .ok_or_else(|| StorageError::new(StorageErrorKind::NotFound(id.to_string())))?;
        apply(record);
        Ok(())
    }
}

#[async_trait]
impl SceneletRepository for InMemorySceneletRepository {
    async fn create_scenelet(&self, scenelet: NewScenelet) -> StoryloomResult<SceneletRecord> {
        let record = SceneletRecord::from_new(SceneletId::generate(), scenelet, Utc::now());

        self.records.write().await.push(record.clone());
        self.journal
            .write()
            .await
            .push(RepositoryOperation::Create {
                id: record.id.clone(),
                parent_id: record.parent_id.clone(),
            });
        Ok(record)
    }

    async fn create_scenelets(
        &self,
        scenelets: Vec<NewScenelet>,
    ) -> StoryloomResult<Vec<SceneletRecord>> {
        let created_at = Utc::now();
        let batch: Vec<SceneletRecord> = scenelets
            .into_iter()
            .map(|new| SceneletRecord::from_new(SceneletId::generate(), new, created_at))
            .collect();

        // One write guard for the whole batch.
        self.records.write().await.extend(batch.iter().cloned());
        self.journal
            .write()
            .await
            .extend(batch.iter().map(|record| RepositoryOperation::Create {
                id: record.id.clone(),
                parent_id: record.parent_id.clone(),
            }));
        Ok(batch)
    }

    async fn delete_scenelets(&self, ids: &[SceneletId]) -> StoryloomResult<()> {
        let mut records = self.records.write().await;
        if let Some(missing) = ids
            .iter()
            .find(|id| !records.iter().any(|record| &record.id == *id))
        {
            return Err(StorageError::new(StorageErrorKind::NotFound(missing.to_string())).into());
        }
        records.retain(|record| !ids.contains(&record.id));
        drop(records);

        self.journal.write().await.extend(
            ids.iter()
                .map(|id| RepositoryOperation::Delete { id: id.clone() }),
        );
        Ok(())
    }

    async fn mark_scenelet_as_branch_point(
        &self,
        id: &SceneletId,
        choice_prompt: &str,
    ) -> StoryloomResult<()> {
        self.update(id, |record| {
            record.is_branch_point = true;
            record.choice_prompt = Some(choice_prompt.to_string());
        })
        .await?;
        self.journal
            .write()
            .await
            .push(RepositoryOperation::MarkBranchPoint { id: id.clone() });
        Ok(())
    }

    async fn mark_scenelet_as_terminal(&self, id: &SceneletId) -> StoryloomResult<()> {
        self.update(id, |record| record.is_terminal_node = true)
            .await?;
        self.journal
            .write()
            .await
            .push(RepositoryOperation::MarkTerminal { id: id.clone() });
        Ok(())
    }

    async fn has_scenelets_for_story(&self, story_id: &str) -> StoryloomResult<bool> {
        Ok(self
            .records
            .read()
            .await
            .iter()
            .any(|record| record.story_id == story_id))
    }

    async fn list_scenelets_by_story(
        &self,
        story_id: &str,
    ) -> StoryloomResult<Vec<SceneletRecord>> {
        Ok(self
            .records
            .read()
            .await
            .iter()
            .filter(|record| record.story_id == story_id)
            .cloned()
            .collect())
    }
}
