//! Filesystem-based scenelet repository.
//!
//! Each scenelet is a JSON document under its story's directory:
//!
//! ```text
//! /var/storyloom/stories/
//! └── harbor-mystery/
//!     ├── 0b6c0f1e-....json
//!     └── 5f1d9a2c-....json
//! ```
//!
//! Writes go to a temporary file in the same directory and are renamed into
//! place, so a reader sees either the old or the new document, never a torn
//! one. A batch stages every file before the first rename.

use async_trait::async_trait;
use chrono::Utc;
use std::path::{Path, PathBuf};
use storyloom_core::{NewScenelet, SceneletId, SceneletRecord};
use storyloom_error::{StorageError, StorageErrorKind, StoryloomResult};
use storyloom_interface::SceneletRepository;

const RECORD_EXTENSION: &str = "json";

/// A record written to its temporary file, waiting to be renamed.
#[derive(Debug)]
struct StagedRecord {
    temp_path: PathBuf,
    path: PathBuf,
}

/// Filesystem scenelet repository.
#[derive(Debug, Clone)]
pub struct FileSceneletRepository {
    base_path: PathBuf,
}

impl FileSceneletRepository {
    /// Create a repository rooted at `base_path`.
    ///
    /// Creates the base directory if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created.
    #[tracing::instrument(skip(base_path))]
    pub fn new(base_path: impl Into<PathBuf>) -> StoryloomResult<Self> {
        let base_path = base_path.into();

        std::fs::create_dir_all(&base_path).map_err(|e| {
            StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                "{}: {}",
                base_path.display(),
                e
            )))
        })?;

        tracing::info!(path = %base_path.display(), "Opened scenelet repository");
        Ok(Self { base_path })
    }

    /// Root directory of the repository.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn story_dir(&self, story_id: &str) -> StoryloomResult<PathBuf> {
        let valid = !story_id.is_empty()
            && story_id != "."
            && story_id != ".."
            && !story_id.contains(['/', '\\']);
        if !valid {
            return Err(StorageError::new(StorageErrorKind::InvalidPath(format!(
                "story id '{}' cannot be used as a directory name",
                story_id
            )))
            .into());
        }
        Ok(self.base_path.join(story_id))
    }

    fn record_path(&self, story_id: &str, id: &SceneletId) -> StoryloomResult<PathBuf> {
        Ok(self
            .story_dir(story_id)?
            .join(format!("{}.{}", id, RECORD_EXTENSION)))
    }

    async fn write_record(&self, record: &SceneletRecord) -> StoryloomResult<()> {
        let staged = self.stage_record(record).await?;
        Self::commit(&staged).await
    }

    /// Write a record to a temporary file next to its final path.
    async fn stage_record(&self, record: &SceneletRecord) -> StoryloomResult<StagedRecord> {
        let path = self.record_path(&record.story_id, &record.id)?;
        let body = serde_json::to_vec_pretty(record).map_err(|e| {
            StorageError::new(StorageErrorKind::Serialization(format!(
                "scenelet {}: {}",
                record.id, e
            )))
        })?;

        let temp_path = path.with_extension(format!("tmp-{}", uuid::Uuid::new_v4()));
        tokio::fs::write(&temp_path, &body).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "{}: {}",
                temp_path.display(),
                e
            )))
        })?;
        Ok(StagedRecord { temp_path, path })
    }

    /// Move a staged record into place.
    async fn commit(staged: &StagedRecord) -> StoryloomResult<()> {
        tokio::fs::rename(&staged.temp_path, &staged.path)
            .await
            .map_err(|e| {
                StorageError::new(StorageErrorKind::FileWrite(format!(
                    "{}: {}",
                    staged.path.display(),
                    e
                )))
            })?;
        Ok(())
    }

    async fn discard(staged: &[StagedRecord]) {
        for record in staged {
            if let Err(e) = tokio::fs::remove_file(&record.temp_path).await {
                tracing::warn!(
                    path = %record.temp_path.display(),
                    error = %e,
                    "Failed to remove staged scenelet"
                );
            }
        }
    }

    async fn ensure_story_dir(&self, story_id: &str) -> StoryloomResult<()> {
        let dir = self.story_dir(story_id)?;
        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                "{}: {}",
                dir.display(),
                e
            )))
        })?;
        Ok(())
    }

    async fn read_record(path: &Path) -> StoryloomResult<SceneletRecord> {
        let body = tokio::fs::read(path).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileRead(format!(
                "{}: {}",
                path.display(),
                e
            )))
        })?;
        let record = serde_json::from_slice(&body).map_err(|e| {
            StorageError::new(StorageErrorKind::Serialization(format!(
                "{}: {}",
                path.display(),
                e
            )))
        })?;
        Ok(record)
    }

    /// Paths of every stored record of a story, unordered.
    async fn record_paths(&self, story_id: &str) -> StoryloomResult<Vec<PathBuf>> {
        let dir = self.story_dir(story_id)?;
        if !tokio::fs::try_exists(&dir).await.unwrap_or(false) {
            return Ok(Vec::new());
        }

        let read_error = |e: std::io::Error| {
            StorageError::new(StorageErrorKind::FileRead(format!("{}: {}", dir.display(), e)))
        };
        let mut entries = tokio::fs::read_dir(&dir).await.map_err(read_error)?;
        let mut paths = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(read_error)? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == RECORD_EXTENSION) {
                paths.push(path);
            }
        }
        Ok(paths)
    }

    async fn update<F>(&self, id: &SceneletId, apply: F) -> StoryloomResult<()>
    where
        F: FnOnce(&mut SceneletRecord),
    {
        let path = self.find_record(id).await?;
        let mut record = Self::read_record(&path).await?;
        apply(&mut record);
        self.write_record(&record).await
    }

    /// Locate a record by id across stories.
    async fn find_record(&self, id: &SceneletId) -> StoryloomResult<PathBuf> {
        let file_name = format!("{}.{}", id, RECORD_EXTENSION);
        let not_found = || StorageError::new(StorageErrorKind::NotFound(id.to_string()));

        let read_error = |e: std::io::Error| {
            StorageError::new(StorageErrorKind::FileRead(format!(
                "{}: {}",
                self.base_path.display(),
                e
            )))
        };
        let mut stories = tokio::fs::read_dir(&self.base_path)
            .await
            .map_err(read_error)?;
        while let Some(story) = stories.next_entry().await.map_err(read_error)? {
            let candidate = story.path().join(&file_name);
            if tokio::fs::try_exists(&candidate).await.unwrap_or(false) {
                return Ok(candidate);
            }
        }
        Err(not_found().into())
    }
}

#[async_trait]
impl SceneletRepository for FileSceneletRepository {
    #[tracing::instrument(skip(self, scenelet), fields(story_id = %scenelet.story_id))]
    async fn create_scenelet(&self, scenelet: NewScenelet) -> StoryloomResult<SceneletRecord> {
        self.ensure_story_dir(&scenelet.story_id).await?;

        let record = SceneletRecord::from_new(SceneletId::generate(), scenelet, Utc::now());
        self.write_record(&record).await?;

        tracing::debug!(scenelet_id = %record.id, "Stored scenelet");
        Ok(record)
    }

    /// Every record is staged before any is renamed into place, so a failed
    /// write leaves no part of the batch visible.
    #[tracing::instrument(skip(self, scenelets), fields(count = scenelets.len()))]
    async fn create_scenelets(
        &self,
        scenelets: Vec<NewScenelet>,
    ) -> StoryloomResult<Vec<SceneletRecord>> {
        let created_at = Utc::now();
        let mut records = Vec::with_capacity(scenelets.len());
        for (index, scenelet) in scenelets.into_iter().enumerate() {
            self.ensure_story_dir(&scenelet.story_id).await?;
            // Distinct timestamps keep batch order under the listing sort.
            let at = created_at + chrono::Duration::microseconds(index as i64);
            records.push(SceneletRecord::from_new(SceneletId::generate(), scenelet, at));
        }

        let mut staged = Vec::with_capacity(records.len());
        for record in &records {
            match self.stage_record(record).await {
                Ok(entry) => staged.push(entry),
                Err(e) => {
                    Self::discard(&staged).await;
                    return Err(e);
                }
            }
        }
        for (index, entry) in staged.iter().enumerate() {
            if let Err(e) = Self::commit(entry).await {
                Self::discard(&staged[index..]).await;
                return Err(e);
            }
        }

        tracing::debug!(count = records.len(), "Stored scenelet batch");
        Ok(records)
    }

    async fn delete_scenelets(&self, ids: &[SceneletId]) -> StoryloomResult<()> {
        for id in ids {
            let path = self.find_record(id).await?;
            tokio::fs::remove_file(&path).await.map_err(|e| {
                StorageError::new(StorageErrorKind::FileWrite(format!(
                    "{}: {}",
                    path.display(),
                    e
                )))
            })?;
            tracing::debug!(scenelet_id = %id, "Deleted scenelet");
        }
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
        .await
    }

    async fn mark_scenelet_as_terminal(&self, id: &SceneletId) -> StoryloomResult<()> {
        self.update(id, |record| record.is_terminal_node = true)
            .await
    }

    async fn has_scenelets_for_story(&self, story_id: &str) -> StoryloomResult<bool> {
        Ok(!self.record_paths(story_id).await?.is_empty())
    }

    async fn list_scenelets_by_story(
        &self,
        story_id: &str,
    ) -> StoryloomResult<Vec<SceneletRecord>> {
        let mut records = Vec::new();
        for path in self.record_paths(story_id).await? {
            records.push(Self::read_record(&path).await?);
        }
        records.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(records)
    }
}
