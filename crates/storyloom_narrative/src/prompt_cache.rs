//! Memoized system prompt loading.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use storyloom_error::{NarrativeError, NarrativeErrorKind, StoryloomResult};
use tokio::sync::RwLock;

/// Name of the interactive scriptwriter system prompt.
pub const INTERACTIVE_SCRIPTWRITER: &str = "interactive_scriptwriter";

const BUNDLED_INTERACTIVE_SCRIPTWRITER: &str =
    include_str!("../prompts/interactive_scriptwriter.md");

/// Loads prompt templates once per cache instance.
///
/// A prompt named `name` is read from `{directory}/{name}.md` when a directory
/// is configured and the file exists, otherwise the bundled copy is used.
/// Loaded text is kept until [`PromptCache::reset`] is called.
///
/// # Example
///
/// ```no_run
/// use storyloom_narrative::PromptCache;
///
/// # async fn demo() -> storyloom_error::StoryloomResult<()> {
/// let cache = PromptCache::new(Some("./prompts".into()));
/// let prompt = cache.interactive_scriptwriter().await?;
/// assert!(!prompt.is_empty());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct PromptCache {
    directory: Option<PathBuf>,
    loaded: RwLock<HashMap<String, Arc<str>>>,
}

impl PromptCache {
    /// Create a cache reading overrides from `directory`.
    pub fn new(directory: Option<PathBuf>) -> Self {
        Self {
            directory,
            loaded: RwLock::default(),
        }
    }

    /// Directory searched for prompt overrides.
    pub fn directory(&self) -> Option<&Path> {
        self.directory.as_deref()
    }

    /// The interactive scriptwriter system prompt.
    pub async fn interactive_scriptwriter(&self) -> StoryloomResult<Arc<str>> {
        self.get(INTERACTIVE_SCRIPTWRITER).await
    }

    /// Load a prompt by name, reading it at most once.
    ///
    /// # Errors
    ///
    /// Fails if the override file exists but cannot be read, or if no
    /// override exists and no prompt of that name is bundled.
    #[tracing::instrument(skip(self))]
    pub async fn get(&self, name: &str) -> StoryloomResult<Arc<str>> {
        if let Some(prompt) = self.loaded.read().await.get(name) {
            return Ok(Arc::clone(prompt));
        }

        let prompt: Arc<str> = self.load(name).await?.into();
        self.loaded
            .write()
            .await
            .insert(name.to_string(), Arc::clone(&prompt));
        Ok(prompt)
    }

    /// Forget every loaded prompt.
    pub async fn reset(&self) {
        self.loaded.write().await.clear();
    }

    /// Whether `name` is currently memoized.
    pub async fn is_cached(&self, name: &str) -> bool {
        self.loaded.read().await.contains_key(name)
    }

    async fn load(&self, name: &str) -> StoryloomResult<String> {
        if let Some(dir) = &self.directory {
            let path = dir.join(format!("{}.md", name));
            if tokio::fs::try_exists(&path).await.unwrap_or(false) {
                tracing::debug!(path = %path.display(), "Loading prompt override");
                return tokio::fs::read_to_string(&path).await.map_err(|e| {
                    NarrativeError::new(NarrativeErrorKind::PromptLoad {
                        name: name.to_string(),
                        message: format!("{}: {}", path.display(), e),
                    })
                    .into()
                });
            }
        }

        match name {
            INTERACTIVE_SCRIPTWRITER => Ok(BUNDLED_INTERACTIVE_SCRIPTWRITER.to_string()),
            _ => Err(NarrativeError::new(NarrativeErrorKind::PromptLoad {
                name: name.to_string(),
                message: "no override file and no bundled prompt".to_string(),
            })
            .into()),
        }
    }
}
