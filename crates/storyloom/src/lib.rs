//! Storyloom: branching interactive story generation.
//!
//! This crate re-exports the storyloom workspace and adds layered
//! configuration and the `storyloom` command-line tool.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use storyloom::{
//!     FileSceneletRepository, GeminiJsonClient, GenerationMode, PromptCache,
//!     StoryGenerationEngine, StoryloomConfig,
//! };
//!
//! let config = StoryloomConfig::load()?;
//! let client = GeminiJsonClient::from_env(config.model.clone(), config.retry.clone())?;
//! let repository = FileSceneletRepository::new(&config.storage.path)?;
//! let prompt = PromptCache::new(config.prompts.directory.clone())
//!     .interactive_scriptwriter()
//!     .await?;
//!
//! let engine = StoryGenerationEngine::new(client, repository, prompt, config.generation)?;
//! let report = engine.generate("harbor", constitution, GenerationMode::Fresh).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod tree;

pub use config::{PromptsConfig, StorageConfig, StoryloomConfig};
pub use tree::render_tree;

// Re-export error types
pub use storyloom_error::{
    ConfigError, IntegrityError, IntegrityErrorKind, JsonError, ModelError, ModelErrorKind, NarrativeError,
    NarrativeErrorKind, RetryableError, StorageError, StorageErrorKind, StoryloomError,
    StoryloomErrorKind, StoryloomResult, ValidationError, ValidationErrorKind,
};

// Re-export core types
pub use storyloom_core::{
    DialogueLine, GenerationTask, InterruptedBranch, NewScenelet, NewSceneletBuilder, ResumeState,
    SceneletId, SceneletRecord, ScriptwriterScenelet, clone_scenelet, validate_scenelet,
};

// Re-export traits
pub use storyloom_interface::{
    JsonGenerationOptions, JsonGenerationRequest, SceneletRepository, StoryModelClient,
};

// Re-export retry handling
pub use storyloom_rate_limit::{RetryConfig, RetryPolicy};

// Re-export persistence
pub use storyloom_storage::{FileSceneletRepository, InMemorySceneletRepository};

// Re-export the story engine
pub use storyloom_narrative::{
    GenerationConfig, GenerationMode, GenerationReport, PromptCache, ResponseShape,
    ScriptwriterResponse, StoryGenerationEngine, TaskFailure, assemble_prompt, plan_resume,
};

// Re-export model providers
#[cfg(feature = "gemini")]
pub use storyloom_models::{GeminiJsonClient, ModelConfig};
