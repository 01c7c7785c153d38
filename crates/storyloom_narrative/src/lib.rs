//! Story tree generation for storyloom.
//!
//! This crate turns a story constitution into a branching tree of scenelets,
//! one model call per frontier node:
//!
//! - [`assemble_prompt`] builds the model input from the constitution and the
//!   root-first path of the node being continued
//! - [`ScriptwriterResponse`] decodes a reply into a branch, linear or
//!   concluding response
//! - [`plan_resume`] reconstructs open work from a persisted tree
//! - [`StoryGenerationEngine`] drives the frontier to completion
//!
//! # Example
//!
//! ```rust,ignore
//! use storyloom_narrative::{GenerationConfig, GenerationMode, PromptCache, StoryGenerationEngine};
//!
//! let prompts = PromptCache::new(None);
//! let engine = StoryGenerationEngine::new(
//!     client,
//!     repository,
//!     prompts.interactive_scriptwriter().await?,
//!     GenerationConfig::default(),
//! )?;
//! let report = engine.generate("harbor", constitution, GenerationMode::Fresh).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod engine;
mod extraction;
mod prompt;
mod prompt_cache;
mod resume;
mod response;

pub use config::GenerationConfig;
pub use engine::{GenerationMode, GenerationReport, StoryGenerationEngine, TaskFailure};
pub use extraction::extract_json;
pub use prompt::{TARGET_PLACEHOLDER, assemble_prompt, render_system_instruction};
pub use prompt_cache::{INTERACTIVE_SCRIPTWRITER, PromptCache};
pub use resume::plan_resume;
pub use response::{ResponseShape, ScriptwriterResponse};
