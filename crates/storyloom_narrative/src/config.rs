//! Tree generation settings.

use serde::{Deserialize, Serialize};
use storyloom_error::ConfigError;

/// How the engine expands a story.
///
/// ```toml
/// [generation]
/// max_concurrency = 4
/// max_path_length = 40
/// target_scenelets_per_path = 12
/// continue_on_error = true
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    derive_getters::Getters,
    derive_setters::Setters,
)]
#[serde(deny_unknown_fields)]
#[setters(prefix = "with_")]
pub struct GenerationConfig {
    /// Tasks in flight at once; 1 processes the frontier sequentially
    #[serde(default = "default_max_concurrency")]
    max_concurrency: usize,

    /// Scenelets a path may hold before expansion stops
    #[serde(default = "default_max_path_length")]
    max_path_length: usize,

    /// Advisory path length rendered into the system instruction
    #[serde(default = "default_target_scenelets_per_path")]
    target_scenelets_per_path: usize,

    /// Keep processing other tasks after one fails
    #[serde(default = "default_continue_on_error")]
    continue_on_error: bool,

    /// Per-call model timeout, client default when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[setters(strip_option)]
    timeout_ms: Option<u64>,

    /// Per-call reasoning budget, client default when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[setters(strip_option)]
    thinking_budget: Option<i32>,
}

fn default_max_concurrency() -> usize {
    4
}

fn default_max_path_length() -> usize {
    40
}

fn default_target_scenelets_per_path() -> usize {
    12
}

fn default_continue_on_error() -> bool {
    true
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
            max_path_length: default_max_path_length(),
            target_scenelets_per_path: default_target_scenelets_per_path(),
            continue_on_error: default_continue_on_error(),
            timeout_ms: None,
            thinking_budget: None,
        }
    }
}

impl GenerationConfig {
    /// Reject settings the engine cannot run with.
    ///
    /// # Errors
    ///
    /// Fails when `max_concurrency` or `max_path_length` is zero, or when the
    /// advisory target exceeds the hard cap.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_concurrency == 0 {
            return Err(ConfigError::new("generation.max_concurrency must be at least 1"));
        }
        if self.max_path_length == 0 {
            return Err(ConfigError::new("generation.max_path_length must be at least 1"));
        }
        if self.target_scenelets_per_path > self.max_path_length {
            return Err(ConfigError::new(format!(
                "generation.target_scenelets_per_path ({}) exceeds max_path_length ({})",
                self.target_scenelets_per_path, self.max_path_length
            )));
        }
        Ok(())
    }
}
