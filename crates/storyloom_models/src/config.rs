//! Model provider configuration.

use serde::{Deserialize, Serialize};

/// Which model to call and how.
///
/// ```toml
/// [model]
/// model = "gemini-2.5-flash"
/// base_url = "https://generativelanguage.googleapis.com/v1beta"
/// api_key_env = "GEMINI_API_KEY"
/// timeout_ms = 120000
/// thinking_budget = 2048
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
#[serde(deny_unknown_fields)]
pub struct ModelConfig {
    /// Model identifier
    #[serde(default = "default_model")]
    model: String,

    /// API root, overridable for proxies and tests
    #[serde(default = "default_base_url")]
    base_url: String,

    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    api_key_env: String,

    /// Default per-call timeout
    #[serde(default = "default_timeout_ms")]
    timeout_ms: u64,

    /// Default reasoning token budget, provider default when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    thinking_budget: Option<i32>,
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

fn default_timeout_ms() -> u64 {
    120_000
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
            timeout_ms: default_timeout_ms(),
            thinking_budget: None,
        }
    }
}

impl ModelConfig {
    /// Use a different model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Point the client at a different API root.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Change the default per-call timeout.
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set the default reasoning budget.
    pub fn with_thinking_budget(mut self, budget: i32) -> Self {
        self.thinking_budget = Some(budget);
        self
    }
}
