//! Retry configuration.

use serde::{Deserialize, Serialize};
use storyloom_error::ConfigError;

/// Backoff settings for model calls.
///
/// ```toml
/// [retry]
/// max_attempts = 4
/// initial_delay_ms = 1000
/// backoff_multiplier = 2.0
/// max_delay_ms = 30000
/// jitter = true
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
#[serde(deny_unknown_fields)]
pub struct RetryConfig {
    /// Total attempts including the first one
    #[serde(default = "default_max_attempts")]
    max_attempts: u32,

    /// Delay before the first retry
    #[serde(default = "default_initial_delay_ms")]
    initial_delay_ms: u64,

    /// Growth factor applied per retry
    #[serde(default = "default_backoff_multiplier")]
    backoff_multiplier: f64,

    /// Upper bound for any computed delay
    #[serde(default = "default_max_delay_ms")]
    max_delay_ms: u64,

    /// Scale each delay by a random factor in [0.5, 1.5)
    #[serde(default = "default_jitter")]
    jitter: bool,
}

fn default_max_attempts() -> u32 {
    4
}

fn default_initial_delay_ms() -> u64 {
    1000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_max_delay_ms() -> u64 {
    30_000
}

fn default_jitter() -> bool {
    true
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
            max_delay_ms: default_max_delay_ms(),
            jitter: default_jitter(),
        }
    }
}

impl RetryConfig {
    /// Build a configuration from explicit values.
    pub fn new(
        max_attempts: u32,
        initial_delay_ms: u64,
        backoff_multiplier: f64,
        max_delay_ms: u64,
        jitter: bool,
    ) -> Self {
        Self {
            max_attempts,
            initial_delay_ms,
            backoff_multiplier,
            max_delay_ms,
            jitter,
        }
    }

    /// Single attempt, no waiting.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Check that the values describe a usable schedule.
    ///
    /// # Errors
    ///
    /// Fails when `max_attempts` is zero, the multiplier is below 1.0, or the
    /// initial delay exceeds the maximum delay.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::new("retry.max_attempts must be at least 1"));
        }
        if !self.backoff_multiplier.is_finite() || self.backoff_multiplier < 1.0 {
            return Err(ConfigError::new(format!(
                "retry.backoff_multiplier must be >= 1.0, got {}",
                self.backoff_multiplier
            )));
        }
        if self.initial_delay_ms > self.max_delay_ms {
            return Err(ConfigError::new(format!(
                "retry.initial_delay_ms ({}) exceeds retry.max_delay_ms ({})",
                self.initial_delay_ms, self.max_delay_ms
            )));
        }
        Ok(())
    }
}
