//! Exponential backoff with jitter around a single fallible call.

use crate::RetryConfig;
use std::future::Future;
use std::time::Duration;
use storyloom_error::RetryableError;
use tokio_retry2::{Retry, RetryError};
use tracing::{debug, warn};

/// Lower bound of the multiplicative jitter factor.
const HALF: f64 = 0.5;

/// Retries transient failures of an async operation.
///
/// The delay before retry `n` (zero-based) is
/// `min(initial * multiplier^n, max)`, scaled by `HALF + random()` when
/// jitter is enabled and capped at `max` again. A server supplied
/// retry-after replaces the computed delay when it is longer.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    config: RetryConfig,
}

impl RetryPolicy {
    /// Create a policy from configuration.
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// The configuration this policy was built from.
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Delay before retry number `retry`, given a jitter sample in `[0, 1)`.
    pub fn delay_for_retry(&self, retry: u32, jitter_sample: f64) -> Duration {
        let max = *self.config.max_delay_ms() as f64;
        let exponent = i32::try_from(retry).unwrap_or(i32::MAX);
        let base = (*self.config.initial_delay_ms() as f64
            * self.config.backoff_multiplier().powi(exponent))
        .min(max);
        let delay = if *self.config.jitter() {
            (base * (HALF + jitter_sample)).min(max)
        } else {
            base
        };
        Duration::from_millis(delay.max(0.0).round() as u64)
    }

    /// Planned delays between attempts, one fewer than `max_attempts`.
    pub fn schedule(&self) -> Vec<Duration> {
        (0..self.config.max_attempts().saturating_sub(1))
            .map(|retry| self.delay_for_retry(retry, rand::random::<f64>()))
            .collect()
    }

    /// Run `operation`, retrying transient errors.
    ///
    /// Errors that report [`RetryableError::is_retryable`] as false are
    /// returned immediately. Once the attempt budget is spent the last error
    /// is returned.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let text = policy.execute(|| async { client.send(&body).await }).await?;
    /// ```
    pub async fn execute<F, Fut, T, E>(&self, mut operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: RetryableError + std::fmt::Display,
    {
        let delays = self.schedule();
        let strategy = delays.clone().into_iter();
        let max_attempts = *self.config.max_attempts();
        let mut attempt: usize = 0;

        Retry::spawn(strategy, move || {
            let planned = delays.get(attempt).copied();
            attempt += 1;
            let current = attempt;
            let call = operation();

            async move {
                match call.await {
                    Ok(value) => {
                        if current > 1 {
                            debug!(attempt = current, "Model call succeeded after retry");
                        }
                        Ok(value)
                    }
                    Err(e) if !e.is_retryable() => {
                        warn!(attempt = current, error = %e, "Permanent error, failing immediately");
                        Err(RetryError::Permanent(e))
                    }
                    Err(e) => match planned {
                        Some(delay) => {
                            let delay = e.retry_after().map_or(delay, |hint| hint.max(delay));
                            warn!(
                                attempt = current,
                                max_attempts,
                                delay_ms = delay.as_millis() as u64,
                                error = %e,
                                "Transient error, will retry"
                            );
                            Err(RetryError::Transient {
                                err: e,
                                retry_after: Some(delay),
                            })
                        }
                        None => {
                            warn!(attempt = current, error = %e, "Retry attempts exhausted");
                            Err(RetryError::Permanent(e))
                        }
                    },
                }
            }
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(jitter: bool) -> RetryPolicy {
        RetryPolicy::new(RetryConfig::new(5, 1000, 2.0, 5000, jitter))
    }

    #[test]
    fn exponential_without_jitter() {
        let policy = policy(false);
        let delays: Vec<u64> = (0..4)
            .map(|n| policy.delay_for_retry(n, 0.9).as_millis() as u64)
            .collect();
        assert_eq!(delays, vec![1000, 2000, 4000, 5000]);
    }

    #[test]
    fn jitter_scales_between_half_and_one_and_a_half() {
        let policy = policy(true);
        assert_eq!(policy.delay_for_retry(0, 0.0).as_millis(), 500);
        assert_eq!(policy.delay_for_retry(0, 0.5).as_millis(), 1000);
        assert_eq!(policy.delay_for_retry(1, 0.75).as_millis(), 2500);
    }

    #[test]
    fn jitter_never_exceeds_cap() {
        let policy = policy(true);
        assert_eq!(policy.delay_for_retry(10, 0.99).as_millis(), 5000);
    }

    #[test]
    fn schedule_has_one_delay_per_retry() {
        assert_eq!(policy(true).schedule().len(), 4);
        assert!(RetryPolicy::new(RetryConfig::no_retry()).schedule().is_empty());
    }
}
