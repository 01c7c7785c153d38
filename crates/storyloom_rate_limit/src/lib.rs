//! Retry handling for model calls.
//!
//! Model providers throttle and occasionally fail. This crate wraps a single
//! call in exponential backoff with jitter, honoring a server supplied
//! retry-after hint when it asks for a longer wait than the computed delay.
//!
//! ```rust,ignore
//! use storyloom_rate_limit::{RetryConfig, RetryPolicy};
//!
//! let policy = RetryPolicy::new(RetryConfig::default());
//! let text = policy.execute(|| async { client.call().await }).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod retry;

pub use config::RetryConfig;
pub use retry::RetryPolicy;
