//! Model provider integrations for storyloom.
//!
//! Providers implement [`StoryModelClient`](storyloom_interface::StoryModelClient):
//! one prompt in, one JSON document (as text) out. Each client owns its retry
//! policy so the story engine can treat a call as atomic.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
#[cfg(feature = "gemini")]
mod gemini;

pub use config::ModelConfig;
#[cfg(feature = "gemini")]
pub use gemini::GeminiJsonClient;
