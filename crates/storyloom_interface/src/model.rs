//! Model client trait and request types.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use storyloom_error::StoryloomResult;

/// Prompt for a single JSON-producing model call.
///
/// # Examples
///
/// ```
/// use storyloom_interface::JsonGenerationRequest;
///
/// let request = JsonGenerationRequest::builder()
///     .system_instruction("You are a scriptwriter.")
///     .user_content("Begin the story.")
///     .build()
///     .unwrap();
///
/// assert_eq!(request.user_content(), "Begin the story.");
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    derive_builder::Builder,
    derive_getters::Getters,
)]
#[builder(setter(into))]
pub struct JsonGenerationRequest {
    /// Standing instructions for the model
    system_instruction: String,
    /// The task-specific input
    user_content: String,
}

impl JsonGenerationRequest {
    /// Creates a new request builder.
    pub fn builder() -> JsonGenerationRequestBuilder {
        JsonGenerationRequestBuilder::default()
    }
}

/// Per-call knobs for a model request.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, derive_setters::Setters,
)]
#[setters(prefix = "with_", strip_option)]
pub struct JsonGenerationOptions {
    /// Abort the call after this many milliseconds
    pub timeout_ms: Option<u64>,
    /// Token budget for model-side reasoning
    pub thinking_budget: Option<i32>,
}

/// A model that answers a prompt with JSON text.
///
/// Implementations own their retry policy. A returned error means the call
/// failed for good: the caller treats it as one atomic failure.
#[async_trait]
pub trait StoryModelClient: Send + Sync {
    /// Issue one request and return the raw response text.
    ///
    /// # Errors
    ///
    /// Fails with a model error for blank output, exhausted rate limiting or
    /// API errors after the client's own retries.
    async fn generate_json(
        &self,
        request: &JsonGenerationRequest,
        options: &JsonGenerationOptions,
    ) -> StoryloomResult<String>;

    /// Provider name (e.g., "gemini").
    fn provider_name(&self) -> &'static str;

    /// Model identifier (e.g., "gemini-2.5-flash").
    fn model_name(&self) -> &str;
}

#[async_trait]
impl<T: StoryModelClient + ?Sized> StoryModelClient for Arc<T> {
    async fn generate_json(
        &self,
        request: &JsonGenerationRequest,
        options: &JsonGenerationOptions,
    ) -> StoryloomResult<String> {
        (**self).generate_json(request, options).await
    }

    fn provider_name(&self) -> &'static str {
        (**self).provider_name()
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}
