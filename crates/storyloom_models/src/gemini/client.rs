//! Gemini client producing JSON text.
//!
//! Builds `generateContent` requests through `gemini-rust` with the response
//! mime type set to `application/json`, so the model answers with a single
//! JSON document. Every call goes through a [`RetryPolicy`]: throttling,
//! timeouts and 5xx responses are retried with backoff, everything else fails
//! immediately.
//!
//! # Example
//!
//! ```no_run
//! use storyloom_models::{GeminiJsonClient, ModelConfig};
//! use storyloom_interface::{JsonGenerationOptions, JsonGenerationRequest, StoryModelClient};
//! use storyloom_rate_limit::RetryConfig;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = GeminiJsonClient::from_env(ModelConfig::default(), RetryConfig::default())?;
//! let request = JsonGenerationRequest::builder()
//!     .system_instruction("Answer in JSON.")
//!     .user_content("{\"ping\": true}")
//!     .build()?;
//! let text = client.generate_json(&request, &JsonGenerationOptions::default()).await?;
//! # Ok(())
//! # }
//! ```

use crate::ModelConfig;
use async_trait::async_trait;
use gemini_rust::{Gemini, client::Model};
use std::sync::Arc;
use std::time::Duration;
use storyloom_error::{ModelError, ModelErrorKind, StoryloomResult};
use storyloom_interface::{JsonGenerationOptions, JsonGenerationRequest, StoryModelClient};
use storyloom_rate_limit::{RetryConfig, RetryPolicy};
use tracing::{debug, instrument};
use url::Url;

const JSON_MIME_TYPE: &str = "application/json";

/// Gemini client implementing [`StoryModelClient`].
#[derive(Clone)]
pub struct GeminiJsonClient {
    client: Arc<Gemini>,
    config: ModelConfig,
    retry: RetryPolicy,
}

impl std::fmt::Debug for GeminiJsonClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiJsonClient")
            .field("model", self.config.model())
            .field("base_url", self.config.base_url())
            .finish_non_exhaustive()
    }
}

impl GeminiJsonClient {
    /// Create a client with an explicit API key.
    ///
    /// # Errors
    ///
    /// Fails if the retry configuration is invalid, the base URL does not
    /// parse, or the Gemini client cannot be built.
    pub fn new(
        api_key: impl Into<String>,
        config: ModelConfig,
        retry: RetryConfig,
    ) -> StoryloomResult<Self> {
        retry.validate()?;
        let api_key: String = api_key.into();

        // The SDK joins the model path onto the base URL, which needs a
        // trailing slash to keep the version segment.
        let mut base_url = config.base_url().clone();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        let base_url = Url::parse(&base_url).map_err(|e| {
            ModelError::new(ModelErrorKind::ClientCreation(format!(
                "invalid base URL '{}': {}",
                config.base_url(),
                e
            )))
        })?;

        let client =
            Gemini::with_model_and_base_url(api_key, model_name_to_enum(config.model()), base_url)
                .map_err(|e| ModelError::new(ModelErrorKind::ClientCreation(e.to_string())))?;

        Ok(Self {
            client: Arc::new(client),
            config,
            retry: RetryPolicy::new(retry),
        })
    }

    /// Create a client reading the API key from the configured environment
    /// variable.
    ///
    /// # Errors
    ///
    /// Fails with [`ModelErrorKind::MissingApiKey`] if the variable is unset
    /// or blank.
    pub fn from_env(config: ModelConfig, retry: RetryConfig) -> StoryloomResult<Self> {
        let api_key = std::env::var(config.api_key_env())
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                ModelError::new(ModelErrorKind::MissingApiKey(config.api_key_env().clone()))
            })?;
        Self::new(api_key, config, retry)
    }

    /// One request, classified into model errors.
    async fn send_once(
        &self,
        request: &JsonGenerationRequest,
        thinking_budget: Option<i32>,
        timeout: Duration,
    ) -> Result<String, ModelError> {
        let mut builder = self
            .client
            .generate_content()
            .with_system_prompt(request.system_instruction())
            .with_user_message(request.user_content())
            .with_response_mime_type(JSON_MIME_TYPE);
        if let Some(budget) = thinking_budget {
            builder = builder.with_thinking_budget(budget);
        }

        let response = tokio::time::timeout(timeout, builder.execute())
            .await
            .map_err(|_| ModelError::new(ModelErrorKind::Timeout(timeout.as_millis() as u64)))?
            .map_err(parse_gemini_error)?;

        let text = response.text();
        if text.trim().is_empty() {
            return Err(ModelError::new(ModelErrorKind::EmptyResponse));
        }
        Ok(text)
    }
}

#[async_trait]
impl StoryModelClient for GeminiJsonClient {
    #[instrument(skip(self, request, options), fields(model = %self.config.model()))]
    async fn generate_json(
        &self,
        request: &JsonGenerationRequest,
        options: &JsonGenerationOptions,
    ) -> StoryloomResult<String> {
        let timeout =
            Duration::from_millis(options.timeout_ms.unwrap_or(*self.config.timeout_ms()));
        let thinking_budget = options.thinking_budget.or(*self.config.thinking_budget());

        debug!(
            prompt_chars = request.user_content().len(),
            timeout_ms = timeout.as_millis() as u64,
            "Sending JSON generation request"
        );

        let text = self
            .retry
            .execute(|| self.send_once(request, thinking_budget, timeout))
            .await?;
        Ok(text)
    }

    fn provider_name(&self) -> &'static str {
        "gemini"
    }

    fn model_name(&self) -> &str {
        self.config.model()
    }
}

/// Map a configured model name onto the SDK's model enum.
fn model_name_to_enum(name: &str) -> Model {
    match name {
        "gemini-2.5-flash" => Model::Gemini25Flash,
        "gemini-2.5-flash-lite" => Model::Gemini25FlashLite,
        "gemini-2.5-pro" => Model::Gemini25Pro,
        other if other.starts_with("models/") => Model::Custom(other.to_string()),
        other => Model::Custom(format!("models/{}", other)),
    }
}

/// Classify a `gemini-rust` error from its rendered message.
///
/// The SDK reports HTTP failures as
/// `bad response from server; code 503; description: ...`.
fn parse_gemini_error(err: impl std::fmt::Display) -> ModelError {
    let message = err.to_string();

    let kind = match extract_status_code(&message) {
        Some(429) => ModelErrorKind::RateLimited {
            retry_after_ms: None,
            message,
        },
        Some(status_code) => ModelErrorKind::Api {
            status_code: Some(status_code),
            retryable: matches!(status_code, 408 | 500 | 502 | 503 | 504),
            message,
        },
        None if is_decode_failure(&message) => ModelErrorKind::MalformedResponse(message),
        None => ModelErrorKind::Transport(message),
    };
    ModelError::new(kind)
}

/// Extract the HTTP status code from an SDK error message.
fn extract_status_code(message: &str) -> Option<u16> {
    let start = message.find("code ")? + "code ".len();
    let digits: String = message[start..]
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

fn is_decode_failure(message: &str) -> bool {
    let lower = message.to_lowercase();
    ["deserializ", "decode", "parse", "json"]
        .iter()
        .any(|needle| lower.contains(needle))
}
