//! Gemini client tests against a local mock server.

use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;
use storyloom_error::{ModelErrorKind, RetryableError, StoryloomErrorKind};
use storyloom_interface::{JsonGenerationOptions, JsonGenerationRequest, StoryModelClient};
use storyloom_models::{GeminiJsonClient, ModelConfig};
use storyloom_rate_limit::RetryConfig;

fn endpoint() -> Matcher {
    Matcher::Regex(r"models/gemini-test:generateContent$".to_string())
}

fn client(server: &ServerGuard, retry: RetryConfig) -> GeminiJsonClient {
    let config = ModelConfig::default()
        .with_model("gemini-test")
        .with_base_url(server.url());
    GeminiJsonClient::new("test-key", config, retry).expect("client builds")
}

fn request() -> JsonGenerationRequest {
    JsonGenerationRequest::builder()
        .system_instruction("You are a scriptwriter.")
        .user_content("Begin.")
        .build()
        .expect("valid request")
}

fn model_kind(err: &storyloom_error::StoryloomError) -> ModelErrorKind {
    match err.kind() {
        StoryloomErrorKind::Model(e) => e.kind.clone(),
        other => panic!("expected model error, got {other}"),
    }
}

#[tokio::test]
async fn returns_candidate_text() -> anyhow::Result<()> {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", endpoint())
        .match_body(Matcher::PartialJson(json!({
            "generationConfig": {
                "responseMimeType": "application/json",
                "thinkingConfig": {"thinkingBudget": 512}
            }
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "candidates": [{
                    "content": {"role": "model", "parts": [{"text": "{\"a\": 1}"}]},
                    "finishReason": "STOP",
                    "index": 0
                }]
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let client = client(&server, RetryConfig::no_retry());
    let options = JsonGenerationOptions::default().with_thinking_budget(512);
    let text = client.generate_json(&request(), &options).await?;

    assert_eq!(text, "{\"a\": 1}");
    assert_eq!(client.provider_name(), "gemini");
    assert_eq!(client.model_name(), "gemini-test");
    mock.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn throttling_is_reported_as_rate_limited() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", endpoint())
        .with_status(429)
        .with_body(r#"{"error": {"message": "quota", "status": "RESOURCE_EXHAUSTED"}}"#)
        .create_async()
        .await;

    let err = client(&server, RetryConfig::no_retry())
        .generate_json(&request(), &JsonGenerationOptions::default())
        .await
        .unwrap_err();

    match model_kind(&err) {
        ModelErrorKind::RateLimited { message, .. } => {
            assert!(message.contains("429"));
        }
        other => panic!("expected rate limit, got {other}"),
    }
}

#[tokio::test]
async fn unusable_output_fails_without_retry() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", endpoint())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"candidates": []}"#)
        .expect(1)
        .create_async()
        .await;

    let retry = RetryConfig::new(3, 1, 2.0, 5, false);
    let err = client(&server, retry)
        .generate_json(&request(), &JsonGenerationOptions::default())
        .await
        .unwrap_err();

    assert!(!err.is_retryable());
    assert!(matches!(
        model_kind(&err),
        ModelErrorKind::EmptyResponse | ModelErrorKind::MalformedResponse(_)
    ));
    mock.assert_async().await;
}

#[tokio::test]
async fn bad_request_is_not_retried() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", endpoint())
        .with_status(400)
        .with_body(r#"{"error": {"message": "bad schema", "status": "INVALID_ARGUMENT"}}"#)
        .expect(1)
        .create_async()
        .await;

    let retry = RetryConfig::new(3, 1, 2.0, 5, false);
    let err = client(&server, retry)
        .generate_json(&request(), &JsonGenerationOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(
        model_kind(&err),
        ModelErrorKind::Api {
            status_code: Some(400),
            retryable: false,
            ..
        }
    ));
    mock.assert_async().await;
}

#[tokio::test]
async fn server_errors_are_retried_until_exhausted() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", endpoint())
        .with_status(503)
        .with_body("overloaded")
        .expect(3)
        .create_async()
        .await;

    let retry = RetryConfig::new(3, 1, 2.0, 5, false);
    let err = client(&server, retry)
        .generate_json(&request(), &JsonGenerationOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(
        model_kind(&err),
        ModelErrorKind::Api {
            status_code: Some(503),
            retryable: true,
            ..
        }
    ));
    mock.assert_async().await;
}

#[test]
fn missing_api_key_is_reported() {
    let config: ModelConfig = toml::from_str(r#"api_key_env = "STORYLOOM_TEST_UNSET_KEY""#)
        .expect("valid config");
    let err = GeminiJsonClient::from_env(config, RetryConfig::no_retry()).unwrap_err();
    assert!(matches!(
        model_kind(&err),
        ModelErrorKind::MissingApiKey(name) if name == "STORYLOOM_TEST_UNSET_KEY"
    ));
}

#[tokio::test]
#[cfg_attr(not(feature = "api"), ignore)]
async fn live_gemini_returns_json() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let client = GeminiJsonClient::from_env(ModelConfig::default(), RetryConfig::default())?;
    let request = JsonGenerationRequest::builder()
        .system_instruction("Reply with a JSON object containing the key \"ok\" set to true.")
        .user_content("Ping.")
        .build()?;
    let text = client
        .generate_json(&request, &JsonGenerationOptions::default())
        .await?;
    let value: serde_json::Value = serde_json::from_str(&text)?;
    assert_eq!(value["ok"], json!(true));
    Ok(())
}
