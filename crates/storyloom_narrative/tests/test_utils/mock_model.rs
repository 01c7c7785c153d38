//! Scripted model client for engine tests.

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use serde_json::json;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use storyloom_core::{SceneletId, SceneletRecord, ScriptwriterScenelet};
use storyloom_error::{ModelError, ModelErrorKind, StoryloomResult};
use storyloom_interface::{JsonGenerationOptions, JsonGenerationRequest, StoryModelClient};

/// A single scripted reply.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Raw response text
    Text(String),
    /// Fail the call with this error
    Error(ModelErrorKind),
}

/// Mock model client replaying scripted responses in call order.
///
/// Once the script is exhausted every call gets the fallback, which is an
/// empty-response error unless configured otherwise.
#[derive(Clone)]
pub struct MockModelClient {
    script: Arc<Mutex<VecDeque<MockResponse>>>,
    fallback: MockResponse,
    requests: Arc<Mutex<Vec<JsonGenerationRequest>>>,
}

impl MockModelClient {
    /// Replay `responses` in order.
    pub fn new_sequence(responses: Vec<MockResponse>) -> Self {
        Self {
            script: Arc::new(Mutex::new(responses.into())),
            fallback: MockResponse::Error(ModelErrorKind::EmptyResponse),
            requests: Arc::default(),
        }
    }

    /// Answer every call with the same response.
    pub fn new_always(response: MockResponse) -> Self {
        Self::new_sequence(Vec::new()).with_fallback(response)
    }

    /// Reply used once the script runs out.
    pub fn with_fallback(mut self, fallback: MockResponse) -> Self {
        self.fallback = fallback;
        self
    }

    /// Number of calls made so far.
    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Every request received, in call order.
    pub fn requests(&self) -> Vec<JsonGenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl StoryModelClient for MockModelClient {
    async fn generate_json(
        &self,
        request: &JsonGenerationRequest,
        _options: &JsonGenerationOptions,
    ) -> StoryloomResult<String> {
        self.requests.lock().unwrap().push(request.clone());
        let next = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        match next {
            MockResponse::Text(text) => Ok(text),
            MockResponse::Error(kind) => Err(ModelError::new(kind).into()),
        }
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }

    fn model_name(&self) -> &str {
        "mock-scriptwriter"
    }
}

fn entry(description: &str) -> serde_json::Value {
    json!({
        "description": description,
        "dialogue": [{"character": "Narrator", "line": description}],
        "shot_suggestions": [format!("Shot of {}", description)]
    })
}

/// Linear response text.
pub fn linear(description: &str) -> MockResponse {
    MockResponse::Text(
        json!({
            "branch_point": false,
            "is_concluding_scene": false,
            "next_scenelets": [entry(description)]
        })
        .to_string(),
    )
}

/// Concluding response text.
pub fn concluding(description: &str) -> MockResponse {
    MockResponse::Text(
        json!({
            "branch_point": false,
            "is_concluding_scene": true,
            "next_scenelets": [entry(description)]
        })
        .to_string(),
    )
}

/// Branch response text with one `(label, description)` entry per choice.
pub fn branch(choice_prompt: &str, choices: &[(&str, &str)]) -> MockResponse {
    let next: Vec<_> = choices
        .iter()
        .map(|(label, description)| {
            let mut value = entry(description);
            value["choice_label"] = json!(label);
            value
        })
        .collect();
    MockResponse::Text(
        json!({
            "branch_point": true,
            "is_concluding_scene": false,
            "choice_prompt": choice_prompt,
            "next_scenelets": next
        })
        .to_string(),
    )
}

/// Scenelet content with the given description.
pub fn scenelet(description: &str) -> ScriptwriterScenelet {
    ScriptwriterScenelet {
        description: description.to_string(),
        dialogue: vec![],
        shot_suggestions: vec!["Wide".to_string()],
        choice_label: None,
    }
}

/// A persisted record; `order` spaces out creation timestamps.
pub fn record(
    story_id: &str,
    id: &str,
    parent: Option<&str>,
    is_branch_point: bool,
    is_terminal_node: bool,
    order: i64,
) -> SceneletRecord {
    let base = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    SceneletRecord {
        id: SceneletId::new(id),
        story_id: story_id.to_string(),
        parent_id: parent.map(SceneletId::new),
        choice_label_from_parent: None,
        choice_prompt: is_branch_point.then(|| "Which way?".to_string()),
        content: scenelet(id),
        is_branch_point,
        is_terminal_node,
        created_at: base + Duration::seconds(order),
    }
}
