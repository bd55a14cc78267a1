//! Shared test utilities and fixtures
//!
//! Mock provider endpoints and app builders for integration tests.

#![allow(dead_code)]

use std::time::Duration;

use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use mindmatter_engine::{AnalysisSettings, App, HistoryStore};
use mindmatter_providers::ApiConfig;
use mindmatter_types::{ApiKey, Provider, UiOptions};

pub const TEST_KEY: &str = "test-key";

/// A well-formed analysis reply as the model would write it.
pub fn analysis_json(relationship: &str, confidence: u8) -> String {
    json!({
        "relationship": relationship,
        "explanation": "* **Light** reaches the retina\n* Signals travel to the visual cortex",
        "mechanism": "Photoreceptors convert light into nerve impulses.",
        "philosophy": "Matter is primary; the image is its reflection.",
        "confidence": confidence
    })
    .to_string()
}

pub fn gemini_body(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }],
        "usageMetadata": { "promptTokenCount": 120, "candidatesTokenCount": 80 }
    })
}

/// Responses API body (non-streaming)
pub fn openai_body(text: &str) -> Value {
    json!({
        "id": "resp_test",
        "object": "response",
        "created_at": 1_234_567_890,
        "model": "gpt-4o-mini",
        "output": [{
            "id": "msg_test",
            "type": "message",
            "role": "assistant",
            "content": [{
                "type": "output_text",
                "text": text
            }]
        }],
        "usage": {
            "input_tokens": 10,
            "output_tokens": 20,
            "total_tokens": 30
        }
    })
}

pub async fn mount_gemini_reply(server: &MockServer, model: &str, text: &str) {
    Mock::given(method("POST"))
        .and(path(format!("/models/{model}:generateContent")))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_body(text)))
        .mount(server)
        .await;
}

pub async fn mount_openai_reply(server: &MockServer, text: &str) {
    Mock::given(method("POST"))
        .and(path("/responses"))
        .respond_with(ResponseTemplate::new(200).set_body_json(openai_body(text)))
        .mount(server)
        .await;
}

/// Answer every POST with `status` and a provider-style error body.
pub async fn mount_error(server: &MockServer, status: u16, message: &str) {
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(status).set_body_json(json!({
            "error": { "code": status, "message": message }
        })))
        .mount(server)
        .await;
}

pub fn api_config(server: &MockServer, provider: Provider) -> ApiConfig {
    ApiConfig::for_provider(
        provider,
        ApiKey::new(provider, TEST_KEY),
        provider.default_model(),
    )
    .expect("key matches provider")
    .with_base_url(server.uri())
    .expect("loopback URL is accepted")
    .with_timeout(Duration::from_secs(5))
}

pub fn settings_for(server: &MockServer, provider: Provider) -> AnalysisSettings {
    AnalysisSettings {
        provider,
        model: provider.default_model().to_string(),
        api_key: Some(ApiKey::new(provider, TEST_KEY)),
        base_url: Some(server.uri()),
        timeout: Duration::from_secs(5),
    }
}

pub fn app_with(settings: AnalysisSettings, history: HistoryStore) -> App {
    App::with_history(UiOptions::default(), settings, history)
}

/// Tick until the in-flight analysis lands.
pub async fn wait_for_analysis(app: &mut App) {
    for _ in 0..300 {
        app.tick();
        if !app.is_analyzing() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("analysis did not complete");
}

/// Macro to skip tests that require network access
#[macro_export]
macro_rules! skip_if_no_network {
    () => {
        if std::env::var("MINDMATTER_TEST_NO_NETWORK").is_ok() {
            eprintln!("Skipping test: MINDMATTER_TEST_NO_NETWORK is set");
            return;
        }
    };
}
