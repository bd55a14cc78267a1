//! Provider clients against a mock HTTP server.

use serde_json::json;
use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use mindmatter_providers::parse::{FALLBACK_CONFIDENCE, UNSTRUCTURED_RELATIONSHIP};
use mindmatter_providers::{ProviderError, analyze};
use mindmatter_types::{
    API_KEY_ERROR_MESSAGE, AnalysisQuery, GENERIC_ERROR_MESSAGE, Provider, QUOTA_ERROR_MESSAGE,
};

use crate::common::{
    TEST_KEY, analysis_json, api_config, gemini_body, mount_error, mount_gemini_reply,
    mount_openai_reply, openai_body,
};

fn query() -> AnalysisQuery {
    AnalysisQuery::new("light", "vision").unwrap()
}

#[tokio::test]
async fn gemini_request_carries_key_prompt_and_json_mode() {
    crate::skip_if_no_network!();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-2.0-flash:generateContent"))
        .and(header("x-goog-api-key", TEST_KEY))
        .and(body_string_contains("light"))
        .and(body_string_contains("vision"))
        .and(body_partial_json(json!({
            "generationConfig": { "responseMimeType": "application/json" }
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(gemini_body(&analysis_json("Light gives rise to sight", 88))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let result = analyze(&api_config(&server, Provider::Gemini), &query())
        .await
        .unwrap();

    assert_eq!(result.relationship, "Light gives rise to sight");
    assert_eq!(result.confidence.percent(), 88);
    assert!(result.mechanism.unwrap().contains("Photoreceptors"));
    assert!(result.philosophy.is_some());
}

#[tokio::test]
async fn openai_request_uses_bearer_auth_and_responses_api() {
    crate::skip_if_no_network!();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/responses"))
        .and(header("authorization", format!("Bearer {TEST_KEY}").as_str()))
        .and(body_partial_json(json!({
            "model": "gpt-4o-mini",
            "store": false,
            "text": { "format": { "type": "json_object" } }
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(openai_body(&analysis_json("Reflection", 70))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let result = analyze(&api_config(&server, Provider::OpenAI), &query())
        .await
        .unwrap();
    assert_eq!(result.relationship, "Reflection");
    assert_eq!(result.confidence.percent(), 70);
}

#[tokio::test]
async fn fenced_reply_is_unwrapped() {
    crate::skip_if_no_network!();
    let server = MockServer::start().await;
    let fenced = format!("```json\n{}\n```", analysis_json("Fenced", 64));
    mount_openai_reply(&server, &fenced).await;

    let result = analyze(&api_config(&server, Provider::OpenAI), &query())
        .await
        .unwrap();
    assert_eq!(result.relationship, "Fenced");
}

#[tokio::test]
async fn prose_reply_becomes_unstructured_result() {
    crate::skip_if_no_network!();
    let server = MockServer::start().await;
    mount_gemini_reply(
        &server,
        "gemini-2.0-flash",
        "Light is reflected in consciousness as images.",
    )
    .await;

    let result = analyze(&api_config(&server, Provider::Gemini), &query())
        .await
        .unwrap();
    assert_eq!(result.relationship, UNSTRUCTURED_RELATIONSHIP);
    assert_eq!(result.explanation, "Light is reflected in consciousness as images.");
    assert_eq!(result.confidence.percent(), FALLBACK_CONFIDENCE);
}

#[tokio::test]
async fn http_statuses_map_to_banner_messages() {
    crate::skip_if_no_network!();
    let cases = [
        (401, API_KEY_ERROR_MESSAGE),
        (403, API_KEY_ERROR_MESSAGE),
        (429, QUOTA_ERROR_MESSAGE),
        (500, GENERIC_ERROR_MESSAGE),
        (400, GENERIC_ERROR_MESSAGE),
    ];

    for (status, expected) in cases {
        let server = MockServer::start().await;
        mount_error(&server, status, "upstream said no").await;

        let err = analyze(&api_config(&server, Provider::Gemini), &query())
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), expected, "status {status}");
    }
}

#[tokio::test]
async fn api_error_message_is_extracted_from_body() {
    crate::skip_if_no_network!();
    let server = MockServer::start().await;
    mount_error(&server, 500, "backend overloaded").await;

    let err = analyze(&api_config(&server, Provider::OpenAI), &query())
        .await
        .unwrap_err();
    match err {
        ProviderError::Api {
            provider,
            status,
            message,
        } => {
            assert_eq!(provider, Provider::OpenAI);
            assert_eq!(status, 500);
            assert_eq!(message, "backend overloaded");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn blocked_prompt_is_an_error() {
    crate::skip_if_no_network!();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "promptFeedback": { "blockReason": "SAFETY" }
        })))
        .mount(&server)
        .await;

    let err = analyze(&api_config(&server, Provider::Gemini), &query())
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::Blocked { ref reason, .. } if reason == "SAFETY"));
    assert_eq!(err.user_message(), GENERIC_ERROR_MESSAGE);
}
