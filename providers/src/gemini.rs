//! Google Gemini `generateContent` client.

use serde_json::{Value, json};

use crate::{ApiConfig, ProviderError, send_json};

const TEMPERATURE: f64 = 0.7;

pub(crate) fn build_request_body(prompt: &str) -> Value {
    json!({
        "contents": [{
            "role": "user",
            "parts": [{ "text": prompt }],
        }],
        "generationConfig": {
            "temperature": TEMPERATURE,
            "responseMimeType": "application/json",
        },
    })
}

mod typed {
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub(crate) struct Response {
        #[serde(default)]
        pub candidates: Vec<Candidate>,
        pub prompt_feedback: Option<PromptFeedback>,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub(crate) struct Candidate {
        pub content: Option<Content>,
        pub finish_reason: Option<String>,
    }

    #[derive(Debug, Deserialize)]
    pub(crate) struct Content {
        #[serde(default)]
        pub parts: Vec<Part>,
    }

    #[derive(Debug, Deserialize)]
    pub(crate) struct Part {
        pub text: Option<String>,
        #[serde(default)]
        pub thought: bool,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub(crate) struct PromptFeedback {
        pub block_reason: Option<String>,
    }
}

/// Concatenate the text parts of the first candidate, skipping thoughts.
fn response_text(response: typed::Response) -> Result<String, ProviderError> {
    let provider = mindmatter_types::Provider::Gemini;

    if let Some(reason) = response
        .prompt_feedback
        .and_then(|feedback| feedback.block_reason)
    {
        return Err(ProviderError::Blocked { provider, reason });
    }

    let Some(candidate) = response.candidates.into_iter().next() else {
        return Err(ProviderError::EmptyResponse { provider });
    };

    let text: String = candidate
        .content
        .map(|content| content.parts)
        .unwrap_or_default()
        .into_iter()
        .filter(|part| !part.thought)
        .filter_map(|part| part.text)
        .collect();

    if text.trim().is_empty() {
        if let Some(reason) = candidate
            .finish_reason
            .filter(|reason| reason != "STOP")
        {
            return Err(ProviderError::Blocked { provider, reason });
        }
        return Err(ProviderError::EmptyResponse { provider });
    }
    Ok(text)
}

pub async fn generate(config: &ApiConfig, prompt: &str) -> Result<String, ProviderError> {
    let url = format!(
        "{}/models/{}:generateContent",
        config.base_url(),
        config.model()
    );
    let request = config
        .client()
        .post(&url)
        .header("x-goog-api-key", config.api_key())
        .header("content-type", "application/json")
        .json(&build_request_body(prompt));

    let response: typed::Response = send_json(config, request).await?;
    response_text(response)
}

#[cfg(test)]
mod tests {
    use super::{build_request_body, response_text, typed};
    use crate::ProviderError;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> typed::Response {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn request_body_carries_prompt_and_json_mime_type() {
        let body = build_request_body("hello");
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "hello");
        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            "application/json"
        );
    }

    #[test]
    fn joins_text_parts_and_skips_thoughts() {
        let response = parse(json!({
            "candidates": [{
                "content": { "parts": [
                    { "text": "thinking...", "thought": true },
                    { "text": "{\"a\":" },
                    { "text": "1}" }
                ]},
                "finishReason": "STOP"
            }]
        }));
        assert_eq!(response_text(response).unwrap(), "{\"a\":1}");
    }

    #[test]
    fn blocked_prompt_is_an_error() {
        let response = parse(json!({ "promptFeedback": { "blockReason": "SAFETY" } }));
        assert!(matches!(
            response_text(response),
            Err(ProviderError::Blocked { reason, .. }) if reason == "SAFETY"
        ));
    }

    #[test]
    fn empty_candidates_is_an_error() {
        let response = parse(json!({ "candidates": [] }));
        assert!(matches!(
            response_text(response),
            Err(ProviderError::EmptyResponse { .. })
        ));

        let response = parse(json!({
            "candidates": [{ "content": { "parts": [] }, "finishReason": "STOP" }]
        }));
        assert!(matches!(
            response_text(response),
            Err(ProviderError::EmptyResponse { .. })
        ));
    }

    #[test]
    fn non_stop_finish_without_text_reports_reason() {
        let response = parse(json!({
            "candidates": [{ "finishReason": "RECITATION" }]
        }));
        assert!(matches!(
            response_text(response),
            Err(ProviderError::Blocked { reason, .. }) if reason == "RECITATION"
        ));
    }
}
