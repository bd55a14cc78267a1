//! OpenAI Responses API client, non-streaming.
//!
//! The prompt goes in `input`; `text.format` asks for a JSON object so the
//! reply lands in [`crate::parse`] without chatter around it.

use serde_json::{Value, json};

use crate::{ApiConfig, ProviderError, send_json};

pub(crate) fn build_request_body(model: &str, prompt: &str) -> Value {
    json!({
        "model": model,
        "input": prompt,
        "store": false,
        "text": { "format": { "type": "json_object" } },
    })
}

mod typed {
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    pub(crate) struct Response {
        #[serde(default)]
        pub output: Vec<OutputItem>,
        pub incomplete_details: Option<IncompleteDetails>,
    }

    #[derive(Debug, Deserialize)]
    pub(crate) struct OutputItem {
        #[serde(rename = "type")]
        pub kind: String,
        #[serde(default)]
        pub content: Vec<ContentPart>,
    }

    #[derive(Debug, Deserialize)]
    pub(crate) struct ContentPart {
        #[serde(rename = "type")]
        pub kind: String,
        pub text: Option<String>,
        pub refusal: Option<String>,
    }

    #[derive(Debug, Deserialize)]
    pub(crate) struct IncompleteDetails {
        pub reason: Option<String>,
    }
}

fn response_text(response: typed::Response) -> Result<String, ProviderError> {
    let provider = mindmatter_types::Provider::OpenAI;
    let mut text = String::new();
    let mut refusal = None;

    for item in response.output.into_iter().filter(|item| item.kind == "message") {
        for part in item.content {
            match part.kind.as_str() {
                "output_text" => text.push_str(part.text.as_deref().unwrap_or_default()),
                "refusal" => refusal = part.refusal.or(part.text),
                _ => {}
            }
        }
    }

    if !text.trim().is_empty() {
        return Ok(text);
    }
    if let Some(reason) = refusal {
        return Err(ProviderError::Blocked { provider, reason });
    }
    if let Some(reason) = response.incomplete_details.and_then(|d| d.reason) {
        return Err(ProviderError::Blocked { provider, reason });
    }
    Err(ProviderError::EmptyResponse { provider })
}

pub async fn generate(config: &ApiConfig, prompt: &str) -> Result<String, ProviderError> {
    let url = format!("{}/responses", config.base_url());
    let request = config
        .client()
        .post(&url)
        .bearer_auth(config.api_key())
        .header("content-type", "application/json")
        .json(&build_request_body(config.model(), prompt));

    let response: typed::Response = send_json(config, request).await?;
    response_text(response)
}
