//! Generative AI clients for the relationship analysis screen.
//!
//! # Architecture
//!
//! - [`analyze`] - single entry point: builds the prompt, dispatches to the
//!   configured provider, parses the reply into an [`AnalysisResult`]
//! - [`gemini`] - Google Gemini `generateContent`
//! - [`openai`] - OpenAI Responses API (non-streaming)
//! - [`prompt`] / [`parse`] - the provider-independent halves of a request
//!
//! # Configuration
//!
//! [`ApiConfig`] bundles the key, model, endpoint and timeout. The constructor
//! rejects a key that belongs to a different provider, and a base URL override
//! may only use plaintext HTTP for loopback hosts.
//!
//! # Errors
//!
//! Every failure is a [`ProviderError`]. Display text is phrased so that
//! [`mindmatter_types::user_facing_error`] recognises authentication problems
//! (the text mentions "API key") and rate limiting (the text mentions "quota").
//! There is no retry: one call, one answer.

use std::sync::OnceLock;
use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use thiserror::Error;

pub use mindmatter_types;
use mindmatter_types::{AnalysisQuery, AnalysisResult, ApiKey, Provider, user_facing_error};

pub mod gemini;
pub mod openai;
pub mod parse;
pub mod prompt;

/// Canonical OpenAI API base URL.
pub const OPENAI_API_BASE_URL: &str = "https://api.openai.com/v1";
/// Canonical Gemini API base URL.
pub const GEMINI_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

const CONNECT_TIMEOUT_SECS: u64 = 30;
const TCP_KEEPALIVE_SECS: u64 = 60;
const POOL_IDLE_TIMEOUT_SECS: u64 = 90;

const MAX_ERROR_BODY_BYTES: usize = 32 * 1024;
const MAX_ERROR_MESSAGE_CHARS: usize = 300;

pub fn http_client() -> &'static reqwest::Client {
    static CLIENT: OnceLock<reqwest::Client> = OnceLock::new();
    CLIENT.get_or_init(|| {
        base_client_builder().build().unwrap_or_else(|e| {
            tracing::error!(
                "Failed to build hardened HTTP client: {e}. Attempting minimal hardened fallback."
            );
            reqwest::Client::builder()
                .https_only(true)
                .redirect(reqwest::redirect::Policy::none())
                .build()
                .expect("Minimal hardened HTTP client must build; cannot proceed without TLS")
        })
    })
}

/// Client for `http://` base URLs that passed [`ApiConfig::with_base_url`].
fn loopback_http_client() -> &'static reqwest::Client {
    static CLIENT: OnceLock<reqwest::Client> = OnceLock::new();
    CLIENT.get_or_init(|| {
        base_client_builder()
            .https_only(false)
            .build()
            .unwrap_or_else(|e| {
                tracing::error!("Failed to build loopback HTTP client: {e}");
                reqwest::Client::new()
            })
    })
}

fn base_client_builder() -> reqwest::ClientBuilder {
    use reqwest::header::{HeaderMap, HeaderValue};

    let mut default_headers = HeaderMap::new();
    default_headers.insert(
        reqwest::header::USER_AGENT,
        HeaderValue::from_static(concat!("mindmatter/", env!("CARGO_PKG_VERSION"))),
    );

    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .redirect(reqwest::redirect::Policy::none())
        .https_only(true)
        .tcp_keepalive(Some(Duration::from_secs(TCP_KEEPALIVE_SECS)))
        .pool_idle_timeout(Some(Duration::from_secs(POOL_IDLE_TIMEOUT_SECS)))
        .default_headers(default_headers)
}

pub async fn read_capped_error_body(response: reqwest::Response) -> String {
    use futures_util::StreamExt;
    let mut body = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let Ok(chunk) = chunk else { break };
        body.extend_from_slice(&chunk);
        if body.len() > MAX_ERROR_BODY_BYTES {
            body.truncate(MAX_ERROR_BODY_BYTES);
            let text = String::from_utf8_lossy(&body);
            return format!("{text}...(truncated)");
        }
    }
    String::from_utf8_lossy(&body).into_owned()
}

/// Pull `error.message` out of a JSON error body; fall back to the raw text.
///
/// Gemini and OpenAI both wrap failures as `{"error": {"message": ...}}`.
fn extract_error_message(body: &str) -> String {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| {
            json.pointer("/error/message")
                .and_then(serde_json::Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string());
    if message.chars().count() > MAX_ERROR_MESSAGE_CHARS {
        let cut: String = message.chars().take(MAX_ERROR_MESSAGE_CHARS).collect();
        format!("{cut}...")
    } else {
        message
    }
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("no API key configured for {provider}; set {} or [api_keys] in config.toml", provider.env_var())]
    MissingApiKey { provider: Provider },
    #[error("{provider} rejected the API key (HTTP {status})")]
    Unauthorized { provider: Provider, status: u16 },
    #[error("{provider} quota exceeded (HTTP 429)")]
    RateLimited { provider: Provider },
    #[error("{provider} API error {status}: {message}")]
    Api {
        provider: Provider,
        status: u16,
        message: String,
    },
    #[error("{provider} did not answer within {}s", timeout.as_secs())]
    Timeout {
        provider: Provider,
        timeout: Duration,
    },
    #[error("request to {provider} failed: {source}")]
    Transport {
        provider: Provider,
        #[source]
        source: reqwest::Error,
    },
    #[error("{provider} returned no answer: {reason}")]
    Blocked { provider: Provider, reason: String },
    #[error("{provider} returned no text")]
    EmptyResponse { provider: Provider },
}

impl ProviderError {
    fn from_status(provider: Provider, status: u16, body: &str) -> Self {
        match status {
            401 | 403 => Self::Unauthorized { provider, status },
            429 => Self::RateLimited { provider },
            _ => Self::Api {
                provider,
                status,
                message: extract_error_message(body),
            },
        }
    }

    /// Text for the error banner.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        user_facing_error(&self.to_string())
    }
}

/// Key, model and endpoint for one provider.
///
/// ```rust
/// use std::time::Duration;
/// use mindmatter_providers::ApiConfig;
/// use mindmatter_types::{ApiKey, Provider};
///
/// let config = ApiConfig::new(ApiKey::new(Provider::Gemini, "test"), "gemini-2.0-flash")
///     .unwrap()
///     .with_timeout(Duration::from_secs(30));
/// assert_eq!(config.provider(), Provider::Gemini);
/// assert!(config.clone().with_base_url("http://example.com").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct ApiConfig {
    api_key: ApiKey,
    model: String,
    base_url: Option<String>,
    plaintext: bool,
    timeout: Duration,
}

#[derive(Debug, Error)]
pub enum ApiConfigError {
    #[error("API key provider {key:?} does not match model provider {model:?}")]
    ProviderMismatch { key: Provider, model: Provider },
    #[error("model name must not be empty")]
    EmptyModel,
    #[error("invalid base URL {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("plaintext base URL {url:?} is only allowed for loopback hosts")]
    InsecureBaseUrl { url: String },
}

impl ApiConfig {
    pub fn new(api_key: ApiKey, model: impl Into<String>) -> Result<Self, ApiConfigError> {
        let model = model.into().trim().to_string();
        if model.is_empty() {
            return Err(ApiConfigError::EmptyModel);
        }
        Ok(Self {
            api_key,
            model,
            base_url: None,
            plaintext: false,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Build for an explicit provider, rejecting a key issued for another one.
    pub fn for_provider(
        provider: Provider,
        api_key: ApiKey,
        model: impl Into<String>,
    ) -> Result<Self, ApiConfigError> {
        let key_provider = api_key.provider();
        if key_provider != provider {
            return Err(ApiConfigError::ProviderMismatch {
                key: key_provider,
                model: provider,
            });
        }
        Self::new(api_key, model)
    }

    /// Override the API base URL (no trailing slash needed).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Result<Self, ApiConfigError> {
        let url = url.into().trim().trim_end_matches('/').to_string();
        let parsed = reqwest::Url::parse(&url).map_err(|e| ApiConfigError::InvalidBaseUrl {
            url: url.clone(),
            reason: e.to_string(),
        })?;
        let plaintext = match parsed.scheme() {
            "https" => false,
            "http" if is_loopback_host(parsed.host_str()) => true,
            "http" => return Err(ApiConfigError::InsecureBaseUrl { url }),
            other => {
                return Err(ApiConfigError::InvalidBaseUrl {
                    url: url.clone(),
                    reason: format!("unsupported scheme {other:?}"),
                });
            }
        };
        self.base_url = Some(url);
        self.plaintext = plaintext;
        Ok(self)
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        if !timeout.is_zero() {
            self.timeout = timeout;
        }
        self
    }

    #[must_use]
    pub fn provider(&self) -> Provider {
        self.api_key.provider()
    }

    #[must_use]
    pub fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(match self.provider() {
            Provider::Gemini => GEMINI_API_BASE_URL,
            Provider::OpenAI => OPENAI_API_BASE_URL,
        })
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    fn client(&self) -> &'static reqwest::Client {
        if self.plaintext {
            loopback_http_client()
        } else {
            http_client()
        }
    }
}

fn is_loopback_host(host: Option<&str>) -> bool {
    matches!(host, Some("localhost" | "127.0.0.1" | "[::1]"))
}

/// Send a prepared request and decode a JSON success body.
pub(crate) async fn send_json<T: DeserializeOwned>(
    config: &ApiConfig,
    request: reqwest::RequestBuilder,
) -> Result<T, ProviderError> {
    let provider = config.provider();
    let transport = |source: reqwest::Error| {
        if source.is_timeout() {
            ProviderError::Timeout {
                provider,
                timeout: config.timeout(),
            }
        } else {
            ProviderError::Transport { provider, source }
        }
    };

    let response = request
        .timeout(config.timeout())
        .send()
        .await
        .map_err(transport)?;

    let status = response.status();
    if !status.is_success() {
        let body = read_capped_error_body(response).await;
        return Err(ProviderError::from_status(provider, status.as_u16(), &body));
    }

    response.json::<T>().await.map_err(transport)
}

/// Ask the configured provider how `query.material()` relates to
/// `query.consciousness()`.
///
/// Replies that are not valid JSON still succeed, as an unstructured result
/// (see [`parse::parse_analysis`]).
pub async fn analyze(
    config: &ApiConfig,
    query: &AnalysisQuery,
) -> Result<AnalysisResult, ProviderError> {
    let prompt = prompt::build_prompt(query);
    let started = Instant::now();

    let outcome = match config.provider() {
        Provider::Gemini => gemini::generate(config, &prompt).await,
        Provider::OpenAI => openai::generate(config, &prompt).await,
    };

    let elapsed_ms = started.elapsed().as_millis() as u64;
    match outcome {
        Ok(text) => {
            tracing::info!(
                provider = config.provider().as_str(),
                model = config.model(),
                elapsed_ms,
                response_chars = text.chars().count(),
                "Analysis completed"
            );
            Ok(parse::parse_analysis(&text))
        }
        Err(e) => {
            tracing::warn!(
                provider = config.provider().as_str(),
                model = config.model(),
                elapsed_ms,
                "Analysis failed: {e}"
            );
            Err(e)
        }
    }
}
