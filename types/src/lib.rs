//! Core domain types for mindmatter.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies.
//! Everything here can be used from any layer of the application:
//!
//! - [`cards`] - the static matter/consciousness deck and its match table
//! - [`game`] - the matching game state machine
//! - [`analysis`] - AI analysis inputs, results, history records and error text
//! - [`display`] - text shaping for explanations and feedback popups
//! - [`ui`] - view and option types shared by the engine and the TUI

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory
#![allow(clippy::missing_panics_doc)] // Panics are documented in assertions

pub mod analysis;
pub mod cards;
pub mod display;
pub mod game;
mod sanitize;
pub mod ui;

pub use analysis::{
    API_KEY_ERROR_MESSAGE, AnalysisField, AnalysisQuery, AnalysisRecord, AnalysisResult,
    Confidence, GENERIC_ERROR_MESSAGE, MIN_INPUT_CHARS, QUOTA_ERROR_MESSAGE, ValidationErrors,
    user_facing_error,
};
pub use cards::{
    ConsciousCard, ConsciousCardId, Deck, DeckError, MaterialCard, MaterialCardId, Pairing,
};
pub use display::{FeedbackSection, feedback_sections, format_display_text, is_detailed_feedback};
pub use game::{
    CardPicker, Feedback, FeedbackKind, GameError, GameState, GameStatus, MatchOutcome,
    POINTS_PER_MATCH,
};
pub use sanitize::sanitize_terminal_text;
pub use ui::{UiOptions, View};

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Provider Types
// ============================================================================

/// Generative AI backends the analysis screen can talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    Gemini,
    OpenAI,
}

const PROVIDER_PARSE_VALUES: &str = "gemini, google, openai, gpt";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown provider {value:?} (expected one of: {expected})")]
pub struct ProviderParseError {
    pub value: String,
    pub expected: &'static str,
}

impl Provider {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Gemini => "gemini",
            Provider::OpenAI => "openai",
        }
    }

    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            Provider::Gemini => "Google Gemini",
            Provider::OpenAI => "OpenAI",
        }
    }

    #[must_use]
    pub fn env_var(&self) -> &'static str {
        match self {
            Provider::Gemini => "GEMINI_API_KEY",
            Provider::OpenAI => "OPENAI_API_KEY",
        }
    }

    #[must_use]
    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::Gemini => "gemini-2.0-flash",
            Provider::OpenAI => "gpt-4o-mini",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ProviderParseError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" | "google" => Ok(Provider::Gemini),
            "openai" | "gpt" => Ok(Provider::OpenAI),
            _ => Err(ProviderParseError {
                value: s.trim().to_string(),
                expected: PROVIDER_PARSE_VALUES,
            }),
        }
    }

    #[must_use]
    pub fn all() -> &'static [Provider] {
        &[Provider::Gemini, Provider::OpenAI]
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Provider-scoped API key.
///
/// Holding the provider in the variant makes it impossible to send a Gemini
/// key to OpenAI or vice versa.
#[derive(Clone, PartialEq, Eq)]
pub enum ApiKey {
    Gemini(String),
    OpenAI(String),
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiKey::Gemini(_) => write!(f, "ApiKey::Gemini(<redacted>)"),
            ApiKey::OpenAI(_) => write!(f, "ApiKey::OpenAI(<redacted>)"),
        }
    }
}

impl ApiKey {
    #[must_use]
    pub fn new(provider: Provider, key: impl Into<String>) -> Self {
        match provider {
            Provider::Gemini => ApiKey::Gemini(key.into()),
            Provider::OpenAI => ApiKey::OpenAI(key.into()),
        }
    }

    #[must_use]
    pub fn provider(&self) -> Provider {
        match self {
            ApiKey::Gemini(_) => Provider::Gemini,
            ApiKey::OpenAI(_) => Provider::OpenAI,
        }
    }

    #[must_use]
    pub fn expose_secret(&self) -> &str {
        match self {
            ApiKey::Gemini(key) | ApiKey::OpenAI(key) => key,
        }
    }
}
