//! AI relationship analysis: validated inputs, parsed results, stored records,
//! and the mapping from raw failures to the text shown to the user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Provider;

/// Minimum length, in characters after trimming, of each analysis input.
pub const MIN_INPUT_CHARS: usize = 2;

pub const API_KEY_ERROR_MESSAGE: &str = "Invalid API key. Please check your configuration!";
pub const QUOTA_ERROR_MESSAGE: &str = "API quota exceeded. Please try again later!";
pub const GENERIC_ERROR_MESSAGE: &str =
    "Something went wrong during the analysis. Please try again!";

const MATERIAL_EMPTY: &str = "Please enter a material phenomenon";
const MATERIAL_SHORT: &str = "Material must be at least 2 characters";
const CONSCIOUSNESS_EMPTY: &str = "Please enter a consciousness phenomenon";
const CONSCIOUSNESS_SHORT: &str = "Consciousness must be at least 2 characters";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnalysisField {
    #[default]
    Material,
    Consciousness,
}

impl AnalysisField {
    #[must_use]
    pub fn other(self) -> Self {
        match self {
            Self::Material => Self::Consciousness,
            Self::Consciousness => Self::Material,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Material => "Material",
            Self::Consciousness => "Consciousness",
        }
    }
}

/// Per-field validation messages. Empty means the inputs are acceptable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ValidationErrors {
    pub material: Option<&'static str>,
    pub consciousness: Option<&'static str>,
}

impl ValidationErrors {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.material.is_none() && self.consciousness.is_none()
    }

    #[must_use]
    pub fn get(&self, field: AnalysisField) -> Option<&'static str> {
        match field {
            AnalysisField::Material => self.material,
            AnalysisField::Consciousness => self.consciousness,
        }
    }

    pub fn clear(&mut self, field: AnalysisField) {
        match field {
            AnalysisField::Material => self.material = None,
            AnalysisField::Consciousness => self.consciousness = None,
        }
    }
}

fn check_input(raw: &str, empty: &'static str, short: &'static str) -> Option<&'static str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        Some(empty)
    } else if trimmed.chars().count() < MIN_INPUT_CHARS {
        Some(short)
    } else {
        None
    }
}

/// A pair of trimmed inputs that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisQuery {
    material: String,
    consciousness: String,
}

impl AnalysisQuery {
    pub fn new(material: &str, consciousness: &str) -> Result<Self, ValidationErrors> {
        let errors = ValidationErrors {
            material: check_input(material, MATERIAL_EMPTY, MATERIAL_SHORT),
            consciousness: check_input(consciousness, CONSCIOUSNESS_EMPTY, CONSCIOUSNESS_SHORT),
        };
        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(Self {
            material: material.trim().to_string(),
            consciousness: consciousness.trim().to_string(),
        })
    }

    #[must_use]
    pub fn material(&self) -> &str {
        &self.material
    }

    #[must_use]
    pub fn consciousness(&self) -> &str {
        &self.consciousness
    }
}

/// Model confidence as a percentage, always within `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub struct Confidence(u8);

impl Confidence {
    pub const MAX: Confidence = Confidence(100);

    #[must_use]
    pub fn new(percent: u8) -> Self {
        Self(percent.min(100))
    }

    /// Clamp an arbitrary model-provided number; NaN becomes zero.
    #[must_use]
    pub fn from_f64(value: f64) -> Self {
        if value.is_nan() {
            return Self(0);
        }
        Self(value.round().clamp(0.0, 100.0) as u8)
    }

    #[must_use]
    pub fn percent(self) -> u8 {
        self.0
    }

    #[must_use]
    pub fn ratio(self) -> f64 {
        f64::from(self.0) / 100.0
    }
}

impl From<u8> for Confidence {
    fn from(value: u8) -> Self {
        Self::new(value)
    }
}

impl From<Confidence> for u8 {
    fn from(value: Confidence) -> Self {
        value.0
    }
}

/// Structured explanation returned by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub relationship: String,
    pub explanation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mechanism: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub philosophy: Option<String>,
    pub confidence: Confidence,
}

/// One stored query and its answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub id: Uuid,
    pub material: String,
    pub consciousness: String,
    pub result: AnalysisResult,
    pub provider: Provider,
    pub timestamp: DateTime<Utc>,
}

impl AnalysisRecord {
    #[must_use]
    pub fn new(query: &AnalysisQuery, result: AnalysisResult, provider: Provider) -> Self {
        Self {
            id: Uuid::new_v4(),
            material: query.material().to_string(),
            consciousness: query.consciousness().to_string(),
            result,
            provider,
            timestamp: Utc::now(),
        }
    }
}

/// Map a raw failure message to the text shown in the error banner.
#[must_use]
pub fn user_facing_error(raw: &str) -> &'static str {
    if raw.contains("API key") {
        API_KEY_ERROR_MESSAGE
    } else if raw.contains("quota") {
        QUOTA_ERROR_MESSAGE
    } else {
        GENERIC_ERROR_MESSAGE
    }
}
