//! Turn free-form model text into an [`AnalysisResult`].
//!
//! Models wrap JSON in code fences, prepend chatter, or ignore the format
//! entirely. The outermost `{...}` is tried first; anything that does not
//! yield both a relationship and an explanation becomes an unstructured
//! result holding the raw text.

use serde::Deserialize;
use serde_json::Value;

use mindmatter_types::{AnalysisResult, Confidence};

/// Confidence assigned when the reply could not be parsed or omits it.
pub const FALLBACK_CONFIDENCE: u8 = 50;

pub const UNSTRUCTURED_RELATIONSHIP: &str = "Unstructured analysis";

#[derive(Debug, Default, Deserialize)]
struct RawAnalysis {
    relationship: Option<String>,
    explanation: Option<String>,
    mechanism: Option<String>,
    philosophy: Option<String>,
    confidence: Option<Value>,
}

#[must_use]
pub fn parse_analysis(text: &str) -> AnalysisResult {
    let body = strip_code_fences(text);
    outermost_object(body)
        .and_then(|json| serde_json::from_str::<RawAnalysis>(json).ok())
        .and_then(into_result)
        .unwrap_or_else(|| {
            tracing::debug!("Model reply was not structured JSON; using raw text");
            unstructured(text)
        })
}

fn into_result(raw: RawAnalysis) -> Option<AnalysisResult> {
    let relationship = non_empty(raw.relationship)?;
    let explanation = non_empty(raw.explanation)?;
    Some(AnalysisResult {
        relationship,
        explanation,
        mechanism: non_empty(raw.mechanism),
        philosophy: non_empty(raw.philosophy),
        confidence: raw
            .confidence
            .as_ref()
            .and_then(confidence_value)
            .unwrap_or(Confidence::new(FALLBACK_CONFIDENCE)),
    })
}

fn unstructured(text: &str) -> AnalysisResult {
    AnalysisResult {
        relationship: UNSTRUCTURED_RELATIONSHIP.to_string(),
        explanation: text.trim().to_string(),
        mechanism: None,
        philosophy: None,
        confidence: Confidence::new(FALLBACK_CONFIDENCE),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Accepts `85`, `"85"` and `"85%"`. Values are percentages, not ratios.
fn confidence_value(value: &Value) -> Option<Confidence> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok()?,
        _ => return None,
    };
    Some(Confidence::from_f64(number))
}

/// Drop a leading ```` ```lang ```` line and a trailing ```` ``` ````.
fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.split_once('\n').map_or("", |(_, body)| body);
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

fn outermost_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

#[cfg(test)]
mod tests {
    use super::{
        FALLBACK_CONFIDENCE, UNSTRUCTURED_RELATIONSHIP, outermost_object, parse_analysis,
        strip_code_fences,
    };

    #[test]
    fn parses_plain_json() {
        let result = parse_analysis(
            r#"{"relationship":"Light causes warmth","explanation":"Photons heat skin.","mechanism":"Thermoreceptors","philosophy":"Matter is primary","confidence":92}"#,
        );
        assert_eq!(result.relationship, "Light causes warmth");
        assert_eq!(result.explanation, "Photons heat skin.");
        assert_eq!(result.mechanism.as_deref(), Some("Thermoreceptors"));
        assert_eq!(result.philosophy.as_deref(), Some("Matter is primary"));
        assert_eq!(result.confidence.percent(), 92);
    }

    #[test]
    fn strips_fences_and_surrounding_chatter() {
        let text = "```json\nHere you go: {\"relationship\":\"r\",\"explanation\":\"e\",\"confidence\":\"75%\"} hope it helps\n```";
        let result = parse_analysis(text);
        assert_eq!(result.relationship, "r");
        assert_eq!(result.confidence.percent(), 75);
        assert!(result.mechanism.is_none());
    }

    #[test]
    fn clamps_out_of_range_confidence() {
        let high = parse_analysis(r#"{"relationship":"r","explanation":"e","confidence":150}"#);
        assert_eq!(high.confidence.percent(), 100);
        let low = parse_analysis(r#"{"relationship":"r","explanation":"e","confidence":-4}"#);
        assert_eq!(low.confidence.percent(), 0);
    }

    #[test]
    fn missing_confidence_uses_fallback() {
        let result = parse_analysis(r#"{"relationship":"r","explanation":"e"}"#);
        assert_eq!(result.confidence.percent(), FALLBACK_CONFIDENCE);
    }

    #[test]
    fn empty_optional_sections_become_none() {
        let result = parse_analysis(
            r#"{"relationship":"r","explanation":"e","mechanism":"  ","philosophy":null}"#,
        );
        assert!(result.mechanism.is_none());
        assert!(result.philosophy.is_none());
    }

    #[test]
    fn non_json_reply_becomes_unstructured() {
        let result = parse_analysis("  Matter shapes mind because brains are matter.  ");
        assert_eq!(result.relationship, UNSTRUCTURED_RELATIONSHIP);
        assert_eq!(
            result.explanation,
            "Matter shapes mind because brains are matter."
        );
        assert_eq!(result.confidence.percent(), FALLBACK_CONFIDENCE);
    }

    #[test]
    fn json_without_required_fields_becomes_unstructured() {
        let text = r#"{"relationship":"only this"}"#;
        let result = parse_analysis(text);
        assert_eq!(result.relationship, UNSTRUCTURED_RELATIONSHIP);
        assert_eq!(result.explanation, text);
    }

    #[test]
    fn fence_helpers() {
        assert_eq!(strip_code_fences("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fences(" {} "), "{}");
        assert_eq!(outermost_object("a {b {c}} d"), Some("{b {c}}"));
        assert_eq!(outermost_object("} {"), None);
    }
}
