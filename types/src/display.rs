//! Text shaping for model explanations and game feedback.

use std::sync::LazyLock;

use regex::Regex;

static BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*([^*]+)\*\*").expect("bold pattern is valid"));

// Start of a `* ` bullet or `1. ` numbered item, at the beginning of the text
// or after whitespace. Group 1 is where the cut goes.
static ITEM_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\s)(\*\s|\d+\.\s)").expect("list item pattern is valid")
});

/// Reflow model output for a narrow panel.
///
/// Bullet and numbered items are split onto their own paragraphs, `**bold**`
/// markers are dropped and `* ` bullets become `• `.
#[must_use]
pub fn format_display_text(text: &str) -> String {
    if text.trim().is_empty() {
        return String::new();
    }

    let text = BOLD.replace_all(text, "$1");
    let mut cuts = vec![0];
    cuts.extend(
        ITEM_START
            .captures_iter(&text)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.start()),
    );
    cuts.push(text.len());
    cuts.dedup();

    cuts.windows(2)
        .map(|w| text[w[0]..w[1]].trim())
        .filter(|section| !section.is_empty())
        .map(|section| match section.strip_prefix('*') {
            Some(rest) if rest.starts_with(char::is_whitespace) => {
                format!("• {}", rest.trim_start())
            }
            _ => section.to_string(),
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// One paragraph of a match feedback message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackSection<'a> {
    Headline(&'a str),
    Material(&'a str),
    Consciousness(&'a str),
    Interaction(&'a str),
    Plain(&'a str),
}

/// Whether a feedback message carries the per-side explanation blocks.
#[must_use]
pub fn is_detailed_feedback(message: &str) -> bool {
    message.contains('🔬') || message.contains('🧠')
}

/// Split a feedback message into labelled paragraphs, stripping the markers.
#[must_use]
pub fn feedback_sections(message: &str) -> Vec<FeedbackSection<'_>> {
    message
        .split("\n\n")
        .map(str::trim)
        .filter(|section| !section.is_empty())
        .map(|section| {
            if section.starts_with('🎉') {
                FeedbackSection::Headline(section)
            } else if let Some(rest) = section.strip_prefix('🔬') {
                FeedbackSection::Material(rest.trim_start())
            } else if let Some(rest) = section.strip_prefix('🧠') {
                FeedbackSection::Consciousness(rest.trim_start())
            } else if let Some(rest) = section.strip_prefix('⚡') {
                let rest = rest.trim_start();
                FeedbackSection::Interaction(rest.strip_prefix("Interaction:").unwrap_or(rest).trim_start())
            } else {
                FeedbackSection::Plain(section)
            }
        })
        .collect()
}
