//! Instruction prompt shared by every provider.

use mindmatter_types::AnalysisQuery;

/// Build the single-turn prompt for `query`.
///
/// The reply is requested as one JSON object whose keys mirror
/// [`mindmatter_types::AnalysisResult`].
#[must_use]
pub fn build_prompt(query: &AnalysisQuery) -> String {
    format!(
        "You are a lecturer in Marxist-Leninist philosophy explaining the dialectical \
relationship between matter and consciousness to students.\n\
\n\
Material phenomenon: \"{material}\"\n\
Consciousness phenomenon: \"{consciousness}\"\n\
\n\
Explain how the material phenomenon gives rise to, shapes, or is reflected in the \
consciousness phenomenon, and how consciousness can act back on matter where relevant. \
Ground the explanation in concrete science (physics, biology, neuroscience, psychology).\n\
\n\
Respond with exactly one JSON object and nothing else, using these keys:\n\
{{\n\
  \"relationship\": \"one-sentence summary of the relationship\",\n\
  \"explanation\": \"detailed explanation; bullet items may start with '* ' or '1. '\",\n\
  \"mechanism\": \"the scientific mechanism linking the two, or null\",\n\
  \"philosophy\": \"the dialectical-materialist interpretation, or null\",\n\
  \"confidence\": 0-100 integer for how direct and well-established the link is\n\
}}\n\
If the two phenomena are unrelated, say so in \"relationship\" and use a low confidence.",
        material = escape_quotes(query.material()),
        consciousness = escape_quotes(query.consciousness()),
    )
}

fn escape_quotes(input: &str) -> String {
    input.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::build_prompt;
    use mindmatter_types::AnalysisQuery;

    #[test]
    fn embeds_trimmed_inputs_and_requests_json() {
        let query = AnalysisQuery::new("  sunlight ", " warmth").unwrap();
        let prompt = build_prompt(&query);

        assert!(prompt.contains("Material phenomenon: \"sunlight\""));
        assert!(prompt.contains("Consciousness phenomenon: \"warmth\""));
        for key in ["relationship", "explanation", "mechanism", "philosophy", "confidence"] {
            assert!(prompt.contains(&format!("\"{key}\"")), "missing {key}");
        }
        assert!(prompt.contains("JSON"));
    }

    #[test]
    fn quotes_in_inputs_do_not_break_the_frame() {
        let query = AnalysisQuery::new("a \"loud\" bang", "fear").unwrap();
        let prompt = build_prompt(&query);
        assert!(prompt.contains(r#""a \"loud\" bang""#));
    }
}
