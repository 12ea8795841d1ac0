// src/ai/risk.rs
//! Content-risk scan: flag spans of a draft script that could trip platform
//! compliance rules, with replacement suggestions. Offsets in highlights are
//! character offsets into the submitted text.

use serde::{Deserialize, Serialize};

use crate::ai::client::{ChatClient, ChatMessage};
use crate::ai::{json, AiError};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskHighlight {
    /// Exact substring of the input at [start, end).
    pub text: String,
    pub start: usize,
    pub end: usize,
    /// Risk category label, e.g. "compliance", "exaggeration".
    pub risk: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskSuggestion {
    pub target: String,
    pub candidates: Vec<String>,
    #[serde(default)]
    pub note: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RiskReport {
    #[serde(default)]
    pub highlights: Vec<RiskHighlight>,
    #[serde(default)]
    pub suggestions: Vec<RiskSuggestion>,
}

const SYSTEM_PROMPT: &str = r#"You are a compliance reviewer for short-video scripts. Identify risky spans in the script and suggest replacements.

Risk categories:
- compliance: wording that violates platform rules
- provocation: wording likely to start fights or pile-ons
- exaggeration: absolute or overblown claims
- vulgarity: crude or suggestive wording
- other: anything else worth a second look

Reply with JSON only, in this shape:
{
  "highlights": [
    {"text": "the risky span", "start": 0, "end": 0, "risk": "category"}
  ],
  "suggestions": [
    {"target": "the risky span", "candidates": ["replacement 1", "replacement 2"], "note": "why"}
  ]
}
"start" and "end" are character offsets into the script, and "text" must be the exact substring at those offsets."#;

pub async fn check_content_risk(
    client: &dyn ChatClient,
    content: &str,
) -> Result<RiskReport, AiError> {
    let user_prompt = format!("Review the following script for risky wording:\n\n{content}");
    let response = client
        .chat(&[
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(user_prompt),
        ])
        .await?;

    let report: RiskReport = json::parse_lenient(&response)?;
    tracing::debug!(
        highlights = report.highlights.len(),
        suggestions = report.suggestions.len(),
        "risk scan complete"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_offsets_address_the_input_text() {
        let input = "This is the absolute best show ever made.";
        let raw = r#"{
            "highlights": [
                {"text": "absolute best", "start": 12, "end": 25, "risk": "exaggeration"}
            ],
            "suggestions": [
                {"target": "absolute best", "candidates": ["one of the stronger"], "note": "soften the claim"}
            ]
        }"#;
        let report: RiskReport = serde_json::from_str(raw).unwrap();
        let h = &report.highlights[0];
        assert_eq!(&input[h.start..h.end], h.text);
    }

    #[test]
    fn empty_report_is_valid() {
        let report: RiskReport = serde_json::from_str("{}").unwrap();
        assert!(report.highlights.is_empty());
        assert!(report.suggestions.is_empty());
    }
}
