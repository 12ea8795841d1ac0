// src/ai/filter.rs
//! Semantic item filtering: hand the model a batch of item ids/titles and a
//! category label, get back the matching ids with a reason each. Lets a user
//! narrow a large list without reading every card.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::ai::client::{ChatClient, ChatMessage};
use crate::ai::{json, AiError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterItem {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FilterResult {
    pub filtered_ids: Vec<String>,
    #[serde(default)]
    pub reason_by_id: HashMap<String, String>,
}

const SYSTEM_PROMPT: &str = "You are a content curator for an entertainment \
short-video team. You will receive a JSON array of trending items and a \
category label. Select only the items that genuinely belong to the category; \
when unsure, leave the item out. Reply with JSON only.";

pub async fn filter_by_category(
    client: &dyn ChatClient,
    items: &[FilterItem],
    category: &str,
) -> Result<FilterResult, AiError> {
    let payload =
        serde_json::to_string_pretty(items).map_err(|e| AiError::Upstream(e.to_string()))?;
    let user_prompt = format!(
        "Select the items that belong to the category \"{category}\":\n\n\
         {payload}\n\n\
         Reply with JSON in this exact shape:\n\
         {{\"filteredIds\": [\"id1\", \"id2\"], \"reasonById\": {{\"id1\": \"reason\", \"id2\": \"reason\"}}}}"
    );

    let response = client
        .chat(&[
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(user_prompt),
        ])
        .await?;

    let result: FilterResult = json::parse_lenient(&response)?;
    tracing::debug!(
        selected = result.filtered_ids.len(),
        of = items.len(),
        category,
        "semantic filter complete"
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_deserializes_with_and_without_reasons() {
        let full: FilterResult = serde_json::from_str(
            r#"{"filteredIds": ["a"], "reasonById": {"a": "matches the category"}}"#,
        )
        .unwrap();
        assert_eq!(full.filtered_ids, vec!["a"]);
        assert_eq!(full.reason_by_id["a"], "matches the category");

        let bare: FilterResult = serde_json::from_str(r#"{"filteredIds": []}"#).unwrap();
        assert!(bare.filtered_ids.is_empty());
        assert!(bare.reason_by_id.is_empty());
    }
}
