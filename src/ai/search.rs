// src/ai/search.rs
//! Web-search grounding: short synthesized summary of recent results for a
//! query, used to feed current facts into script generation.

use serde::Serialize;

use crate::ai::client::BochaSearchClient;
use crate::ai::AiError;

#[derive(Debug, Clone, Serialize)]
pub struct SearchSummary {
    pub query: String,
    pub summary: String,
    pub results: Vec<serde_json::Value>,
}

pub async fn web_search_summary(
    client: &BochaSearchClient,
    query: &str,
) -> Result<SearchSummary, AiError> {
    let resp = client.web_search(query, 10).await?;
    Ok(SearchSummary {
        query: query.to_string(),
        summary: resp
            .summary
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| "No recent results found.".to_string()),
        results: resp.results,
    })
}
