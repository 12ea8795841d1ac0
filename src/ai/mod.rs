// src/ai/mod.rs
//! External AI collaborator boundary. Every operation here is a stateless
//! request/response pair against an opaque text-generation or search
//! provider; failures always propagate to the caller, because unlike the
//! feed layer there is no fallback data to fall back to.

pub mod client;
pub mod filter;
pub mod json;
pub mod risk;
pub mod script;
pub mod search;
pub mod topics;

use std::sync::Arc;

use thiserror::Error;

use crate::config::Secrets;
use client::{BochaSearchClient, DynChatClient, OpenAiCompatClient};

#[derive(Debug, Error)]
pub enum AiError {
    /// Configuration failure: retrying cannot help, surfaced distinctly.
    #[error("missing API key: set {0}")]
    MissingKey(&'static str),
    #[error("upstream AI call failed: {0}")]
    Upstream(String),
    /// Expected JSON that neither strict parsing nor brace extraction could
    /// recover.
    #[error("unparseable AI response")]
    Unparseable,
}

/// One shared handle over the configured AI providers. DeepSeek drives
/// generation (topics use a hotter sampling profile than scripts), Qwen
/// drives review-style calls (semantic filter, risk scan), Bocha drives web
/// search.
pub struct AiService {
    topics_client: DynChatClient,
    script_client: DynChatClient,
    review_client: DynChatClient,
    search_client: BochaSearchClient,
}

impl AiService {
    pub fn from_secrets(secrets: &Secrets) -> Self {
        Self {
            topics_client: Arc::new(
                OpenAiCompatClient::deepseek(secrets.deepseek_key.clone()).with_sampling(0.8, 1000),
            ),
            script_client: Arc::new(OpenAiCompatClient::deepseek(secrets.deepseek_key.clone())),
            review_client: Arc::new(OpenAiCompatClient::qwen(secrets.qwen_key.clone())),
            search_client: BochaSearchClient::new(secrets.bocha_key.clone()),
        }
    }

    /// Assembly seam for tests: inject stub clients.
    pub fn new(
        topics_client: DynChatClient,
        script_client: DynChatClient,
        review_client: DynChatClient,
        search_client: BochaSearchClient,
    ) -> Self {
        Self {
            topics_client,
            script_client,
            review_client,
            search_client,
        }
    }

    pub async fn generate_topics(
        &self,
        title: &str,
        summary: Option<&str>,
        platform: Option<&str>,
    ) -> Result<topics::TopicProposals, AiError> {
        topics::generate_topics(self.topics_client.as_ref(), title, summary, platform).await
    }

    pub async fn generate_topic_batch(
        &self,
        items: &[topics::TopicSeed],
        exclude_ids: &[String],
    ) -> Result<topics::TopicBatch, AiError> {
        topics::generate_topic_batch(self.review_client.as_ref(), items, exclude_ids).await
    }

    pub async fn expand_topic_batch(
        &self,
        items: &[topics::TopicSeed],
        exclude_ids: &[String],
        existing: &[topics::Topic],
    ) -> Result<topics::TopicBatch, AiError> {
        topics::expand_topic_batch(self.review_client.as_ref(), items, exclude_ids, existing).await
    }

    pub async fn compose_draft(
        &self,
        req: &script::DraftRequest,
    ) -> Result<script::DraftOut, AiError> {
        script::compose_draft(self.script_client.as_ref(), &self.search_client, req).await
    }

    pub async fn generate_script(
        &self,
        req: &script::ScriptRequest,
    ) -> Result<script::ScriptOut, AiError> {
        script::generate_script(self.script_client.as_ref(), req).await
    }

    pub async fn filter_by_category(
        &self,
        items: &[filter::FilterItem],
        category: &str,
    ) -> Result<filter::FilterResult, AiError> {
        filter::filter_by_category(self.review_client.as_ref(), items, category).await
    }

    pub async fn check_content_risk(&self, content: &str) -> Result<risk::RiskReport, AiError> {
        risk::check_content_risk(self.review_client.as_ref(), content).await
    }

    pub async fn web_search_summary(
        &self,
        query: &str,
    ) -> Result<search::SearchSummary, AiError> {
        search::web_search_summary(&self.search_client, query).await
    }
}
