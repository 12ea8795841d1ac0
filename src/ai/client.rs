// src/ai/client.rs
//! Chat and search provider clients. Both chat upstreams speak the
//! OpenAI-compatible completions shape, so one client covers DeepSeek and
//! Qwen (DashScope compatible-mode); only endpoint, model, and key differ.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::ai::AiError;
use crate::config::{ENV_BOCHA_KEY, ENV_DASHSCOPE_KEY, ENV_DEEPSEEK_KEY};

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system",
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user",
            content: content.into(),
        }
    }
}

#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn chat(&self, messages: &[ChatMessage]) -> Result<String, AiError>;
    fn provider_name(&self) -> &'static str;
}

pub type DynChatClient = Arc<dyn ChatClient>;

pub struct OpenAiCompatClient {
    http: reqwest::Client,
    endpoint: &'static str,
    model: &'static str,
    api_key: Option<String>,
    key_var: &'static str,
    name: &'static str,
    temperature: f32,
    max_tokens: u32,
}

fn chat_http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(4))
        .timeout(Duration::from_secs(60))
        .build()
        .expect("reqwest client")
}

impl OpenAiCompatClient {
    pub fn deepseek(api_key: Option<String>) -> Self {
        Self {
            http: chat_http_client(),
            endpoint: "https://api.deepseek.com/chat/completions",
            model: "deepseek-chat",
            api_key,
            key_var: ENV_DEEPSEEK_KEY,
            name: "deepseek",
            temperature: 0.7,
            max_tokens: 1000,
        }
    }

    pub fn qwen(api_key: Option<String>) -> Self {
        Self {
            http: chat_http_client(),
            endpoint: "https://dashscope.aliyuncs.com/compatible-mode/v1/chat/completions",
            model: "qwen-flash",
            api_key,
            key_var: ENV_DASHSCOPE_KEY,
            name: "qwen",
            temperature: 0.7,
            max_tokens: 2000,
        }
    }

    pub fn with_sampling(mut self, temperature: f32, max_tokens: u32) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }
}

#[derive(Serialize)]
struct ChatReq<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResp {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMsg,
}

#[derive(Deserialize)]
struct ChoiceMsg {
    content: String,
}

#[async_trait]
impl ChatClient for OpenAiCompatClient {
    async fn chat(&self, messages: &[ChatMessage]) -> Result<String, AiError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or(AiError::MissingKey(self.key_var))?;

        let req = ChatReq {
            model: self.model,
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let resp = self
            .http
            .post(self.endpoint)
            .bearer_auth(key)
            .json(&req)
            .send()
            .await
            .map_err(|e| AiError::Upstream(format!("{}: {e}", self.name)))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let snippet: String = body.chars().take(200).collect();
            tracing::warn!(provider = self.name, %status, "chat upstream error");
            return Err(AiError::Upstream(format!(
                "{} returned {status}: {snippet}",
                self.name
            )));
        }

        let body: ChatResp = resp
            .json()
            .await
            .map_err(|e| AiError::Upstream(format!("{}: decoding response: {e}", self.name)))?;
        let content = body
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .unwrap_or_default();
        if content.is_empty() {
            return Err(AiError::Upstream(format!("{}: empty completion", self.name)));
        }
        Ok(content)
    }

    fn provider_name(&self) -> &'static str {
        self.name
    }
}

// ------------------------------------------------------------
// Bocha web search
// ------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub results: Vec<serde_json::Value>,
}

pub struct BochaSearchClient {
    http: reqwest::Client,
    api_key: Option<String>,
}

impl BochaSearchClient {
    const ENDPOINT: &'static str = "https://api.bochaai.com/v1/web-search";

    pub fn new(api_key: Option<String>) -> Self {
        Self {
            http: chat_http_client(),
            api_key,
        }
    }

    pub async fn web_search(&self, query: &str, count: u32) -> Result<SearchResponse, AiError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or(AiError::MissingKey(ENV_BOCHA_KEY))?;

        let resp = self
            .http
            .post(Self::ENDPOINT)
            .bearer_auth(key)
            .json(&serde_json::json!({
                "query": query,
                "summary": true,
                "count": count,
            }))
            .send()
            .await
            .map_err(|e| AiError::Upstream(format!("bocha: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            tracing::warn!(%status, "web search upstream error");
            return Err(AiError::Upstream(format!("bocha returned {status}")));
        }
        resp.json()
            .await
            .map_err(|e| AiError::Upstream(format!("bocha: decoding response: {e}")))
    }
}
