// src/api.rs
//! Public HTTP surface. Feed aggregation never 5xxs for upstream trouble;
//! AI endpoints propagate their failures because the caller has nothing to
//! fall back to.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use crate::aggregate::{Aggregator, HotPage, HotQuery, QueryError, SortBy};
use crate::ai::{filter::FilterItem, script::ScriptRequest, AiError, AiService};

#[derive(Clone)]
pub struct AppState {
    pub aggregator: Arc<Aggregator>,
    pub ai: Arc<AiService>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/api/hot-items", get(hot_items))
        .route("/api/refresh", post(refresh))
        .route("/api/ai/generate-topics", post(generate_topics))
        .route("/api/ai/generate-script", post(generate_script))
        .route("/api/topics/generate", post(topics_generate))
        .route("/api/topics/expand", post(topics_expand))
        .route("/api/writing/generate", post(writing_generate))
        .route("/api/ai/filter", post(ai_filter))
        .route("/api/ai/check-risk", post(check_risk))
        .route("/api/ai/web-search", post(web_search))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

type ApiError = (StatusCode, Json<ErrorBody>);

fn bad_request(msg: impl Into<String>) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody { error: msg.into() }),
    )
}

fn ai_error_response(err: AiError) -> ApiError {
    let status = match err {
        // Config failures are distinct: retrying cannot help.
        AiError::MissingKey(_) => StatusCode::SERVICE_UNAVAILABLE,
        AiError::Upstream(_) | AiError::Unparseable => StatusCode::BAD_GATEWAY,
    };
    tracing::warn!(error = %err, "ai endpoint failed");
    (
        status,
        Json(ErrorBody {
            error: err.to_string(),
        }),
    )
}

// ------------------------------------------------------------
// Feed aggregation
// ------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HotItemsParams {
    #[serde(default = "default_source")]
    source: String,
    #[serde(default)]
    search: Option<String>,
    #[serde(default)]
    sort_by: Option<SortBy>,
    #[serde(default = "default_page")]
    page: usize,
    #[serde(default = "default_page_size")]
    page_size: usize,
    #[serde(default)]
    force_refresh: bool,
}

fn default_source() -> String {
    "all".to_string()
}
fn default_page() -> usize {
    1
}
fn default_page_size() -> usize {
    60
}

async fn hot_items(
    State(state): State<AppState>,
    Query(params): Query<HotItemsParams>,
) -> Result<Json<HotPage>, ApiError> {
    let query = HotQuery {
        source: params.source,
        search: params.search,
        sort_by: params.sort_by.unwrap_or_default(),
        page: params.page,
        page_size: params.page_size,
        force_refresh: params.force_refresh,
    };
    state
        .aggregator
        .query(&query)
        .await
        .map(Json)
        .map_err(|e: QueryError| bad_request(e.to_string()))
}

#[derive(Serialize)]
struct RefreshOut {
    cleared: usize,
    keys: Vec<String>,
}

async fn refresh(State(state): State<AppState>) -> Json<RefreshOut> {
    let keys = state.aggregator.cache().keys();
    let cleared = state.aggregator.cache().invalidate_all();
    tracing::info!(cleared, "manual cache refresh");
    Json(RefreshOut { cleared, keys })
}

// ------------------------------------------------------------
// AI pipeline
// ------------------------------------------------------------

#[derive(Deserialize)]
struct TopicsReq {
    title: String,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    platform: Option<String>,
}

async fn generate_topics(
    State(state): State<AppState>,
    Json(body): Json<TopicsReq>,
) -> Result<Json<crate::ai::topics::TopicProposals>, ApiError> {
    if body.title.trim().is_empty() {
        return Err(bad_request("title must not be empty"));
    }
    state
        .ai
        .generate_topics(
            &body.title,
            body.summary.as_deref(),
            body.platform.as_deref(),
        )
        .await
        .map(Json)
        .map_err(ai_error_response)
}

async fn generate_script(
    State(state): State<AppState>,
    Json(body): Json<ScriptRequest>,
) -> Result<Json<crate::ai::script::ScriptOut>, ApiError> {
    if body.original_title.trim().is_empty() || body.selected_topic.trim().is_empty() {
        return Err(bad_request(
            "originalTitle and selectedTopic must not be empty",
        ));
    }
    state
        .ai
        .generate_script(&body)
        .await
        .map(Json)
        .map_err(ai_error_response)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TopicBatchReq {
    hot_items: Vec<crate::ai::topics::TopicSeed>,
    #[serde(default)]
    exclude_ids: Vec<String>,
    #[serde(default)]
    existing_topics: Vec<crate::ai::topics::Topic>,
}

async fn topics_generate(
    State(state): State<AppState>,
    Json(body): Json<TopicBatchReq>,
) -> Result<Json<crate::ai::topics::TopicBatch>, ApiError> {
    if body.hot_items.is_empty() {
        return Err(bad_request("hotItems must not be empty"));
    }
    state
        .ai
        .generate_topic_batch(&body.hot_items, &body.exclude_ids)
        .await
        .map(Json)
        .map_err(ai_error_response)
}

async fn topics_expand(
    State(state): State<AppState>,
    Json(body): Json<TopicBatchReq>,
) -> Result<Json<crate::ai::topics::TopicBatch>, ApiError> {
    if body.hot_items.is_empty() {
        return Err(bad_request("hotItems must not be empty"));
    }
    state
        .ai
        .expand_topic_batch(&body.hot_items, &body.exclude_ids, &body.existing_topics)
        .await
        .map(Json)
        .map_err(ai_error_response)
}

async fn writing_generate(
    State(state): State<AppState>,
    Json(body): Json<crate::ai::script::DraftRequest>,
) -> Result<Json<crate::ai::script::DraftOut>, ApiError> {
    if body.topic.title.trim().is_empty() || body.style.trim().is_empty() {
        return Err(bad_request("topic and style are required"));
    }
    state
        .ai
        .compose_draft(&body)
        .await
        .map(Json)
        .map_err(ai_error_response)
}

#[derive(Deserialize)]
struct FilterReq {
    items: Vec<FilterItem>,
    category: String,
}

async fn ai_filter(
    State(state): State<AppState>,
    Json(body): Json<FilterReq>,
) -> Result<Json<crate::ai::filter::FilterResult>, ApiError> {
    if body.items.is_empty() || body.category.trim().is_empty() {
        return Err(bad_request("items and category are required"));
    }
    state
        .ai
        .filter_by_category(&body.items, &body.category)
        .await
        .map(Json)
        .map_err(ai_error_response)
}

#[derive(Deserialize)]
struct RiskReq {
    content: String,
}

async fn check_risk(
    State(state): State<AppState>,
    Json(body): Json<RiskReq>,
) -> Result<Json<crate::ai::risk::RiskReport>, ApiError> {
    if body.content.trim().is_empty() {
        return Err(bad_request("content must not be empty"));
    }
    state
        .ai
        .check_content_risk(&body.content)
        .await
        .map(Json)
        .map_err(ai_error_response)
}

#[derive(Deserialize)]
struct SearchReq {
    query: String,
}

async fn web_search(
    State(state): State<AppState>,
    Json(body): Json<SearchReq>,
) -> Result<Json<crate::ai::search::SearchSummary>, ApiError> {
    if body.query.trim().is_empty() {
        return Err(bad_request("query must not be empty"));
    }
    state
        .ai
        .web_search_summary(&body.query)
        .await
        .map(Json)
        .map_err(ai_error_response)
}
