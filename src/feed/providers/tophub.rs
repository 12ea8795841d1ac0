// src/feed/providers/tophub.rs
//! TopHub trending-board adapter: three fixed boards queried sequentially
//! with a pacing delay and an Authorization header. The whole combined fetch
//! is cached under one key; sub-board selection happens downstream by id
//! prefix.

use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use serde::Deserialize;

use crate::feed::cache::{Clock, FeedCache};
use crate::feed::normalize_text;
use crate::feed::sample;
use crate::feed::transport::HttpFetch;
use crate::feed::types::{rfc3339_from_millis, HotItem, Platform};

pub const TOPHUB_BASE_URL: &str = "https://api.tophubdata.com";

/// Delay between consecutive board requests; the API rate-limits bursts.
pub const REQUEST_PACE: Duration = Duration::from_millis(600);

/// Entries kept per board.
const PER_BOARD_LIMIT: usize = 10;

pub const CACHE_KEY: &str = "tophub_all";

#[derive(Debug, Clone, Copy)]
pub struct Board {
    pub hashid: &'static str,
    pub name: &'static str,
    pub display: &'static str,
}

/// Fixed board order: Weibo → Douyin → Zhihu. Output concatenation follows
/// this order.
pub const BOARDS: &[Board] = &[
    Board {
        hashid: "KqndgxeLl9",
        name: "Weibo",
        display: "Hot Search",
    },
    Board {
        hashid: "DpQvNABoNE",
        name: "Douyin",
        display: "Trending",
    },
    Board {
        hashid: "mproPpoq6O",
        name: "Zhihu",
        display: "Trending",
    },
];

pub fn board_by_name(name: &str) -> Option<&'static Board> {
    BOARDS.iter().find(|b| b.name.eq_ignore_ascii_case(name))
}

#[derive(Debug, Deserialize)]
struct NodeEnvelope {
    #[serde(default)]
    error: Option<serde_json::Value>,
    #[serde(default)]
    data: Option<NodeData>,
}

#[derive(Debug, Deserialize)]
struct NodeData {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    display: Option<String>,
    #[serde(default)]
    items: Option<Vec<NodeItem>>,
}

#[derive(Debug, Deserialize)]
struct NodeItem {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    url: Option<String>,
    /// Raw heat string, e.g. "455万热度".
    #[serde(default)]
    extra: Option<String>,
}

/// Parse a heat string like "455万热度" or "1.2亿" into a number. Returns
/// None when there is no leading numeric part.
pub fn parse_hot_value(extra: &str) -> Option<u64> {
    let s = extra.trim();
    let end = s
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit() && *c != '.')
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    let num: f64 = s[..end].parse().ok()?;
    let rest = &s[end..];
    let mult = if rest.starts_with('亿') {
        100_000_000.0
    } else if rest.starts_with('万') {
        10_000.0
    } else {
        1.0
    };
    Some((num * mult).round() as u64)
}

pub struct TopHubProvider {
    fetch: Arc<dyn HttpFetch>,
    cache: Arc<FeedCache>,
    clock: Arc<dyn Clock>,
    api_key: Option<String>,
    pace: Duration,
}

impl TopHubProvider {
    pub fn new(
        fetch: Arc<dyn HttpFetch>,
        cache: Arc<FeedCache>,
        clock: Arc<dyn Clock>,
        api_key: Option<String>,
    ) -> Self {
        Self {
            fetch,
            cache,
            clock,
            api_key,
            pace: REQUEST_PACE,
        }
    }

    /// Test hook: remove or shorten the pacing delay.
    pub fn with_pace(mut self, pace: Duration) -> Self {
        self.pace = pace;
        self
    }

    async fn fetch_board(&self, board: &Board) -> Option<(NodeData, Vec<NodeItem>)> {
        let key = self.api_key.as_deref()?;
        let url = format!("{TOPHUB_BASE_URL}/nodes/{}", board.hashid);
        let body = match self.fetch.get_text(&url, Some(key)).await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(error = ?e, board = board.name, "tophub fetch failed");
                counter!("feed_fetch_errors_total").increment(1);
                return None;
            }
        };
        let env: NodeEnvelope = match serde_json::from_str(&body) {
            Ok(env) => env,
            Err(e) => {
                tracing::warn!(error = ?e, board = board.name, "tophub shape error");
                counter!("feed_fetch_errors_total").increment(1);
                return None;
            }
        };
        if env.error.is_some() {
            tracing::warn!(board = board.name, "tophub returned error payload");
            counter!("feed_fetch_errors_total").increment(1);
            return None;
        }
        let mut data = env.data?;
        let items = data.items.take()?;
        if items.is_empty() {
            return None;
        }
        Some((data, items))
    }

    fn shape(&self, board: &Board, data: &NodeData, items: Vec<NodeItem>, now_ms: u64) -> Vec<HotItem> {
        let name = data.name.as_deref().filter(|s| !s.is_empty()).unwrap_or(board.name);
        let display = data
            .display
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(board.display);
        let source_name = format!("{name} · {display}");

        items
            .into_iter()
            .take(PER_BOARD_LIMIT)
            .enumerate()
            .filter_map(|(idx, it)| {
                let title = normalize_text(it.title.as_deref().unwrap_or_default());
                if title.is_empty() {
                    return None;
                }
                Some(HotItem {
                    id: format!("tophub_{}_{idx}_{now_ms}", board.hashid),
                    title,
                    summary: it
                        .description
                        .map(|s| normalize_text(&s))
                        .filter(|s| !s.is_empty()),
                    description: None,
                    link: it.url.filter(|s| !s.trim().is_empty()),
                    pub_date: rfc3339_from_millis(now_ms),
                    platform: Platform::Tophub,
                    source_name: source_name.clone(),
                    score: it.extra.as_deref().and_then(parse_hot_value),
                })
            })
            .collect()
    }

    /// Fetch all boards in declared order. The combined batch is cached as a
    /// whole; when every board fails the built-in sample batch is returned.
    pub async fn fetch_all(&self) -> Vec<HotItem> {
        // Missing key is a config gap, not an outage: contribute nothing
        // rather than samples.
        if self.api_key.is_none() {
            tracing::warn!("TOPHUB_API_KEY not set, skipping");
            return Vec::new();
        }

        let now = self.clock.now_millis();
        if let Some(items) = self.cache.get(CACHE_KEY, now) {
            counter!("feed_cache_hits_total").increment(1);
            return items;
        }

        let mut out: Vec<HotItem> = Vec::new();
        for (i, board) in BOARDS.iter().enumerate() {
            if let Some((data, items)) = self.fetch_board(board).await {
                let now = self.clock.now_millis();
                let shaped = self.shape(board, &data, items, now);
                counter!("feed_items_total").increment(shaped.len() as u64);
                out.extend(shaped);
            } else {
                tracing::warn!(board = board.name, "skipping board (failed or empty)");
            }
            if i + 1 < BOARDS.len() && !self.pace.is_zero() {
                tokio::time::sleep(self.pace).await;
            }
        }

        if out.is_empty() {
            tracing::warn!("all tophub boards failed, returning sample batch");
            return sample::tophub_samples(self.clock.as_ref());
        }

        self.cache.put(CACHE_KEY, out.clone(), self.clock.now_millis());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hot_value_parses_common_shapes() {
        assert_eq!(parse_hot_value("455万热度"), Some(4_550_000));
        assert_eq!(parse_hot_value("1.2亿"), Some(120_000_000));
        assert_eq!(parse_hot_value("8931"), Some(8931));
        assert_eq!(parse_hot_value("热度"), None);
        assert_eq!(parse_hot_value(""), None);
    }
}
