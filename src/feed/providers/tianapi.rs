// src/feed/providers/tianapi.rs
//! TianAPI hot-list adapter. Each channel is one endpoint returning a
//! `{code, result: {newslist}}` envelope that must validate before use. A
//! missing API key degrades the whole source to an empty contribution.

use std::sync::Arc;

use metrics::counter;
use serde::Deserialize;

use crate::feed::cache::{Clock, FeedCache};
use crate::feed::normalize_text;
use crate::feed::sample;
use crate::feed::transport::HttpFetch;
use crate::feed::types::{rfc3339_from_millis, HotItem, Platform};

pub const TIANAPI_BASE_URL: &str = "https://apis.tianapi.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Topnews,
    Entertainment,
    Esports,
    Anime,
}

impl Channel {
    pub fn path(&self) -> &'static str {
        match self {
            Channel::Topnews => "topnews",
            Channel::Entertainment => "huabian",
            Channel::Esports => "esports",
            Channel::Anime => "dongman",
        }
    }

    pub fn display(&self) -> &'static str {
        match self {
            Channel::Topnews => "TianAPI · Top News",
            Channel::Entertainment => "TianAPI · Entertainment",
            Channel::Esports => "TianAPI · Esports",
            Channel::Anime => "TianAPI · Anime",
        }
    }

    fn id_prefix(&self) -> &'static str {
        match self {
            Channel::Topnews => "tianapi_topnews",
            Channel::Entertainment => "tianapi_ent",
            Channel::Esports => "tianapi_esports",
            Channel::Anime => "tianapi_anime",
        }
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    code: i64,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    result: Option<NewsResult>,
}

#[derive(Debug, Deserialize)]
struct NewsResult {
    #[serde(default)]
    newslist: Vec<NewsEntry>,
}

#[derive(Debug, Deserialize)]
struct NewsEntry {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    digest: Option<String>,
    #[serde(default)]
    intro: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default, rename = "sourceUrl")]
    source_url: Option<String>,
    #[serde(default)]
    ctime: Option<String>,
    #[serde(default, rename = "publishTime")]
    publish_time: Option<String>,
}

pub struct TianApiProvider {
    fetch: Arc<dyn HttpFetch>,
    cache: Arc<FeedCache>,
    clock: Arc<dyn Clock>,
    api_key: Option<String>,
}

impl TianApiProvider {
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
        }
    }

    /// Fetch one channel. Returns empty on any upstream or shape failure; a
    /// targeted single-channel query has no sample fallback (the caller asked
    /// for exactly this list, an empty answer is meaningful).
    pub async fn fetch_channel(&self, channel: Channel, num: u32) -> Vec<HotItem> {
        let Some(key) = self.api_key.as_deref() else {
            tracing::warn!(channel = channel.path(), "TIANAPI_KEY not set, skipping");
            return Vec::new();
        };

        let cache_key = format!("tianapi_{}", channel.path());
        let now = self.clock.now_millis();
        if let Some(items) = self.cache.get(&cache_key, now) {
            counter!("feed_cache_hits_total").increment(1);
            return items;
        }

        let url = format!(
            "{TIANAPI_BASE_URL}/{}/index?key={key}&num={num}",
            channel.path()
        );
        let body = match self.fetch.get_text(&url, None).await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(error = ?e, channel = channel.path(), "tianapi fetch failed");
                counter!("feed_fetch_errors_total").increment(1);
                return Vec::new();
            }
        };

        let envelope: Envelope = match serde_json::from_str(&body) {
            Ok(env) => env,
            Err(e) => {
                tracing::warn!(error = ?e, channel = channel.path(), "tianapi shape error");
                counter!("feed_fetch_errors_total").increment(1);
                return Vec::new();
            }
        };
        if envelope.code != 200 {
            tracing::warn!(
                code = envelope.code,
                msg = envelope.msg.as_deref().unwrap_or(""),
                channel = channel.path(),
                "tianapi error code"
            );
            counter!("feed_fetch_errors_total").increment(1);
            return Vec::new();
        }

        let list = envelope.result.map(|r| r.newslist).unwrap_or_default();
        let now = self.clock.now_millis();
        let items = self.shape(channel, list, now);
        counter!("feed_items_total").increment(items.len() as u64);
        self.cache.put(&cache_key, items.clone(), now);
        items
    }

    fn shape(&self, channel: Channel, list: Vec<NewsEntry>, now_ms: u64) -> Vec<HotItem> {
        list.into_iter()
            .enumerate()
            .filter_map(|(idx, entry)| {
                let title = normalize_text(entry.title.as_deref().unwrap_or_default());
                if title.is_empty() {
                    return None;
                }
                let summary = entry
                    .digest
                    .or(entry.intro)
                    .or(entry.description)
                    .map(|s| normalize_text(&s))
                    .filter(|s| !s.is_empty());
                let link = entry
                    .url
                    .or(entry.source_url)
                    .filter(|s| !s.trim().is_empty());
                let pub_date = entry
                    .ctime
                    .or(entry.publish_time)
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or_else(|| rfc3339_from_millis(now_ms));
                Some(HotItem {
                    id: format!("{}_{now_ms}_{idx}", channel.id_prefix()),
                    title,
                    summary,
                    description: None,
                    link,
                    pub_date,
                    platform: Platform::Tianapi,
                    source_name: channel.display().to_string(),
                    score: None,
                })
            })
            .collect()
    }

    /// Default combined fetch: the esports and anime channels, queried
    /// concurrently as a pair. Falls back to the sample batch when both come
    /// back empty.
    pub async fn fetch_all(&self) -> Vec<HotItem> {
        // Missing key is a config gap, not an outage: contribute nothing
        // rather than samples.
        if self.api_key.is_none() {
            return Vec::new();
        }
        let (esports, anime) = tokio::join!(
            self.fetch_channel(Channel::Esports, 10),
            self.fetch_channel(Channel::Anime, 10)
        );

        let mut out = esports;
        out.extend(anime);
        if out.is_empty() {
            tracing::warn!("all tianapi channels failed, returning sample batch");
            return sample::tianapi_samples(self.clock.as_ref());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_drops_untitled_and_falls_back_through_summaries() {
        let list: Vec<NewsEntry> = serde_json::from_str(
            r#"[
                {"title": "A", "digest": "d", "url": "https://x/1", "ctime": "2024-08-05 10:00:00"},
                {"title": "B", "intro": "i"},
                {"title": "", "digest": "ignored"},
                {"description": "no title at all"}
            ]"#,
        )
        .unwrap();
        let provider_clockless_shape = |list| {
            // shape() only needs the channel and a timestamp
            let fetch: Arc<dyn HttpFetch> = Arc::new(NoFetch);
            let cache = Arc::new(FeedCache::new());
            let clock: Arc<dyn Clock> = Arc::new(crate::feed::cache::SystemClock);
            TianApiProvider::new(fetch, cache, clock, None).shape(Channel::Topnews, list, 42)
        };
        let items = provider_clockless_shape(list);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].summary.as_deref(), Some("d"));
        assert_eq!(items[0].pub_date, "2024-08-05 10:00:00");
        assert_eq!(items[1].summary.as_deref(), Some("i"));
        assert!(items[1].link.is_none());
        assert!(items[0].id.starts_with("tianapi_topnews_42_"));
    }

    struct NoFetch;

    #[async_trait::async_trait]
    impl HttpFetch for NoFetch {
        async fn get_text(&self, _url: &str, _auth: Option<&str>) -> anyhow::Result<String> {
            anyhow::bail!("no network in unit tests")
        }
    }
}
