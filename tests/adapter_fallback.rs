// tests/adapter_fallback.rs
//
// Adapter degradation contract: a dead upstream never aborts a batch, total
// failure yields the documented sample set, and a missing API key yields
// nothing at all.

use std::sync::Arc;
use std::time::Duration;

use anyhow::bail;
use async_trait::async_trait;

use trendcast::feed::cache::{Clock, FeedCache, SystemClock};
use trendcast::feed::providers::rsshub::RsshubProvider;
use trendcast::feed::providers::tianapi::TianApiProvider;
use trendcast::feed::providers::tophub::TopHubProvider;
use trendcast::feed::sample::{RSS_SAMPLE_LEN, TIANAPI_SAMPLE_LEN, TOPHUB_SAMPLE_LEN};
use trendcast::feed::transport::HttpFetch;

struct FailFetch;

#[async_trait]
impl HttpFetch for FailFetch {
    async fn get_text(&self, url: &str, _auth: Option<&str>) -> anyhow::Result<String> {
        bail!("connection refused: {url}")
    }
}

/// Serves a canned body for urls containing a marker, fails everything else.
struct PartialFetch {
    marker: &'static str,
    body: &'static str,
}

#[async_trait]
impl HttpFetch for PartialFetch {
    async fn get_text(&self, url: &str, _auth: Option<&str>) -> anyhow::Result<String> {
        if url.contains(self.marker) {
            Ok(self.body.to_string())
        } else {
            bail!("simulated outage: {url}")
        }
    }
}

fn clock() -> Arc<dyn Clock> {
    Arc::new(SystemClock)
}

#[tokio::test]
async fn tophub_total_failure_returns_sample_batch() {
    let provider = TopHubProvider::new(
        Arc::new(FailFetch),
        Arc::new(FeedCache::new()),
        clock(),
        Some("test-key".into()),
    )
    .with_pace(Duration::ZERO);

    let items = provider.fetch_all().await;
    assert_eq!(items.len(), TOPHUB_SAMPLE_LEN);
    assert!(items.iter().all(|it| it.id.starts_with("sample_tophub_")));
}

#[tokio::test]
async fn tophub_partial_failure_keeps_surviving_board_only() {
    let body = r#"{
        "data": {
            "name": "微博",
            "display": "热搜榜",
            "items": [
                {"title": "one", "url": "https://x/1", "extra": "12万热度"},
                {"title": "two", "url": "https://x/2"}
            ]
        }
    }"#;
    let provider = TopHubProvider::new(
        Arc::new(PartialFetch {
            marker: "KqndgxeLl9",
            body,
        }),
        Arc::new(FeedCache::new()),
        clock(),
        Some("test-key".into()),
    )
    .with_pace(Duration::ZERO);

    let items = provider.fetch_all().await;
    assert_eq!(items.len(), 2, "no samples mixed into a partial success");
    assert!(items.iter().all(|it| it.id.starts_with("tophub_KqndgxeLl9_")));
    assert_eq!(items[0].source_name, "微博 · 热搜榜");
    assert_eq!(items[0].score, Some(120_000));
    assert_eq!(items[1].score, None);
}

#[tokio::test]
async fn tophub_missing_key_contributes_nothing() {
    let provider = TopHubProvider::new(
        Arc::new(FailFetch),
        Arc::new(FeedCache::new()),
        clock(),
        None,
    )
    .with_pace(Duration::ZERO);
    assert!(provider.fetch_all().await.is_empty());
}

#[tokio::test]
async fn tianapi_total_failure_returns_sample_batch() {
    let provider = TianApiProvider::new(
        Arc::new(FailFetch),
        Arc::new(FeedCache::new()),
        clock(),
        Some("test-key".into()),
    );
    let items = provider.fetch_all().await;
    assert_eq!(items.len(), TIANAPI_SAMPLE_LEN);
}

#[tokio::test]
async fn tianapi_missing_key_contributes_nothing() {
    let provider = TianApiProvider::new(
        Arc::new(FailFetch),
        Arc::new(FeedCache::new()),
        clock(),
        None,
    );
    assert!(provider.fetch_all().await.is_empty());
}

#[tokio::test]
async fn tianapi_error_code_is_a_shape_failure() {
    let provider = TianApiProvider::new(
        Arc::new(PartialFetch {
            marker: "esports",
            body: r#"{"code": 250, "msg": "key error"}"#,
        }),
        Arc::new(FeedCache::new()),
        clock(),
        Some("bad-key".into()),
    );
    // Both channels produce nothing usable, so the sample batch comes back.
    let items = provider.fetch_all().await;
    assert_eq!(items.len(), TIANAPI_SAMPLE_LEN);
}

#[tokio::test]
async fn rsshub_total_failure_returns_sample_batch() {
    let provider = RsshubProvider::new(
        Arc::new(FailFetch),
        Arc::new(FeedCache::new()),
        clock(),
    )
    .with_accounts(vec![
        ("111".into(), "Account A".into()),
        ("222".into(), "Account B".into()),
    ])
    .with_pace(Duration::ZERO);

    let items = provider.fetch_all().await;
    assert_eq!(items.len(), RSS_SAMPLE_LEN);
}

#[tokio::test]
async fn rsshub_partial_failure_keeps_surviving_account() {
    let body = r#"<rss><channel>
        <item><title>kept</title><link>https://x/kept</link>
        <pubDate>Wed, 07 Aug 2024 12:00:00 GMT</pubDate></item>
    </channel></rss>"#;
    let provider = RsshubProvider::new(
        Arc::new(PartialFetch {
            marker: "/111",
            body,
        }),
        Arc::new(FeedCache::new()),
        clock(),
    )
    .with_accounts(vec![
        ("111".into(), "Account A".into()),
        ("222".into(), "Account B".into()),
    ])
    .with_pace(Duration::ZERO);

    let items = provider.fetch_all().await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].title, "kept");
    assert_eq!(items[0].source_name, "Account A");
    assert_eq!(items[0].summary.as_deref(), Some("kept"));
    assert_eq!(items[0].description.as_deref(), Some("kept"));
}
