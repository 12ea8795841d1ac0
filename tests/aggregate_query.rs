// tests/aggregate_query.rs
//
// Orchestrator-level behavior against stub transports: selection, sorting,
// pagination, search filtering, cache reuse, and force refresh.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::bail;
use async_trait::async_trait;

use trendcast::aggregate::{Aggregator, HotQuery, QueryError, SortBy};
use trendcast::feed::cache::{Clock, FeedCache};
use trendcast::feed::providers::rsshub::RsshubProvider;
use trendcast::feed::providers::tianapi::TianApiProvider;
use trendcast::feed::providers::tophub::TopHubProvider;
use trendcast::feed::transport::HttpFetch;

const RSS_FIXTURE: &str = r#"<?xml version="1.0"?>
<rss version="2.0"><channel>
  <item>
    <title>newest story about a drama</title>
    <link>https://example.test/t0</link>
    <pubDate>Wed, 07 Aug 2024 12:00:00 GMT</pubDate>
  </item>
  <item>
    <title>middle story about a game</title>
    <link>https://example.test/t1</link>
    <pubDate>Wed, 07 Aug 2024 11:00:00 GMT</pubDate>
  </item>
  <item>
    <title>oldest story about a drama</title>
    <link>https://example.test/t2</link>
    <pubDate>Wed, 07 Aug 2024 10:00:00 GMT</pubDate>
  </item>
</channel></rss>"#;

/// Serves the RSS fixture for the single tracked account; counts calls.
struct CountingFetch {
    calls: AtomicUsize,
}

#[async_trait]
impl HttpFetch for CountingFetch {
    async fn get_text(&self, url: &str, _auth: Option<&str>) -> anyhow::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if url.contains("/weibo/user/") || url.contains("/9001") {
            Ok(RSS_FIXTURE.to_string())
        } else {
            bail!("unexpected url in test: {url}")
        }
    }
}

struct ManualClock {
    millis: AtomicU64,
}

impl ManualClock {
    fn new(start: u64) -> Self {
        Self {
            millis: AtomicU64::new(start),
        }
    }

    fn advance(&self, ms: u64) {
        self.millis.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> u64 {
        self.millis.load(Ordering::SeqCst)
    }
}

fn build(fetch: Arc<dyn HttpFetch>, clock: Arc<dyn Clock>) -> Aggregator {
    let cache = Arc::new(FeedCache::new());
    let rsshub = RsshubProvider::new(fetch.clone(), cache.clone(), clock.clone())
        .with_accounts(vec![("9001".into(), "Fixture Account".into())])
        .with_pace(Duration::ZERO);
    // No keys: these sources contribute nothing in this test.
    let tianapi = TianApiProvider::new(fetch.clone(), cache.clone(), clock.clone(), None);
    let tophub =
        TopHubProvider::new(fetch, cache.clone(), clock, None).with_pace(Duration::ZERO);
    Aggregator::from_parts(rsshub, tianapi, tophub, cache)
}

fn rss_query() -> HotQuery {
    HotQuery {
        source: "rss".into(),
        page_size: 2,
        ..HotQuery::default()
    }
}

#[tokio::test]
async fn time_sort_and_pagination_match_contract() {
    let clock = Arc::new(ManualClock::new(1_000_000));
    let agg = build(
        Arc::new(CountingFetch {
            calls: AtomicUsize::new(0),
        }),
        clock,
    );

    let page = agg.query(&rss_query()).await.unwrap();
    assert_eq!(page.total, 3);
    assert_eq!(page.items.len(), 2);
    assert!(page.has_more);
    assert_eq!(page.items[0].link.as_deref(), Some("https://example.test/t0"));
    assert_eq!(page.items[1].link.as_deref(), Some("https://example.test/t1"));

    let last = agg
        .query(&HotQuery {
            page: 2,
            ..rss_query()
        })
        .await
        .unwrap();
    assert_eq!(last.items.len(), 1);
    assert!(!last.has_more);
    assert_eq!(last.items[0].link.as_deref(), Some("https://example.test/t2"));
}

#[tokio::test]
async fn search_filters_title_case_insensitively() {
    let clock = Arc::new(ManualClock::new(1_000_000));
    let agg = build(
        Arc::new(CountingFetch {
            calls: AtomicUsize::new(0),
        }),
        clock,
    );

    let page = agg
        .query(&HotQuery {
            search: Some("DRAMA".into()),
            page_size: 10,
            ..rss_query()
        })
        .await
        .unwrap();
    assert_eq!(page.total, 2);
    assert!(page
        .items
        .iter()
        .all(|it| it.title.contains("drama")));
}

#[tokio::test]
async fn fresh_cache_skips_network_and_force_refresh_bypasses_it() {
    let fetch = Arc::new(CountingFetch {
        calls: AtomicUsize::new(0),
    });
    let clock = Arc::new(ManualClock::new(1_000_000));
    let agg = build(fetch.clone(), clock.clone());

    let first = agg.query(&rss_query()).await.unwrap();
    assert_eq!(fetch.calls.load(Ordering::SeqCst), 1);

    // Second call inside the freshness window: identical items, no new call.
    clock.advance(60_000);
    let second = agg.query(&rss_query()).await.unwrap();
    assert_eq!(fetch.calls.load(Ordering::SeqCst), 1, "served from cache");
    assert_eq!(first.items, second.items);

    // Force refresh always hits the upstream again.
    let refreshed = agg
        .query(&HotQuery {
            force_refresh: true,
            ..rss_query()
        })
        .await
        .unwrap();
    assert_eq!(fetch.calls.load(Ordering::SeqCst), 2);
    assert_eq!(refreshed.total, 3);

    // And the cache now holds the refreshed batch.
    agg.query(&rss_query()).await.unwrap();
    assert_eq!(fetch.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn stale_cache_refetches_after_the_freshness_window() {
    let fetch = Arc::new(CountingFetch {
        calls: AtomicUsize::new(0),
    });
    let clock = Arc::new(ManualClock::new(1_000_000));
    let agg = build(fetch.clone(), clock.clone());

    agg.query(&rss_query()).await.unwrap();
    assert_eq!(fetch.calls.load(Ordering::SeqCst), 1);

    clock.advance(trendcast::feed::cache::FRESHNESS_WINDOW_MS + 1);
    agg.query(&rss_query()).await.unwrap();
    assert_eq!(fetch.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn unknown_source_tag_is_a_request_error() {
    let clock = Arc::new(ManualClock::new(0));
    let agg = build(
        Arc::new(CountingFetch {
            calls: AtomicUsize::new(0),
        }),
        clock,
    );
    let err = agg
        .query(&HotQuery {
            source: "rss,reddit".into(),
            ..HotQuery::default()
        })
        .await
        .unwrap_err();
    assert_eq!(err, QueryError::UnknownSource("reddit".into()));

    let err = agg
        .query(&HotQuery {
            page: 0,
            ..rss_query()
        })
        .await
        .unwrap_err();
    assert_eq!(err, QueryError::BadPagination);
}

#[tokio::test]
async fn hot_sort_orders_by_score_descending() {
    let clock = Arc::new(ManualClock::new(1_000_000));
    let agg = build(
        Arc::new(CountingFetch {
            calls: AtomicUsize::new(0),
        }),
        clock,
    );
    // RSS items carry no score, so hot sort leaves concatenation order.
    let page = agg
        .query(&HotQuery {
            sort_by: SortBy::Hot,
            page_size: 10,
            ..rss_query()
        })
        .await
        .unwrap();
    assert_eq!(page.total, 3);
    let links: Vec<_> = page.items.iter().filter_map(|i| i.link.as_deref()).collect();
    assert_eq!(
        links,
        vec![
            "https://example.test/t0",
            "https://example.test/t1",
            "https://example.test/t2"
        ]
    );
}
