// src/feed/sample.rs
//! Built-in sample batches, returned when every sub-target of an adapter
//! fails. The UI keeps rendering something while fully offline instead of a
//! hard failure signal; sample ids carry a `sample_` prefix so they are easy
//! to spot downstream.

use crate::feed::cache::Clock;
use crate::feed::types::{rfc3339_from_millis, HotItem, Platform};

pub const TOPHUB_SAMPLE_LEN: usize = 5;
pub const TIANAPI_SAMPLE_LEN: usize = 4;
pub const RSS_SAMPLE_LEN: usize = 3;

fn rfc3339_minutes_ago(now_ms: u64, minutes: u64) -> String {
    rfc3339_from_millis(now_ms.saturating_sub(minutes * 60 * 1000))
}

fn sample(
    id: &str,
    title: &str,
    summary: &str,
    link: &str,
    pub_date: String,
    platform: Platform,
    source_name: &str,
    score: Option<u64>,
) -> HotItem {
    HotItem {
        id: id.to_string(),
        title: title.to_string(),
        summary: Some(summary.to_string()),
        description: None,
        link: Some(link.to_string()),
        pub_date,
        platform,
        source_name: source_name.to_string(),
        score,
    }
}

pub fn tophub_samples(clock: &dyn Clock) -> Vec<HotItem> {
    let now = clock.now_millis();
    let items = vec![
        sample(
            "sample_tophub_1",
            "New drama premiere sparks heated discussion",
            "An urban relationship drama whose opening episode broke a 2% rating",
            "https://example.com/news1",
            rfc3339_minutes_ago(now, 30),
            Platform::Tophub,
            "Weibo · Hot Search",
            Some(892_456),
        ),
        sample(
            "sample_tophub_2",
            "Game balance patch divides the player base",
            "The update ships hero rebalances and a new cosmetic line",
            "https://example.com/news2",
            rfc3339_minutes_ago(now, 45),
            Platform::Tophub,
            "Zhihu · Trending",
            Some(756_234),
        ),
        sample(
            "sample_tophub_3",
            "Short-video platform rolls out longer uploads",
            "Creators can now publish clips up to ten minutes long",
            "https://example.com/news3",
            rfc3339_minutes_ago(now, 60),
            Platform::Tophub,
            "Douyin · Trending",
            Some(634_521),
        ),
        sample(
            "sample_tophub_4",
            "Esports grand final kicks off tonight",
            "Two top teams contest the season title and a large prize pool",
            "https://example.com/news4",
            rfc3339_minutes_ago(now, 90),
            Platform::Tophub,
            "Weibo · Hot Search",
            Some(543_210),
        ),
        sample(
            "sample_tophub_5",
            "New anime season earns high review scores",
            "The manga adaptation holds a nine-plus rating across platforms",
            "https://example.com/news5",
            rfc3339_minutes_ago(now, 120),
            Platform::Tophub,
            "Zhihu · Trending",
            Some(432_109),
        ),
    ];
    debug_assert_eq!(items.len(), TOPHUB_SAMPLE_LEN);
    items
}

pub fn tianapi_samples(clock: &dyn Clock) -> Vec<HotItem> {
    let now = clock.now_millis();
    let items = vec![
        sample(
            "sample_tianapi_1",
            "Tournament upset sends underdog team to playoffs",
            "A lower-seeded roster eliminates last year's champion in five games",
            "https://example.com/tianapi1",
            rfc3339_minutes_ago(now, 20),
            Platform::Tianapi,
            "TianAPI · Esports",
            None,
        ),
        sample(
            "sample_tianapi_2",
            "Studio announces sequel film for hit animation",
            "Production starts this winter with the original creative team",
            "https://example.com/tianapi2",
            rfc3339_minutes_ago(now, 50),
            Platform::Tianapi,
            "TianAPI · Anime",
            None,
        ),
        sample(
            "sample_tianapi_3",
            "Streaming numbers hit a new seasonal record",
            "Concurrent viewers peaked during the weekend showcase",
            "https://example.com/tianapi3",
            rfc3339_minutes_ago(now, 75),
            Platform::Tianapi,
            "TianAPI · Top News",
            None,
        ),
        sample(
            "sample_tianapi_4",
            "Celebrity variety show renews for another season",
            "The cast returns with new guests after a strong ratings run",
            "https://example.com/tianapi4",
            rfc3339_minutes_ago(now, 100),
            Platform::Tianapi,
            "TianAPI · Entertainment",
            None,
        ),
    ];
    debug_assert_eq!(items.len(), TIANAPI_SAMPLE_LEN);
    items
}

pub fn rss_samples(clock: &dyn Clock) -> Vec<HotItem> {
    let now = clock.now_millis();
    let mut items = vec![
        sample(
            "sample_rss_1",
            "Behind-the-scenes clip from the new series trends overnight",
            "Behind-the-scenes clip from the new series trends overnight",
            "https://example.com/rss1",
            rfc3339_minutes_ago(now, 15),
            Platform::Rss,
            "Sample Account",
            None,
        ),
        sample(
            "sample_rss_2",
            "Fan meetup photos draw a wave of reposts",
            "Fan meetup photos draw a wave of reposts",
            "https://example.com/rss2",
            rfc3339_minutes_ago(now, 40),
            Platform::Rss,
            "Sample Account",
            None,
        ),
        sample(
            "sample_rss_3",
            "Teaser poster hints at a surprise collaboration",
            "Teaser poster hints at a surprise collaboration",
            "https://example.com/rss3",
            rfc3339_minutes_ago(now, 70),
            Platform::Rss,
            "Sample Account",
            None,
        ),
    ];
    // RSS items carry the provider-compat description field.
    for it in &mut items {
        it.description = it.summary.clone();
    }
    debug_assert_eq!(items.len(), RSS_SAMPLE_LEN);
    items
}
