// src/feed/mod.rs
pub mod cache;
pub mod parser;
pub mod providers;
pub mod sample;
pub mod transport;
pub mod types;

use metrics::{describe_counter, describe_gauge, describe_histogram, gauge};
use once_cell::sync::OnceCell;

/// One-time metrics registration (so series show up on /metrics).
pub fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("feed_items_total", "Items parsed from feed sources.");
        describe_counter!(
            "feed_fetch_errors_total",
            "Upstream fetch/shape errors per source."
        );
        describe_counter!("feed_cache_hits_total", "Per-source cache hits.");
        describe_histogram!("feed_parse_ms", "Feed parse time in milliseconds.");
        describe_gauge!(
            "feed_cache_freshness_window_ms",
            "Configured cache freshness window in milliseconds."
        );
        gauge!("feed_cache_freshness_window_ms").set(cache::FRESHNESS_WINDOW_MS as f64);
    });
}

/// Normalize display text coming from upstreams: decode HTML entities, strip
/// tags, collapse whitespace, cap length.
pub fn normalize_text(s: &str) -> String {
    let mut out = html_escape::decode_html_entities(s).to_string();

    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, "").to_string();

    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").trim().to_string();

    // Length cap: 500 chars is plenty for a card title or synopsis.
    if out.chars().count() > 500 {
        out = out.chars().take(500).collect();
    }
    out
}
