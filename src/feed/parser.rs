// src/feed/parser.rs
//! RSS document parser: strict XML deserialization first, tolerant regex scan
//! as the fallback for malformed or partial markup.
//!
//! The mirror occasionally serves truncated documents and items with CDATA or
//! plain-text titles; a single bad entry is skipped, never an error. Only the
//! enclosing adapter's transport can fail a fetch.

use once_cell::sync::OnceCell;
use quick_xml::de::from_str;
use regex::Regex;
use serde::Deserialize;

use crate::feed::normalize_text;

/// One parsed feed entry before adapter shaping. `pub_date` is the raw string
/// as found in the document; the adapter substitutes fetch time when absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    pub title: String,
    pub link: String,
    pub pub_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
}

/// Parse one raw feed document into entries. Entries lacking a non-empty
/// title or link are dropped. Given identical input, output is identical.
pub fn parse_feed(xml: &str) -> Vec<RawEntry> {
    let t0 = std::time::Instant::now();
    let out = match from_str::<Rss>(xml) {
        Ok(rss) => collect_strict(rss),
        Err(_) => scan_items(xml),
    };
    metrics::histogram!("feed_parse_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
    out
}

fn collect_strict(rss: Rss) -> Vec<RawEntry> {
    let mut out = Vec::with_capacity(rss.channel.item.len());
    for it in rss.channel.item {
        let title = normalize_text(it.title.as_deref().unwrap_or_default());
        let link = it.link.as_deref().unwrap_or_default().trim().to_string();
        if title.is_empty() || link.is_empty() {
            continue;
        }
        out.push(RawEntry {
            title,
            link,
            pub_date: it.pub_date.filter(|d| !d.trim().is_empty()),
        });
    }
    out
}

/// Tolerant path: extract `<item>…</item>` blocks by regex and pull fields
/// out of each block independently, so one mangled entry cannot poison the
/// rest of the document.
fn scan_items(xml: &str) -> Vec<RawEntry> {
    static RE_ITEM: OnceCell<Regex> = OnceCell::new();
    static RE_TITLE_CDATA: OnceCell<Regex> = OnceCell::new();
    static RE_TITLE: OnceCell<Regex> = OnceCell::new();
    static RE_LINK: OnceCell<Regex> = OnceCell::new();
    static RE_PUBDATE: OnceCell<Regex> = OnceCell::new();

    let re_item = RE_ITEM.get_or_init(|| Regex::new(r"(?s)<item>.*?</item>").unwrap());
    let re_title_cdata = RE_TITLE_CDATA
        .get_or_init(|| Regex::new(r"(?s)<title><!\[CDATA\[(.*?)\]\]></title>").unwrap());
    let re_title = RE_TITLE.get_or_init(|| Regex::new(r"(?s)<title>(.*?)</title>").unwrap());
    let re_link = RE_LINK.get_or_init(|| Regex::new(r"(?s)<link>(.*?)</link>").unwrap());
    let re_pubdate = RE_PUBDATE.get_or_init(|| Regex::new(r"(?s)<pubDate>(.*?)</pubDate>").unwrap());

    let mut out = Vec::new();
    for m in re_item.find_iter(xml) {
        let block = m.as_str();

        // CDATA titles win over plain ones when both match.
        let title_raw = re_title_cdata
            .captures(block)
            .or_else(|| re_title.captures(block))
            .map(|c| c[1].to_string())
            .unwrap_or_default();
        let title = normalize_text(&title_raw);

        let link = re_link
            .captures(block)
            .map(|c| c[1].trim().to_string())
            .unwrap_or_default();

        if title.is_empty() || link.is_empty() {
            continue;
        }

        let pub_date = re_pubdate
            .captures(block)
            .map(|c| c[1].trim().to_string())
            .filter(|d| !d.is_empty());

        out.push(RawEntry {
            title,
            link,
            pub_date,
        });
    }
    out
}
