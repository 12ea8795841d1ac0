// src/feed/types.rs
use serde::{Deserialize, Serialize};
use time::{format_description::well_known::Rfc2822, OffsetDateTime, UtcOffset};

/// Coarse origin tag for a hot item. Closed set; each variant maps to one
/// upstream family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Rss,
    Tianapi,
    Tophub,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Rss => "rss",
            Platform::Tianapi => "tianapi",
            Platform::Tophub => "tophub",
        }
    }
}

/// Canonical normalized unit of trending content, regardless of origin.
///
/// Items are immutable after creation: every upstream fetch produces a fresh
/// batch with fresh ids. Ids are unique within one batch but deliberately not
/// stable across refetches (they embed the fetch time).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotItem {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Kept distinct from `summary` for RSS provider compatibility.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    /// RFC 3339 where the source provides one; RFC 2822 passed through
    /// verbatim for RSS feeds. Fetch time is substituted when absent.
    pub pub_date: String,
    pub platform: Platform,
    pub source_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<u64>,
}

impl HotItem {
    /// Publish time as unix seconds, tolerating both RFC 3339 and RFC 2822.
    /// Unparseable dates sort as 0 (oldest).
    pub fn pub_date_unix(&self) -> i64 {
        parse_pub_date_unix(&self.pub_date)
    }

    pub fn score_or_zero(&self) -> u64 {
        self.score.unwrap_or(0)
    }
}

pub fn parse_pub_date_unix(s: &str) -> i64 {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return dt.timestamp();
    }
    if let Ok(dt) = OffsetDateTime::parse(s, &Rfc2822) {
        return dt.to_offset(UtcOffset::UTC).unix_timestamp();
    }
    // TianAPI uses bare "YYYY-MM-DD HH:MM:SS" timestamps.
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or(0)
}

/// Epoch-millis timestamp rendered as RFC 3339, the shape synthesized
/// `pubDate` fields use.
pub fn rfc3339_from_millis(ms: u64) -> String {
    chrono::DateTime::from_timestamp_millis(ms as i64)
        .unwrap_or_default()
        .to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pub_date_accepts_both_formats() {
        assert_eq!(
            parse_pub_date_unix("1970-01-01T00:01:00+00:00"),
            60,
            "rfc3339"
        );
        assert_eq!(
            parse_pub_date_unix("Thu, 01 Jan 1970 00:01:00 +0000"),
            60,
            "rfc2822"
        );
        assert_eq!(parse_pub_date_unix("not a date"), 0);
    }

    #[test]
    fn synthesized_dates_round_trip_through_the_parser() {
        let s = rfc3339_from_millis(60_000);
        assert_eq!(parse_pub_date_unix(&s), 60);
    }

    #[test]
    fn serializes_with_wire_field_names() {
        let item = HotItem {
            id: "rss_1_0_42".into(),
            title: "t".into(),
            summary: None,
            description: None,
            link: None,
            pub_date: "2024-01-01T00:00:00Z".into(),
            platform: Platform::Rss,
            source_name: "src".into(),
            score: None,
        };
        let v = serde_json::to_value(&item).unwrap();
        assert!(v.get("pubDate").is_some());
        assert!(v.get("sourceName").is_some());
        assert!(v.get("summary").is_none(), "None fields stay off the wire");
    }
}
