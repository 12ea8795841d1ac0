// src/feed/providers/rsshub.rs
//! Mirrored-feed adapter: one RSSHub route per tracked Weibo account, fetched
//! sequentially with a pacing delay, cached per account.

use std::sync::Arc;
use std::time::Duration;

use metrics::counter;

use crate::feed::cache::{Clock, FeedCache};
use crate::feed::parser::parse_feed;
use crate::feed::sample;
use crate::feed::transport::HttpFetch;
use crate::feed::types::{rfc3339_from_millis, HotItem, Platform};

pub const RSS_BASE_URL: &str = "https://rsshub-production-e0d5.up.railway.app/weibo/user";

/// Delay between consecutive account fetches. Fixed, non-adaptive; just
/// enough to stay under the mirror's rate limit.
pub const REQUEST_PACE: Duration = Duration::from_millis(1000);

/// Tracked account ids with their display names. Iteration order is the
/// declared order and is part of the output contract.
pub const TRACKED_ACCOUNTS: &[(&str, &str)] = &[
    ("5400431801", "牯岭街少女"),
    ("1072962941", "热播电视剧"),
    ("7391324928", "看韩影"),
    ("6871390978", "快乐追星十级学渣"),
    ("6890070834", "非职业熬夜冠军"),
    ("6330503671", "复读机卡机了"),
    ("6423651199", "小狗斯特"),
    ("6559402245", "烫金真爱册"),
    ("6618806075", "插花大师"),
    ("5666481284", "心动收藏站"),
    ("2120754067", "朝阳区在逃富婆"),
    ("3051218441", "Sweet猫饼"),
    ("5607032695", "钮祜禄流流"),
    ("2456865965", "芝麻糊了吧"),
    ("5273937341", "泡菜那些事"),
];

pub struct RsshubProvider {
    fetch: Arc<dyn HttpFetch>,
    cache: Arc<FeedCache>,
    clock: Arc<dyn Clock>,
    accounts: Vec<(String, String)>,
    pace: Duration,
}

impl RsshubProvider {
    pub fn new(fetch: Arc<dyn HttpFetch>, cache: Arc<FeedCache>, clock: Arc<dyn Clock>) -> Self {
        let accounts = TRACKED_ACCOUNTS
            .iter()
            .map(|(uid, name)| (uid.to_string(), name.to_string()))
            .collect();
        Self {
            fetch,
            cache,
            clock,
            accounts,
            pace: REQUEST_PACE,
        }
    }

    /// Test hook: replace the tracked account table.
    pub fn with_accounts(mut self, accounts: Vec<(String, String)>) -> Self {
        self.accounts = accounts;
        self
    }

    /// Test hook: remove or shorten the pacing delay.
    pub fn with_pace(mut self, pace: Duration) -> Self {
        self.pace = pace;
        self
    }

    /// Fetch one account feed, serving from cache when fresh. Transport and
    /// shape failures contribute an empty batch, never an error.
    async fn fetch_account(&self, uid: &str, name: &str) -> Vec<HotItem> {
        let key = format!("rss_{uid}");
        let now = self.clock.now_millis();
        if let Some(items) = self.cache.get(&key, now) {
            counter!("feed_cache_hits_total").increment(1);
            tracing::debug!(account = name, uid, "rss cache hit");
            return items;
        }

        let url = format!("{RSS_BASE_URL}/{uid}");
        let body = match self.fetch.get_text(&url, None).await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(error = ?e, account = name, uid, "rss fetch failed");
                counter!("feed_fetch_errors_total").increment(1);
                return Vec::new();
            }
        };

        let now = self.clock.now_millis();
        let items: Vec<HotItem> = parse_feed(&body)
            .into_iter()
            .enumerate()
            .map(|(i, raw)| {
                let pub_date = raw
                    .pub_date
                    .unwrap_or_else(|| rfc3339_from_millis(now));
                HotItem {
                    id: format!("rss_{uid}_{i}_{now}"),
                    summary: Some(raw.title.clone()),
                    description: Some(raw.title.clone()),
                    title: raw.title,
                    link: Some(raw.link),
                    pub_date,
                    platform: Platform::Rss,
                    source_name: name.to_string(),
                    score: None,
                }
            })
            .collect();
        counter!("feed_items_total").increment(items.len() as u64);

        self.cache.put(&key, items.clone(), now);
        items
    }

    /// Fetch every tracked account in declared order, newest first across the
    /// merged result. Falls back to the built-in sample batch only when every
    /// account produced nothing.
    pub async fn fetch_all(&self) -> Vec<HotItem> {
        let mut out: Vec<HotItem> = Vec::new();
        let mut ok_sources = 0usize;

        for (i, (uid, name)) in self.accounts.iter().enumerate() {
            let items = self.fetch_account(uid, name).await;
            if !items.is_empty() {
                ok_sources += 1;
                out.extend(items);
            }
            if i + 1 < self.accounts.len() && !self.pace.is_zero() {
                tokio::time::sleep(self.pace).await;
            }
        }

        tracing::info!(
            items = out.len(),
            ok_sources,
            accounts = self.accounts.len(),
            "rss fetch complete"
        );

        if out.is_empty() {
            tracing::warn!("all rss accounts failed, returning sample batch");
            return sample::rss_samples(self.clock.as_ref());
        }

        // Stable sort, newest first; per-account order survives for ties.
        out.sort_by_key(|it| std::cmp::Reverse(it.pub_date_unix()));
        out
    }
}
