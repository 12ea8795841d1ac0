// src/aggregate.rs
//! Aggregation orchestrator: fans out to the selected source adapters
//! sequentially, concatenates whatever each returns (possibly empty on
//! failure), then filters, stably sorts, and paginates.
//!
//! Upstream unavailability never fails a query; only malformed request
//! parameters do.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Secrets;
use crate::feed::cache::{Clock, FeedCache};
use crate::feed::providers::rsshub::RsshubProvider;
use crate::feed::providers::tianapi::{Channel, TianApiProvider};
use crate::feed::providers::tophub::{board_by_name, TopHubProvider};
use crate::feed::transport::HttpFetch;
use crate::feed::types::HotItem;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("unknown source tag: {0}")]
    UnknownSource(String),
    #[error("page and pageSize must be at least 1")]
    BadPagination,
}

/// Recognized source selectors. `All` expands to every known source family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceTag {
    All,
    Rss,
    TianApi,
    TianApiTopnews,
    TianApiEnt,
    TopHub,
    TopHubWeibo,
    TopHubDouyin,
    TopHubZhihu,
}

impl SourceTag {
    pub fn parse(s: &str) -> Result<Self, QueryError> {
        match s.trim() {
            "all" => Ok(SourceTag::All),
            "rss" => Ok(SourceTag::Rss),
            "tianapi" => Ok(SourceTag::TianApi),
            "tianapi_topnews" => Ok(SourceTag::TianApiTopnews),
            "tianapi_ent" => Ok(SourceTag::TianApiEnt),
            "tophub" => Ok(SourceTag::TopHub),
            "tophub_weibo" => Ok(SourceTag::TopHubWeibo),
            "tophub_douyin" => Ok(SourceTag::TopHubDouyin),
            "tophub_zhihu" => Ok(SourceTag::TopHubZhihu),
            other => Err(QueryError::UnknownSource(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    Time,
    Hot,
}

impl Default for SortBy {
    fn default() -> Self {
        SortBy::Time
    }
}

#[derive(Debug, Clone)]
pub struct HotQuery {
    /// Comma-separable tag list, or "all".
    pub source: String,
    pub search: Option<String>,
    pub sort_by: SortBy,
    /// 1-based.
    pub page: usize,
    pub page_size: usize,
    pub force_refresh: bool,
}

impl Default for HotQuery {
    fn default() -> Self {
        Self {
            source: "all".to_string(),
            search: None,
            sort_by: SortBy::Time,
            page: 1,
            page_size: 60,
            force_refresh: false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HotPage {
    pub items: Vec<HotItem>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
    pub has_more: bool,
}

pub struct Aggregator {
    rsshub: RsshubProvider,
    tianapi: TianApiProvider,
    tophub: TopHubProvider,
    cache: Arc<FeedCache>,
}

impl Aggregator {
    pub fn new(fetch: Arc<dyn HttpFetch>, clock: Arc<dyn Clock>, secrets: &Secrets) -> Self {
        let cache = Arc::new(FeedCache::new());
        let rsshub = RsshubProvider::new(fetch.clone(), cache.clone(), clock.clone());
        let tianapi = TianApiProvider::new(
            fetch.clone(),
            cache.clone(),
            clock.clone(),
            secrets.tianapi_key.clone(),
        );
        let tophub = TopHubProvider::new(fetch, cache.clone(), clock, secrets.tophub_key.clone());
        Self::from_parts(rsshub, tianapi, tophub, cache)
    }

    /// Assembly seam for tests: inject pre-built providers and cache.
    pub fn from_parts(
        rsshub: RsshubProvider,
        tianapi: TianApiProvider,
        tophub: TopHubProvider,
        cache: Arc<FeedCache>,
    ) -> Self {
        Self {
            rsshub,
            tianapi,
            tophub,
            cache,
        }
    }

    pub fn cache(&self) -> &FeedCache {
        &self.cache
    }

    pub async fn query(&self, q: &HotQuery) -> Result<HotPage, QueryError> {
        crate::feed::ensure_metrics_described();

        if q.page == 0 || q.page_size == 0 {
            return Err(QueryError::BadPagination);
        }
        let tags = q
            .source
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .map(SourceTag::parse)
            .collect::<Result<Vec<_>, _>>()?;
        if tags.is_empty() {
            return Err(QueryError::UnknownSource(q.source.clone()));
        }

        // Force refresh drops every per-source cache entry before fetching,
        // one policy for all adapters.
        if q.force_refresh {
            let n = self.cache.invalidate_all();
            tracing::info!(cleared = n, "force refresh: feed cache invalidated");
        }

        let wants = |t: SourceTag| tags.contains(&t) || tags.contains(&SourceTag::All);

        let mut items: Vec<HotItem> = Vec::new();

        if wants(SourceTag::Rss) {
            items.extend(self.rsshub.fetch_all().await);
        }

        // Targeted channels take precedence over the combined default, same
        // as the sub-board handling below.
        if tags.contains(&SourceTag::TianApiTopnews) {
            items.extend(self.tianapi.fetch_channel(Channel::Topnews, 20).await);
        } else if tags.contains(&SourceTag::TianApiEnt) {
            items.extend(self.tianapi.fetch_channel(Channel::Entertainment, 20).await);
        } else if wants(SourceTag::TianApi) {
            items.extend(self.tianapi.fetch_all().await);
        }

        let board_tags = [
            (SourceTag::TopHubWeibo, "Weibo"),
            (SourceTag::TopHubDouyin, "Douyin"),
            (SourceTag::TopHubZhihu, "Zhihu"),
        ];
        let wanted_boards: Vec<&str> = board_tags
            .iter()
            .filter(|(t, _)| tags.contains(t))
            .map(|(_, name)| *name)
            .collect();
        if !wanted_boards.is_empty() {
            let all = self.tophub.fetch_all().await;
            let prefixes: Vec<String> = wanted_boards
                .iter()
                .filter_map(|name| board_by_name(name))
                .map(|b| format!("tophub_{}_", b.hashid))
                .collect();
            items.extend(
                all.into_iter()
                    .filter(|it| prefixes.iter().any(|p| it.id.starts_with(p.as_str()))),
            );
        } else if wants(SourceTag::TopHub) {
            items.extend(self.tophub.fetch_all().await);
        }

        if let Some(needle) = q.search.as_deref().map(str::to_lowercase) {
            if !needle.is_empty() {
                items.retain(|it| {
                    it.title.to_lowercase().contains(&needle)
                        || it
                            .summary
                            .as_deref()
                            .is_some_and(|s| s.to_lowercase().contains(&needle))
                });
            }
        }

        sort_items(&mut items, q.sort_by);
        Ok(paginate(items, q.page, q.page_size))
    }
}

/// Stable sort: equal keys keep their source-concatenation order.
pub(crate) fn sort_items(items: &mut [HotItem], sort_by: SortBy) {
    match sort_by {
        SortBy::Time => items.sort_by_key(|it| std::cmp::Reverse(it.pub_date_unix())),
        SortBy::Hot => items.sort_by_key(|it| std::cmp::Reverse(it.score_or_zero())),
    }
}

pub(crate) fn paginate(items: Vec<HotItem>, page: usize, page_size: usize) -> HotPage {
    let total = items.len();
    let start = (page - 1).saturating_mul(page_size).min(total);
    let end = start.saturating_add(page_size).min(total);
    let has_more = page.saturating_mul(page_size) < total;
    HotPage {
        items: items[start..end].to_vec(),
        total,
        page,
        page_size,
        has_more,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::types::Platform;

    fn item(id: &str, pub_date: &str, score: Option<u64>) -> HotItem {
        HotItem {
            id: id.to_string(),
            title: format!("title {id}"),
            summary: None,
            description: None,
            link: None,
            pub_date: pub_date.to_string(),
            platform: Platform::Tophub,
            source_name: "s".into(),
            score,
        }
    }

    #[test]
    fn sort_by_hot_is_stable_for_equal_scores() {
        let mut items = vec![
            item("a", "2024-01-01T00:00:00Z", Some(10)),
            item("b", "2024-01-01T00:00:00Z", Some(10)),
            item("c", "2024-01-01T00:00:00Z", Some(50)),
            item("d", "2024-01-01T00:00:00Z", None),
        ];
        sort_items(&mut items, SortBy::Hot);
        let ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b", "d"]);
    }

    #[test]
    fn sort_by_time_is_stable_for_equal_dates() {
        let mut items = vec![
            item("old", "2024-01-01T00:00:00Z", None),
            item("new1", "2024-06-01T00:00:00Z", None),
            item("new2", "2024-06-01T00:00:00Z", None),
        ];
        sort_items(&mut items, SortBy::Time);
        let ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["new1", "new2", "old"]);
    }

    #[test]
    fn paginate_slices_and_reports_has_more() {
        let items: Vec<HotItem> = (0..5)
            .map(|i| item(&format!("i{i}"), "2024-01-01T00:00:00Z", None))
            .collect();

        let p1 = paginate(items.clone(), 1, 2);
        assert_eq!(p1.items.len(), 2);
        assert_eq!(p1.total, 5);
        assert!(p1.has_more);

        let p3 = paginate(items.clone(), 3, 2);
        assert_eq!(p3.items.len(), 1);
        assert!(!p3.has_more);

        let past_end = paginate(items, 4, 2);
        assert!(past_end.items.is_empty());
        assert_eq!(past_end.total, 5);
        assert!(!past_end.has_more);
    }

    #[test]
    fn source_tags_parse_and_reject() {
        assert_eq!(SourceTag::parse("all"), Ok(SourceTag::All));
        assert_eq!(SourceTag::parse(" rss "), Ok(SourceTag::Rss));
        assert!(matches!(
            SourceTag::parse("reddit"),
            Err(QueryError::UnknownSource(_))
        ));
    }
}
