// src/feed/cache.rs
//! Per-source freshness cache with an injected clock.
//!
//! The cache is an explicit object owned by the aggregator, never a process
//! global; freshness tests drive it with a manual clock. Entries are keyed by
//! source identity (one key per RSS account, one per aggregator channel or
//! board batch).

use std::collections::HashMap;
use std::sync::RwLock;

use crate::feed::types::HotItem;

/// Fixed freshness window: 30 minutes.
pub const FRESHNESS_WINDOW_MS: u64 = 30 * 60 * 1000;

/// Millisecond clock, injectable so cache expiry is testable.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> u64;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        chrono::Utc::now().timestamp_millis().max(0) as u64
    }
}

struct Entry {
    items: Vec<HotItem>,
    stored_at: u64,
}

/// In-process, time-bounded cache. Not shared across instances, not persisted.
pub struct FeedCache {
    entries: RwLock<HashMap<String, Entry>>,
}

impl FeedCache {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the cached batch if present and still inside the freshness
    /// window at `now_ms`; stale entries are a miss (evicted lazily on `put`).
    pub fn get(&self, key: &str, now_ms: u64) -> Option<Vec<HotItem>> {
        let g = self.entries.read().expect("rwlock poisoned");
        g.get(key).and_then(|e| {
            if now_ms.saturating_sub(e.stored_at) < FRESHNESS_WINDOW_MS {
                Some(e.items.clone())
            } else {
                None
            }
        })
    }

    pub fn put(&self, key: &str, items: Vec<HotItem>, now_ms: u64) {
        let mut g = self.entries.write().expect("rwlock poisoned");
        g.insert(
            key.to_string(),
            Entry {
                items,
                stored_at: now_ms,
            },
        );
    }

    /// Unconditional clear; used for force-refresh. Returns how many entries
    /// were dropped.
    pub fn invalidate_all(&self) -> usize {
        let mut g = self.entries.write().expect("rwlock poisoned");
        let n = g.len();
        g.clear();
        n
    }

    pub fn keys(&self) -> Vec<String> {
        let g = self.entries.read().expect("rwlock poisoned");
        let mut keys: Vec<String> = g.keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl Default for FeedCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::types::Platform;

    fn item(id: &str) -> HotItem {
        HotItem {
            id: id.to_string(),
            title: "t".into(),
            summary: None,
            description: None,
            link: None,
            pub_date: "2024-01-01T00:00:00Z".into(),
            platform: Platform::Rss,
            source_name: "s".into(),
            score: None,
        }
    }

    #[test]
    fn hit_within_window_miss_after() {
        let cache = FeedCache::new();
        cache.put("rss_1", vec![item("a")], 1_000);

        let hit = cache.get("rss_1", 1_000 + FRESHNESS_WINDOW_MS - 1);
        assert_eq!(hit.as_deref().map(|v| v.len()), Some(1));

        let miss = cache.get("rss_1", 1_000 + FRESHNESS_WINDOW_MS);
        assert!(miss.is_none(), "entry exactly at window age is stale");
    }

    #[test]
    fn put_replaces_prior_entry() {
        let cache = FeedCache::new();
        cache.put("k", vec![item("old")], 0);
        cache.put("k", vec![item("new"), item("new2")], 10);
        let got = cache.get("k", 20).unwrap();
        assert_eq!(got.len(), 2);
        assert_eq!(got[0].id, "new");
    }

    #[test]
    fn invalidate_all_empties_cache() {
        let cache = FeedCache::new();
        cache.put("a", vec![item("1")], 0);
        cache.put("b", vec![item("2")], 0);
        assert_eq!(cache.invalidate_all(), 2);
        assert!(cache.get("a", 1).is_none());
        assert!(cache.keys().is_empty());
    }
}
