// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod aggregate;
pub mod ai;
pub mod api;
pub mod config;
pub mod feed;
pub mod metrics;

// ---- Re-exports for stable public API ----
pub use crate::aggregate::{Aggregator, HotPage, HotQuery, SortBy};
pub use crate::api::{router, AppState};
pub use crate::feed::types::{HotItem, Platform};
