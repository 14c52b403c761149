//! # billtrack-client
//!
//! LegiScan access layer: a throttled, retrying HTTP client plus the local
//! caches that keep upstream traffic bounded.
//!
//! - [`client`] — rate-limited envelope fetcher with soft-fail semantics
//! - [`api`] — typed `getSessionList` / `getMasterList` / `getBill` /
//!   `getSearch` wrappers and detail flattening
//! - [`detail_cache`] — change-hash-keyed bill detail cache
//! - [`list_cache`] — TTL caches for sessions and master lists
//! - [`search`] — TTL cache for discovery-search pages
//! - [`stats`] — process-wide call/cache counters

pub mod api;
pub mod client;
pub mod detail_cache;
pub mod error;
pub mod list_cache;
pub mod search;
pub mod stats;

pub use api::{flatten_bill, SearchHit, SearchPage, Session};
pub use client::LegiScanClient;
pub use detail_cache::DetailCache;
pub use error::ClientError;
pub use list_cache::ListCache;
pub use search::SearchCache;
pub use stats::{ClientStats, StatsSnapshot};
