//! Billtrack core library — domain types, normalization, configuration.
//!
//! Public API surface:
//! - [`types`] — tracked rows, master-list entries, enrichment tri-state
//! - [`normalize`] — bill-number normalization and hyperlink extraction
//! - [`header`] — header-name → column-index map for worksheet access
//! - [`states`] — LegiScan state-id ordering and abbreviation lookup
//! - [`risk`] — risk-lookup formula helpers
//! - [`config`] — environment-driven runtime configuration
//! - [`error`] — [`ConfigError`], [`HeaderError`]

pub mod config;
pub mod error;
pub mod header;
pub mod normalize;
pub mod risk;
pub mod states;
pub mod types;

pub use config::Config;
pub use error::{ConfigError, HeaderError};
pub use header::{columns, HeaderMap};
pub use types::{BillDetail, Enrichment, MasterIndexEntry, RawBill, TrackedBill, UNKNOWN};
