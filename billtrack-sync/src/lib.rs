//! # billtrack-sync
//!
//! The reconciliation core: diff tracked worksheets against upstream
//! master lists and emit minimal patches plus notifications.
//!
//! - [`master_index`] — per-state lookup rebuilt each pass
//! - [`reconcile`] — per-row NEW / CHANGED / BACKFILL / UNCHANGED logic
//! - [`digest`] — fast-path skip digest
//! - [`snapshot`] / [`run_state`] — persisted pass state
//! - [`driver`] — worksheet pass orchestration
//! - [`discovery`] — search for untracked candidate bills
//! - [`report`] — run reports and alert text

pub mod digest;
pub mod discovery;
pub mod driver;
pub mod error;
pub mod master_index;
pub mod reconcile;
pub mod report;
pub mod run_state;
pub mod snapshot;

pub use digest::sheet_digest;
pub use discovery::{discover, IgnoreList, KnownBills, SearchSource};
pub use driver::{MasterSource, PassCounts, Syncer, WorksheetOutcome, WorksheetSpec, WORKSHEETS};
pub use error::SyncError;
pub use master_index::MasterIndex;
pub use reconcile::{DetailSource, NoDetails, Reconciler, RowState};
pub use report::{
    new_bill_alert, status_change_alert, NullPoster, ReconciliationReport, SocialPoster,
};
pub use run_state::{RunState, RunStateStore};
pub use snapshot::{SheetStats, SnapshotStore};
