//! Per-worksheet row snapshots.
//!
//! After every successful pass the parsed rows are persisted; the next pass
//! diffs against them. A missing or unreadable snapshot means "treat the
//! current rows as the previous state", so a fresh deploy never produces a
//! notification storm.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use billtrack_core::{TrackedBill, UNKNOWN};

use crate::error::{io_err, SyncError};

#[derive(Debug, Serialize, Deserialize)]
pub struct SnapshotFile {
    pub saved_at: DateTime<Utc>,
    pub rows: Vec<TrackedBill>,
}

pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        SnapshotStore {
            dir: data_dir.into().join("snapshots"),
        }
    }

    fn path(&self, worksheet: &str, year: i32) -> PathBuf {
        self.dir.join(format!("{worksheet}-{year}.json"))
    }

    /// Previous rows for a worksheet, or `None` on first run (missing or
    /// unreadable file).
    pub fn load(&self, worksheet: &str, year: i32) -> Option<Vec<TrackedBill>> {
        let path = self.path(worksheet, year);
        let body = fs::read(&path).ok()?;
        match serde_json::from_slice::<SnapshotFile>(&body) {
            Ok(snapshot) => Some(snapshot.rows),
            Err(err) => {
                tracing::warn!("snapshot {} unreadable, treating as first run: {err}", path.display());
                None
            }
        }
    }

    pub fn save(&self, worksheet: &str, year: i32, rows: &[TrackedBill]) -> Result<(), SyncError> {
        fs::create_dir_all(&self.dir).map_err(|e| io_err(&self.dir, e))?;
        let snapshot = SnapshotFile {
            saved_at: Utc::now(),
            rows: rows.to_vec(),
        };
        let path = self.path(worksheet, year);
        let tmp = path.with_extension("json.tmp");
        let body = serde_json::to_vec_pretty(&snapshot)?;
        fs::write(&tmp, body).map_err(|e| io_err(&tmp, e))?;
        fs::rename(&tmp, &path).map_err(|e| io_err(&path, e))?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Sheet statistics
// ---------------------------------------------------------------------------

/// Aggregate counts over a worksheet's rows, for `/stats` and the CLI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SheetStats {
    pub total_rows: usize,
    pub by_state: BTreeMap<String, usize>,
    pub by_status: BTreeMap<String, usize>,
    pub unknown_status: usize,
    pub missing_url: usize,
}

impl SheetStats {
    pub fn from_rows(rows: &[TrackedBill]) -> Self {
        let mut stats = SheetStats {
            total_rows: rows.len(),
            ..SheetStats::default()
        };
        for row in rows {
            if !row.state.is_empty() {
                *stats.by_state.entry(row.state.clone()).or_insert(0) += 1;
            }
            if row.status.is_empty() || row.status == UNKNOWN {
                stats.unknown_status += 1;
            } else {
                *stats.by_status.entry(row.status.clone()).or_insert(0) += 1;
            }
            if row.url.is_empty() {
                stats.missing_url += 1;
            }
        }
        stats
    }
}
