//! Per-worksheet run state: digest, success marker, format signature.
//!
//! The success marker is cleared at the start of a pass and set only after
//! snapshot and digest are persisted, so a crash mid-pass forces the next
//! pass down the full reconciliation path.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{io_err, SyncError};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunState {
    /// Digest persisted by the last successful pass.
    pub digest: Option<String>,
    /// True only when the previous pass completed end to end.
    pub last_success: bool,
    /// Header signature of the last applied formatting pass.
    pub format_signature: Option<String>,
}

pub struct RunStateStore {
    dir: PathBuf,
}

impl RunStateStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        RunStateStore {
            dir: data_dir.into().join("state"),
        }
    }

    fn path(&self, worksheet: &str, year: i32) -> PathBuf {
        self.dir.join(format!("{worksheet}-{year}.json"))
    }

    /// Missing or unreadable state reads as the default (no digest, no
    /// success, no formatting applied).
    pub fn load(&self, worksheet: &str, year: i32) -> RunState {
        let path = self.path(worksheet, year);
        fs::read(&path)
            .ok()
            .and_then(|body| serde_json::from_slice(&body).ok())
            .unwrap_or_default()
    }

    pub fn save(&self, worksheet: &str, year: i32, state: &RunState) -> Result<(), SyncError> {
        fs::create_dir_all(&self.dir).map_err(|e| io_err(&self.dir, e))?;
        let path = self.path(worksheet, year);
        let tmp = path.with_extension("json.tmp");
        let body = serde_json::to_vec_pretty(state)?;
        fs::write(&tmp, body).map_err(|e| io_err(&tmp, e))?;
        fs::rename(&tmp, &path).map_err(|e| io_err(&path, e))?;
        Ok(())
    }

    /// Drop the success marker, keeping digest and format signature.
    /// Returns the state as it stood before the clear, so the caller can
    /// still see whether the previous pass succeeded.
    pub fn clear_success(&self, worksheet: &str, year: i32) -> Result<RunState, SyncError> {
        let prior = self.load(worksheet, year);
        let mut cleared = prior.clone();
        cleared.last_success = false;
        self.save(worksheet, year, &cleared)?;
        Ok(prior)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_state_reads_as_default() {
        let dir = TempDir::new().unwrap();
        let store = RunStateStore::new(dir.path());
        assert_eq!(store.load("W", 2025), RunState::default());
    }

    #[test]
    fn clear_success_keeps_digest() {
        let dir = TempDir::new().unwrap();
        let store = RunStateStore::new(dir.path());
        store
            .save(
                "W",
                2025,
                &RunState {
                    digest: Some("d".into()),
                    last_success: true,
                    format_signature: Some("f".into()),
                },
            )
            .unwrap();

        let prior = store.clear_success("W", 2025).unwrap();
        assert!(prior.last_success, "caller sees the pre-clear state");
        assert_eq!(prior.digest.as_deref(), Some("d"));

        let reloaded = store.load("W", 2025);
        assert!(!reloaded.last_success);
        assert_eq!(reloaded.digest.as_deref(), Some("d"));
        assert_eq!(reloaded.format_signature.as_deref(), Some("f"));
    }
}
