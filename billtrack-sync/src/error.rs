//! Error types for billtrack-sync.

use std::path::PathBuf;

use thiserror::Error;

use billtrack_core::{ConfigError, HeaderError};
use billtrack_sheets::SheetError;

/// Failures that abort a worksheet pass. Per-row problems never surface
/// here; they go into the dev report and the pass continues.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Sheet(#[from] SheetError),

    #[error(transparent)]
    Header(#[from] HeaderError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("state JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
