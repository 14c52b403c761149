//! Error types for billtrack-notify.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    /// Network-level failure talking to a notification service.
    #[error("notification transport error: {0}")]
    Transport(String),

    /// Login rejected or session expired.
    #[error("notification auth failed: {0}")]
    Auth(String),

    /// Service accepted the connection but rejected the request.
    #[error("notification rejected: {0}")]
    Rejected(String),

    /// Throttle-state I/O failure.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("notification JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> NotifyError {
    NotifyError::Io {
        path: path.into(),
        source,
    }
}
