//! Error types for billtrack-client.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from upstream fetches and local caches.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network-level failure (DNS, TLS, timeout) or retry budget exhausted
    /// on a transient HTTP status.
    #[error("upstream transport error for {url}: {reason}")]
    Transport { url: String, reason: String },

    /// Non-retryable HTTP status, malformed JSON body, or an envelope
    /// missing its expected payload key.
    #[error("upstream protocol error for {url}: {reason}")]
    Protocol { url: String, reason: String },

    /// Local cache I/O failure, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Cache JSON serialization/deserialization error.
    #[error("cache JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience constructor for [`ClientError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ClientError {
    ClientError::Io {
        path: path.into(),
        source,
    }
}
