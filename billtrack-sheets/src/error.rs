//! Error types for billtrack-sheets.

use thiserror::Error;

/// All errors that can arise from tabular-store operations.
///
/// A failed batch update or formatting call fails the worksheet pass; the
/// caller's success marker stays cleared so the next pass retries fully.
#[derive(Debug, Error)]
pub enum SheetError {
    /// Network or HTTP failure talking to the store.
    #[error("sheet transport error: {0}")]
    Transport(#[from] Box<ureq::Error>),

    /// The store answered with something we could not interpret.
    #[error("sheet protocol error: {0}")]
    Protocol(String),

    /// A malformed A1 range or cell reference.
    #[error("invalid sheet range '{0}'")]
    BadRange(String),

    /// JSON decode failure on a store response.
    #[error("sheet JSON error: {0}")]
    Json(#[from] std::io::Error),
}

impl From<ureq::Error> for SheetError {
    fn from(err: ureq::Error) -> Self {
        SheetError::Transport(Box::new(err))
    }
}
