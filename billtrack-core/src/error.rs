//! Error types for billtrack-core.

use thiserror::Error;

/// All errors that can arise from reading runtime configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable was not set.
    #[error("missing required environment variable '{name}'")]
    MissingEnv { name: String },

    /// An environment variable was set to an unparseable value.
    #[error("invalid value '{value}' for environment variable '{name}'")]
    InvalidEnv { name: String, value: String },
}

/// Errors raised when resolving named columns in a worksheet header row.
#[derive(Debug, Error)]
pub enum HeaderError {
    /// The worksheet header row does not contain a required column.
    #[error("worksheet is missing required column '{0}'")]
    MissingColumn(String),
}
