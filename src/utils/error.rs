//! The `error` module defines the error type used throughout `sbexport`.
//!
//! The exporter never recovers locally: every failure, whether a bad filter
//! pattern, a failed management request or a malformed duration, is carried
//! up to `main` as an `ExportError` and ends the run.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ExportError>;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("invalid entity filter pattern: {0}")]
    FilterPattern(#[from] regex::Error),

    #[error("invalid connection string: {0}")]
    ConnectionString(String),

    #[error("failed to load settings: {0}")]
    Settings(#[from] config::ConfigError),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{url} returned {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    #[error("export cancelled")]
    Cancelled,

    #[error("invalid ISO-8601 duration '{0}'")]
    Duration(String),

    #[error("malformed forward reference '{0}'")]
    ForwardReference(String),

    #[error("malformed management response: {0}")]
    MalformedResponse(String),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl ExportError {
    pub(crate) fn malformed(message: impl std::fmt::Display) -> Self {
        Self::MalformedResponse(message.to_string())
    }
}
