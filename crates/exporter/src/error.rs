//! Error types for the trace exporter

use crate::dsn::DsnError;
use thiserror::Error;

/// Result type for exporter operations
pub type Result<T> = std::result::Result<T, ExporterError>;

/// Errors surfaced to the host
///
/// Everything except `Shutdown` is a construction error: the exporter refuses
/// to start. Per-batch send failures never show up here.
#[derive(Debug, Error)]
pub enum ExporterError {
    /// Configured batch size is not a positive integer
    #[error("uptrace: got batch_size={0}, wanted > 0")]
    InvalidBatchSize(i64),

    /// DSN is missing or malformed
    #[error("uptrace: invalid DSN: {0}")]
    Dsn(#[from] DsnError),

    /// HTTP client could not be built
    #[error("uptrace: can't create HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// Sender failed to release its resources
    #[error("uptrace: shutdown failed: {0}")]
    Shutdown(#[source] SendError),
}

/// Errors from sending a single batch
#[derive(Debug, Error)]
pub enum SendError {
    /// Transport-layer error (connect, timeout, cancelled request)
    #[error("transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status
    #[error("backend returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// Batch could not be serialized
    #[error("serialization error: {0}")]
    Encode(#[from] serde_json::Error),

    /// Compression or other I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Sender was shut down
    #[error("sender is shut down")]
    Closed,

    /// Error from a custom sender
    #[error("{0}")]
    Other(String),
}

impl From<String> for SendError {
    fn from(s: String) -> Self {
        SendError::Other(s)
    }
}

impl From<&str> for SendError {
    fn from(s: &str) -> Self {
        SendError::Other(s.to_string())
    }
}
