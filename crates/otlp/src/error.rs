//! Error types for OTLP decoding

use thiserror::Error;

/// Result type for OTLP operations
pub type Result<T> = std::result::Result<T, OtlpError>;

/// Errors that can occur while reading OTLP payloads
#[derive(Error, Debug)]
pub enum OtlpError {
    /// Payload is not a valid protobuf `TracesData` message
    #[error("Protobuf decode error: {0}")]
    Decode(#[from] prost::DecodeError),

    /// I/O error while reading a payload
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
