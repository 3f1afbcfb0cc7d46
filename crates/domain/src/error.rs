//! Domain error types

use thiserror::Error;

/// Errors raised while preparing request or expectation payloads.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A value could not be encoded as JSON.
    #[error("failed to encode JSON: {0}")]
    JsonEncode(#[from] serde_json::Error),

    /// A value could not be encoded as XML.
    #[error("failed to encode XML: {0}")]
    XmlEncode(#[from] quick_xml::SeError),

    /// A multipart file part could not be read from disk.
    #[error("failed to read multipart file {path}: {source}")]
    FileRead {
        /// Path of the file that was requested.
        path: String,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// A multipart part has a name that cannot be written into the envelope.
    #[error("invalid multipart field name: {0}")]
    InvalidFieldName(String),
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
