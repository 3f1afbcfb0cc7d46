//! Error types for checks.
//!
//! None of these are recoverable from inside a test: the tester turns each
//! one into a fatal failure at the chain boundary.

use httpcheck_domain::DomainError;
use thiserror::Error;

/// Errors raised while preparing, sending or inspecting a check.
#[derive(Debug, Error)]
pub enum CheckError {
    /// A body or multipart part could not be produced.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The transient server could not bind a loopback listener.
    #[error("failed to bind test server: {0}")]
    Bind(#[source] std::io::Error),

    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(String),

    /// A header name is not a valid token.
    #[error("invalid header name: {0}")]
    InvalidHeaderName(String),

    /// A header value contains characters not allowed on the wire.
    #[error("invalid header value for {name}: {value:?}")]
    InvalidHeaderValue {
        /// Header the value was meant for.
        name: String,
        /// Rejected value.
        value: String,
    },

    /// The request target could not be resolved against the server address.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// An assertion or dispatch was attempted with nothing to act on.
    #[error("{0}")]
    Usage(&'static str),

    /// The request timed out.
    #[error("request timed out after {timeout_ms}ms")]
    Timeout {
        /// Configured timeout.
        timeout_ms: u64,
    },

    /// The server refused the connection.
    #[error("connection refused by {host}:{port}")]
    ConnectionRefused {
        /// Target host.
        host: String,
        /// Target port.
        port: u16,
    },

    /// The connection failed for another reason.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The redirect policy stopped the request.
    #[error("redirect policy rejected the response: {0}")]
    Redirect(String),

    /// The response body could not be read.
    #[error("failed to read response body: {0}")]
    BodyRead(String),

    /// Any other transport failure.
    #[error("transport error: {0}")]
    Transport(String),
}

/// Result type alias for check operations.
pub type CheckResult<T> = Result<T, CheckError>;
