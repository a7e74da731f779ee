//! Internal error types for HTTP fetches.
//!
//! These errors are internal to `filesvc-http` and are mapped to
//! [`FileError`](filesvc_core::FileError) at the port boundary.

use thiserror::Error;

/// Result type alias for HTTP operations.
pub type HttpResult<T> = Result<T, HttpError>;

/// Errors related to HTTP fetches.
#[derive(Debug, Error)]
pub enum HttpError {
    /// The storage key could not be turned into a fetchable URL.
    #[error("Cannot resolve key '{key}' to a URL: {reason}")]
    UnresolvableKey {
        /// The key as given
        key: String,
        /// Why resolution failed
        reason: String,
    },

    /// The server answered with a non-success status.
    #[error("HTTP {status}")]
    Status {
        /// The status line, e.g. `404 Not Found`
        status: reqwest::StatusCode,
    },

    /// Network or HTTP client error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The configured base URL is malformed.
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),
}
