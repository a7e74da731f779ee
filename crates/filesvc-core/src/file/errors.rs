//! File fetch error types.
//!
//! These errors are stored on a job and replayed to late subscribers, so they
//! must be cheap to clone and must not hold non-serializable sources such as
//! `reqwest::Error` or `std::io::Error`. Adapters capture the message as a
//! string at the port boundary.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for file fetch operations.
///
/// Every variant is terminal for the job that recorded it.
#[derive(Clone, Debug, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum FileError {
    /// The fetcher could not resolve the storage key to a fetchable address.
    #[error("Invalid resource key: {key}")]
    InvalidKey {
        /// The key that could not be resolved.
        key: String,
    },

    /// Network or I/O failure while fetching.
    #[error("Transport failure: {}", message.as_deref().unwrap_or("unknown error"))]
    TransportFailure {
        /// Human-readable detail, when the transport provided one.
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },

    /// The fetch completed with neither data nor an error.
    #[error("Fetch completed without data")]
    EmptyResponse,
}

impl FileError {
    /// Create an invalid key error.
    pub fn invalid_key(key: impl Into<String>) -> Self {
        Self::InvalidKey { key: key.into() }
    }

    /// Create a transport failure carrying a message.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::TransportFailure {
            message: Some(message.into()),
        }
    }

    /// Create a transport failure without detail.
    #[must_use]
    pub const fn transport_unknown() -> Self {
        Self::TransportFailure { message: None }
    }

    /// Create a transport failure from a `std::io::Error`.
    #[must_use]
    pub fn from_io_error(err: &std::io::Error) -> Self {
        let kind = err.kind();
        Self::TransportFailure {
            message: Some(format!("{kind:?}: {err}")),
        }
    }

    /// Short diagnostic message for presentation layers.
    #[must_use]
    pub fn diagnostic(&self) -> String {
        match self {
            Self::InvalidKey { key } => format!("Could not locate file '{key}'."),
            Self::TransportFailure {
                message: Some(message),
            } => format!("Download failed: {message}"),
            Self::TransportFailure { message: None } => "Download failed.".to_string(),
            Self::EmptyResponse => "The server returned no data.".to_string(),
        }
    }
}

/// Convenience result type for file operations.
pub type FileResult<T> = Result<T, FileError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::TimedOut, "read timed out");
        let err = FileError::from_io_error(&io_err);

        match err {
            FileError::TransportFailure {
                message: Some(message),
            } => {
                assert!(message.starts_with("TimedOut"));
                assert!(message.contains("read timed out"));
            }
            other => panic!("Expected TransportFailure, got {other:?}"),
        }
    }

    #[test]
    fn test_error_serialization() {
        let err = FileError::transport("timeout");
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("timeout"));

        let parsed: FileError = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, err);
    }

    #[test]
    fn test_transport_without_message_skips_field() {
        let json = serde_json::to_string(&FileError::transport_unknown()).unwrap();
        assert!(!json.contains("message"));
    }

    #[test]
    fn test_display_and_diagnostics() {
        assert_eq!(
            FileError::transport("timeout").to_string(),
            "Transport failure: timeout"
        );
        assert_eq!(
            FileError::transport_unknown().to_string(),
            "Transport failure: unknown error"
        );
        assert!(FileError::invalid_key("img-42").diagnostic().contains("img-42"));
        assert!(FileError::EmptyResponse.diagnostic().contains("no data"));
    }
}
