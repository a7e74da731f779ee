//! Job layer configuration and validation.
//!
//! Pure configuration types with no infrastructure dependencies. Adapters
//! (CLI flags, environment, embedding apps) build a `FileServiceConfig` and
//! hand it to the job cache.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default minimum spacing between progress fan-outs, in milliseconds.
pub const DEFAULT_PROGRESS_INTERVAL_MS: u64 = 100;

/// Upper bound accepted for the progress interval.
pub const MAX_PROGRESS_INTERVAL_MS: u64 = 10_000;

/// Job layer configuration.
///
/// All fields are optional to support partial overrides and graceful defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FileServiceConfig {
    /// Minimum spacing between progress callbacks for one job.
    /// `0` forwards every report.
    pub progress_interval_ms: Option<u64>,

    /// Abandon an in-flight fetch once its last subscriber is removed.
    pub cancel_when_unsubscribed: Option<bool>,
}

impl FileServiceConfig {
    /// Create a configuration with sensible defaults.
    #[must_use]
    pub const fn with_defaults() -> Self {
        Self {
            progress_interval_ms: Some(DEFAULT_PROGRESS_INTERVAL_MS),
            cancel_when_unsubscribed: Some(false),
        }
    }

    /// Get the effective progress interval (with default fallback).
    #[must_use]
    pub const fn effective_progress_interval(&self) -> Duration {
        match self.progress_interval_ms {
            Some(ms) => Duration::from_millis(ms),
            None => Duration::from_millis(DEFAULT_PROGRESS_INTERVAL_MS),
        }
    }

    /// Whether fetches are cancelled when nobody is listening anymore.
    #[must_use]
    pub const fn effective_cancel_when_unsubscribed(&self) -> bool {
        match self.cancel_when_unsubscribed {
            Some(cancel) => cancel,
            None => false,
        }
    }

    /// Merge an update into this configuration, only touching fields that are Some.
    pub fn merge(&mut self, other: &FileServiceConfigUpdate) {
        if let Some(interval) = other.progress_interval_ms {
            self.progress_interval_ms = interval;
        }
        if let Some(cancel) = other.cancel_when_unsubscribed {
            self.cancel_when_unsubscribed = cancel;
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if let Some(ms) = self.progress_interval_ms {
            if ms > MAX_PROGRESS_INTERVAL_MS {
                return Err(SettingsError::InvalidProgressInterval(ms));
            }
        }
        Ok(())
    }
}

/// Partial configuration update.
///
/// Each field is `Option<Option<T>>`:
/// - `None` = don't change this field
/// - `Some(None)` = reset field to its default
/// - `Some(Some(value))` = set field to value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileServiceConfigUpdate {
    pub progress_interval_ms: Option<Option<u64>>,
    pub cancel_when_unsubscribed: Option<Option<bool>>,
}

/// Configuration validation error.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("Progress interval must be between 0 and 10,000 ms, got {0}")]
    InvalidProgressInterval(u64),
}
