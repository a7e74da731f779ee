//! File events and job status snapshots.

use serde::{Deserialize, Serialize};

use super::errors::FileError;

/// Point-in-time view of a download job.
///
/// This is a snapshot for observers and instrumentation; the payload bytes
/// themselves are only delivered through subscriptions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum JobStatus {
    /// No fetch has been started (or the last one was cancelled).
    Idle,
    /// A fetch is in flight.
    Fetching {
        /// Last reported fraction in `[0, 1]`, if any.
        #[serde(skip_serializing_if = "Option::is_none")]
        progress: Option<f32>,
    },
    /// Data is available.
    Succeeded {
        /// Size of the cached payload.
        bytes: usize,
    },
    /// The fetch failed; the error is replayed to new subscribers.
    Failed {
        /// The recorded error.
        error: FileError,
    },
}

impl JobStatus {
    /// Whether the job reached a terminal state.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded { .. } | Self::Failed { .. })
    }

    /// Whether a fetch is in flight.
    #[must_use]
    pub const fn is_fetching(&self) -> bool {
        matches!(self, Self::Fetching { .. })
    }

    /// Short lowercase label for logs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Fetching { .. } => "fetching",
            Self::Succeeded { .. } => "succeeded",
            Self::Failed { .. } => "failed",
        }
    }
}

/// Single discriminated union for all file job events.
///
/// Events describe job and cache lifecycle transitions. Progress is not part
/// of this stream; it is delivered to subscribers directly.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FileEvent {
    /// A job was created on a cache miss.
    JobCreated {
        /// Storage key of the resource.
        key: String,
    },

    /// The fetcher was invoked for a job.
    FetchStarted {
        /// Storage key of the resource.
        key: String,
    },

    /// The fetch completed with data.
    FetchSucceeded {
        /// Storage key of the resource.
        key: String,
        /// Payload size.
        bytes: usize,
    },

    /// The fetch failed.
    FetchFailed {
        /// Storage key of the resource.
        key: String,
        /// The terminal error.
        error: FileError,
    },

    /// An in-flight fetch was abandoned after its last subscriber left.
    FetchCancelled {
        /// Storage key of the resource.
        key: String,
    },

    /// Data was injected without fetching.
    LocalDataInjected {
        /// Storage key of the resource.
        key: String,
        /// Payload size.
        bytes: usize,
    },

    /// The job cache was cleared.
    CacheCleared {
        /// Number of jobs detached from the cache.
        evicted: usize,
    },
}

impl FileEvent {
    /// Create a fetch failed event.
    pub fn fetch_failed(key: impl Into<String>, error: FileError) -> Self {
        Self::FetchFailed {
            key: key.into(),
            error,
        }
    }

    /// Get the storage key this event refers to, if any.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::JobCreated { key }
            | Self::FetchStarted { key }
            | Self::FetchSucceeded { key, .. }
            | Self::FetchFailed { key, .. }
            | Self::FetchCancelled { key }
            | Self::LocalDataInjected { key, .. } => Some(key),
            Self::CacheCleared { .. } => None,
        }
    }

    /// Get the event name for logging.
    #[must_use]
    pub const fn event_name(&self) -> &'static str {
        match self {
            Self::JobCreated { .. } => "job_created",
            Self::FetchStarted { .. } => "fetch_started",
            Self::FetchSucceeded { .. } => "fetch_succeeded",
            Self::FetchFailed { .. } => "fetch_failed",
            Self::FetchCancelled { .. } => "fetch_cancelled",
            Self::LocalDataInjected { .. } => "local_data_injected",
            Self::CacheCleared { .. } => "cache_cleared",
        }
    }
}
