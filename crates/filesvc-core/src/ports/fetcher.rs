//! Fetcher port definition (trait abstraction).
//!
//! The fetcher is the only collaborator that touches the network. The job
//! layer hands it an opaque storage key and a progress sink and awaits the
//! outcome.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use crate::file::{FileError, FileResult};

// ============================================================================
// Progress Sink
// ============================================================================

/// Callback handle through which a fetcher reports progress.
///
/// Fractions are clamped to `[0, 1]`; `NaN` is dropped. Reports made after the
/// fetch future has resolved are ignored by the job layer.
#[derive(Clone)]
pub struct ProgressSink {
    inner: Arc<dyn Fn(f32) + Send + Sync>,
}

impl ProgressSink {
    /// Wrap a progress callback.
    pub fn new(report: impl Fn(f32) + Send + Sync + 'static) -> Self {
        Self {
            inner: Arc::new(report),
        }
    }

    /// A sink that discards every report.
    #[must_use]
    pub fn noop() -> Self {
        Self::new(|_| {})
    }

    /// Report a completion fraction.
    pub fn report(&self, fraction: f32) {
        if fraction.is_nan() {
            return;
        }
        (self.inner)(fraction.clamp(0.0, 1.0));
    }

    /// Report progress from byte counts.
    ///
    /// Does nothing when the total is unknown or zero.
    #[allow(clippy::cast_precision_loss)] // progress display only
    pub fn report_bytes(&self, downloaded: u64, total: Option<u64>) {
        match total {
            Some(total) if total > 0 => self.report((downloaded as f64 / total as f64) as f32),
            _ => {}
        }
    }
}

impl fmt::Debug for ProgressSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressSink").finish_non_exhaustive()
    }
}

// ============================================================================
// Fetcher Trait
// ============================================================================

/// Port for retrieving the bytes behind a storage key.
///
/// # Contract
///
/// - `Ok(Some(bytes))` - the fetch produced data
/// - `Err(error)` - the fetch failed
/// - `Ok(None)` - the fetch completed with neither (treated as
///   [`FileError::EmptyResponse`] by the job layer)
///
/// `progress` may be invoked any number of times before the future resolves.
/// Implementations perform a single attempt; retry policy is not part of
/// this port.
///
/// # Example
///
/// ```ignore
/// let fetcher: Arc<dyn FileFetcherPort> = Arc::new(HttpFileFetcher::new(&config)?);
/// let bytes = fetch_bytes(fetcher.as_ref(), "avatars/42.jpg", ProgressSink::noop()).await?;
/// ```
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FileFetcherPort: Send + Sync {
    /// Fetch the bytes for `key`.
    async fn fetch(&self, key: &str, progress: ProgressSink) -> Result<Option<Bytes>, FileError>;
}

/// Fetch through a port, folding an empty completion into an error.
pub async fn fetch_bytes(
    fetcher: &dyn FileFetcherPort,
    key: &str,
    progress: ProgressSink,
) -> FileResult<Bytes> {
    fetcher
        .fetch(key, progress)
        .await?
        .ok_or(FileError::EmptyResponse)
}
