//! Deduplicating download jobs for filesvc.
//!
//! - `DownloadJob` - one resource's fetch, broadcast to any number of
//!   subscribers, with at most one fetch in flight
//! - `JobCache` - get-or-create registry keyed by storage key, cleared
//!   explicitly by the owning application
//! - `ProgressThrottle` - rate limit for progress fan-out
//!
//! Fetching itself is delegated to a [`FileFetcherPort`] adapter.
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

#[cfg(test)]
use tokio_test as _;

// Re-export core types for convenience
pub use filesvc_core::{
    Bytes, FileError, FileEvent, FileEventEmitterPort, FileFetcherPort, FileResource,
    FileServiceConfig, JobStatus, ProgressSink, RemoteFile,
};

mod cache;
mod job;
pub(crate) mod progress;

#[cfg(test)]
mod test_support;

pub use cache::{JobCache, JobCacheDeps, build_job_cache};
pub use job::{DownloadJob, SubscriptionHandlers, SubscriptionId};
pub use progress::ProgressThrottle;
