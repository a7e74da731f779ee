//! Get-or-create registry of download jobs.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use parking_lot::Mutex;
use tokio::runtime::Handle;

use filesvc_core::{
    FileEvent, FileEventEmitterPort, FileFetcherPort, FileResource, FileServiceConfig,
};

use crate::job::{DownloadJob, JobContext};

/// Dependencies for creating a job cache.
pub struct JobCacheDeps {
    /// Port that performs the actual fetches.
    pub fetcher: Arc<dyn FileFetcherPort>,
    /// Port for emitting job and cache events.
    pub event_emitter: Arc<dyn FileEventEmitterPort>,
    /// Job layer configuration.
    pub config: FileServiceConfig,
    /// Runtime the fetches are spawned on.
    pub runtime: Handle,
}

/// Build a shared job cache from its dependencies.
pub fn build_job_cache(deps: JobCacheDeps) -> Arc<JobCache> {
    Arc::new(JobCache::new(deps))
}

/// Process-scoped map from storage key to its download job.
///
/// The cache is the only owner that keeps jobs reachable by key. There is no
/// eviction policy; the owning application calls [`clear`](Self::clear) on
/// memory pressure or teardown.
pub struct JobCache {
    ctx: Arc<JobContext>,
    /// Guarded by a single lock; never held while calling into a job.
    jobs: Mutex<HashMap<String, Arc<DownloadJob>>>,
}

impl JobCache {
    /// Create an empty cache.
    pub fn new(deps: JobCacheDeps) -> Self {
        let ctx = JobContext {
            fetcher: deps.fetcher,
            emitter: deps.event_emitter,
            runtime: deps.runtime,
            progress_interval: deps.config.effective_progress_interval(),
            cancel_when_unsubscribed: deps.config.effective_cancel_when_unsubscribed(),
        };
        Self {
            ctx: Arc::new(ctx),
            jobs: Mutex::new(HashMap::new()),
        }
    }

    /// Get the job for `resource`, creating it on first use.
    ///
    /// Until the next [`clear`](Self::clear), every call with the same storage
    /// key returns the same instance. Creating a job does not start a fetch;
    /// the first subscriber does.
    pub fn job_for_resource(&self, resource: impl FileResource) -> Arc<DownloadJob> {
        let key = resource.storage_key();
        let created = {
            let mut jobs = self.jobs.lock();
            if let Some(job) = jobs.get(key) {
                return Arc::clone(job);
            }
            let job = DownloadJob::new(
                key.to_owned(),
                resource.display_name().to_owned(),
                Arc::clone(&self.ctx),
            );
            jobs.insert(key.to_owned(), Arc::clone(&job));
            job
        };

        tracing::debug!(
            target: "filesvc.cache",
            key = %created.key(),
            name = %created.display_name(),
            "Created download job"
        );
        self.ctx.emitter.emit(FileEvent::JobCreated {
            key: created.key().to_owned(),
        });
        created
    }

    /// Store bytes for `resource` without fetching them.
    pub fn add_local_data(&self, data: impl Into<Bytes>, resource: impl FileResource) {
        self.job_for_resource(resource).set_local_data(data);
    }

    /// Drop every job.
    ///
    /// Jobs already handed out keep working for their subscribers but are
    /// marked detached; the next lookup for the same key creates a new job.
    pub fn clear(&self) {
        let evicted: Vec<Arc<DownloadJob>> = {
            let mut jobs = self.jobs.lock();
            jobs.drain().map(|(_, job)| job).collect()
        };
        for job in &evicted {
            job.detach();
        }

        tracing::info!(target: "filesvc.cache", evicted = evicted.len(), "Job cache cleared");
        self.ctx.emitter.emit(FileEvent::CacheCleared {
            evicted: evicted.len(),
        });
    }

    /// Number of cached jobs.
    pub fn len(&self) -> usize {
        self.jobs.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.lock().is_empty()
    }

    /// Whether a job is cached for `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.jobs.lock().contains_key(key)
    }
}

impl fmt::Debug for JobCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobCache")
            .field("jobs", &self.len())
            .field("progress_interval", &self.ctx.progress_interval)
            .field("cancel_when_unsubscribed", &self.ctx.cancel_when_unsubscribed)
            .finish_non_exhaustive()
    }
}
