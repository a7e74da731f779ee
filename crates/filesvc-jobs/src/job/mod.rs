//! Download job: fetch once, broadcast to many.
//!
//! A `DownloadJob` owns the lifecycle of one resource's bytes. Any number of
//! subscribers may attach; the first one to find the job idle starts the
//! fetch, everyone else shares it.
//!
//! # Concurrency Model
//!
//! - `inner` (state + subscribers) is a short-lived `parking_lot::Mutex`; the
//!   idle -> fetching check-and-set happens under it, so concurrent
//!   subscribers start at most one fetch. No callback runs while it is held.
//! - Each subscriber has its own re-entrant delivery gate. Fan-out holds one
//!   gate per callback, so removal waits only for that subscriber's callback
//!   in flight, and `subscribe` never waits on other subscribers.
//! - Lock order: gate -> inner. `inner` is never held while taking a gate.
//! - Fan-out re-checks the state revision under each gate, so a subscriber
//!   never sees an older outcome after a newer one.

mod state;
mod subscription;

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use filesvc_core::{
    FileError, FileEvent, FileEventEmitterPort, FileFetcherPort, FileResult, JobStatus,
    ProgressSink, fetch_bytes,
};

use crate::progress::ProgressThrottle;
use state::{JobInner, JobState};
use subscription::{Delivery, Listener, Subscriber};

pub use subscription::{SubscriptionHandlers, SubscriptionId};

/// Collaborators and settings shared by every job of one cache.
pub(crate) struct JobContext {
    pub(crate) fetcher: Arc<dyn FileFetcherPort>,
    pub(crate) emitter: Arc<dyn FileEventEmitterPort>,
    pub(crate) runtime: Handle,
    pub(crate) progress_interval: Duration,
    pub(crate) cancel_when_unsubscribed: bool,
}

/// One resource's fetch-once, broadcast-to-many download.
///
/// Jobs are created by [`JobCache`](crate::JobCache) and always live behind an
/// `Arc`. None of the public operations can fail; fetch errors are delivered
/// to subscribers.
pub struct DownloadJob {
    key: String,
    display_name: String,
    ctx: Arc<JobContext>,
    inner: Mutex<JobInner>,
    status_tx: watch::Sender<JobStatus>,
    created_at: DateTime<Utc>,
    detached: AtomicBool,
    weak_self: Weak<Self>,
}

impl DownloadJob {
    pub(crate) fn new(key: String, display_name: String, ctx: Arc<JobContext>) -> Arc<Self> {
        let (status_tx, _) = watch::channel(JobStatus::Idle);
        Arc::new_cyclic(|weak_self| Self {
            key,
            display_name,
            ctx,
            inner: Mutex::new(JobInner::new()),
            status_tx,
            created_at: Utc::now(),
            detached: AtomicBool::new(false),
            weak_self: weak_self.clone(),
        })
    }

    /// Storage key this job fetches.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Display name of the resource, for diagnostics.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// When the job was created.
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// When the most recent subscriber attached.
    pub fn last_subscribed_at(&self) -> Option<DateTime<Utc>> {
        self.inner.lock().last_subscribed_at
    }

    /// Number of currently registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.inner.lock().subscribers.len()
    }

    /// Whether the owning cache has been cleared since this job was handed out.
    pub fn is_detached(&self) -> bool {
        self.detached.load(Ordering::Acquire)
    }

    pub(crate) fn detach(&self) {
        self.detached.store(true, Ordering::Release);
    }

    /// Current status snapshot.
    pub fn status(&self) -> JobStatus {
        self.inner.lock().state.status()
    }

    /// Watch status transitions.
    pub fn watch_status(&self) -> watch::Receiver<JobStatus> {
        self.status_tx.subscribe()
    }

    /// Wait until the job reaches a terminal state.
    ///
    /// This does not start a fetch. With cancel-on-unsubscribe enabled, a job
    /// that loses all subscribers returns to idle and this keeps waiting.
    pub async fn settled(&self) -> JobStatus {
        let mut rx = self.status_tx.subscribe();
        match rx.wait_for(JobStatus::is_terminal).await {
            Ok(status) => status.clone(),
            Err(_) => self.status(),
        }
    }

    /// Register a subscriber.
    ///
    /// The current state is replayed synchronously on the calling thread
    /// before this returns: cached data, else a recorded error, else the last
    /// progress value. If the job is idle, the fetch is started. Callbacks
    /// running for other subscribers do not delay this call.
    pub fn subscribe(&self, handlers: SubscriptionHandlers) -> SubscriptionId {
        let id = SubscriptionId::generate();
        let (listener, on_removed) = handlers.into_parts();
        let delivery = Delivery::new(listener);

        // Fan-out reaching this subscriber waits until replay is done.
        let gate = delivery.enter();
        let (replay, started) = {
            let mut inner = self.inner.lock();
            inner.subscribers.push(Subscriber {
                id,
                delivery: delivery.clone(),
                on_removed,
            });
            inner.last_subscribed_at = Some(Utc::now());

            let replay = inner.state.replay();
            let started = inner.begin_fetch(ProgressThrottle::new(self.ctx.progress_interval));
            if started.is_some() {
                self.publish_status(&inner);
            }
            (replay, started)
        };

        tracing::debug!(
            target: "filesvc.jobs",
            key = %self.key,
            subscription = %id,
            "Subscriber attached"
        );
        replay.deliver(delivery.listener());
        drop(gate);

        if let Some((generation, cancel)) = started {
            self.spawn_fetch(generation, cancel);
        }
        id
    }

    /// Inject bytes that are already available, bypassing the fetcher.
    ///
    /// Current subscribers are notified as for a fetch success. An in-flight
    /// fetch is abandoned and its result discarded. A job that already holds
    /// data keeps it; later injections are ignored.
    pub fn set_local_data(&self, data: impl Into<Bytes>) {
        let data = data.into();
        let bytes = data.len();

        let (deliveries, revision, abandoned) = {
            let mut inner = self.inner.lock();
            if matches!(inner.state, JobState::Succeeded(_)) {
                tracing::debug!(
                    target: "filesvc.jobs",
                    key = %self.key,
                    bytes,
                    "Job already holds data, local data ignored"
                );
                return;
            }
            let (previous, revision) = inner.settle(JobState::Succeeded(data.clone()));
            let abandoned = match previous {
                JobState::Fetching(active) => Some(active.cancel),
                _ => None,
            };
            (inner.deliveries(), revision, abandoned)
        };

        if let Some(cancel) = abandoned {
            cancel.cancel();
        }
        tracing::debug!(
            target: "filesvc.jobs",
            key = %self.key,
            bytes,
            subscribers = deliveries.len(),
            "Local data injected"
        );
        self.fan_out(
            &deliveries,
            |inner| inner.revision() == revision,
            |listener| listener.success(&data),
        );
        self.status_tx.send_replace(JobStatus::Succeeded { bytes });

        self.ctx.emitter.emit(FileEvent::LocalDataInjected {
            key: self.key.clone(),
            bytes,
        });
    }

    /// Remove a subscriber by handle.
    ///
    /// Its `on_removed` callback runs before this returns, and none of its
    /// other callbacks run afterwards. If one of its callbacks is running on
    /// another thread, this waits for it. Unknown handles are ignored;
    /// returns whether a subscriber was removed.
    pub fn remove_subscriber(&self, id: SubscriptionId) -> bool {
        let (removed, abandoned) = {
            let mut inner = self.inner.lock();
            let Some(pos) = inner.subscribers.iter().position(|s| s.id == id) else {
                return false;
            };
            let removed = inner.subscribers.remove(pos);

            let abandoned = if self.ctx.cancel_when_unsubscribed && inner.subscribers.is_empty() {
                match std::mem::replace(&mut inner.state, JobState::Idle) {
                    JobState::Fetching(active) => {
                        self.publish_status(&inner);
                        Some(active.cancel)
                    }
                    other => {
                        inner.state = other;
                        None
                    }
                }
            } else {
                None
            };
            (removed, abandoned)
        };

        removed.delivery.close();
        tracing::debug!(
            target: "filesvc.jobs",
            key = %self.key,
            subscription = %id,
            "Subscriber removed"
        );
        if let Some(on_removed) = removed.on_removed {
            on_removed();
        }

        if let Some(cancel) = abandoned {
            cancel.cancel();
            tracing::debug!(
                target: "filesvc.jobs",
                key = %self.key,
                "Last subscriber left, fetch abandoned"
            );
            self.ctx.emitter.emit(FileEvent::FetchCancelled {
                key: self.key.clone(),
            });
        }
        true
    }

    fn publish_status(&self, inner: &JobInner) {
        self.status_tx.send_replace(inner.state.status());
    }

    /// Deliver to each subscriber under its own gate while `current` holds.
    fn fan_out(
        &self,
        deliveries: &[Delivery],
        current: impl Fn(&JobInner) -> bool,
        deliver: impl Fn(&Listener),
    ) {
        for delivery in deliveries {
            delivery.run(|listener| {
                let still_current = current(&self.inner.lock());
                if still_current {
                    deliver(listener);
                }
            });
        }
    }

    fn spawn_fetch(&self, generation: u64, cancel: CancellationToken) {
        let Some(job) = self.weak_self.upgrade() else {
            return;
        };
        tracing::debug!(
            target: "filesvc.jobs",
            key = %self.key,
            name = %self.display_name,
            generation,
            "Starting fetch"
        );
        self.ctx.emitter.emit(FileEvent::FetchStarted {
            key: self.key.clone(),
        });

        let task = self
            .ctx
            .runtime
            .spawn(Arc::clone(&job).run_fetch(generation, cancel));
        // A panicking fetcher must still settle the job.
        self.ctx.runtime.spawn(async move {
            if let Err(err) = task.await {
                if err.is_panic() {
                    tracing::error!(
                        target: "filesvc.jobs",
                        key = %job.key,
                        generation,
                        "Fetcher panicked"
                    );
                    job.finish(generation, Err(FileError::transport("fetcher panicked")));
                }
            }
        });
    }

    async fn run_fetch(self: Arc<Self>, generation: u64, cancel: CancellationToken) {
        let sink = {
            let job = Arc::downgrade(&self);
            ProgressSink::new(move |fraction| {
                if let Some(job) = job.upgrade() {
                    job.report_progress(generation, fraction);
                }
            })
        };
        let fetcher = Arc::clone(&self.ctx.fetcher);

        let outcome = tokio::select! {
            () = cancel.cancelled() => {
                tracing::debug!(target: "filesvc.jobs", key = %self.key, generation, "Fetch cancelled");
                return;
            }
            outcome = fetch_bytes(fetcher.as_ref(), &self.key, sink) => outcome,
        };
        self.finish(generation, outcome);
    }

    fn report_progress(&self, generation: u64, fraction: f32) {
        let deliveries = {
            let mut inner = self.inner.lock();
            let forward = inner.record_progress(generation, fraction);
            if inner.state.generation() == Some(generation) {
                self.publish_status(&inner);
            }
            if !forward {
                return;
            }
            inner.progress_deliveries()
        };

        self.fan_out(
            &deliveries,
            |inner| inner.state.generation() == Some(generation),
            |listener| listener.progress(fraction),
        );
    }

    fn finish(&self, generation: u64, outcome: FileResult<Bytes>) {
        let (deliveries, revision) = {
            let mut inner = self.inner.lock();
            if inner.state.generation() != Some(generation) {
                tracing::debug!(
                    target: "filesvc.jobs",
                    key = %self.key,
                    generation,
                    "Discarding stale fetch result"
                );
                return;
            }
            let (_, revision) = inner.settle(match &outcome {
                Ok(data) => JobState::Succeeded(data.clone()),
                Err(error) => JobState::Failed(error.clone()),
            });
            (inner.deliveries(), revision)
        };

        self.fan_out(
            &deliveries,
            |inner| inner.revision() == revision,
            |listener| match &outcome {
                Ok(data) => listener.success(data),
                Err(error) => listener.error(error),
            },
        );
        // Terminal status goes out only after every callback has run.
        self.publish_status(&self.inner.lock());

        let event = match outcome {
            Ok(data) => {
                tracing::debug!(target: "filesvc.jobs", key = %self.key, bytes = data.len(), "Fetch succeeded");
                FileEvent::FetchSucceeded {
                    key: self.key.clone(),
                    bytes: data.len(),
                }
            }
            Err(error) => {
                tracing::warn!(target: "filesvc.jobs", key = %self.key, error = %error, "Fetch failed");
                FileEvent::fetch_failed(self.key.clone(), error)
            }
        };
        self.ctx.emitter.emit(event);
    }
}

impl fmt::Debug for DownloadJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DownloadJob")
            .field("key", &self.key)
            .field("status", &self.status())
            .field("subscribers", &self.subscriber_count())
            .field("detached", &self.is_detached())
            .finish_non_exhaustive()
    }
}
