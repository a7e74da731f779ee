//! Subscription identities and handler sets.

use std::cell::Cell;
use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use filesvc_core::FileError;
use parking_lot::{ReentrantMutex, ReentrantMutexGuard};
use uuid::Uuid;

type SuccessFn = Arc<dyn Fn(Bytes) + Send + Sync>;
type ErrorFn = Arc<dyn Fn(FileError) + Send + Sync>;
type ProgressFn = Arc<dyn Fn(f32) + Send + Sync>;
type RemovedFn = Box<dyn FnOnce() + Send>;

/// Handle returned by [`DownloadJob::subscribe`](super::DownloadJob::subscribe).
///
/// Pass it back to `remove_subscriber` to stop receiving callbacks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    pub(crate) fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// The underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Optional callbacks for one subscriber.
///
/// Every handler defaults to a no-op. Success, error, and progress callbacks
/// run on the thread that produced the state change (a runtime worker for
/// fetch results, the caller's thread for replay inside `subscribe`).
/// `on_removed` runs exactly once, synchronously, inside `remove_subscriber`.
///
/// # Example
///
/// ```
/// use filesvc_jobs::SubscriptionHandlers;
///
/// let handlers = SubscriptionHandlers::new()
///     .on_success(|bytes| println!("got {} bytes", bytes.len()))
///     .on_error(|err| eprintln!("{}", err.diagnostic()));
/// ```
#[derive(Default)]
pub struct SubscriptionHandlers {
    listener: Listener,
    on_removed: Option<RemovedFn>,
}

impl SubscriptionHandlers {
    /// Create an empty handler set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Called once with the payload when data becomes available.
    #[must_use]
    pub fn on_success(mut self, handler: impl Fn(Bytes) + Send + Sync + 'static) -> Self {
        self.listener.on_success = Some(Arc::new(handler));
        self
    }

    /// Called once with the terminal error when the fetch fails.
    #[must_use]
    pub fn on_error(mut self, handler: impl Fn(FileError) + Send + Sync + 'static) -> Self {
        self.listener.on_error = Some(Arc::new(handler));
        self
    }

    /// Called with a fraction in `[0, 1]` while the fetch is running.
    #[must_use]
    pub fn on_progress(mut self, handler: impl Fn(f32) + Send + Sync + 'static) -> Self {
        self.listener.on_progress = Some(Arc::new(handler));
        self
    }

    /// Called when the subscription is removed.
    #[must_use]
    pub fn on_removed(mut self, handler: impl FnOnce() + Send + 'static) -> Self {
        self.on_removed = Some(Box::new(handler));
        self
    }

    pub(crate) fn into_parts(self) -> (Listener, Option<RemovedFn>) {
        (self.listener, self.on_removed)
    }
}

impl fmt::Debug for SubscriptionHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionHandlers")
            .field("on_success", &self.listener.on_success.is_some())
            .field("on_error", &self.listener.on_error.is_some())
            .field("on_progress", &self.listener.on_progress.is_some())
            .field("on_removed", &self.on_removed.is_some())
            .finish()
    }
}

/// The delivery half of a handler set, cloned out of the job lock for fan-out.
#[derive(Clone, Default)]
pub(crate) struct Listener {
    on_success: Option<SuccessFn>,
    on_error: Option<ErrorFn>,
    on_progress: Option<ProgressFn>,
}

impl Listener {
    pub(crate) fn success(&self, data: &Bytes) {
        if let Some(handler) = &self.on_success {
            handler(data.clone());
        }
    }

    pub(crate) fn error(&self, error: &FileError) {
        if let Some(handler) = &self.on_error {
            handler(error.clone());
        }
    }

    pub(crate) fn progress(&self, fraction: f32) {
        if let Some(handler) = &self.on_progress {
            handler(fraction);
        }
    }

    pub(crate) const fn wants_progress(&self) -> bool {
        self.on_progress.is_some()
    }
}

/// One subscriber's listener behind its own delivery gate.
///
/// Every callback for the subscriber runs with the gate held, and removal
/// closes the gate under the same lock. Once `close` returns, no further
/// callback starts. The gate is re-entrant so a callback may remove its own
/// subscription. Callbacks of other subscribers never wait on it.
#[derive(Clone)]
pub(crate) struct Delivery {
    gate: Arc<ReentrantMutex<Cell<bool>>>,
    listener: Listener,
}

impl Delivery {
    pub(crate) fn new(listener: Listener) -> Self {
        Self {
            gate: Arc::new(ReentrantMutex::new(Cell::new(true))),
            listener,
        }
    }

    pub(crate) const fn listener(&self) -> &Listener {
        &self.listener
    }

    /// Hold the gate without delivering; used to order replay before fan-out.
    pub(crate) fn enter(&self) -> ReentrantMutexGuard<'_, Cell<bool>> {
        self.gate.lock()
    }

    /// Run `deliver` unless the subscriber has been removed.
    pub(crate) fn run(&self, deliver: impl FnOnce(&Listener)) {
        let open = self.gate.lock();
        if open.get() {
            deliver(&self.listener);
        }
    }

    /// Stop delivery, waiting for a callback in flight on another thread.
    pub(crate) fn close(&self) {
        self.gate.lock().set(false);
    }
}

/// A registered subscriber, owned by its job.
pub(crate) struct Subscriber {
    pub(crate) id: SubscriptionId,
    pub(crate) delivery: Delivery,
    pub(crate) on_removed: Option<RemovedFn>,
}
