//! File event emitter port.
//!
//! This port abstracts lifecycle event emission, allowing the job layer to
//! report transitions without coupling to a transport (log, channel, UI bus).

use crate::file::FileEvent;

/// Port for emitting file events.
///
/// Implementations are called from whichever thread performed the
/// transition, never while a job lock is held. This method should not block.
pub trait FileEventEmitterPort: Send + Sync {
    /// Emit a file event.
    fn emit(&self, event: FileEvent);

    /// Clone this emitter into a boxed trait object.
    ///
    /// This enables cloning of `Arc<dyn FileEventEmitterPort>` without
    /// requiring the underlying type to implement Clone.
    fn clone_box(&self) -> Box<dyn FileEventEmitterPort>;
}

/// A no-op file event emitter for tests and embedders without listeners.
#[derive(Debug, Clone, Default)]
pub struct NoopFileEmitter;

impl NoopFileEmitter {
    /// Create a new no-op emitter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl FileEventEmitterPort for NoopFileEmitter {
    fn emit(&self, _event: FileEvent) {
        // Intentionally do nothing
    }

    fn clone_box(&self) -> Box<dyn FileEventEmitterPort> {
        Box::new(self.clone())
    }
}

/// Emitter that writes every event to `tracing` under the `filesvc.events` target.
#[derive(Debug, Clone, Default)]
pub struct TracingFileEmitter;

impl TracingFileEmitter {
    /// Create a new tracing emitter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl FileEventEmitterPort for TracingFileEmitter {
    fn emit(&self, event: FileEvent) {
        match &event {
            FileEvent::FetchFailed { key, error } => {
                tracing::warn!(target: "filesvc.events", key = %key, error = %error, "fetch_failed");
            }
            FileEvent::CacheCleared { evicted } => {
                tracing::info!(target: "filesvc.events", evicted = *evicted, "cache_cleared");
            }
            other => {
                tracing::debug!(
                    target: "filesvc.events",
                    key = other.key().unwrap_or_default(),
                    "{}",
                    other.event_name()
                );
            }
        }
    }

    fn clone_box(&self) -> Box<dyn FileEventEmitterPort> {
        Box::new(self.clone())
    }
}
