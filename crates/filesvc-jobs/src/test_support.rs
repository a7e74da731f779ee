//! Shared fakes for the unit tests in this crate.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use tokio::sync::{Notify, mpsc};

use filesvc_core::{FileError, FileEvent, FileEventEmitterPort, FileFetcherPort, ProgressSink};

use crate::SubscriptionHandlers;

type Outcome = Result<Option<Bytes>, FileError>;

/// Fetcher that blocks every call until the test hands it an outcome.
pub(crate) struct GatedFetcher {
    calls: AtomicUsize,
    sinks: Mutex<Vec<ProgressSink>>,
    started: Notify,
    outcomes_tx: mpsc::UnboundedSender<Outcome>,
    outcomes_rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<Outcome>>,
}

impl GatedFetcher {
    pub(crate) fn new() -> Arc<Self> {
        let (outcomes_tx, outcomes_rx) = mpsc::unbounded_channel();
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            sinks: Mutex::new(Vec::new()),
            started: Notify::new(),
            outcomes_tx,
            outcomes_rx: tokio::sync::Mutex::new(outcomes_rx),
        })
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Wait until a fetch call has been entered.
    pub(crate) async fn wait_started(&self) {
        self.started.notified().await;
    }

    /// Report progress through the sink of the most recent call.
    pub(crate) fn report(&self, fraction: f32) {
        let sink = self.sinks.lock().last().cloned();
        if let Some(sink) = sink {
            sink.report(fraction);
        }
    }

    pub(crate) fn complete(&self, outcome: Outcome) {
        self.outcomes_tx.send(outcome).unwrap();
    }
}

#[async_trait]
impl FileFetcherPort for GatedFetcher {
    async fn fetch(&self, _key: &str, progress: ProgressSink) -> Outcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.sinks.lock().push(progress);
        self.started.notify_one();
        let mut outcomes = self.outcomes_rx.lock().await;
        outcomes.recv().await.unwrap_or(Ok(None))
    }
}

/// Fetcher whose every call panics, standing in for a broken adapter.
#[derive(Default)]
pub(crate) struct PanickingFetcher {
    calls: AtomicUsize,
}

impl PanickingFetcher {
    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FileFetcherPort for PanickingFetcher {
    async fn fetch(&self, _key: &str, _progress: ProgressSink) -> Outcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        panic!("adapter bug");
    }
}

mockall::mock! {
    pub(crate) Emitter {}

    impl FileEventEmitterPort for Emitter {
        fn emit(&self, event: FileEvent);
        fn clone_box(&self) -> Box<dyn FileEventEmitterPort>;
    }
}

#[derive(Clone)]
struct RecordingEmitter(Arc<Mutex<Vec<&'static str>>>);

impl FileEventEmitterPort for RecordingEmitter {
    fn emit(&self, event: FileEvent) {
        self.0.lock().push(event.event_name());
    }

    fn clone_box(&self) -> Box<dyn FileEventEmitterPort> {
        Box::new(self.clone())
    }
}

/// Emitter that records event names in order.
pub(crate) fn recording_emitter() -> (Arc<dyn FileEventEmitterPort>, Arc<Mutex<Vec<&'static str>>>)
{
    let events = Arc::new(Mutex::new(Vec::new()));
    (Arc::new(RecordingEmitter(Arc::clone(&events))), events)
}

/// Collects subscriber callbacks as `"<name>:<kind>[:<value>]"` lines.
#[derive(Clone, Default)]
pub(crate) struct Recorder(Arc<Mutex<Vec<String>>>);

impl Recorder {
    pub(crate) fn handlers(&self, name: &'static str) -> SubscriptionHandlers {
        let (ok, err, progress, removed) = (self.clone(), self.clone(), self.clone(), self.clone());
        SubscriptionHandlers::new()
            .on_success(move |data| {
                ok.push(format!("{name}:success:{}", String::from_utf8_lossy(&data)));
            })
            .on_error(move |error| err.push(format!("{name}:error:{error}")))
            .on_progress(move |fraction| progress.push(format!("{name}:progress:{fraction}")))
            .on_removed(move || removed.push(format!("{name}:removed")))
    }

    fn push(&self, line: String) {
        self.0.lock().push(line);
    }

    pub(crate) fn lines(&self) -> Vec<String> {
        self.0.lock().clone()
    }
}
