//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces that the job layer expects from
//! infrastructure. They contain no implementation details and use only
//! domain types.
//!
//! # Design Rules
//!
//! - No `reqwest` or runtime types in any signature
//! - Errors crossing a port are always `FileError`
//! - Fetchers perform one attempt per call

pub mod event_emitter;
pub mod fetcher;

pub use event_emitter::{FileEventEmitterPort, NoopFileEmitter, TracingFileEmitter};
pub use fetcher::{FileFetcherPort, ProgressSink, fetch_bytes};
