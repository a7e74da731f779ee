//! Core domain types and port definitions for filesvc.
//!
//! `filesvc` is a deduplicating, multi-subscriber file download layer: one
//! in-flight fetch per resource key, fanned out to every interested observer.
//! This crate holds the pieces every other crate agrees on:
//!
//! - `file` - resources, job status snapshots, lifecycle events, errors
//! - `ports` - the fetcher and event emitter traits
//! - `settings` - job layer configuration
#![deny(unused_crate_dependencies)]

pub mod file;
pub mod ports;
pub mod settings;

// Re-export commonly used types for convenience
pub use file::{FileError, FileEvent, FileResource, FileResult, JobStatus, RemoteFile};
pub use ports::{
    FileEventEmitterPort, FileFetcherPort, NoopFileEmitter, ProgressSink, TracingFileEmitter,
    fetch_bytes,
};
pub use settings::{
    DEFAULT_PROGRESS_INTERVAL_MS, FileServiceConfig, FileServiceConfigUpdate,
    MAX_PROGRESS_INTERVAL_MS, SettingsError,
};

// Re-exported so adapters name the same buffer type as the port
pub use bytes::Bytes;
