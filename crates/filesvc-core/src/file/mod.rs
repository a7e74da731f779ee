//! File domain types, events, and errors.
//!
//! This module contains pure data types for the download-and-cache layer.
//! No I/O, networking, or runtime dependencies allowed.
//!
//! # Structure
//!
//! - `types` - The `FileResource` abstraction and the `RemoteFile` value type
//! - `events` - Job lifecycle events and status snapshots (`FileEvent`, `JobStatus`)
//! - `errors` - Error taxonomy for fetch failures (`FileError`)

pub mod errors;
pub mod events;
pub mod types;

// Re-export commonly used types
pub use errors::{FileError, FileResult};
pub use events::{FileEvent, JobStatus};
pub use types::{FileResource, RemoteFile};
