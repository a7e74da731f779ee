//! HTTP fetcher adapter for filesvc.
//!
//! Implements [`FileFetcherPort`](filesvc_core::FileFetcherPort) on top of
//! `reqwest`: storage keys are resolved against a base URL and fetched with a
//! single streamed GET.
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

mod client;
mod config;
mod error;
mod port;

// ============================================================================
// Public API
// ============================================================================

pub use client::HttpFileFetcher;
pub use config::{DEFAULT_TIMEOUT, HttpFetcherConfig};
pub use error::{HttpError, HttpResult};

// Silence unused dev-dependency warnings
#[cfg(test)]
use mockito as _;
#[cfg(test)]
use tokio as _;
