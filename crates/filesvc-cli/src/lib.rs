//! Command-line adapter for filesvc.
//!
//! - `parser` / `commands` - clap definitions
//! - `bootstrap` - composition root wiring the HTTP fetcher into a job cache
//! - `handlers` - one module per subcommand
//! - `error` - `CliError` and exit codes
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

// Silence unused dev-dependency warnings
#[cfg(test)]
use mockito as _;
#[cfg(test)]
use tempfile as _;

// Used by the main.rs binary
use anyhow as _;
use dotenvy as _;
use tracing_subscriber as _;

pub mod bootstrap;
pub mod commands;
pub mod error;
pub mod handlers;
pub mod parser;

// Re-export primary types for convenient access
pub use bootstrap::{CliConfig, CliContext, bootstrap};
pub use commands::Commands;
pub use error::CliError;
pub use parser::Cli;
