//! Subcommands.

use std::path::PathBuf;

use clap::Subcommand;

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Fetch one or more storage keys
    ///
    /// Repeated keys share one download job, and so one network request.
    Fetch {
        /// Storage keys to fetch
        #[arg(required = true)]
        keys: Vec<String>,
        /// Directory to write fetched files into
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Number of subscribers attached to each key
        #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u16).range(1..))]
        subscribers: u16,
    },

    /// Print the effective configuration as JSON
    Config,
}
