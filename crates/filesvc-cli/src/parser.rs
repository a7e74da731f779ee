//! Main CLI parser and top-level argument handling.
//!
//! This module defines the root CLI structure with global options.

use clap::Parser;

use crate::commands::Commands;

/// Command-line interface for the filesvc download layer.
///
/// Global options configure the HTTP fetcher and the job cache; every one of
/// them can also come from the environment (or a `.env` file).
#[derive(Parser)]
#[command(name = "filesvc")]
#[command(about = "Fetch remote files through a deduplicating job cache")]
#[command(version)]
pub struct Cli {
    /// Base URL that storage keys are resolved against
    #[arg(long = "base-url", env = "FILESVC_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// Per-request timeout in seconds
    #[arg(
        long = "timeout-secs",
        env = "FILESVC_TIMEOUT_SECS",
        default_value_t = 30,
        global = true
    )]
    pub timeout_secs: u64,

    /// Minimum spacing between progress updates, in milliseconds
    #[arg(
        long = "progress-interval-ms",
        env = "FILESVC_PROGRESS_INTERVAL_MS",
        global = true
    )]
    pub progress_interval_ms: Option<u64>,

    /// Abandon a fetch once nobody is subscribed to it anymore
    #[arg(
        long = "cancel-when-unsubscribed",
        env = "FILESVC_CANCEL_WHEN_UNSUBSCRIBED",
        global = true
    )]
    pub cancel_when_unsubscribed: bool,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parser_builds() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_args() {
        let cli = Cli::parse_from([
            "filesvc",
            "--verbose",
            "--base-url",
            "https://cdn.example.com/",
            "--progress-interval-ms",
            "0",
            "config",
        ]);
        assert!(cli.verbose);
        assert_eq!(cli.base_url.as_deref(), Some("https://cdn.example.com/"));
        assert_eq!(cli.progress_interval_ms, Some(0));
        assert_eq!(cli.timeout_secs, 30);
        assert!(matches!(cli.command, Some(Commands::Config)));
    }

    #[test]
    fn test_fetch_args() {
        let cli = Cli::parse_from([
            "filesvc",
            "fetch",
            "img-1",
            "img-1",
            "img-2",
            "--subscribers",
            "3",
            "--out",
            "/tmp/out",
            "--cancel-when-unsubscribed",
        ]);
        assert!(cli.cancel_when_unsubscribed);
        let Some(Commands::Fetch {
            keys,
            out,
            subscribers,
        }) = cli.command
        else {
            panic!("expected fetch command");
        };
        assert_eq!(keys, vec!["img-1", "img-1", "img-2"]);
        assert_eq!(out.as_deref(), Some(std::path::Path::new("/tmp/out")));
        assert_eq!(subscribers, 3);
    }

    #[test]
    fn test_fetch_requires_a_key() {
        assert!(Cli::try_parse_from(["filesvc", "fetch"]).is_err());
    }
}
