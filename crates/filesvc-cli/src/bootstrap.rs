//! CLI bootstrap - the composition root.
//!
//! This module is the ONLY place where infrastructure is wired together
//! for the CLI adapter:
//! - HTTP fetcher (via filesvc-http)
//! - Event emitter (tracing-backed, from filesvc-core)
//! - Job cache (via filesvc-jobs)

use std::sync::Arc;
use std::time::Duration;

use filesvc_core::{FileServiceConfig, TracingFileEmitter};
use filesvc_http::{HttpFetcherConfig, HttpFileFetcher};
use filesvc_jobs::{JobCache, JobCacheDeps, build_job_cache};
use tokio::runtime::Handle;

use crate::error::CliError;
use crate::parser::Cli;

/// Bootstrap configuration for the CLI.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Job layer settings.
    pub file_service: FileServiceConfig,
    /// HTTP fetcher settings.
    pub http: HttpFetcherConfig,
}

impl CliConfig {
    /// Build the configuration from parsed arguments, applying defaults and
    /// validating the result.
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let mut file_service = FileServiceConfig::with_defaults();
        if let Some(ms) = cli.progress_interval_ms {
            file_service.progress_interval_ms = Some(ms);
        }
        file_service.cancel_when_unsubscribed = Some(cli.cancel_when_unsubscribed);
        file_service.validate()?;

        if cli.timeout_secs == 0 {
            return Err(CliError::Arguments(
                "--timeout-secs must be greater than zero".to_string(),
            ));
        }
        let http = HttpFetcherConfig::new()
            .with_optional_base_url(cli.base_url.clone())
            .with_timeout(Duration::from_secs(cli.timeout_secs));

        Ok(Self { file_service, http })
    }
}

/// Fully composed context for CLI commands.
pub struct CliContext {
    /// The shared job cache.
    pub cache: Arc<JobCache>,
    /// Configuration the context was built from.
    pub config: CliConfig,
}

/// Bootstrap the CLI application.
///
/// Must be called from within the tokio runtime; fetches are spawned on it.
pub async fn bootstrap(config: CliConfig) -> Result<CliContext, CliError> {
    let fetcher = Arc::new(HttpFileFetcher::new(&config.http)?);

    // Events go to the log; there is no frontend to forward them to
    let event_emitter = Arc::new(TracingFileEmitter::new());

    let cache = build_job_cache(JobCacheDeps {
        fetcher,
        event_emitter,
        config: config.file_service.clone(),
        runtime: Handle::current(),
    });

    tracing::debug!(
        base_url = config.http.base_url().unwrap_or("<none>"),
        "CLI context ready"
    );
    Ok(CliContext { cache, config })
}
