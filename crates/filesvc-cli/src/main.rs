//! CLI entry point - the composition root.
//!
//! Parses arguments, installs logging, bootstraps the job cache and routes to
//! a handler. `CliError` decides the process exit code.

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use filesvc_cli::handlers::fetch::{self, FetchArgs};
use filesvc_cli::{Cli, CliConfig, CliError, Commands, bootstrap, handlers};

fn init_tracing(verbose: bool) -> anyhow::Result<()> {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = CliConfig::from_cli(&cli)?;

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Config => handlers::config::execute(&config),
        Commands::Fetch {
            keys,
            out,
            subscribers,
        } => {
            let ctx = bootstrap(config).await?;
            let args = FetchArgs {
                keys,
                out,
                subscribers: usize::from(subscribers),
            };
            let report = fetch::execute(&ctx, &args).await?;
            fetch::print_report(&report);

            match report.failures() {
                0 => Ok(()),
                failed => Err(CliError::Fetch(format!(
                    "{failed} of {} keys failed",
                    report.outcomes.len()
                ))),
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables before parsing so they act as flag fallbacks
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    if let Err(err) = run(cli).await {
        eprintln!("Error: {err}");
        std::process::exit(err.exit_code());
    }
    Ok(())
}
