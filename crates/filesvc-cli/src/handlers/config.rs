//! `filesvc config` - print the effective configuration.

use serde_json::{Value, json};

use crate::bootstrap::CliConfig;
use crate::error::CliError;

/// Render the effective configuration, defaults applied.
pub fn effective_config(config: &CliConfig) -> Value {
    let service = &config.file_service;
    json!({
        "file_service": {
            "progress_interval_ms": u64::try_from(service.effective_progress_interval().as_millis())
                .unwrap_or(u64::MAX),
            "cancel_when_unsubscribed": service.effective_cancel_when_unsubscribed(),
        },
        "http": {
            "base_url": config.http.base_url(),
            "user_agent": config.http.user_agent(),
            "timeout_secs": config.http.timeout().as_secs(),
        },
    })
}

pub fn execute(config: &CliConfig) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(&effective_config(config))
        .map_err(|e| CliError::Config(e.to_string()))?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Cli;
    use clap::Parser;

    #[test]
    fn test_effective_config_shape() {
        let cli = Cli::parse_from([
            "filesvc",
            "--base-url",
            "https://cdn.example.com/",
            "--progress-interval-ms",
            "250",
            "config",
        ]);
        let value = effective_config(&CliConfig::from_cli(&cli).unwrap());

        assert_eq!(value["file_service"]["progress_interval_ms"], 250);
        assert_eq!(value["file_service"]["cancel_when_unsubscribed"], false);
        assert_eq!(value["http"]["base_url"], "https://cdn.example.com/");
        assert_eq!(value["http"]["timeout_secs"], 30);
    }

    #[test]
    fn test_missing_base_url_is_null() {
        let cli = Cli::parse_from(["filesvc", "config"]);
        let value = effective_config(&CliConfig::from_cli(&cli).unwrap());
        assert!(value["http"]["base_url"].is_null());
    }
}
