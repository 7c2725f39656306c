use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use onvif_api::{ApiError, OnvifClient};
use onvif_events::RenewalError;

mod cli;
mod commands;
mod config;
mod logging;
mod output;

use cli::Cli;
use config::{Config, ConfigError};

/// Exit code for configuration errors; anything else unrecovered exits with 1
const EXIT_CONFIGURATION: u8 = 2;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let quiet = cli.global.quiet;

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if !quiet {
                eprintln!("error: {e:#}");
            }
            ExitCode::from(exit_code(&e))
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::from_args(&cli.global)?;
    if let Err(e) = logging::init_logging(config.logging) {
        eprintln!("warning: {e}");
    }

    let client = OnvifClient::new(&config.host, config.credentials.clone(), config.client.clone())?;
    tracing::debug!(host = %config.host, "client ready");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(commands::run(cli.command, client, &config))
}

fn exit_code(error: &anyhow::Error) -> u8 {
    let configuration = error.downcast_ref::<ConfigError>().is_some()
        || error
            .downcast_ref::<ApiError>()
            .is_some_and(ApiError::is_configuration)
        || matches!(
            error.downcast_ref::<RenewalError>(),
            Some(RenewalError::Configuration(_))
        );

    if configuration {
        EXIT_CONFIGURATION
    } else {
        1
    }
}
