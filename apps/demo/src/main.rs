use demo::cli::Cli;
use demo::cli::Commands;
use demo::error::DemoError;
use demo::logger::initialize as LoggerInitialize;
use demo::modes;

use common::ErrorLocation;
use demo_core::config::{AppConfig, default_config_dir};

use std::fs::create_dir_all;
use std::panic::Location;
use std::process::ExitCode;

use clap::Parser;
use log::error;

const LOG_DIR_NAME: &str = "logs";

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), DemoError> {
    let config_dir = match cli.config_dir {
        Some(dir) => dir,
        None => default_config_dir()?,
    };
    let config = AppConfig::load(&config_dir)?;

    let log_dir = config_dir.join(LOG_DIR_NAME);
    create_dir_all(&log_dir).map_err(|e| DemoError::Demo {
        message: format!("Failed to create log directory: {e}"),
        location: ErrorLocation::from(Location::caller()),
    })?;

    // Initialize logger FIRST
    LoggerInitialize(&log_dir, cli.command.log_file_name(), config.logging.level.into())?;

    match cli.command {
        Commands::Agent => modes::run_agent(&config, &config_dir).await,
        Commands::Worker { capability } => modes::run_worker(capability).await,
        Commands::Controller { own } => modes::run_controller(&config, &own).await,
    }
}
