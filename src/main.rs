use clap::Parser;
use expense_session::cli::{Cli, Credentials, handle_command};
use expense_session::config::load_config;
use expense_session::initializer::initialize_application;
use expense_session::logger::setup_logging;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Load config first to get log level
    let mut config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Some(level) = cli.log_level.clone() {
        config.logging.level = level;
    }

    // Keep the guard alive to ensure log messages are flushed
    let _guard = setup_logging(&config);
    config.log_summary();

    let app = match initialize_application(config) {
        Ok(app) => app,
        Err(e) => {
            tracing::error!("Initialization failed: {}", e);
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let credentials = if cli.command.is_local() {
        None
    } else {
        match Credentials::resolve(cli.email.clone()) {
            Ok(credentials) => Some(credentials),
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::FAILURE;
            }
        }
    };

    match handle_command(&app, cli.command, credentials).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Command failed: {}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
