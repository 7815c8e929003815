//! Folio CLI entry point.

use anyhow::Result;
use clap::Parser;
use folio::cli::{commands, Cli, Commands};
use folio::config::Settings;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config_path = cli.config.as_ref().map(PathBuf::from);
    let settings = Settings::load_from(config_path.as_ref())?;

    // Initialize logging
    let log_level = match cli.verbose {
        0 => settings.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("folio={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Ensure data directories exist
    std::fs::create_dir_all(settings.data_dir())?;

    // Execute command
    match &cli.command {
        Commands::Add { files } => {
            commands::run_add(files, &settings)?;
        }

        Commands::Ask { question, top_k, json } => {
            commands::run_ask(question, *top_k, *json, &settings)?;
        }

        Commands::Search { query, top_k } => {
            commands::run_search(query, *top_k, &settings)?;
        }

        Commands::List => {
            commands::run_list(&settings)?;
        }

        Commands::Clear { yes } => {
            commands::run_clear(*yes, &settings)?;
        }

        Commands::Status => {
            commands::run_status(&settings)?;
        }

        Commands::Shell => {
            commands::run_shell(&settings)?;
        }

        Commands::Config { action } => {
            commands::run_config(action, config_path.as_ref(), settings)?;
        }
    }

    Ok(())
}
