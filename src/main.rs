//! Database Restore Tool
//!
//! Restores a saved dump from the dumps directory, decompressing gzip dumps
//! first, or lists the saved dumps.

// dbrestore/src/main.rs
mod config;
mod errors;
mod restore;
mod utils;

use anyhow::Context;
use clap::Parser;
use config::{AppConfig, config_path_from_env};
use errors::AppError;
use restore::RestoreOutcome;
use std::process::ExitCode;

const EXIT_SUCCESS: u8 = 0;
const EXIT_FAILURE: u8 = 1;
const EXIT_INVALID_INPUT: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "dbrestore", version, about = "Restore a dump from the dumps directory")]
struct Cli {
    /// Filename of the dump; lists the saved dumps when omitted
    dump: Option<String>,

    /// The database connection to restore to
    #[arg(short, long, value_name = "NAME")]
    database: Option<String>,
}

/// Main entry point for the restore tool
fn main() -> ExitCode {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    if let Err(e) = setup_logging() {
        eprintln!("⚠️ Logging disabled: {}", e);
    }

    let config_path = config_path_from_env();
    let app_config = match AppConfig::load_from_json(&config_path).with_context(|| {
        format!(
            "Failed to load application configuration from {}",
            config_path.display()
        )
    }) {
        Ok(app_config) => app_config,
        Err(e) => {
            eprintln!("❌ Error: {:?}", e);
            return ExitCode::from(EXIT_INVALID_INPUT);
        }
    };

    match restore::run_restore_flow(&app_config, cli.database.as_deref(), cli.dump.as_deref()) {
        Ok(outcome) => {
            log::debug!("Terminating with outcome {:?}", outcome);
            ExitCode::from(outcome_exit_status(outcome))
        }
        Err(e) => {
            eprintln!("❌ Error: {}", e);
            ExitCode::from(error_exit_status(&e))
        }
    }
}

fn outcome_exit_status(outcome: RestoreOutcome) -> u8 {
    if outcome.is_success() {
        EXIT_SUCCESS
    } else {
        EXIT_FAILURE
    }
}

fn error_exit_status(error: &AppError) -> u8 {
    if error.is_invalid_input() {
        EXIT_INVALID_INPUT
    } else {
        EXIT_FAILURE
    }
}

/// Logs go to stderr, filtered by `DBRESTORE_LOG` (default `warn`).
fn setup_logging() -> Result<(), log::SetLoggerError> {
    let env = env_logger::Env::new()
        .filter_or("DBRESTORE_LOG", "warn")
        .write_style("DBRESTORE_LOG_STYLE");
    env_logger::try_init_from_env(env)
}
