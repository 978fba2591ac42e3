//! dashboard-e2e - declarative UI scenarios for the workspace dashboard
//!
//! Runs YAML scenarios against the dashboard in a real browser (through a
//! WebDriver server) or against an in-memory simulation of it.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use commands::Commands;
use dashboard_e2e::common::config::Config;
use dashboard_e2e::common::logging;
use dashboard_e2e::{cli, commands};

#[derive(Parser)]
#[command(name = "dashboard-e2e", about = "Workspace dashboard scenario runner")]
#[command(version, long_about = None)]
struct Cli {
    /// Configuration file (default: <config dir>/dashboard-e2e/config.toml)
    #[arg(long, global = true, env = "DASHBOARD_E2E_CONFIG")]
    config: Option<PathBuf>,

    /// Print every step and enable debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Also write logs to <data dir>/logs/dashboard-e2e.log
    #[arg(long, global = true)]
    log_file: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Dropped when main returns, flushing buffered log lines
    let _log_guard = if cli.log_file {
        logging::init_with_file(cli.verbose).map(|(path, guard)| {
            tracing::debug!("Logging to {}", path.display());
            guard
        })
    } else {
        logging::init_cli(cli.verbose);
        None
    };

    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };

    let result = match config {
        Ok(config) => cli::dispatch(cli.command, config, cli.verbose).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
