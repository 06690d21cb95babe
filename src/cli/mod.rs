//! Command-line interface.

pub mod commands;
pub mod display;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::domain::models::Config;
use crate::infrastructure::config::ConfigLoader;
use commands::import::ImportArgs;
use commands::init::InitArgs;
use commands::metadata::MetadataArgs;
use commands::report::ReportArgs;
use commands::serve::ServeArgs;

#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Tally - ad-hoc reports over test results", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Config file to use instead of .tally/config.yaml
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the project directory, default config and database
    Init(InitArgs),

    /// Load users, runs and test results from a JSON file
    Import(ImportArgs),

    /// List available dimensions and metrics
    Metadata(MetadataArgs),

    /// Run a report
    Report(ReportArgs),

    /// Serve the reports HTTP API
    Serve(ServeArgs),
}

/// Load configuration from an explicit file or the project hierarchy.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    }
}

/// Print an error in the requested format and exit non-zero.
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    if json_mode {
        let body = serde_json::json!({
            "error": format!("{err:#}"),
            "code": "CLI_ERROR",
        });
        eprintln!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
    } else {
        eprintln!("Error: {err:#}");
    }
    std::process::exit(1)
}
