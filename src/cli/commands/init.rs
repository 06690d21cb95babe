//! Implementation of the `tally init` command.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use tokio::fs;

use crate::adapters::sqlite::initialize_database;
use crate::cli::display::{output, CommandOutput};
use crate::domain::models::{Config, DatabaseConfig};

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing config file
    #[arg(long, short)]
    pub force: bool,

    /// Target directory (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,
}

#[derive(Debug, serde::Serialize)]
pub struct InitOutput {
    pub success: bool,
    pub message: String,
    pub initialized_path: PathBuf,
    pub config_written: bool,
    pub database_path: PathBuf,
}

impl CommandOutput for InitOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![self.message.clone()];
        if self.config_written {
            lines.push("Wrote .tally/config.yaml".to_string());
        }
        lines.push(format!("Database ready at {}", self.database_path.display()));
        lines.join("\n")
    }
}

pub async fn execute(args: InitArgs, json_mode: bool) -> Result<()> {
    let target_path = if args.path.is_absolute() {
        args.path.clone()
    } else {
        std::env::current_dir().context("Failed to get current directory")?.join(&args.path)
    };

    let tally_dir = target_path.join(".tally");
    fs::create_dir_all(&tally_dir)
        .await
        .with_context(|| format!("Failed to create {}", tally_dir.display()))?;

    let config_path = tally_dir.join("config.yaml");
    let config_written = args.force || !config_path.exists();
    if config_written {
        let yaml = serde_yaml::to_string(&Config::default()).context("Failed to render default config")?;
        fs::write(&config_path, yaml)
            .await
            .with_context(|| format!("Failed to write {}", config_path.display()))?;
    }

    let database_path = tally_dir.join("tally.db");
    let database = DatabaseConfig {
        path: database_path.display().to_string(),
        ..DatabaseConfig::default()
    };
    let pool = initialize_database(&database).await.context("Failed to initialize database")?;
    pool.close().await;

    let output_data = InitOutput {
        success: true,
        message: "Project initialized successfully.".to_string(),
        initialized_path: target_path,
        config_written,
        database_path,
    };

    output(&output_data, json_mode);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_init_creates_config_and_database() {
        let dir = tempfile::tempdir().unwrap();

        execute(InitArgs { force: false, path: dir.path().to_path_buf() }, true).await.unwrap();

        assert!(dir.path().join(".tally/config.yaml").exists());
        assert!(dir.path().join(".tally/tally.db").exists());

        // Re-running is idempotent.
        execute(InitArgs { force: false, path: dir.path().to_path_buf() }, true).await.unwrap();
    }
}
