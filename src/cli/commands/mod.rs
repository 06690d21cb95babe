//! CLI command implementations.

pub mod import;
pub mod init;
pub mod metadata;
pub mod report;
pub mod serve;

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::adapters::sqlite::{initialize_database, SqliteResultStore};
use crate::domain::models::Config;
use crate::services::reporting::{standard_catalog, ReportEngine};

/// Open the configured database, applying pending migrations.
pub async fn open_store(config: &Config) -> Result<SqliteResultStore> {
    let pool = initialize_database(&config.database)
        .await
        .with_context(|| format!("Failed to open database at {}", config.database.path))?;
    Ok(SqliteResultStore::new(pool))
}

/// Report engine over the configured database and the built-in catalog.
pub async fn build_engine(config: &Config) -> Result<ReportEngine<SqliteResultStore>> {
    let store = open_store(config).await?;
    let catalog = standard_catalog().context("Failed to build report catalog")?;
    Ok(ReportEngine::new(Arc::new(store), Arc::new(catalog), config.reports.clone()))
}
