//! Implementation of the `tally import` command.

use anyhow::{Context, Result};
use clap::Args;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::info;

use super::open_store;
use crate::adapters::sqlite::SqliteResultStore;
use crate::cli::display::{output, CommandOutput};
use crate::domain::models::{Config, Entity, TestResult};

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// JSON file with `users`, `runs` and `results` arrays
    pub file: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RunRecord {
    pub id: String,
    pub project_id: String,
    pub name: String,
    #[serde(default)]
    pub milestone: Option<String>,
}

/// Bulk-load payload.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ImportFile {
    pub users: Vec<UserRecord>,
    pub runs: Vec<RunRecord>,
    pub results: Vec<TestResult>,
}

impl From<UserRecord> for Entity {
    fn from(user: UserRecord) -> Self {
        let mut attributes = BTreeMap::new();
        if let Some(email) = user.email {
            attributes.insert("email".to_string(), email);
        }
        Self { id: user.id, name: user.name, project_id: None, attributes }
    }
}

impl From<RunRecord> for Entity {
    fn from(run: RunRecord) -> Self {
        let mut attributes = BTreeMap::new();
        if let Some(milestone) = run.milestone {
            attributes.insert("milestone".to_string(), milestone);
        }
        Self { id: run.id, name: run.name, project_id: Some(run.project_id), attributes }
    }
}

#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct ImportOutput {
    pub users: usize,
    pub runs: usize,
    pub results: usize,
}

impl CommandOutput for ImportOutput {
    fn to_human(&self) -> String {
        format!(
            "Imported {} user(s), {} run(s), {} result(s).",
            self.users, self.runs, self.results
        )
    }
}

/// Write every record of `data` to `store` in a single transaction.
pub async fn import_into(store: &SqliteResultStore, data: ImportFile) -> Result<ImportOutput> {
    let users: Vec<Entity> = data.users.into_iter().map(Entity::from).collect();
    let runs: Vec<Entity> = data.runs.into_iter().map(Entity::from).collect();

    store
        .import_batch(&users, &runs, &data.results)
        .await
        .context("Import failed, no records were written")?;

    Ok(ImportOutput { users: users.len(), runs: runs.len(), results: data.results.len() })
}

pub async fn execute(args: ImportArgs, config: &Config, json_mode: bool) -> Result<()> {
    let content = tokio::fs::read_to_string(&args.file)
        .await
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let data: ImportFile =
        serde_json::from_str(&content).with_context(|| format!("Invalid import file {}", args.file.display()))?;

    let store = open_store(config).await?;
    let summary = import_into(&store, data).await?;
    info!(users = summary.users, runs = summary.runs, results = summary.results, "import complete");

    output(&summary, json_mode);
    Ok(())
}
