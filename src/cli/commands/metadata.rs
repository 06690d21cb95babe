//! Implementation of the `tally metadata` command.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use crate::cli::display::{list_table, output, render_list, CommandOutput};
use crate::services::reporting::{standard_catalog, CatalogMetadata};

#[derive(Args, Debug)]
pub struct MetadataArgs {
    /// Project the catalog is listed for
    #[arg(short, long)]
    pub project: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MetadataOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(flatten)]
    pub catalog: CatalogMetadata,
}

impl CommandOutput for MetadataOutput {
    fn to_human(&self) -> String {
        let mut dimensions = list_table(&["id", "label", "date"]);
        for d in &self.catalog.dimensions {
            dimensions.add_row(vec![d.id.clone(), d.label.clone(), if d.date { "yes" } else { "" }.to_string()]);
        }

        let mut metrics = list_table(&["id", "label", "unit"]);
        for m in &self.catalog.metrics {
            metrics.add_row(vec![m.id.clone(), m.label.clone(), m.unit.clone().unwrap_or_default()]);
        }

        format!(
            "{}\n\n{}",
            render_list("dimension", &dimensions, self.catalog.dimensions.len()),
            render_list("metric", &metrics, self.catalog.metrics.len())
        )
    }
}

pub fn execute(args: MetadataArgs, json_mode: bool) -> Result<()> {
    let catalog = standard_catalog().context("Failed to build report catalog")?;
    let output_data = MetadataOutput {
        project: args.project,
        catalog: catalog.metadata(),
    };
    output(&output_data, json_mode);
    Ok(())
}
