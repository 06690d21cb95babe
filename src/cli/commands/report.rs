//! Implementation of the `tally report` command.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Args;
use serde::Serialize;

use super::build_engine;
use crate::cli::display::{list_table, output, render_list, truncate, CommandOutput};
use crate::domain::models::{Config, MetricValue, PageSize, ReportRequest, ReportResult, SortDirection};

#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Project to report on
    #[arg(short, long, conflicts_with = "all_projects")]
    pub project: Option<String>,

    /// Report across every project
    #[arg(long)]
    pub all_projects: bool,

    /// Dimension ids, in column order (repeat or comma-separate)
    #[arg(short = 'd', long = "dimension", value_delimiter = ',')]
    pub dimensions: Vec<String>,

    /// Metric ids, in column order (repeat or comma-separate)
    #[arg(short = 'm', long = "metric", value_delimiter = ',', required = true)]
    pub metrics: Vec<String>,

    /// First day included (YYYY-MM-DD, UTC)
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Last day included (YYYY-MM-DD, UTC)
    #[arg(long)]
    pub to: Option<NaiveDate>,

    /// Column to sort by
    #[arg(short, long)]
    pub sort: Option<String>,

    /// Sort direction: asc or desc
    #[arg(long)]
    pub direction: Option<SortDirection>,

    /// Page number, starting at 1
    #[arg(long)]
    pub page: Option<usize>,

    /// Rows per page, or "all"
    #[arg(long)]
    pub page_size: Option<PageSize>,
}

impl From<ReportArgs> for ReportRequest {
    fn from(args: ReportArgs) -> Self {
        Self {
            project_id: args.project,
            cross_project: args.all_projects,
            dimensions: args.dimensions,
            metrics: args.metrics,
            start_date: args.from,
            end_date: args.to,
            page: args.page,
            page_size: args.page_size,
            sort_column: args.sort,
            sort_direction: args.direction,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct ReportOutput(pub ReportResult);

const MAX_CELL_WIDTH: usize = 40;

fn format_metric(value: MetricValue) -> String {
    match value {
        MetricValue::Count(n) => n.to_string(),
        MetricValue::Number(x) if x.fract() == 0.0 => format!("{x:.0}"),
        MetricValue::Number(x) => format!("{x:.2}"),
    }
}

impl CommandOutput for ReportOutput {
    fn to_human(&self) -> String {
        let report = &self.0;
        let Some(first) = report.all_results.first() else {
            return "No rows found.".to_string();
        };

        let headers: Vec<&str> = first
            .dimensions()
            .iter()
            .map(|(id, _)| id.as_str())
            .chain(first.metrics().iter().map(|(id, _)| id.as_str()))
            .collect();
        let mut table = list_table(&headers);

        for row in &report.results {
            let cells: Vec<String> = row
                .dimensions()
                .iter()
                .map(|(_, v)| truncate(&v.label(), MAX_CELL_WIDTH))
                .chain(row.metrics().iter().map(|(_, v)| format_metric(*v)))
                .collect();
            table.add_row(cells);
        }

        let mut rendered = render_list("row", &table, report.results.len());
        if report.results.len() < report.total_count {
            rendered.push_str(&format!(
                "\n\nPage {} of {} total row(s), page size {}",
                report.page, report.total_count, report.page_size
            ));
        }
        rendered
    }
}

pub async fn execute(args: ReportArgs, config: &Config, json_mode: bool) -> Result<()> {
    let engine = build_engine(config).await?;
    let request = ReportRequest::from(args);

    let report = engine
        .run(&request)
        .await
        .map_err(|e| anyhow::anyhow!(e.public_message(config.reports.expose_error_details)))
        .context("Report failed")?;

    output(&ReportOutput(report), json_mode);
    Ok(())
}
