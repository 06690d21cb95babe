use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::report::{PageSize, SortDirection};

/// Ad-hoc report request as received from a transport.
///
/// Fields are camelCase on the wire; snake_case spellings are accepted as aliases.
/// Unknown fields are rejected so a misspelled filter never yields silently unfiltered data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct ReportRequest {
    /// Owning project. Required unless `cross_project` is set.
    #[serde(alias = "project_id")]
    pub project_id: Option<String>,
    /// Compute over every project (administrative reports).
    #[serde(alias = "cross_project")]
    pub cross_project: bool,
    pub dimensions: Vec<String>,
    pub metrics: Vec<String>,
    /// First day included, UTC.
    #[serde(alias = "start_date")]
    pub start_date: Option<NaiveDate>,
    /// Last day included, UTC.
    #[serde(alias = "end_date")]
    pub end_date: Option<NaiveDate>,
    /// 1-based page number.
    pub page: Option<usize>,
    #[serde(alias = "page_size")]
    pub page_size: Option<PageSize>,
    #[serde(alias = "sort_column")]
    pub sort_column: Option<String>,
    #[serde(alias = "sort_direction")]
    pub sort_direction: Option<SortDirection>,
}

impl ReportRequest {
    pub fn for_project(project_id: impl Into<String>) -> Self {
        Self {
            project_id: Some(project_id.into()),
            ..Self::default()
        }
    }

    pub fn dimension(mut self, id: impl Into<String>) -> Self {
        self.dimensions.push(id.into());
        self
    }

    pub fn metric(mut self, id: impl Into<String>) -> Self {
        self.metrics.push(id.into());
        self
    }

    pub fn sorted_by(mut self, column: impl Into<String>, direction: SortDirection) -> Self {
        self.sort_column = Some(column.into());
        self.sort_direction = Some(direction);
        self
    }

    pub fn paged(mut self, page: usize, page_size: PageSize) -> Self {
        self.page = Some(page);
        self.page_size = Some(page_size);
        self
    }

    pub fn between(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.start_date = start;
        self.end_date = end;
        self
    }
}
