//! Request validation: turns a [`ReportRequest`] into a resolved [`ReportPlan`].

use std::collections::HashSet;
use std::sync::Arc;

use super::catalog::{Dimension, Metric, ReportCatalog};
use super::error::ValidationError;
use crate::domain::models::{
    DateRange, GroupField, PageSize, ReportRequest, ReportsConfig, Scope, SortDirection,
};

/// Column a report is ordered by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortTarget {
    Dimension(String),
    Metric(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub target: SortTarget,
    pub direction: SortDirection,
}

/// A validated request with every id resolved against the catalog.
pub struct ReportPlan {
    pub scope: Scope,
    pub dimensions: Vec<Arc<dyn Dimension>>,
    pub metrics: Vec<Arc<dyn Metric>>,
    pub range: DateRange,
    pub page: usize,
    pub page_size: PageSize,
    pub sort: Option<SortSpec>,
}

impl ReportPlan {
    /// Grouping fields in dimension order.
    pub fn group_by(&self) -> Vec<GroupField> {
        self.dimensions.iter().map(|d| d.group_by_field()).collect()
    }
}

pub fn validate(
    request: &ReportRequest,
    catalog: &ReportCatalog,
    config: &ReportsConfig,
) -> Result<ReportPlan, ValidationError> {
    let scope = match (&request.project_id, request.cross_project) {
        (_, true) => Scope::All,
        (Some(id), false) if !id.trim().is_empty() => Scope::Project(id.clone()),
        _ => return Err(ValidationError::MissingScope),
    };

    if request.dimensions.is_empty() && !config.allow_ungrouped {
        return Err(ValidationError::EmptyDimensions);
    }
    if request.metrics.is_empty() {
        return Err(ValidationError::EmptyMetrics);
    }

    let dimensions = request
        .dimensions
        .iter()
        .map(|id| catalog.dimension(id).cloned().ok_or_else(|| ValidationError::UnknownDimension(id.clone())))
        .collect::<Result<Vec<_>, _>>()?;
    let metrics = request
        .metrics
        .iter()
        .map(|id| catalog.metric(id).cloned().ok_or_else(|| ValidationError::UnknownMetric(id.clone())))
        .collect::<Result<Vec<_>, _>>()?;

    let mut seen = HashSet::new();
    if let Some(dup) = request.dimensions.iter().chain(&request.metrics).find(|id| !seen.insert(id.as_str())) {
        return Err(ValidationError::DuplicateColumn(dup.clone()));
    }

    let sort = resolve_sort(request, catalog, &dimensions)?;

    let page = request.page.unwrap_or(1);
    if page == 0 {
        return Err(ValidationError::InvalidPage(page));
    }
    let page_size = request.page_size.unwrap_or_default();
    if page_size == PageSize::Rows(0) {
        return Err(ValidationError::InvalidPageSize(page_size.to_string()));
    }

    if let (Some(start), Some(end)) = (request.start_date, request.end_date) {
        if start > end {
            return Err(ValidationError::InvalidDateRange { start, end });
        }
    }

    Ok(ReportPlan {
        scope,
        dimensions,
        metrics,
        range: DateRange::from_days(request.start_date, request.end_date),
        page,
        page_size,
        sort,
    })
}

/// Resolve the requested sort column against the selected columns.
///
/// Without an explicit column, a selected date dimension sorts ascending.
fn resolve_sort(
    request: &ReportRequest,
    catalog: &ReportCatalog,
    dimensions: &[Arc<dyn Dimension>],
) -> Result<Option<SortSpec>, ValidationError> {
    let direction = request.sort_direction.unwrap_or_default();

    let Some(column) = request.sort_column.as_deref().filter(|c| !c.is_empty()) else {
        return Ok(dimensions.iter().find(|d| d.is_date()).map(|d| SortSpec {
            target: SortTarget::Dimension(d.id().to_string()),
            direction: SortDirection::Asc,
        }));
    };

    let target = if request.dimensions.iter().any(|id| id == column) {
        SortTarget::Dimension(column.to_string())
    } else if request.metrics.iter().any(|id| id == column) {
        SortTarget::Metric(column.to_string())
    } else {
        match catalog.resolve_metric_alias(column) {
            Some(canonical) if request.metrics.iter().any(|id| id == canonical) => {
                SortTarget::Metric(canonical.to_string())
            }
            _ => return Err(ValidationError::UnknownSortColumn(column.to_string())),
        }
    };

    Ok(Some(SortSpec { target, direction }))
}
