//! Report execution: validate, aggregate concurrently, merge, sort, paginate.

use std::sync::Arc;

use futures::future::try_join_all;
use tracing::{debug, error, instrument};

use super::catalog::{AggregationContext, CatalogMetadata, ReportCatalog};
use super::error::ReportError;
use super::merge::{merge, DimensionLookup};
use super::paginate::paginate;
use super::sort::sort_rows;
use super::validation::{validate, ReportPlan};
use crate::domain::errors::DomainResult;
use crate::domain::models::{ReportRequest, ReportResult, ReportRow, ReportsConfig};
use crate::domain::ports::ResultStore;

/// Computes pivot reports from a [`ResultStore`] using an injected catalog.
pub struct ReportEngine<S: ResultStore> {
    store: Arc<S>,
    catalog: Arc<ReportCatalog>,
    config: ReportsConfig,
}

impl<S: ResultStore> Clone for ReportEngine<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            catalog: Arc::clone(&self.catalog),
            config: self.config.clone(),
        }
    }
}

impl<S: ResultStore + 'static> ReportEngine<S> {
    pub fn new(store: Arc<S>, catalog: Arc<ReportCatalog>, config: ReportsConfig) -> Self {
        Self { store, catalog, config }
    }

    pub fn catalog(&self) -> &ReportCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &ReportsConfig {
        &self.config
    }

    /// Available dimensions and metrics. Computes no values.
    pub fn metadata(&self) -> CatalogMetadata {
        self.catalog.metadata()
    }

    /// Run one report request end to end.
    #[instrument(skip(self, request), fields(project = ?request.project_id, cross_project = request.cross_project))]
    pub async fn run(&self, request: &ReportRequest) -> Result<ReportResult, ReportError> {
        let plan = validate(request, &self.catalog, &self.config)?;
        debug!(
            dimensions = ?request.dimensions,
            metrics = ?request.metrics,
            scope = %plan.scope,
            "report request validated"
        );

        let mut rows = self.aggregate(&plan).await.map_err(|e| {
            error!(error = %e, "report aggregation failed");
            ReportError::Aggregation(e)
        })?;

        if let Some(spec) = &plan.sort {
            sort_rows(&mut rows, spec);
        }

        let results = paginate(&rows, plan.page, plan.page_size);
        debug!(total = rows.len(), page = plan.page, returned = results.len(), "report complete");

        Ok(ReportResult {
            results,
            total_count: rows.len(),
            all_results: rows,
            page: plan.page,
            page_size: plan.page_size,
        })
    }

    /// Run every metric and enumerate every dimension concurrently, then merge.
    ///
    /// Rows come back unsorted, in merge order.
    pub async fn aggregate(&self, plan: &ReportPlan) -> DomainResult<Vec<ReportRow>> {
        let store: &dyn ResultStore = self.store.as_ref();
        let ctx = AggregationContext {
            scope: plan.scope.clone(),
            group_by: plan.group_by(),
            range: plan.range,
        };

        let metric_outputs = try_join_all(plan.metrics.iter().map(|m| m.aggregate(store, &ctx)));
        let dimension_members = try_join_all(plan.dimensions.iter().map(|d| d.enumerate(store, &ctx.scope)));
        let (partials, members) = tokio::try_join!(metric_outputs, dimension_members)?;

        debug!(
            partial_rows = partials.iter().map(Vec::len).sum::<usize>(),
            "aggregation finished, merging"
        );

        let lookups: Vec<DimensionLookup> = members.into_iter().map(DimensionLookup::from_members).collect();
        merge(&plan.dimensions, &lookups, &plan.metrics, partials)
    }
}
