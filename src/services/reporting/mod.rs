//! Ad-hoc report aggregation.
//!
//! A [`ReportCatalog`] registers dimensions (grouping axes) and metrics
//! (measures). [`ReportEngine`] validates a request against it, runs every
//! metric and dimension enumeration concurrently, merges partial rows into
//! one row per composite group key, then sorts and paginates.

pub mod catalog;
pub mod dimensions;
pub mod engine;
pub mod error;
pub mod manual;
pub mod merge;
pub mod metrics;
pub mod paginate;
pub mod sort;
pub mod validation;

pub use catalog::{
    AggregationContext, CatalogBuilder, CatalogError, CatalogMetadata, Dimension, DimensionInfo, DimensionMember,
    Metric, MetricInfo, ReportCatalog,
};
pub use dimensions::{AutomationDimension, DayDimension, EntityDimension, StateDimension};
pub use engine::ReportEngine;
pub use error::{ReportError, ValidationError};
pub use metrics::{AggregationPath, Measure, MeasureMetric};
pub use validation::{ReportPlan, SortSpec, SortTarget};

/// The built-in catalog over test results.
///
/// Sort aliases: `elapsedMs` and `totalElapsedMs` name `sumElapsedMs`,
/// `averageElapsedMs` names `avgElapsedMs`.
pub fn standard_catalog() -> Result<ReportCatalog, CatalogError> {
    ReportCatalog::builder()
        .dimension(StateDimension)
        .dimension(EntityDimension::assignee())
        .dimension(EntityDimension::run())
        .dimension(DayDimension)
        .dimension(AutomationDimension)
        .metric(MeasureMetric::count())
        .metric(MeasureMetric::sum_elapsed_ms())
        .metric(MeasureMetric::avg_elapsed_ms())
        .metric(MeasureMetric::automated_count())
        .metric(MeasureMetric::pass_rate())
        .metric_alias("elapsedMs", "sumElapsedMs")
        .metric_alias("totalElapsedMs", "sumElapsedMs")
        .metric_alias("averageElapsedMs", "avgElapsedMs")
        .build()
}
