//! Built-in metrics and the native/manual aggregation strategy.

use async_trait::async_trait;
use tracing::debug;

use super::catalog::{AggregationContext, Metric};
use super::manual::group_records;
use crate::domain::errors::DomainResult;
use crate::domain::models::{GroupField, MetricValue, PartialRow, ResultState, TestResult};
use crate::domain::ports::{AggregateOp, AggregateQuery, RecordQuery, ResultStore};

/// What a metric measures over each group of results.
#[derive(Debug, Clone, Copy)]
pub enum Measure {
    /// Number of results.
    Count,
    /// Sum of non-null elapsed seconds.
    SumElapsed,
    /// Mean of non-null elapsed seconds, 0 when none are set.
    AvgElapsed,
    /// Number of results matching the predicate.
    CountWhere(fn(&TestResult) -> bool),
    /// Share of results matching the predicate, in `[0, 1]`.
    Ratio(fn(&TestResult) -> bool),
}

impl Measure {
    /// Store-native operation computing this measure, if one exists.
    pub fn native_op(&self) -> Option<AggregateOp> {
        match self {
            Self::Count => Some(AggregateOp::Count),
            Self::SumElapsed => Some(AggregateOp::SumElapsed),
            Self::AvgElapsed => Some(AggregateOp::AvgElapsed),
            Self::CountWhere(_) | Self::Ratio(_) => None,
        }
    }

    fn is_count(&self) -> bool {
        matches!(self, Self::Count | Self::CountWhere(_))
    }

    /// Reduce one group in memory, with the same semantics as the native operation.
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_wrap)]
    pub fn reduce(&self, group: &[&TestResult]) -> MetricValue {
        match self {
            Self::Count => MetricValue::Count(group.len() as i64),
            Self::SumElapsed => MetricValue::Number(group.iter().filter_map(|r| r.elapsed_seconds).sum()),
            Self::AvgElapsed => {
                let measured: Vec<f64> = group.iter().filter_map(|r| r.elapsed_seconds).collect();
                if measured.is_empty() {
                    MetricValue::Number(0.0)
                } else {
                    MetricValue::Number(measured.iter().sum::<f64>() / measured.len() as f64)
                }
            }
            Self::CountWhere(predicate) => {
                MetricValue::Count(group.iter().filter(|r| predicate(r)).count() as i64)
            }
            Self::Ratio(predicate) => {
                if group.is_empty() {
                    MetricValue::Number(0.0)
                } else {
                    let hits = group.iter().filter(|r| predicate(r)).count();
                    MetricValue::Number(hits as f64 / group.len() as f64)
                }
            }
        }
    }
}

fn is_automated(result: &TestResult) -> bool {
    result.automated
}

fn is_passed(result: &TestResult) -> bool {
    result.state == ResultState::Passed
}

/// Which computation path a metric takes for a set of grouping fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregationPath {
    Native(AggregateOp),
    Manual,
}

impl AggregationPath {
    /// Native when the measure has a store operation and every field is natively groupable.
    pub fn select(measure: &Measure, fields: &[GroupField]) -> Self {
        match measure.native_op() {
            Some(op) if fields.iter().all(GroupField::is_native) => Self::Native(op),
            _ => Self::Manual,
        }
    }
}

/// A metric defined by a [`Measure`] and a presentation scale.
///
/// Counts are never scaled. Other values are multiplied by `scale`, e.g. 1000
/// to report elapsed seconds as milliseconds.
pub struct MeasureMetric {
    id: &'static str,
    label: &'static str,
    unit: Option<&'static str>,
    measure: Measure,
    scale: f64,
}

impl MeasureMetric {
    pub const fn new(id: &'static str, label: &'static str, measure: Measure) -> Self {
        Self {
            id,
            label,
            unit: None,
            measure,
            scale: 1.0,
        }
    }

    pub const fn scaled(mut self, scale: f64, unit: &'static str) -> Self {
        self.scale = scale;
        self.unit = Some(unit);
        self
    }

    /// Number of results per group.
    pub const fn count() -> Self {
        Self::new("count", "Results", Measure::Count)
    }

    /// Total elapsed time; seconds scaled by 1000 to milliseconds.
    pub const fn sum_elapsed_ms() -> Self {
        Self::new("sumElapsedMs", "Total Elapsed", Measure::SumElapsed).scaled(1000.0, "ms")
    }

    /// Mean elapsed time; seconds scaled by 1000 to milliseconds.
    pub const fn avg_elapsed_ms() -> Self {
        Self::new("avgElapsedMs", "Average Elapsed", Measure::AvgElapsed).scaled(1000.0, "ms")
    }

    /// Number of automated results. Boolean flags are always counted in memory.
    pub fn automated_count() -> Self {
        Self::new("automatedCount", "Automated Results", Measure::CountWhere(is_automated))
    }

    /// Passed results as a percentage of all results; ratio scaled by 100.
    pub fn pass_rate() -> Self {
        Self::new("passRate", "Pass Rate", Measure::Ratio(is_passed)).scaled(100.0, "%")
    }

    pub fn path(&self, fields: &[GroupField]) -> AggregationPath {
        AggregationPath::select(&self.measure, fields)
    }

    fn present(&self, value: MetricValue) -> MetricValue {
        match value {
            MetricValue::Count(n) if self.measure.is_count() => MetricValue::Count(n),
            other => MetricValue::Number(other.as_f64() * self.scale),
        }
    }

    async fn aggregate_manual(
        &self,
        store: &dyn ResultStore,
        ctx: &AggregationContext,
    ) -> DomainResult<Vec<PartialRow>> {
        let records = store
            .find_results(&RecordQuery { scope: ctx.scope.clone(), range: ctx.range })
            .await?;

        Ok(group_records(&records, &ctx.group_by)
            .into_iter()
            .map(|(values, group)| PartialRow::new(values, self.present(self.measure.reduce(&group))))
            .collect())
    }
}

#[async_trait]
impl Metric for MeasureMetric {
    fn id(&self) -> &str {
        self.id
    }

    fn label(&self) -> &str {
        self.label
    }

    fn unit(&self) -> Option<&str> {
        self.unit
    }

    fn zero(&self) -> MetricValue {
        if self.measure.is_count() {
            MetricValue::Count(0)
        } else {
            MetricValue::Number(0.0)
        }
    }

    async fn aggregate(&self, store: &dyn ResultStore, ctx: &AggregationContext) -> DomainResult<Vec<PartialRow>> {
        let path = self.path(&ctx.group_by);
        debug!(metric = self.id, ?path, fields = ?ctx.group_by, "aggregating metric");

        match path {
            AggregationPath::Native(op) => {
                let rows = store
                    .grouped_aggregate(&AggregateQuery {
                        scope: ctx.scope.clone(),
                        group_by: ctx.group_by.clone(),
                        op,
                        range: ctx.range,
                    })
                    .await?;
                Ok(rows
                    .into_iter()
                    .map(|row| PartialRow::new(row.values, self.present(row.value)))
                    .collect())
            }
            AggregationPath::Manual => self.aggregate_manual(store, ctx).await,
        }
    }
}
