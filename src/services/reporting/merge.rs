//! Folds per-metric partial rows into one pivot row per composite group key.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::warn;

use super::catalog::{Dimension, DimensionMember, Metric};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{DisplayValue, GroupKey, GroupValue, PartialRow, ReportRow};

/// Enumerated members of one dimension, keyed by day-bucketed group value.
#[derive(Debug, Clone, Default)]
pub struct DimensionLookup {
    members: HashMap<GroupValue, DimensionMember>,
}

impl DimensionLookup {
    pub fn from_members(members: Vec<DimensionMember>) -> Self {
        Self {
            members: members
                .into_iter()
                .map(|m| (m.value.clone().day_bucket(), m))
                .collect(),
        }
    }

    /// Render a grouped value: `None` for null, `Unknown` when not enumerated.
    pub fn hydrate(&self, dimension: &dyn Dimension, value: &GroupValue) -> DisplayValue {
        if value.is_null() {
            return DisplayValue::None;
        }
        match self.members.get(value) {
            Some(member) => dimension.display(member),
            None => DisplayValue::Unknown { id: value.as_key_string() },
        }
    }
}

/// Merge metric outputs into pivot rows.
///
/// `partials` is aligned with `metrics`; `lookups` with `dimensions`. Rows are
/// emitted in first-seen order, walking metrics in request order.
pub fn merge(
    dimensions: &[Arc<dyn Dimension>],
    lookups: &[DimensionLookup],
    metrics: &[Arc<dyn Metric>],
    partials: Vec<Vec<PartialRow>>,
) -> DomainResult<Vec<ReportRow>> {
    let mut index: HashMap<GroupKey, usize> = HashMap::new();
    let mut rows: Vec<ReportRow> = Vec::new();

    for (metric, metric_rows) in metrics.iter().zip(partials) {
        let mut seen = HashSet::new();

        for partial in metric_rows {
            if partial.values.len() != dimensions.len() {
                return Err(DomainError::ValidationFailed(format!(
                    "metric {} returned {} grouping values, expected {}",
                    metric.id(),
                    partial.values.len(),
                    dimensions.len()
                )));
            }

            let key = GroupKey::derive(&partial.values);
            if !seen.insert(key.clone()) {
                warn!(metric = metric.id(), key = ?key.values(), "duplicate group key from metric, keeping later value");
            }

            let slot = match index.get(&key) {
                Some(&slot) => slot,
                None => {
                    rows.push(blank_row(dimensions, lookups, metrics, &key));
                    index.insert(key, rows.len() - 1);
                    rows.len() - 1
                }
            };
            rows[slot].set_metric(metric.id(), partial.value);
        }
    }

    if dimensions.is_empty() && rows.is_empty() {
        rows.push(blank_row(dimensions, lookups, metrics, &GroupKey::derive(&[])));
    }

    Ok(rows)
}

fn blank_row(
    dimensions: &[Arc<dyn Dimension>],
    lookups: &[DimensionLookup],
    metrics: &[Arc<dyn Metric>],
    key: &GroupKey,
) -> ReportRow {
    let columns = dimensions
        .iter()
        .zip(lookups)
        .zip(key.values())
        .map(|((dimension, lookup), value)| {
            (dimension.id().to_string(), lookup.hydrate(dimension.as_ref(), value))
        })
        .collect();
    let zeros = metrics.iter().map(|m| (m.id().to_string(), m.zero())).collect();
    ReportRow::new(columns, zeros)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::MetricValue;
    use crate::services::reporting::dimensions::{EntityDimension, StateDimension};
    use crate::services::reporting::metrics::MeasureMetric;

    fn text(s: &str) -> GroupValue {
        GroupValue::text(s)
    }

    fn state_lookup() -> DimensionLookup {
        DimensionLookup::from_members(vec![
            DimensionMember::named(text("passed"), "Passed"),
            DimensionMember::named(text("failed"), "Failed"),
        ])
    }

    #[test]
    fn test_merge_fills_missing_metrics_with_zero() {
        let dimensions: Vec<Arc<dyn Dimension>> = vec![Arc::new(StateDimension)];
        let metrics: Vec<Arc<dyn Metric>> =
            vec![Arc::new(MeasureMetric::count()), Arc::new(MeasureMetric::sum_elapsed_ms())];

        let rows = merge(
            &dimensions,
            &[state_lookup()],
            &metrics,
            vec![
                vec![
                    PartialRow::new(vec![text("failed")], MetricValue::Count(1)),
                    PartialRow::new(vec![text("passed")], MetricValue::Count(2)),
                ],
                vec![PartialRow::new(vec![text("passed")], MetricValue::Number(180_000.0))],
            ],
        )
        .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].metric("count"), Some(MetricValue::Count(1)));
        assert_eq!(rows[0].metric("sumElapsedMs"), Some(MetricValue::Number(0.0)));
        assert_eq!(rows[1].metric("sumElapsedMs"), Some(MetricValue::Number(180_000.0)));
        assert!(matches!(rows[1].dimension("state"), Some(DisplayValue::Named { name, .. }) if name == "Passed"));
    }

    #[test]
    fn test_missing_lookup_members_render_unknown() {
        let dimensions: Vec<Arc<dyn Dimension>> = vec![Arc::new(EntityDimension::assignee())];
        let metrics: Vec<Arc<dyn Metric>> = vec![Arc::new(MeasureMetric::count())];

        let rows = merge(
            &dimensions,
            &[DimensionLookup::default()],
            &metrics,
            vec![vec![
                PartialRow::new(vec![text("unknown")], MetricValue::Count(3)),
                PartialRow::new(vec![GroupValue::Null], MetricValue::Count(1)),
            ]],
        )
        .unwrap();

        assert_eq!(rows[0].dimension("assignee"), Some(&DisplayValue::Unknown { id: "unknown".into() }));
        assert_eq!(rows[1].dimension("assignee"), Some(&DisplayValue::None));
    }

    #[test]
    fn test_duplicate_key_keeps_later_value() {
        let dimensions: Vec<Arc<dyn Dimension>> = vec![Arc::new(StateDimension)];
        let metrics: Vec<Arc<dyn Metric>> = vec![Arc::new(MeasureMetric::count())];

        let rows = merge(
            &dimensions,
            &[state_lookup()],
            &metrics,
            vec![vec![
                PartialRow::new(vec![text("passed")], MetricValue::Count(1)),
                PartialRow::new(vec![text("passed")], MetricValue::Count(5)),
            ]],
        )
        .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].metric("count"), Some(MetricValue::Count(5)));
    }

    #[test]
    fn test_ungrouped_empty_result_yields_zero_row() {
        let metrics: Vec<Arc<dyn Metric>> =
            vec![Arc::new(MeasureMetric::count()), Arc::new(MeasureMetric::pass_rate())];

        let rows = merge(&[], &[], &metrics, vec![vec![], vec![]]).unwrap();

        assert_eq!(rows.len(), 1);
        assert!(rows[0].dimensions().is_empty());
        assert_eq!(rows[0].metric("count"), Some(MetricValue::Count(0)));
        assert_eq!(rows[0].metric("passRate"), Some(MetricValue::Number(0.0)));
    }

    #[test]
    fn test_arity_mismatch_is_an_error() {
        let dimensions: Vec<Arc<dyn Dimension>> = vec![Arc::new(StateDimension)];
        let metrics: Vec<Arc<dyn Metric>> = vec![Arc::new(MeasureMetric::count())];

        let err = merge(
            &dimensions,
            &[state_lookup()],
            &metrics,
            vec![vec![PartialRow::new(vec![], MetricValue::Count(1))]],
        )
        .unwrap_err();
        assert!(err.to_string().contains("count"));
    }
}
