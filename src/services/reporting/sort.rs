//! Row ordering.

use std::cmp::Ordering;

use super::validation::{SortSpec, SortTarget};
use crate::domain::models::{DisplayValue, MetricValue, ReportRow, SortDirection};

/// Sort rows in place. Stable, so ties keep merge order.
///
/// Missing dimension values (`None`, `Unknown`) sort last in either direction.
pub fn sort_rows(rows: &mut [ReportRow], spec: &SortSpec) {
    match &spec.target {
        SortTarget::Dimension(id) => rows.sort_by(|a, b| {
            compare_missing_last(a.dimension(id), b.dimension(id), spec.direction, compare_display)
        }),
        SortTarget::Metric(id) => rows.sort_by(|a, b| {
            let (x, y) = (a.metric(id), b.metric(id));
            compare_missing_last(x.as_ref(), y.as_ref(), spec.direction, |x, y| {
                x.as_f64().total_cmp(&y.as_f64())
            })
        }),
    }
}

fn compare_missing_last<T: Present>(
    a: Option<&T>,
    b: Option<&T>,
    direction: SortDirection,
    cmp: impl Fn(&T, &T) -> Ordering,
) -> Ordering {
    let a = a.filter(|v| v.is_present());
    let b = b.filter(|v| v.is_present());
    match (a, b) {
        (Some(a), Some(b)) => match direction {
            SortDirection::Asc => cmp(a, b),
            SortDirection::Desc => cmp(b, a),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

trait Present {
    fn is_present(&self) -> bool;
}

impl Present for DisplayValue {
    fn is_present(&self) -> bool {
        !self.is_missing()
    }
}

impl Present for MetricValue {
    fn is_present(&self) -> bool {
        true
    }
}

/// Date buckets by date, named values by name then id.
fn compare_display(a: &DisplayValue, b: &DisplayValue) -> Ordering {
    match (a, b) {
        (DisplayValue::DateBucket { date: x }, DisplayValue::DateBucket { date: y }) => x.cmp(y),
        (DisplayValue::DateBucket { .. }, _) => Ordering::Less,
        (_, DisplayValue::DateBucket { .. }) => Ordering::Greater,
        (
            DisplayValue::Named { id: id_a, name: name_a, .. },
            DisplayValue::Named { id: id_b, name: name_b, .. },
        ) => name_a.cmp(name_b).then_with(|| id_a.cmp(id_b)),
        _ => Ordering::Equal,
    }
}
