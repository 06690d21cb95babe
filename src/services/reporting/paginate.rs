//! Page slicing.

use crate::domain::models::{PageSize, ReportRow};

/// Rows of 1-based `page`. Out-of-range pages are empty.
pub fn paginate(rows: &[ReportRow], page: usize, page_size: PageSize) -> Vec<ReportRow> {
    match page_size {
        PageSize::All => {
            if page <= 1 {
                rows.to_vec()
            } else {
                Vec::new()
            }
        }
        PageSize::Rows(size) => {
            let start = page.saturating_sub(1).saturating_mul(size);
            let end = start.saturating_add(size).min(rows.len());
            rows.get(start..end).map(<[ReportRow]>::to_vec).unwrap_or_default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::MetricValue;

    fn rows(n: i64) -> Vec<ReportRow> {
        (0..n)
            .map(|i| ReportRow::new(vec![], vec![("count".into(), MetricValue::Count(i))]))
            .collect()
    }

    #[test]
    fn test_slices_requested_page() {
        let page = paginate(&rows(5), 2, PageSize::Rows(2));
        let counts: Vec<_> = page.iter().map(|r| r.metric("count").unwrap()).collect();
        assert_eq!(counts, vec![MetricValue::Count(2), MetricValue::Count(3)]);
    }

    #[test]
    fn test_last_page_is_partial() {
        assert_eq!(paginate(&rows(5), 3, PageSize::Rows(2)).len(), 1);
    }

    #[test]
    fn test_out_of_range_is_empty() {
        assert!(paginate(&rows(5), 4, PageSize::Rows(2)).is_empty());
        assert!(paginate(&rows(5), usize::MAX, PageSize::Rows(usize::MAX)).is_empty());
        assert!(paginate(&rows(5), 2, PageSize::All).is_empty());
    }

    #[test]
    fn test_all_returns_everything() {
        assert_eq!(paginate(&rows(5), 1, PageSize::All).len(), 5);
    }
}
