//! In-memory grouping used when a store cannot group natively.

use std::collections::BTreeMap;

use crate::domain::models::{GroupField, GroupValue, TestResult};

/// Group records by the projection of each grouping field.
///
/// Groups come back ordered by their grouping values, the same order native
/// aggregation reports them in.
pub fn group_records<'a>(
    records: &'a [TestResult],
    fields: &[GroupField],
) -> BTreeMap<Vec<GroupValue>, Vec<&'a TestResult>> {
    let mut groups: BTreeMap<Vec<GroupValue>, Vec<&TestResult>> = BTreeMap::new();
    for record in records {
        let key = fields.iter().map(|f| record.group_value(*f)).collect();
        groups.entry(key).or_default().push(record);
    }
    groups
}
