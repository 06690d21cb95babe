use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::{
    DateRange, Entity, EntityKind, GroupField, GroupValue, PartialRow, Scope, TestResult,
};

/// Aggregate operations a store can compute natively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateOp {
    /// Number of matching results, as `MetricValue::Count`.
    Count,
    /// Sum of `elapsed_seconds`, nulls ignored, 0 for an all-null group.
    SumElapsed,
    /// Mean of non-null `elapsed_seconds`, 0 for an all-null group.
    AvgElapsed,
}

/// Native grouped aggregation request.
#[derive(Debug, Clone)]
pub struct AggregateQuery {
    pub scope: Scope,
    /// Must only contain fields for which [`GroupField::is_native`] holds.
    pub group_by: Vec<GroupField>,
    pub op: AggregateOp,
    pub range: DateRange,
}

/// Raw record fetch used by in-memory aggregation.
#[derive(Debug, Clone)]
pub struct RecordQuery {
    pub scope: Scope,
    pub range: DateRange,
}

/// Read-side port over stored test results.
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Group matching results by `query.group_by` and aggregate each group.
    ///
    /// Row values are aligned with `group_by`, nullable references are reported as
    /// [`crate::domain::models::UNKNOWN_GROUP`], and rows are ordered by their
    /// grouping values. Non-native fields are rejected with
    /// `DomainError::UnsupportedGrouping`.
    async fn grouped_aggregate(&self, query: &AggregateQuery) -> DomainResult<Vec<PartialRow>>;

    /// Every result in scope whose `created_at` falls inside the range.
    async fn find_results(&self, query: &RecordQuery) -> DomainResult<Vec<TestResult>>;

    /// Distinct values of a field within scope. `Day` yields UTC dates.
    async fn distinct_values(&self, scope: &Scope, field: GroupField) -> DomainResult<Vec<GroupValue>>;

    /// Related entities visible from the scope.
    async fn list_entities(&self, scope: &Scope, kind: EntityKind) -> DomainResult<Vec<Entity>>;
}
