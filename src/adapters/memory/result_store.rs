//! In-memory implementation of the ResultStore port.

use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    Entity, EntityKind, GroupField, GroupValue, MetricValue, PartialRow, Scope, TestResult,
};
use crate::domain::ports::{AggregateOp, AggregateQuery, RecordQuery, ResultStore};

#[derive(Default)]
struct Inner {
    results: Vec<TestResult>,
    users: Vec<Entity>,
    runs: Vec<Entity>,
}

/// Vector-backed store with the same grouping semantics as the SQLite adapter.
#[derive(Clone, Default)]
pub struct InMemoryResultStore {
    inner: Arc<RwLock<Inner>>,
}

#[derive(Default)]
struct NativeAccumulator {
    count: i64,
    sum: f64,
    measured: i64,
}

impl NativeAccumulator {
    fn push(&mut self, result: &TestResult) {
        self.count += 1;
        if let Some(elapsed) = result.elapsed_seconds {
            self.sum += elapsed;
            self.measured += 1;
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn finish(&self, op: AggregateOp) -> MetricValue {
        match op {
            AggregateOp::Count => MetricValue::Count(self.count),
            AggregateOp::SumElapsed => MetricValue::Number(self.sum),
            AggregateOp::AvgElapsed if self.measured == 0 => MetricValue::Number(0.0),
            AggregateOp::AvgElapsed => MetricValue::Number(self.sum / self.measured as f64),
        }
    }
}

impl InMemoryResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_result(&self, result: TestResult) {
        self.inner.write().await.results.push(result);
    }

    pub async fn insert_results(&self, results: impl IntoIterator<Item = TestResult>) {
        self.inner.write().await.results.extend(results);
    }

    pub async fn insert_entity(&self, kind: EntityKind, entity: Entity) {
        let mut inner = self.inner.write().await;
        match kind {
            EntityKind::User => inner.users.push(entity),
            EntityKind::Run => inner.runs.push(entity),
        }
    }
}

#[async_trait]
impl ResultStore for InMemoryResultStore {
    async fn grouped_aggregate(&self, query: &AggregateQuery) -> DomainResult<Vec<PartialRow>> {
        if let Some(field) = query.group_by.iter().find(|f| !f.is_native()) {
            return Err(DomainError::UnsupportedGrouping(*field));
        }

        let inner = self.inner.read().await;
        let mut groups: BTreeMap<Vec<GroupValue>, NativeAccumulator> = BTreeMap::new();
        for result in inner
            .results
            .iter()
            .filter(|r| query.scope.includes(&r.project_id) && query.range.contains(r.created_at))
        {
            let key = query.group_by.iter().map(|f| result.group_value(*f)).collect();
            groups.entry(key).or_default().push(result);
        }

        // SQL aggregates over an empty ungrouped set still return one row.
        if groups.is_empty() && query.group_by.is_empty() {
            groups.insert(Vec::new(), NativeAccumulator::default());
        }

        Ok(groups
            .into_iter()
            .map(|(values, acc)| PartialRow::new(values, acc.finish(query.op)))
            .collect())
    }

    async fn find_results(&self, query: &RecordQuery) -> DomainResult<Vec<TestResult>> {
        let inner = self.inner.read().await;
        let mut results: Vec<TestResult> = inner
            .results
            .iter()
            .filter(|r| query.scope.includes(&r.project_id) && query.range.contains(r.created_at))
            .cloned()
            .collect();
        results.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(results)
    }

    async fn distinct_values(&self, scope: &Scope, field: GroupField) -> DomainResult<Vec<GroupValue>> {
        let inner = self.inner.read().await;
        let values: BTreeSet<GroupValue> = inner
            .results
            .iter()
            .filter(|r| scope.includes(&r.project_id))
            .map(|r| r.group_value(field))
            .collect();
        Ok(values.into_iter().collect())
    }

    async fn list_entities(&self, scope: &Scope, kind: EntityKind) -> DomainResult<Vec<Entity>> {
        let inner = self.inner.read().await;
        let source = match kind {
            EntityKind::User => &inner.users,
            EntityKind::Run => &inner.runs,
        };
        Ok(source
            .iter()
            .filter(|e| e.project_id.as_deref().map_or(true, |p| scope.includes(p)))
            .cloned()
            .collect())
    }
}
