//! Dimension and metric contracts and the registry that holds them.

use async_trait::async_trait;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use thiserror::Error;

use crate::domain::errors::DomainResult;
use crate::domain::models::{
    DateRange, DisplayValue, GroupField, GroupValue, MetricValue, PartialRow, Scope,
};
use crate::domain::ports::ResultStore;

/// One enumerated value of a dimension, with whatever the dimension needs to render it.
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionMember {
    pub value: GroupValue,
    pub name: Option<String>,
    pub attributes: BTreeMap<String, String>,
}

impl DimensionMember {
    pub fn new(value: GroupValue) -> Self {
        Self {
            value,
            name: None,
            attributes: BTreeMap::new(),
        }
    }

    pub fn named(value: GroupValue, name: impl Into<String>) -> Self {
        Self {
            value,
            name: Some(name.into()),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attributes(mut self, attributes: BTreeMap<String, String>) -> Self {
        self.attributes = attributes;
        self
    }
}

/// A grouping axis.
#[async_trait]
pub trait Dimension: Send + Sync {
    fn id(&self) -> &str;

    fn label(&self) -> &str;

    /// Store field partial rows are grouped on for this dimension.
    fn group_by_field(&self) -> GroupField;

    /// Whether values render as date buckets (drives the default sort).
    fn is_date(&self) -> bool {
        self.group_by_field() == GroupField::Day
    }

    /// Every value of this axis that exists within `scope`.
    async fn enumerate(&self, store: &dyn ResultStore, scope: &Scope) -> DomainResult<Vec<DimensionMember>>;

    /// Render an enumerated member. Must be pure.
    fn display(&self, member: &DimensionMember) -> DisplayValue;
}

/// Inputs shared by every metric of one request.
#[derive(Debug, Clone)]
pub struct AggregationContext {
    pub scope: Scope,
    /// Ordered grouping fields; partial rows align their values with this list.
    pub group_by: Vec<GroupField>,
    pub range: DateRange,
}

/// An aggregate measure.
#[async_trait]
pub trait Metric: Send + Sync {
    fn id(&self) -> &str;

    fn label(&self) -> &str;

    /// Presentation unit of the values, if any.
    fn unit(&self) -> Option<&str> {
        None
    }

    /// Value reported for a group this metric produced no row for.
    fn zero(&self) -> MetricValue {
        MetricValue::Count(0)
    }

    /// One partial row per group, at most one per distinct group key.
    async fn aggregate(&self, store: &dyn ResultStore, ctx: &AggregationContext) -> DomainResult<Vec<PartialRow>>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("Duplicate catalog id: {0}")]
    DuplicateId(String),

    #[error("Alias '{alias}' points at unknown metric '{target}'")]
    UnknownAliasTarget { alias: String, target: String },

    #[error("Alias '{0}' shadows a registered id")]
    AliasShadowsId(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct DimensionInfo {
    pub id: String,
    pub label: String,
    pub date: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricInfo {
    pub id: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// Available columns, without any computed values.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogMetadata {
    pub dimensions: Vec<DimensionInfo>,
    pub metrics: Vec<MetricInfo>,
}

/// Registry of dimensions and metrics, built once and shared read-only.
pub struct ReportCatalog {
    dimensions: Vec<Arc<dyn Dimension>>,
    metrics: Vec<Arc<dyn Metric>>,
    dimension_index: HashMap<String, usize>,
    metric_index: HashMap<String, usize>,
    metric_aliases: HashMap<String, String>,
}

impl ReportCatalog {
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::default()
    }

    pub fn dimension(&self, id: &str) -> Option<&Arc<dyn Dimension>> {
        self.dimension_index.get(id).map(|&i| &self.dimensions[i])
    }

    pub fn metric(&self, id: &str) -> Option<&Arc<dyn Metric>> {
        self.metric_index.get(id).map(|&i| &self.metrics[i])
    }

    /// Canonical metric id for a registered alias.
    pub fn resolve_metric_alias(&self, alias: &str) -> Option<&str> {
        self.metric_aliases.get(alias).map(String::as_str)
    }

    pub fn metadata(&self) -> CatalogMetadata {
        CatalogMetadata {
            dimensions: self
                .dimensions
                .iter()
                .map(|d| DimensionInfo {
                    id: d.id().to_string(),
                    label: d.label().to_string(),
                    date: d.is_date(),
                })
                .collect(),
            metrics: self
                .metrics
                .iter()
                .map(|m| MetricInfo {
                    id: m.id().to_string(),
                    label: m.label().to_string(),
                    unit: m.unit().map(str::to_string),
                })
                .collect(),
        }
    }
}

/// Collects catalog entries; ids are unique across dimensions, metrics and aliases.
#[derive(Default)]
pub struct CatalogBuilder {
    dimensions: Vec<Arc<dyn Dimension>>,
    metrics: Vec<Arc<dyn Metric>>,
    aliases: Vec<(String, String)>,
}

impl CatalogBuilder {
    pub fn dimension(mut self, dimension: impl Dimension + 'static) -> Self {
        self.dimensions.push(Arc::new(dimension));
        self
    }

    pub fn metric(mut self, metric: impl Metric + 'static) -> Self {
        self.metrics.push(Arc::new(metric));
        self
    }

    /// Accept `alias` as a sort column for the metric `target`.
    pub fn metric_alias(mut self, alias: impl Into<String>, target: impl Into<String>) -> Self {
        self.aliases.push((alias.into(), target.into()));
        self
    }

    pub fn build(self) -> Result<ReportCatalog, CatalogError> {
        let mut dimension_index = HashMap::new();
        let mut metric_index = HashMap::new();

        for (i, dimension) in self.dimensions.iter().enumerate() {
            if dimension_index.insert(dimension.id().to_string(), i).is_some() {
                return Err(CatalogError::DuplicateId(dimension.id().to_string()));
            }
        }
        for (i, metric) in self.metrics.iter().enumerate() {
            let id = metric.id();
            if dimension_index.contains_key(id) || metric_index.insert(id.to_string(), i).is_some() {
                return Err(CatalogError::DuplicateId(id.to_string()));
            }
        }

        let mut metric_aliases = HashMap::new();
        for (alias, target) in self.aliases {
            if dimension_index.contains_key(&alias) || metric_index.contains_key(&alias) {
                return Err(CatalogError::AliasShadowsId(alias));
            }
            if !metric_index.contains_key(&target) {
                return Err(CatalogError::UnknownAliasTarget { alias, target });
            }
            if metric_aliases.insert(alias.clone(), target).is_some() {
                return Err(CatalogError::DuplicateId(alias));
            }
        }

        Ok(ReportCatalog {
            dimensions: self.dimensions,
            metrics: self.metrics,
            dimension_index,
            metric_index,
            metric_aliases,
        })
    }
}
