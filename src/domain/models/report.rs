//! Report grid types shared by the catalog, the engine and the transports.

use chrono::{DateTime, Days, NaiveDate, SecondsFormat, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Store field a dimension groups on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GroupField {
    State,
    Assignee,
    Run,
    /// Day bucket derived from `created_at`.
    Day,
    /// Boolean automation flag.
    Automated,
}

impl GroupField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::State => "state",
            Self::Assignee => "assignee",
            Self::Run => "run",
            Self::Day => "day",
            Self::Automated => "automated",
        }
    }

    /// Whether the store can group on this field without fetching raw records.
    ///
    /// Derived fields (day truncation, boolean flags) are always grouped in memory.
    pub fn is_native(&self) -> bool {
        matches!(self, Self::State | Self::Assignee | Self::Run)
    }
}

impl fmt::Display for GroupField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Group label used when a related-entity reference is missing.
pub const UNKNOWN_GROUP: &str = "unknown";

/// Raw value of a grouping field for one record or group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GroupValue {
    Null,
    Text(String),
    Int(i64),
    Bool(bool),
    Date(NaiveDate),
    Timestamp(DateTime<Utc>),
}

impl GroupValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Truncate timestamps to their UTC day; every other value is returned unchanged.
    pub fn day_bucket(self) -> Self {
        match self {
            Self::Timestamp(ts) => Self::Date(ts.date_naive()),
            other => other,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Stable textual form used for display ids.
    pub fn as_key_string(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Text(s) => s.clone(),
            Self::Int(i) => i.to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Date(d) => d.format("%Y-%m-%d").to_string(),
            Self::Timestamp(ts) => ts.to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

impl fmt::Display for GroupValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            other => write!(f, "{}", other.as_key_string()),
        }
    }
}

/// Composite identity of one grid row across the active grouping fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupKey(Vec<GroupValue>);

impl GroupKey {
    /// Derive a key from raw grouping values, bucketing timestamps by UTC day.
    pub fn derive(values: &[GroupValue]) -> Self {
        Self(values.iter().cloned().map(GroupValue::day_bucket).collect())
    }

    pub fn values(&self) -> &[GroupValue] {
        &self.0
    }
}

/// Numeric value of a metric column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetricValue {
    Count(i64),
    Number(f64),
}

impl MetricValue {
    pub fn as_f64(&self) -> f64 {
        match self {
            #[allow(clippy::cast_precision_loss)]
            Self::Count(n) => *n as f64,
            Self::Number(x) => *x,
        }
    }
}

impl Default for MetricValue {
    fn default() -> Self {
        Self::Count(0)
    }
}

/// One metric's value for one group, as produced by either aggregation path.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialRow {
    /// Raw grouping values, aligned with the grouping fields of the request.
    pub values: Vec<GroupValue>,
    pub value: MetricValue,
}

impl PartialRow {
    pub fn new(values: Vec<GroupValue>, value: MetricValue) -> Self {
        Self { values, value }
    }
}

/// Rendered form of a dimension value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DisplayValue {
    Named {
        id: String,
        name: String,
        #[serde(skip_serializing_if = "BTreeMap::is_empty")]
        attributes: BTreeMap<String, String>,
    },
    DateBucket {
        date: NaiveDate,
    },
    /// The grouped value was null.
    None,
    /// The grouped value has no enumerated entity (deleted or orphaned reference).
    Unknown {
        id: String,
    },
}

impl DisplayValue {
    pub fn named(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Named {
            id: id.into(),
            name: name.into(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::None | Self::Unknown { .. })
    }

    /// Short label for tables and logs.
    pub fn label(&self) -> String {
        match self {
            Self::Named { name, .. } => name.clone(),
            Self::DateBucket { date } => date.format("%Y-%m-%d").to_string(),
            Self::None => "-".to_string(),
            Self::Unknown { id } if id.is_empty() => "Unknown".to_string(),
            Self::Unknown { id } => format!("Unknown ({id})"),
        }
    }
}

/// One pivot row: a display value per dimension and a number per metric.
///
/// Columns keep request order. Serializes as a flat JSON object.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReportRow {
    dimensions: Vec<(String, DisplayValue)>,
    metrics: Vec<(String, MetricValue)>,
}

impl ReportRow {
    pub fn new(dimensions: Vec<(String, DisplayValue)>, metrics: Vec<(String, MetricValue)>) -> Self {
        Self { dimensions, metrics }
    }

    pub fn dimension(&self, id: &str) -> Option<&DisplayValue> {
        self.dimensions.iter().find(|(k, _)| k == id).map(|(_, v)| v)
    }

    pub fn metric(&self, id: &str) -> Option<MetricValue> {
        self.metrics.iter().find(|(k, _)| k == id).map(|(_, v)| *v)
    }

    pub fn dimensions(&self) -> &[(String, DisplayValue)] {
        &self.dimensions
    }

    pub fn metrics(&self) -> &[(String, MetricValue)] {
        &self.metrics
    }

    /// Overwrite a metric column. Returns false if the column does not exist.
    pub fn set_metric(&mut self, id: &str, value: MetricValue) -> bool {
        match self.metrics.iter_mut().find(|(k, _)| k == id) {
            Some((_, slot)) => {
                *slot = value;
                true
            }
            None => false,
        }
    }
}

impl Serialize for ReportRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.dimensions.len() + self.metrics.len()))?;
        for (id, value) in &self.dimensions {
            map.serialize_entry(id, value)?;
        }
        for (id, value) in &self.metrics {
            map.serialize_entry(id, value)?;
        }
        map.end()
    }
}

/// Half-open UTC time window `[start, end)` applied to `created_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl DateRange {
    pub const fn unbounded() -> Self {
        Self { start: None, end: None }
    }

    /// Build a window from calendar days; the end day is inclusive.
    pub fn from_days(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self {
            start: start.map(|d| d.and_time(chrono::NaiveTime::MIN).and_utc()),
            end: end
                .and_then(|d| d.checked_add_days(Days::new(1)))
                .map(|d| d.and_time(chrono::NaiveTime::MIN).and_utc()),
        }
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.start.map_or(true, |s| ts >= s) && self.end.map_or(true, |e| ts < e)
    }
}

/// Owning collection a report is computed over.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    Project(String),
    /// Cross-project report (administrative).
    All,
}

impl Scope {
    pub fn project_id(&self) -> Option<&str> {
        match self {
            Self::Project(id) => Some(id),
            Self::All => None,
        }
    }

    pub fn includes(&self, project_id: &str) -> bool {
        self.project_id().map_or(true, |id| id == project_id)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Project(id) => write!(f, "project:{id}"),
            Self::All => write!(f, "all"),
        }
    }
}

/// Number of rows per page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "PageSizeRepr", into = "PageSizeRepr")]
pub enum PageSize {
    #[default]
    All,
    Rows(usize),
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum PageSizeRepr {
    Rows(usize),
    Text(String),
}

impl TryFrom<PageSizeRepr> for PageSize {
    type Error = String;

    fn try_from(repr: PageSizeRepr) -> Result<Self, Self::Error> {
        match repr {
            PageSizeRepr::Rows(n) => Ok(Self::Rows(n)),
            PageSizeRepr::Text(s) => s.parse(),
        }
    }
}

impl From<PageSize> for PageSizeRepr {
    fn from(size: PageSize) -> Self {
        match size {
            PageSize::All => Self::Text("all".to_string()),
            PageSize::Rows(n) => Self::Rows(n),
        }
    }
}

impl std::str::FromStr for PageSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        s.parse::<usize>()
            .map(Self::Rows)
            .map_err(|_| format!("invalid page size '{s}': expected a positive integer or \"all\""))
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Rows(n) => write!(f, "{n}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl std::str::FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" | "ascending" => Ok(Self::Asc),
            "desc" | "descending" => Ok(Self::Desc),
            _ => Err(format!("invalid sort direction '{s}': expected asc or desc")),
        }
    }
}

/// A fully computed report. Serializes with camelCase keys.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportResult {
    /// Rows of the requested page.
    pub results: Vec<ReportRow>,
    /// Every row, sorted, unpaginated.
    pub all_results: Vec<ReportRow>,
    pub total_count: usize,
    pub page: usize,
    pub page_size: PageSize,
}
