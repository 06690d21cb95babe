//! Test result records and the related entities reports hydrate from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::report::{GroupField, GroupValue, UNKNOWN_GROUP};

/// Outcome recorded for a single test execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultState {
    Passed,
    Failed,
    Blocked,
    Skipped,
    Retest,
    Untested,
}

impl Default for ResultState {
    fn default() -> Self {
        Self::Untested
    }
}

impl ResultState {
    pub const ALL: [Self; 6] = [
        Self::Passed,
        Self::Failed,
        Self::Blocked,
        Self::Skipped,
        Self::Retest,
        Self::Untested,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Blocked => "blocked",
            Self::Skipped => "skipped",
            Self::Retest => "retest",
            Self::Untested => "untested",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "passed" | "pass" => Some(Self::Passed),
            "failed" | "fail" => Some(Self::Failed),
            "blocked" => Some(Self::Blocked),
            "skipped" | "skip" => Some(Self::Skipped),
            "retest" => Some(Self::Retest),
            "untested" => Some(Self::Untested),
            _ => None,
        }
    }

    /// Human-readable label.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Passed => "Passed",
            Self::Failed => "Failed",
            Self::Blocked => "Blocked",
            Self::Skipped => "Skipped",
            Self::Retest => "Retest",
            Self::Untested => "Untested",
        }
    }

    /// Hex color used by report builders when charting this state.
    pub fn color(&self) -> &'static str {
        match self {
            Self::Passed => "#4caf50",
            Self::Failed => "#f44336",
            Self::Blocked => "#9e9e9e",
            Self::Skipped => "#ff9800",
            Self::Retest => "#2196f3",
            Self::Untested => "#cfd8dc",
        }
    }
}

impl fmt::Display for ResultState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single recorded test execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub id: String,
    pub project_id: String,
    pub run_id: String,
    pub title: String,
    #[serde(default)]
    pub state: ResultState,
    #[serde(default)]
    pub assignee_id: Option<String>,
    /// Wall-clock duration of the execution in seconds.
    #[serde(default)]
    pub elapsed_seconds: Option<f64>,
    #[serde(default)]
    pub automated: bool,
    pub created_at: DateTime<Utc>,
}

impl TestResult {
    /// Project this record onto a grouping field.
    ///
    /// Missing related-entity references group under [`UNKNOWN_GROUP`] and the
    /// creation instant is bucketed to its UTC day, matching what stores do natively.
    pub fn group_value(&self, field: GroupField) -> GroupValue {
        match field {
            GroupField::State => GroupValue::text(self.state.as_str()),
            GroupField::Assignee => GroupValue::text(
                self.assignee_id
                    .as_deref()
                    .filter(|id| !id.is_empty())
                    .unwrap_or(UNKNOWN_GROUP),
            ),
            GroupField::Run => GroupValue::text(&self.run_id),
            GroupField::Day => GroupValue::Date(self.created_at.date_naive()),
            GroupField::Automated => GroupValue::Bool(self.automated),
        }
    }
}

/// Kind of related entity a dimension can hydrate its display values from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    User,
    Run,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Run => "run",
        }
    }
}

/// A related entity (user, run) referenced by test results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    pub name: String,
    /// Scope the entity belongs to. Users are global and carry `None`.
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl Entity {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            project_id: None,
            attributes: BTreeMap::new(),
        }
    }

    /// Attach the owning project.
    pub fn in_project(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    /// Add a display attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}
