//! Report request errors.

use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::errors::DomainError;

/// A request that cannot be computed as asked. Surfaced as HTTP 400.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("project_id is required unless cross_project is set")]
    MissingScope,

    #[error("at least one dimension is required")]
    EmptyDimensions,

    #[error("at least one metric is required")]
    EmptyMetrics,

    #[error("Unknown dimension: {0}")]
    UnknownDimension(String),

    #[error("Unknown metric: {0}")]
    UnknownMetric(String),

    #[error("Column requested more than once: {0}")]
    DuplicateColumn(String),

    #[error("Unknown sort column: {0}")]
    UnknownSortColumn(String),

    #[error("Invalid page: {0}. Pages start at 1")]
    InvalidPage(usize),

    #[error("Invalid page_size: {0}. Must be a positive integer or \"all\"")]
    InvalidPageSize(String),

    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },
}

/// Failure of a report request.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Report aggregation failed: {0}")]
    Aggregation(#[from] DomainError),
}

impl ReportError {
    /// HTTP-equivalent status for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::Aggregation(_) => 500,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Aggregation(_) => "AGGREGATION_ERROR",
        }
    }

    /// Message safe to hand to a caller.
    ///
    /// Aggregation failures are reduced to their category unless `expose_details` is set.
    pub fn public_message(&self, expose_details: bool) -> String {
        match self {
            Self::Validation(e) => e.to_string(),
            Self::Aggregation(e) if expose_details => e.to_string(),
            Self::Aggregation(e) => format!("report aggregation failed: {}", e.category()),
        }
    }
}
