//! Tally - ad-hoc report aggregation over test results
//!
//! Tally turns a request naming dimensions (grouping axes such as state,
//! assignee, run or day) and metrics (count, elapsed time, pass rate) into a
//! sorted, paginated pivot table.
//!
//! # Architecture
//!
//! This crate follows Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): models, errors and the `ResultStore` port
//! - **Service Layer** (`services`): the report catalog and engine
//! - **Adapters** (`adapters`): SQLite and in-memory stores, HTTP API
//! - **Infrastructure Layer** (`infrastructure`): configuration and logging
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use tally::adapters::memory::InMemoryResultStore;
//! use tally::services::{standard_catalog, ReportEngine};
//! use tally::ReportRequest;
//!
//! let engine = ReportEngine::new(
//!     Arc::new(InMemoryResultStore::new()),
//!     Arc::new(standard_catalog()?),
//!     Default::default(),
//! );
//! let report = engine
//!     .run(&ReportRequest::for_project("p1").dimension("state").metric("count"))
//!     .await?;
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::models::{
    Config, DatabaseConfig, DisplayValue, LoggingConfig, MetricValue, PageSize, ReportRequest, ReportResult,
    ReportRow, ReportsConfig, ServerConfig, SortDirection, TestResult,
};
pub use domain::ports::ResultStore;
pub use domain::{DomainError, DomainResult};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{standard_catalog, ReportCatalog, ReportEngine, ReportError, ValidationError};
