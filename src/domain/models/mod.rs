//! Domain models for the tally reporting system.

pub mod config;
pub mod report;
pub mod request;
pub mod test_result;

pub use config::{Config, DatabaseConfig, LoggingConfig, ReportsConfig, ServerConfig};
pub use report::{
    DateRange, DisplayValue, GroupField, GroupKey, GroupValue, MetricValue, PageSize, PartialRow,
    ReportResult, ReportRow, Scope, SortDirection, UNKNOWN_GROUP,
};
pub use request::ReportRequest;
pub use test_result::{Entity, EntityKind, ResultState, TestResult};
