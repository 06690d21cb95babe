//! HTTP surface for reports.

pub mod reports_http;

pub use reports_http::{ErrorResponse, ReportsHttpConfig, ReportsHttpServer};
