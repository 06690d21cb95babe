pub mod reporting;

pub use reporting::{standard_catalog, ReportCatalog, ReportEngine, ReportError, ValidationError};
