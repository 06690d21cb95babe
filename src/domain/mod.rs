//! Domain layer for the tally reporting system
//!
//! Models, error types and the store port the reporting engine consumes.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{DomainError, DomainResult};
