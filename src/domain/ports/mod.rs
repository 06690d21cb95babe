//! Port trait definitions (Hexagonal Architecture)
//!
//! The reporting engine only reaches stored data through [`ResultStore`]; the
//! SQLite and in-memory adapters implement it.

pub mod result_store;

pub use result_store::{AggregateOp, AggregateQuery, RecordQuery, ResultStore};
