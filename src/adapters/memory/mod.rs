//! In-memory adapters, used by tests and fixtures.

pub mod result_store;

pub use result_store::InMemoryResultStore;
