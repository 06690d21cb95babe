//! Common test utilities for integration tests
//!
//! Shared fixtures: a small seeded project, store constructors and an engine
//! over the built-in catalog.

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use std::sync::Arc;

use tally::adapters::memory::InMemoryResultStore;
use tally::adapters::sqlite::{create_migrated_test_pool, SqliteResultStore};
use tally::domain::models::{Entity, EntityKind, ResultState, TestResult};
use tally::{standard_catalog, ReportEngine, ReportsConfig, ResultStore};

pub fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap()
}

/// Builder-style constructor for a result in project `p1`.
pub fn result(id: &str, state: ResultState, elapsed: Option<f64>, created_at: DateTime<Utc>) -> TestResult {
    TestResult {
        id: id.to_string(),
        project_id: "p1".to_string(),
        run_id: "run-1".to_string(),
        title: format!("case {id}"),
        state,
        assignee_id: None,
        elapsed_seconds: elapsed,
        automated: false,
        created_at,
    }
}

/// Three results, two states, elapsed 60, 120 and 0 seconds.
pub fn scenario_results() -> Vec<TestResult> {
    vec![
        result("r1", ResultState::Passed, Some(60.0), at(1, 9)),
        result("r2", ResultState::Passed, Some(120.0), at(1, 23)),
        result("r3", ResultState::Failed, Some(0.0), at(2, 0)),
    ]
}

/// A richer project: assignees (one deleted), two runs, automation flags,
/// a second project that must never leak into `p1` reports.
pub fn project_results() -> Vec<TestResult> {
    let mut results = Vec::new();
    let states = [ResultState::Passed, ResultState::Failed, ResultState::Blocked, ResultState::Passed];
    for i in 0..12u32 {
        let mut r = result(
            &format!("p1-{i:02}"),
            states[i as usize % states.len()],
            if i % 5 == 0 { None } else { Some(f64::from(i) * 1.5) },
            at(1 + i % 3, (i * 5) % 24),
        );
        r.assignee_id = match i % 4 {
            0 => Some("u1".to_string()),
            1 => Some("u2".to_string()),
            2 => Some("ghost".to_string()),
            _ => None,
        };
        r.run_id = if i % 2 == 0 { "run-1".to_string() } else { "run-2".to_string() };
        r.automated = i % 3 == 0;
        results.push(r);
    }

    let mut other = result("p2-00", ResultState::Failed, Some(999.0), at(1, 10));
    other.project_id = "p2".to_string();
    other.run_id = "run-9".to_string();
    results.push(other);
    results
}

pub fn users() -> Vec<Entity> {
    vec![
        Entity::new("u1", "Ana").with_attribute("email", "ana@example.com"),
        Entity::new("u2", "Bo"),
    ]
}

pub fn runs() -> Vec<Entity> {
    vec![
        Entity::new("run-1", "Nightly").in_project("p1").with_attribute("milestone", "1.0"),
        Entity::new("run-2", "Smoke").in_project("p1"),
        Entity::new("run-9", "Other").in_project("p2"),
    ]
}

pub async fn memory_store(results: Vec<TestResult>) -> InMemoryResultStore {
    let store = InMemoryResultStore::new();
    store.insert_results(results).await;
    for user in users() {
        store.insert_entity(EntityKind::User, user).await;
    }
    for run in runs() {
        store.insert_entity(EntityKind::Run, run).await;
    }
    store
}

pub async fn sqlite_store(results: Vec<TestResult>) -> SqliteResultStore {
    let pool = create_migrated_test_pool().await.expect("failed to create test pool");
    let store = SqliteResultStore::new(pool);
    for user in users() {
        store.upsert_user(&user).await.expect("failed to insert user");
    }
    for run in runs() {
        store.upsert_run(&run).await.expect("failed to insert run");
    }
    for result in &results {
        store.insert_result(result).await.expect("failed to insert result");
    }
    store
}

pub fn engine<S: ResultStore + 'static>(store: S) -> ReportEngine<S> {
    ReportEngine::new(
        Arc::new(store),
        Arc::new(standard_catalog().expect("standard catalog")),
        ReportsConfig::default(),
    )
}

/// Setup test logging
///
/// Initializes tracing subscriber for test output.
pub fn setup_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}
