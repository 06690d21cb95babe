//! End-to-end report computation over the SQLite and in-memory stores.

mod common;

use std::sync::Arc;

use chrono::NaiveDate;
use common::{engine, memory_store, project_results, scenario_results, sqlite_store};
use tally::domain::models::{DisplayValue, MetricValue, PageSize, ReportRequest, SortDirection};
use tally::{standard_catalog, ReportEngine, ReportsConfig, ResultStore};

fn metric_total(rows: &[tally::ReportRow], id: &str) -> f64 {
    rows.iter().map(|r| r.metric(id).expect("metric column").as_f64()).sum()
}

async fn check_state_scenario<S: ResultStore + 'static>(engine: ReportEngine<S>) {
    let request = ReportRequest::for_project("p1")
        .dimension("state")
        .metric("count")
        .metric("sumElapsedMs");

    let report = engine.run(&request).await.expect("report should succeed");

    assert_eq!(report.total_count, 2, "one row per state");
    assert_eq!(report.results, report.all_results);
    assert!((metric_total(&report.all_results, "count") - 3.0).abs() < f64::EPSILON);
    assert!((metric_total(&report.all_results, "sumElapsedMs") - 180_000.0).abs() < 1e-6);

    let passed = report
        .all_results
        .iter()
        .find(|r| matches!(r.dimension("state"), Some(DisplayValue::Named { id, .. }) if id == "passed"))
        .expect("passed row");
    assert_eq!(passed.metric("count"), Some(MetricValue::Count(2)));
}

#[tokio::test]
async fn test_state_scenario_in_memory() {
    check_state_scenario(engine(memory_store(scenario_results()).await)).await;
}

#[tokio::test]
async fn test_state_scenario_sqlite() {
    check_state_scenario(engine(sqlite_store(scenario_results()).await)).await;
}

#[tokio::test]
async fn test_day_dimension_buckets_by_utc_day() {
    let engine = engine(sqlite_store(scenario_results()).await);
    let request = ReportRequest::for_project("p1").dimension("day").metric("count");

    let report = engine.run(&request).await.unwrap();

    let rows: Vec<_> = report
        .all_results
        .iter()
        .map(|r| (r.dimension("day").unwrap().label(), r.metric("count").unwrap()))
        .collect();
    assert_eq!(
        rows,
        vec![
            ("2024-03-01".to_string(), MetricValue::Count(2)),
            ("2024-03-02".to_string(), MetricValue::Count(1)),
        ]
    );
}

#[tokio::test]
async fn test_end_date_is_inclusive() {
    let engine = engine(sqlite_store(scenario_results()).await);
    let day = NaiveDate::from_ymd_opt(2024, 3, 1);
    let request = ReportRequest::for_project("p1").dimension("state").metric("count").between(day, day);

    let report = engine.run(&request).await.unwrap();

    assert_eq!(report.total_count, 1);
    assert_eq!(report.all_results[0].metric("count"), Some(MetricValue::Count(2)));
}

#[tokio::test]
async fn test_project_scope_and_cross_project() {
    let engine = engine(memory_store(project_results()).await);

    let scoped = ReportRequest::for_project("p1").dimension("state").metric("count");
    let report = engine.run(&scoped).await.unwrap();
    assert!((metric_total(&report.all_results, "count") - 12.0).abs() < f64::EPSILON);

    let everything = ReportRequest {
        cross_project: true,
        ..ReportRequest::default().dimension("state").metric("count")
    };
    let report = engine.run(&everything).await.unwrap();
    assert!((metric_total(&report.all_results, "count") - 13.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_orphaned_and_missing_assignees_render_unknown() {
    let engine = engine(sqlite_store(project_results()).await);
    let request = ReportRequest::for_project("p1")
        .dimension("assignee")
        .metric("count")
        .sorted_by("assignee", SortDirection::Asc);

    let report = engine.run(&request).await.unwrap();

    let labels: Vec<_> = report.all_results.iter().map(|r| r.dimension("assignee").unwrap().label()).collect();
    assert_eq!(labels, vec!["Ana", "Bo", "Unknown (ghost)", "Unknown (unknown)"]);
    assert!(report.all_results.iter().all(|r| r.metric("count") == Some(MetricValue::Count(3))));

    match report.all_results[0].dimension("assignee") {
        Some(DisplayValue::Named { attributes, .. }) => {
            assert_eq!(attributes.get("email").map(String::as_str), Some("ana@example.com"));
        }
        other => panic!("expected named assignee, got {other:?}"),
    }
}

#[tokio::test]
async fn test_stores_agree_on_every_path() {
    let memory = engine(memory_store(project_results()).await);
    let sqlite = engine(sqlite_store(project_results()).await);

    let requests = [
        ReportRequest::for_project("p1")
            .dimension("state")
            .metric("count")
            .metric("sumElapsedMs")
            .metric("avgElapsedMs"),
        ReportRequest::for_project("p1")
            .dimension("assignee")
            .dimension("run")
            .metric("count")
            .metric("passRate"),
        ReportRequest::for_project("p1")
            .dimension("day")
            .dimension("automated")
            .metric("count")
            .metric("automatedCount")
            .metric("avgElapsedMs"),
        ReportRequest::for_project("p1").dimension("run").dimension("day").metric("sumElapsedMs"),
    ];

    for request in &requests {
        let a = memory.run(request).await.unwrap();
        let b = sqlite.run(request).await.unwrap();
        assert_eq!(a.all_results, b.all_results, "stores disagree for {:?}", request.dimensions);
    }
}

#[tokio::test]
async fn test_pages_concatenate_to_all_results() {
    let engine = engine(memory_store(project_results()).await);
    let base = ReportRequest::for_project("p1")
        .dimension("assignee")
        .dimension("state")
        .metric("count")
        .sorted_by("count", SortDirection::Desc);

    let full = engine.run(&base).await.unwrap();
    let mut collected = Vec::new();
    let mut page = 1;
    loop {
        let report = engine.run(&base.clone().paged(page, PageSize::Rows(3))).await.unwrap();
        assert_eq!(report.total_count, full.total_count);
        if report.results.is_empty() {
            break;
        }
        collected.extend(report.results);
        page += 1;
    }

    assert_eq!(collected, full.all_results);
}

#[tokio::test]
async fn test_metric_sort_is_monotonic() {
    let engine = engine(sqlite_store(project_results()).await);
    let request = ReportRequest::for_project("p1")
        .dimension("run")
        .dimension("state")
        .metric("sumElapsedMs")
        .sorted_by("elapsedMs", SortDirection::Desc);

    let report = engine.run(&request).await.unwrap();

    let values: Vec<f64> = report
        .all_results
        .iter()
        .map(|r| r.metric("sumElapsedMs").unwrap().as_f64())
        .collect();
    assert!(values.windows(2).all(|w| w[0] >= w[1]), "not descending: {values:?}");
}

#[tokio::test]
async fn test_unknown_ids_fail_validation() {
    let engine = engine(memory_store(project_results()).await);

    let err = engine
        .run(&ReportRequest::for_project("p1").dimension("colour").metric("count"))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 400);
    assert_eq!(err.public_message(false), "Unknown dimension: colour");

    let err = engine
        .run(&ReportRequest::for_project("p1").dimension("state").metric("bogus"))
        .await
        .unwrap_err();
    assert_eq!(err.public_message(false), "Unknown metric: bogus");
}

#[tokio::test]
async fn test_ungrouped_report_on_empty_project() {
    let store = sqlite_store(project_results()).await;
    let engine = ReportEngine::new(
        Arc::new(store),
        Arc::new(standard_catalog().unwrap()),
        ReportsConfig { allow_ungrouped: true, ..ReportsConfig::default() },
    );

    let request = ReportRequest::for_project("nobody").metric("count").metric("passRate");
    let report = engine.run(&request).await.unwrap();

    assert_eq!(report.total_count, 1);
    assert_eq!(report.all_results[0].metric("count"), Some(MetricValue::Count(0)));
    assert_eq!(report.all_results[0].metric("passRate"), Some(MetricValue::Number(0.0)));
}

#[tokio::test]
async fn test_row_columns_are_keyed_by_metric_id() {
    let engine = engine(memory_store(scenario_results()).await);
    let labels: Vec<String> = engine.metadata().metrics.iter().map(|m| m.label.clone()).collect();

    let report = engine
        .run(&ReportRequest::for_project("p1").dimension("state").metric("count").metric("sumElapsedMs"))
        .await
        .unwrap();

    let row = serde_json::to_value(&report.results[0]).unwrap();
    let keys: Vec<&str> = row.as_object().unwrap().keys().map(String::as_str).collect();
    assert_eq!(keys.len(), 3);
    for key in ["state", "count", "sumElapsedMs"] {
        assert!(keys.contains(&key), "missing column {key}");
    }
    assert!(labels.iter().all(|label| !keys.contains(&label.as_str())));
}
