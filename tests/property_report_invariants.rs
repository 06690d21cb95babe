//! Property tests over randomly generated result sets.

mod common;

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;
use std::collections::HashSet;

use common::{engine, memory_store};
use tally::domain::models::{PageSize, ReportRequest, ResultState, SortDirection, TestResult};

fn arb_result() -> impl Strategy<Value = (usize, u8, Option<u8>, Option<u16>, bool, u32)> {
    (
        0usize..ResultState::ALL.len(),
        0u8..3,
        proptest::option::of(0u8..4),
        proptest::option::of(0u16..600),
        any::<bool>(),
        0u32..(5 * 24 * 60),
    )
}

fn build(specs: Vec<(usize, u8, Option<u8>, Option<u16>, bool, u32)>) -> Vec<TestResult> {
    let base = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    specs
        .into_iter()
        .enumerate()
        .map(|(i, (state, run, assignee, elapsed, automated, minutes))| TestResult {
            id: format!("r{i:04}"),
            project_id: "p1".to_string(),
            run_id: format!("run-{run}"),
            title: format!("case {i}"),
            state: ResultState::ALL[state],
            assignee_id: assignee.map(|a| format!("u{a}")),
            elapsed_seconds: elapsed.map(f64::from),
            automated,
            created_at: base + Duration::minutes(i64::from(minutes)),
        })
        .collect()
}

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(future)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// Property: rows are unique per composite key, bounded by the key space,
    /// and their counts add up to the ungrouped total.
    #[test]
    fn prop_grouping_partitions_results(specs in proptest::collection::vec(arb_result(), 0..60)) {
        let results = build(specs);
        let total = results.len();

        let report = block_on(async {
            let engine = engine(memory_store(results).await);
            engine
                .run(&ReportRequest::for_project("p1").dimension("state").dimension("day").dimension("automated").metric("count").metric("automatedCount"))
                .await
                .unwrap()
        });

        let keys: HashSet<String> = report
            .all_results
            .iter()
            .map(|r| r.dimensions().iter().map(|(_, v)| v.label()).collect::<Vec<_>>().join("|"))
            .collect();
        prop_assert_eq!(keys.len(), report.all_results.len());
        prop_assert!(report.all_results.len() <= ResultState::ALL.len() * 6 * 2);

        let counted: f64 = report.all_results.iter().map(|r| r.metric("count").unwrap().as_f64()).sum();
        prop_assert!((counted - total as f64).abs() < f64::EPSILON);

        for row in &report.all_results {
            prop_assert!(row.metric("automatedCount").unwrap().as_f64() <= row.metric("count").unwrap().as_f64());
        }
    }

    /// Property: pages concatenate to the sorted full result and the metric
    /// sort is monotonic.
    #[test]
    fn prop_pages_concatenate(specs in proptest::collection::vec(arb_result(), 0..60), size in 1usize..7) {
        let results = build(specs);

        let (full, pages) = block_on(async {
            let engine = engine(memory_store(results).await);
            let base = ReportRequest::for_project("p1")
                .dimension("assignee")
                .dimension("run")
                .metric("avgElapsedMs")
                .sorted_by("avgElapsedMs", SortDirection::Desc);

            let full = engine.run(&base).await.unwrap();
            let mut pages = Vec::new();
            for page in 1..=full.total_count / size + 1 {
                pages.extend(engine.run(&base.clone().paged(page, PageSize::Rows(size))).await.unwrap().results);
            }
            (full, pages)
        });

        prop_assert_eq!(&pages, &full.all_results);

        let values: Vec<f64> = full.all_results.iter().map(|r| r.metric("avgElapsedMs").unwrap().as_f64()).collect();
        prop_assert!(values.windows(2).all(|w| w[0] >= w[1]));
    }
}
