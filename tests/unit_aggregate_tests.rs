//! # Aggregator Unit Tests / 聚合器单元测试
//!
//! Tests folding terminal descriptors into a `RunResult`.
//!
//! 测试将终止描述符折叠为 `RunResult`。

use chrono::Utc;
use std::path::Path;
use std::time::Duration;
use suite_runner::core::aggregate::RunResult;
use suite_runner::core::models::{
    CaseError, CaseResult, FileError, FileOutcome, TestFileDescriptor, TestReport,
};

fn settled(path: &str, passed: bool, duration_ms: u64) -> TestFileDescriptor {
    let case = if passed {
        CaseResult::passed("case", Duration::from_millis(1))
    } else {
        CaseResult::failed(
            "case",
            CaseError {
                message: "nope".to_string(),
                stack: None,
            },
            Duration::from_millis(1),
        )
    };
    let mut d = TestFileDescriptor::new(path);
    d.settle(
        FileOutcome::Completed(TestReport::from_cases(vec![case])),
        Duration::from_millis(duration_ms),
    )
    .unwrap();
    d
}

#[test]
fn test_all_success_passes() {
    let files = (0..5).map(|i| settled(&format!("/t/{i}.test.toml"), true, 10));
    let result = RunResult::aggregate(files, Utc::now(), Duration::from_millis(12));
    assert!(result.passed());
    assert_eq!(result.len(), 5);
}

#[test]
fn test_single_failure_flips_aggregate() {
    let mut files: Vec<_> = (0..4)
        .map(|i| settled(&format!("/t/{i}.test.toml"), true, 10))
        .collect();
    files.push(settled("/t/bad.test.toml", false, 10));

    let result = RunResult::aggregate(files, Utc::now(), Duration::from_millis(12));
    assert!(!result.passed());
    assert_eq!(result.failed_files().count(), 1);
}

#[test]
fn test_pending_file_fails_aggregate() {
    let files = vec![
        settled("/t/a.test.toml", true, 1),
        TestFileDescriptor::new("/t/b.test.toml"),
    ];
    let result = RunResult::aggregate(files, Utc::now(), Duration::from_millis(2));
    assert!(!result.passed());
    assert_eq!(result.summary().files_skipped, 1);
}

#[test]
fn test_empty_run_passes() {
    let result = RunResult::aggregate(Vec::new(), Utc::now(), Duration::ZERO);
    assert!(result.passed());
    assert!(result.is_empty());
}

#[test]
fn test_total_duration_is_wall_clock_not_sum() {
    let files = vec![
        settled("/t/a.test.toml", true, 100),
        settled("/t/b.test.toml", true, 100),
    ];
    let result = RunResult::aggregate(files, Utc::now(), Duration::from_millis(105));
    assert_eq!(result.total_duration(), Duration::from_millis(105));
}

#[test]
fn test_summary_counts() {
    let mut timed_out = TestFileDescriptor::new("/t/slow.test.toml");
    timed_out
        .settle(
            FileOutcome::Errored(FileError::timeout(Duration::from_millis(50))),
            Duration::from_millis(50),
        )
        .unwrap();

    let files = vec![
        settled("/t/a.test.toml", true, 1),
        settled("/t/b.test.toml", false, 1),
        timed_out,
        TestFileDescriptor::new("/t/skipped.test.toml"),
    ];
    let result = RunResult::aggregate(files, Utc::now(), Duration::from_millis(60));
    let summary = result.summary();

    assert_eq!(summary.files_total, 4);
    assert_eq!(summary.files_passed, 1);
    assert_eq!(summary.files_failed, 2);
    assert_eq!(summary.files_timed_out, 1);
    assert_eq!(summary.files_skipped, 1);
    assert_eq!(summary.cases_passed, 1);
    assert_eq!(summary.cases_failed, 1);
}

#[test]
fn test_files_are_ordered_and_addressable_by_path() {
    let files = vec![
        settled("/t/z.test.toml", true, 1),
        settled("/t/a.test.toml", true, 1),
    ];
    let result = RunResult::aggregate(files, Utc::now(), Duration::from_millis(1));

    let paths: Vec<_> = result.files().map(|d| d.path().to_path_buf()).collect();
    assert_eq!(paths[0], Path::new("/t/a.test.toml"));
    assert_eq!(paths[1], Path::new("/t/z.test.toml"));
    assert!(result.get(Path::new("/t/z.test.toml")).is_some());
    assert!(result.get(Path::new("/t/missing.test.toml")).is_none());
}
