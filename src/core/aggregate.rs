//! # Report Aggregator / 报告聚合器
//!
//! Folds the terminal descriptors of a run into a read-only `RunResult`.
//!
//! 将一次运行的终止描述符折叠为只读的 `RunResult`。

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::models::{duration_ms, FileStatus, TestFileDescriptor};

/// The whole-run result handed to reporters.
/// 交给报告器的整次运行结果。
#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    started_at: DateTime<Utc>,
    #[serde(with = "duration_ms")]
    total_duration: Duration,
    passed: bool,
    files: BTreeMap<PathBuf, TestFileDescriptor>,
}

/// Counts derived from a `RunResult`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub files_total: usize,
    pub files_passed: usize,
    pub files_failed: usize,
    /// Files left `pending` because the run stopped early.
    pub files_skipped: usize,
    pub files_timed_out: usize,
    pub cases_passed: usize,
    pub cases_failed: usize,
}

impl RunResult {
    /// Builds the aggregate.
    ///
    /// `total_duration` is the wall-clock span of the run; per-file durations
    /// overlap and are not summed. The run passes iff every file is `Success`,
    /// so a file skipped by a bail also fails the run. An empty run passes.
    pub fn aggregate(
        descriptors: impl IntoIterator<Item = TestFileDescriptor>,
        started_at: DateTime<Utc>,
        total_duration: Duration,
    ) -> Self {
        let files: BTreeMap<PathBuf, TestFileDescriptor> = descriptors
            .into_iter()
            .map(|d| (d.path().to_path_buf(), d))
            .collect();
        let passed = files.values().all(|d| d.status() == FileStatus::Success);

        Self {
            started_at,
            total_duration,
            passed,
            files,
        }
    }

    pub fn passed(&self) -> bool {
        self.passed
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn total_duration(&self) -> Duration {
        self.total_duration
    }

    pub fn get(&self, path: &Path) -> Option<&TestFileDescriptor> {
        self.files.get(path)
    }

    /// Descriptors ordered by path.
    pub fn files(&self) -> impl Iterator<Item = &TestFileDescriptor> {
        self.files.values()
    }

    pub fn failed_files(&self) -> impl Iterator<Item = &TestFileDescriptor> {
        self.files
            .values()
            .filter(|d| d.status() == FileStatus::Failed)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn summary(&self) -> RunSummary {
        let mut summary = RunSummary {
            files_total: self.files.len(),
            ..RunSummary::default()
        };
        for descriptor in self.files.values() {
            match descriptor.status() {
                FileStatus::Success => summary.files_passed += 1,
                FileStatus::Failed => summary.files_failed += 1,
                FileStatus::Pending => summary.files_skipped += 1,
            }
            if descriptor.is_timeout() {
                summary.files_timed_out += 1;
            }
            if let Some(report) = descriptor.report() {
                summary.cases_passed += report.passed_count();
                summary.cases_failed += report.failed_count();
            }
        }
        summary
    }
}
