//! # Data Models Module / 数据模型模块
//!
//! This module defines the core data structures used throughout the suite runner.
//! It includes the per-file descriptor, the per-file test report, individual case
//! results and the captured file-level errors.
//!
//! 此模块定义了整个套件运行器中使用的核心数据结构。
//! 它包括每个文件的描述符、每个文件的测试报告、单个用例结果以及捕获的文件级错误。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::execution::EngineError;

/// The lifecycle status of a test file.
/// A descriptor starts as `Pending` and moves to exactly one terminal state.
///
/// 测试文件的生命周期状态。
/// 描述符以 `Pending` 开始，并且只会转换到一个终止状态。
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    /// Not attempted (yet). A pending file in a final result was skipped.
    /// 尚未执行。最终结果中的 pending 文件表示被跳过。
    Pending,
    /// Every case in the file passed.
    /// 文件中的所有用例都通过了。
    Success,
    /// The file failed to load, timed out, or at least one case failed.
    /// 文件加载失败、超时或至少一个用例失败。
    Failed,
}

impl FileStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, FileStatus::Pending)
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FileStatus::Pending => "pending",
            FileStatus::Success => "success",
            FileStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Enumerates the reasons a whole file can fail outside of its case results.
/// 枚举整个文件在用例结果之外失败的原因。
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileErrorKind {
    /// The file's declarations could not be loaded.
    /// 无法加载文件的测试声明。
    Load,
    /// The file's execution exceeded the configured timeout.
    /// 文件执行超出了配置的超时时间。
    Timeout,
    /// The file's logic panicked outside of any case body.
    /// 文件逻辑在用例体之外发生了 panic。
    Panic,
}

/// A failure captured at the file-task boundary.
/// 在文件任务边界捕获的失败。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileError {
    pub kind: FileErrorKind,
    pub message: String,
    /// The full error chain or captured output, if any.
    pub stack: Option<String>,
}

impl FileError {
    /// Builds a load error from an `anyhow` error, keeping the whole context chain as the stack.
    pub fn load(err: &anyhow::Error) -> Self {
        Self {
            kind: FileErrorKind::Load,
            message: err.to_string(),
            stack: Some(format!("{err:?}")),
        }
    }

    pub fn timeout(limit: Duration) -> Self {
        Self {
            kind: FileErrorKind::Timeout,
            message: format!("Test file exceeded the timeout of {}ms", limit.as_millis()),
            stack: None,
        }
    }

    pub fn panic(message: impl Into<String>) -> Self {
        Self {
            kind: FileErrorKind::Panic,
            message: message.into(),
            stack: None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        self.kind == FileErrorKind::Timeout
    }
}

impl fmt::Display for FileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

/// Failure detail of a single case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseError {
    pub message: String,
    pub stack: Option<String>,
}

impl From<anyhow::Error> for CaseError {
    fn from(err: anyhow::Error) -> Self {
        Self {
            message: err.to_string(),
            stack: Some(format!("{err:?}")),
        }
    }
}

/// The result of a single test case.
/// 单个测试用例的结果。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseResult {
    pub name: String,
    pub passed: bool,
    pub error: Option<CaseError>,
    #[serde(with = "duration_ms")]
    pub duration: Duration,
}

impl CaseResult {
    pub fn passed(name: impl Into<String>, duration: Duration) -> Self {
        Self {
            name: name.into(),
            passed: true,
            error: None,
            duration,
        }
    }

    pub fn failed(name: impl Into<String>, error: CaseError, duration: Duration) -> Self {
        Self {
            name: name.into(),
            passed: false,
            error: Some(error),
            duration,
        }
    }
}

/// The result of running every case declared in one file.
/// Cases are kept in declaration order.
///
/// 运行一个文件中声明的所有用例的结果。
/// 用例按声明顺序保存。
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TestReport {
    pub passed: bool,
    pub cases: Vec<CaseResult>,
}

impl TestReport {
    /// Builds a report from case results. A file with zero cases counts as passing.
    pub fn from_cases(cases: Vec<CaseResult>) -> Self {
        let passed = cases.iter().all(|c| c.passed);
        Self { passed, cases }
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    pub fn passed_count(&self) -> usize {
        self.cases.iter().filter(|c| c.passed).count()
    }

    pub fn failed_count(&self) -> usize {
        self.cases.len() - self.passed_count()
    }
}

/// The per-file bookkeeping record tracking discovery, execution and result.
///
/// Created once by discovery with `status = Pending`, settled exactly once by the
/// execution engine, and read-only afterwards.
///
/// 每个文件的簿记记录，跟踪发现、执行和结果。
/// 由发现阶段以 `Pending` 状态创建，由执行引擎恰好终结一次，此后只读。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestFileDescriptor {
    path: PathBuf,
    status: FileStatus,
    report: Option<TestReport>,
    error: Option<FileError>,
    #[serde(with = "duration_ms::option")]
    duration: Option<Duration>,
}

/// How a file task settled, before it is written into its descriptor.
#[derive(Debug, Clone)]
pub enum FileOutcome {
    /// The file's logic completed normally; the report decides the status.
    Completed(TestReport),
    /// The file's logic failed at the task boundary.
    Errored(FileError),
}

impl TestFileDescriptor {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            status: FileStatus::Pending,
            report: None,
            error: None,
            duration: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn status(&self) -> FileStatus {
        self.status
    }

    pub fn report(&self) -> Option<&TestReport> {
        self.report.as_ref()
    }

    pub fn error(&self) -> Option<&FileError> {
        self.error.as_ref()
    }

    pub fn duration(&self) -> Option<Duration> {
        self.duration
    }

    pub fn is_skipped(&self) -> bool {
        self.status == FileStatus::Pending
    }

    pub fn is_timeout(&self) -> bool {
        self.error.as_ref().is_some_and(FileError::is_timeout)
    }

    /// Writes the terminal state. Fails if the descriptor was already settled,
    /// which can only happen through an engine bug.
    ///
    /// 写入终止状态。如果描述符已经被终结则失败，这只可能由引擎缺陷导致。
    pub fn settle(&mut self, outcome: FileOutcome, duration: Duration) -> Result<(), EngineError> {
        if self.status.is_terminal() {
            return Err(EngineError::AlreadySettled(self.path.clone()));
        }

        match outcome {
            FileOutcome::Completed(report) => {
                self.status = if report.passed {
                    FileStatus::Success
                } else {
                    FileStatus::Failed
                };
                self.report = Some(report);
            }
            FileOutcome::Errored(error) => {
                self.status = FileStatus::Failed;
                self.error = Some(error);
            }
        }
        self.duration = Some(duration);
        Ok(())
    }
}

/// Serde helpers storing durations as integer milliseconds.
pub(crate) mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }

    pub mod option {
        use serde::{Deserialize, Deserializer, Serializer};
        use std::time::Duration;

        pub fn serialize<S: Serializer>(d: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
            match d {
                Some(d) => s.serialize_some(&(d.as_millis() as u64)),
                None => s.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
            Ok(Option::<u64>::deserialize(d)?.map(Duration::from_millis))
        }
    }
}
