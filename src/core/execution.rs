//! # Test Execution Engine Module / 测试执行引擎模块
//!
//! This module drives concurrent, isolated execution of all discovered test
//! files. Each file runs in its own task; failures, panics and timeouts are
//! caught at the file-task boundary and written into that file's descriptor
//! only, so one file can never corrupt or cancel another.
//!
//! 此模块驱动所有已发现测试文件的并发隔离执行。
//! 每个文件在自己的任务中运行；失败、panic 和超时在文件任务边界被捕获，
//! 并只写入该文件的描述符，因此一个文件永远不会破坏或取消另一个文件。
//!
//! ## Bail / 快速失败
//!
//! Bail is cooperative: the first failed file cancels a shared token, files
//! that have not started yet stay `pending`, and files already running finish
//! normally and keep their real status.
//!
//! 快速失败是协作式的：第一个失败的文件会取消共享令牌，尚未开始的文件保持 `pending`，
//! 已在运行的文件正常结束并保留其真实状态。

use chrono::Utc;
use futures::{stream, StreamExt};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tokio_util::task::AbortOnDropHandle;
use tracing::{debug, info, warn};

use crate::core::aggregate::RunResult;
use crate::core::config::RunnerConfig;
use crate::core::file_test::{panic_message, FileTest};
use crate::core::loader::TestLoader;
use crate::core::models::{FileError, FileOutcome, FileStatus, TestFileDescriptor};

/// Faults of the engine itself. These are never test failures and abort the run.
/// 引擎自身的故障。它们不是测试失败，会中止整个运行。
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("test file listed more than once: {0}")]
    DuplicatePath(PathBuf),
    #[error("descriptor for {0} was settled more than once")]
    AlreadySettled(PathBuf),
    #[error("file task for {path} aborted outside the isolation boundary: {message}")]
    TaskAborted { path: PathBuf, message: String },
}

/// Options controlling a single run.
/// 控制单次运行的选项。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineOptions {
    /// Per-file limit. `None` lets a file run forever.
    pub timeout: Option<Duration>,
    pub bail: bool,
    pub verbose: bool,
    /// Max files in flight. `None` starts every file at once.
    pub jobs: Option<usize>,
}

impl From<&RunnerConfig> for EngineOptions {
    fn from(config: &RunnerConfig) -> Self {
        Self {
            timeout: config.timeout(),
            bail: config.bail,
            verbose: config.verbose,
            jobs: config.jobs,
        }
    }
}

/// Progress notifications for streaming reporters.
/// 供流式报告器使用的进度通知。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEvent {
    FileStarted {
        path: PathBuf,
    },
    FileFinished {
        path: PathBuf,
        status: FileStatus,
        duration: Duration,
    },
}

/// Runs a set of test files and aggregates their results.
pub struct ExecutionEngine {
    options: EngineOptions,
    loader: Arc<dyn TestLoader>,
    listeners: Vec<mpsc::UnboundedSender<RunEvent>>,
    stop_token: CancellationToken,
}

impl ExecutionEngine {
    pub fn new(options: EngineOptions, loader: Arc<dyn TestLoader>) -> Self {
        Self {
            options,
            loader,
            listeners: Vec::new(),
            stop_token: CancellationToken::new(),
        }
    }

    /// Uses an externally owned token, e.g. one cancelled on Ctrl-C.
    /// Cancelling it has the same effect as a bail.
    pub fn with_stop_token(mut self, token: CancellationToken) -> Self {
        self.stop_token = token;
        self
    }

    pub fn with_listener(mut self, listener: mpsc::UnboundedSender<RunEvent>) -> Self {
        self.listeners.push(listener);
        self
    }

    /// Registers a new listener and returns its receiving end.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<RunEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.listeners.push(tx);
        rx
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Executes every descriptor and resolves once all started files have
    /// settled. Files never started because of a bail remain `pending`.
    ///
    /// 执行所有描述符，并在所有已启动文件结束后返回。
    /// 因快速失败而从未启动的文件保持 `pending`。
    pub async fn run(
        &self,
        descriptors: Vec<TestFileDescriptor>,
    ) -> Result<RunResult, EngineError> {
        let started_at = Utc::now();
        let clock = Instant::now();

        let mut seen = HashSet::with_capacity(descriptors.len());
        for descriptor in &descriptors {
            if !seen.insert(descriptor.path().to_path_buf()) {
                return Err(EngineError::DuplicatePath(descriptor.path().to_path_buf()));
            }
        }

        info!("Loading test files...");
        info!("{} test files loaded.", descriptors.len());

        let jobs = self.options.jobs.unwrap_or(descriptors.len()).max(1);
        let failures = Arc::new(AtomicUsize::new(0));

        let settled: Vec<_> = stream::iter(descriptors.into_iter().map(|descriptor| {
            let ctx = FileTaskContext {
                loader: Arc::clone(&self.loader),
                listeners: self.listeners.clone(),
                stop_token: self.stop_token.clone(),
                failures: Arc::clone(&failures),
                options: self.options.clone(),
            };
            let path = descriptor.path().to_path_buf();
            let handle = tokio::spawn(run_file_task(descriptor, ctx));
            async move { (path, handle.await) }
        }))
        .buffer_unordered(jobs)
        .collect()
        .await;

        let mut finished = Vec::with_capacity(settled.len());
        for (path, joined) in settled {
            match joined {
                Ok(Ok(descriptor)) => finished.push(descriptor),
                Ok(Err(e)) => return Err(e),
                Err(join_err) => {
                    return Err(EngineError::TaskAborted {
                        path,
                        message: panic_message(join_err),
                    });
                }
            }
        }

        let total_duration = clock.elapsed();
        let failed = failures.load(Ordering::SeqCst);
        info!(
            "Run finished in {}ms with {} failed file(s)",
            total_duration.as_millis(),
            failed
        );

        Ok(RunResult::aggregate(finished, started_at, total_duration))
    }
}

/// Everything a file task needs, owned so the task is `'static`.
struct FileTaskContext {
    loader: Arc<dyn TestLoader>,
    listeners: Vec<mpsc::UnboundedSender<RunEvent>>,
    stop_token: CancellationToken,
    failures: Arc<AtomicUsize>,
    options: EngineOptions,
}

impl FileTaskContext {
    fn emit(&self, event: RunEvent) {
        for listener in &self.listeners {
            // A listener that went away is not an error.
            let _ = listener.send(event.clone());
        }
    }
}

/// The file-task boundary. This task owns its descriptor exclusively and
/// writes the terminal state exactly once.
async fn run_file_task(
    mut descriptor: TestFileDescriptor,
    ctx: FileTaskContext,
) -> Result<TestFileDescriptor, EngineError> {
    let path = descriptor.path().to_path_buf();

    if ctx.stop_token.is_cancelled() {
        debug!("Run stopped; leaving {} pending", path.display());
        return Ok(descriptor);
    }

    info!("Running file: {}", path.display());
    ctx.emit(RunEvent::FileStarted { path: path.clone() });

    let start = Instant::now();
    let outcome = execute_file(path.clone(), Arc::clone(&ctx.loader), ctx.options.timeout).await;
    let duration = start.elapsed();

    descriptor.settle(outcome, duration)?;

    if ctx.options.verbose {
        if let Some(report) = descriptor.report() {
            for case in &report.cases {
                info!(
                    file = %path.display(),
                    "{} {} ({}ms)",
                    if case.passed { "ok" } else { "FAILED" },
                    case.name,
                    case.duration.as_millis()
                );
            }
        }
    }

    if descriptor.status() == FileStatus::Failed {
        let failed_so_far = ctx.failures.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(error) = descriptor.error() {
            warn!("{} failed: {}", path.display(), error);
        }
        if ctx.options.bail && !ctx.stop_token.is_cancelled() {
            warn!(
                "Bailing after {} failed file(s); no new files will be started",
                failed_so_far
            );
            ctx.stop_token.cancel();
        }
    }

    ctx.emit(RunEvent::FileFinished {
        path,
        status: descriptor.status(),
        duration,
    });

    Ok(descriptor)
}

/// Runs one file's logic in a separate task and converts every way it can end
/// into a `FileOutcome`. Dropping the inner handle on timeout aborts the file,
/// its running case and any child process it spawned.
async fn execute_file(
    path: PathBuf,
    loader: Arc<dyn TestLoader>,
    timeout: Option<Duration>,
) -> FileOutcome {
    let test = FileTest::new(path, loader);
    let handle = AbortOnDropHandle::new(tokio::spawn(async move { test.run().await }));

    let joined = match timeout {
        Some(limit) => match tokio::time::timeout(limit, handle).await {
            Ok(joined) => joined,
            Err(_) => return FileOutcome::Errored(FileError::timeout(limit)),
        },
        None => handle.await,
    };

    match joined {
        Ok(Ok(report)) => FileOutcome::Completed(report),
        Ok(Err(e)) => FileOutcome::Errored(FileError::load(&e)),
        Err(join_err) => FileOutcome::Errored(FileError::panic(panic_message(join_err))),
    }
}
