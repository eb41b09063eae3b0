//! # Suite Runner Library / Suite Runner 库
//!
//! This library provides the core functionality for the Suite Runner tool,
//! a concurrent test-suite execution engine: it discovers test files, runs
//! each one in isolation, and aggregates a structured report.
//!
//! 此库为 Suite Runner 工具提供核心功能，
//! 这是一个并发的测试套件执行引擎：发现测试文件、隔离运行每个文件并聚合结构化报告。
//!
//! ## Modules / 模块
//!
//! - `core` - Data models, configuration, discovery and the execution engine
//! - `infra` - Infrastructure services like command execution and file system helpers
//! - `reporting` - Console and JSON rendering of a run result
//! - `cli` - Command-line interface and commands
//!
//! - `core` - 数据模型、配置、发现和执行引擎
//! - `infra` - 基础设施服务，如命令执行和文件系统工具
//! - `reporting` - 运行结果的控制台和 JSON 渲染
//! - `cli` - 命令行接口和命令

pub mod cli;
pub mod core;
pub mod infra;
pub mod reporting;

// Re-export commonly used items
pub use core::config;
pub use core::execution;
pub use core::models;

use tracing_subscriber::EnvFilter;

/// Installs the global `tracing` subscriber, writing to stderr.
///
/// `RUST_LOG` takes precedence; otherwise `log_level` is used, then `debug`
/// when verbose, then `warn`. Calling this twice is harmless.
///
/// 安装全局 `tracing` 订阅器，输出到 stderr。
/// 优先使用 `RUST_LOG`；否则依次使用 `log_level`、verbose 时的 `debug`、`warn`。
pub fn init_logging(verbose: bool, log_level: Option<&str>) {
    let fallback = log_level.unwrap_or(if verbose { "debug" } else { "warn" });
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
