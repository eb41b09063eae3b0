//! # Core Module / 核心模块
//!
//! This module contains the core functionality of the suite runner,
//! including data models, configuration, discovery and the execution engine.
//!
//! 此模块包含套件运行器的核心功能，
//! 包括数据模型、配置、发现和执行引擎。

pub mod aggregate;
pub mod config;
pub mod discovery;
pub mod execution;
pub mod loader;
pub mod models;

// Re-exports
pub use aggregate::{RunResult, RunSummary};
pub use config::RunnerConfig;
pub use execution::{EngineError, EngineOptions, ExecutionEngine, RunEvent};
pub use file_test::FileTest;
pub use loader::{CaseDecl, ManifestLoader, TestLoader};
pub use models::{FileStatus, TestFileDescriptor, TestReport};
