//! # Reporting Module / 报告模块
//!
//! This module renders an aggregated `RunResult`: a colorful console summary
//! and an optional JSON report for tooling.
//!
//! 此模块渲染聚合后的 `RunResult`：彩色控制台摘要和可选的 JSON 报告。

pub mod console;
pub mod json;

// Re-export common reporting functions
pub use console::{print_failure_details, print_summary};
pub use json::write_json_report;
