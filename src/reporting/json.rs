//! # JSON Reporting Module / JSON 报告模块
//!
//! Writes a machine-readable report of a run.
//!
//! 写出一次运行的机器可读报告。

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;

use crate::core::aggregate::{RunResult, RunSummary};

#[derive(Serialize)]
struct JsonReport<'a> {
    summary: RunSummary,
    #[serde(flatten)]
    result: &'a RunResult,
}

/// Renders the run as pretty-printed JSON.
pub fn render_json_report(result: &RunResult) -> Result<String> {
    let report = JsonReport {
        summary: result.summary(),
        result,
    };
    serde_json::to_string_pretty(&report).context("Failed to serialize run result")
}

/// Writes the JSON report to `path`, creating parent directories as needed.
pub fn write_json_report(result: &RunResult, path: &Path) -> Result<()> {
    let json = render_json_report(result)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create report directory: {}", parent.display()))?;
    }
    fs::write(path, json)
        .with_context(|| format!("Failed to write JSON report: {}", path.display()))?;
    Ok(())
}
