//! # Console Reporting Module / 控制台报告模块
//!
//! This module prints the aggregated run result to the console: one colored
//! line per file, optional per-case lines, failure details and a totals line.
//!
//! 此模块将聚合的运行结果打印到控制台：每个文件一行彩色输出、可选的每用例输出、
//! 失败详情以及汇总行。

use colored::*;
use std::path::Path;

use crate::core::aggregate::RunResult;
use crate::core::models::{FileStatus, TestFileDescriptor};

/// Prints a formatted summary of the run.
///
/// # Output Format / 输出格式
/// ```text
/// --- Test Summary ---
///   - PASS     | tests/math.test.toml                     |     12ms
///   - FAIL     | tests/strings.test.toml                  |      8ms
///   - TIMEOUT  | tests/slow.test.toml                     |     50ms
///   - SKIP     | tests/other.test.toml                    |      N/A
/// ```
pub fn print_summary(result: &RunResult, root: Option<&Path>, verbose: bool) {
    println!("\n{}", "--- Test Summary ---".bold());

    for descriptor in result.files() {
        let duration_str = descriptor
            .duration()
            .map(|d| format!("{}ms", d.as_millis()))
            .unwrap_or_else(|| "N/A".to_string());
        let note = match descriptor.report() {
            Some(report) if report.is_empty() => " (no cases)".dimmed().to_string(),
            _ => String::new(),
        };

        println!(
            "  - {:<8} | {:<40} | {:>8}{}",
            status_label(descriptor),
            display_path(descriptor.path(), root),
            duration_str,
            note
        );

        if verbose {
            if let Some(report) = descriptor.report() {
                for case in &report.cases {
                    let mark = if case.passed { "✓".green() } else { "✗".red() };
                    println!(
                        "        {} {} ({}ms)",
                        mark,
                        case.name,
                        case.duration.as_millis()
                    );
                }
            }
        }
    }

    let summary = result.summary();
    let files_line = format!(
        "Files: {} passed, {} failed, {} skipped, {} total",
        summary.files_passed, summary.files_failed, summary.files_skipped, summary.files_total
    );
    let cases_line = format!(
        "Cases: {} passed, {} failed",
        summary.cases_passed, summary.cases_failed
    );

    println!();
    println!("{}", files_line);
    println!("{}", cases_line);
    println!("Time:  {}ms", result.total_duration().as_millis());
}

/// Prints the failing cases and file-level errors of every failed file.
pub fn print_failure_details(result: &RunResult, root: Option<&Path>) {
    let failed: Vec<&TestFileDescriptor> = result.failed_files().collect();
    if failed.is_empty() {
        return;
    }

    println!("\n{}", "--- Failures ---".red().bold());
    println!("{}", "-".repeat(80));

    for (i, descriptor) in failed.iter().enumerate() {
        println!(
            "[{}/{}] {}",
            i + 1,
            failed.len(),
            display_path(descriptor.path(), root).cyan()
        );

        if let Some(error) = descriptor.error() {
            println!("  {} {}", format!("{:?} error:", error.kind).red(), error.message);
            if let Some(stack) = &error.stack {
                for line in stack.lines() {
                    println!("    {}", line.dimmed());
                }
            }
        }

        if let Some(report) = descriptor.report() {
            for case in report.cases.iter().filter(|c| !c.passed) {
                println!("  {} {}", "✗".red(), case.name.bold());
                if let Some(error) = &case.error {
                    println!("    {}", error.message);
                    if let Some(stack) = &error.stack {
                        for line in stack.lines() {
                            println!("      {}", line.dimmed());
                        }
                    }
                }
            }
        }
        println!("{}", "-".repeat(80));
    }
}

/// Clears the terminal using ANSI escape codes.
pub fn clear_console() {
    print!("\x1B[2J\x1B[1;1H");
}

fn status_label(descriptor: &TestFileDescriptor) -> ColoredString {
    match descriptor.status() {
        FileStatus::Success => "PASS".green(),
        FileStatus::Failed if descriptor.is_timeout() => "TIMEOUT".red(),
        FileStatus::Failed => "FAIL".red(),
        FileStatus::Pending => "SKIP".dimmed(),
    }
}

fn display_path(path: &Path, root: Option<&Path>) -> String {
    root.and_then(|r| path.strip_prefix(r).ok())
        .unwrap_or(path)
        .display()
        .to_string()
}
