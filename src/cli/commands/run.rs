//! # Run Command Module / 运行命令模块
//!
//! This module implements the default command of the Suite Runner CLI:
//! resolve the configuration, discover test files, execute them and report.
//!
//! 此模块实现了 Suite Runner CLI 的默认命令：
//! 解析配置、发现测试文件、执行并报告。

use anyhow::{Context, Result};
use colored::*;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    core::{
        aggregate::RunResult,
        config::{self, ConfigOverrides, RunnerConfig},
        discovery,
        execution::{EngineOptions, ExecutionEngine, RunEvent},
        loader::ManifestLoader,
        models::TestFileDescriptor,
    },
    infra::fs::absolute_path,
    init_logging,
    reporting::{
        console::{clear_console, print_failure_details, print_summary},
        json::write_json_report,
    },
};

/// Executes the run command.
///
/// # Arguments
/// * `overrides` - Configuration values given on the command line
/// * `json` - Optional path for a JSON report
///
/// # Returns
/// `Ok(true)` if every test file passed, `Ok(false)` if any failed or was
/// skipped, and `Err` for configuration, discovery or engine errors, or when
/// a requested JSON report cannot be written.
pub async fn execute(overrides: ConfigOverrides, json: Option<PathBuf>) -> Result<bool> {
    let cwd = env::current_dir().context("Failed to determine the working directory")?;
    let (config, config_source) = config::resolve(&cwd, &overrides)?;

    init_logging(config.verbose, config.log_level.as_deref());
    info!("Running default command");
    match &config_source {
        Some(path) => info!("Loaded config from {}", path.display()),
        None => info!("No configuration files were found."),
    }

    let descriptors = discovery::discover(&config.test_directory, &config.file_pattern)?;
    if descriptors.is_empty() {
        println!(
            "{}",
            format!(
                "No test files matching '{}' found in {}",
                config.file_pattern,
                config.test_directory.display()
            )
            .yellow()
        );
    }

    // Discovered paths are canonical, so shorten them against the canonical root.
    let display_root = absolute_path(&config.test_directory)?;
    let stop_token = setup_signal_handler();
    let result = run_suite(&config, descriptors, &display_root, stop_token).await?;

    if config.clear_console {
        clear_console();
    }
    print_summary(&result, Some(&display_root), config.verbose);
    print_failure_details(&result, Some(&display_root));

    if let Some(report_path) = &json {
        println!("\nWriting JSON report to: {}", report_path.display());
        write_json_report(&result, report_path)?;
    }

    if result.passed() {
        println!("\n{}", "ALL TEST FILES PASSED".green().bold());
    } else {
        println!("\n{}", "TEST RUN FAILED".red().bold());
    }
    info!("Default command finished");

    Ok(result.passed())
}

/// Runs the engine over the discovered files, streaming start events to the console.
async fn run_suite(
    config: &RunnerConfig,
    descriptors: Vec<TestFileDescriptor>,
    display_root: &Path,
    stop_token: CancellationToken,
) -> Result<RunResult> {
    let mut engine = ExecutionEngine::new(EngineOptions::from(config), Arc::new(ManifestLoader))
        .with_stop_token(stop_token);
    let mut events = engine.subscribe();

    let root = display_root.to_path_buf();
    let progress = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            if let RunEvent::FileStarted { path } = event {
                let shown = path.strip_prefix(&root).unwrap_or(&path);
                println!("{} {}", "RUNS".blue(), shown.display());
            }
        }
    });

    let result = engine.run(descriptors).await.context("Test engine failure")?;

    // Closing the engine's senders ends the progress stream.
    drop(engine);
    if let Err(e) = progress.await {
        debug!("Progress printer ended abnormally: {}", e);
    }

    Ok(result)
}

/// Sets up a Ctrl-C handler that stops scheduling new files.
fn setup_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let token_clone = token.clone();

    tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => {
                println!("\n{}", "Interrupted; finishing running files...".yellow());
                token_clone.cancel();
            }
            Err(e) => warn!("Failed to listen for Ctrl-C: {}", e),
        }
    });

    token
}
