//! # Configuration Module / 配置模块
//!
//! Resolves the single, immutable `RunnerConfig` consumed by the engine.
//! Values are layered: built-in defaults, then the TOML config file, then
//! command-line overrides.
//!
//! 解析引擎使用的唯一不可变 `RunnerConfig`。
//! 配置按层合并：内置默认值、TOML 配置文件、命令行覆盖。

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::infra::fs::resolve_against;

/// The config file looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "suite-runner.toml";

/// The fully merged configuration for one run.
/// 一次运行的完全合并配置。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Print per-case lines and debug logs.
    /// 打印每个用例的结果和调试日志。
    pub verbose: bool,
    /// Stop starting new files after the first failure.
    /// 在第一次失败后停止启动新文件。
    pub bail: bool,
    /// Per-file timeout in milliseconds. `0` disables the timeout.
    /// 每个文件的超时时间（毫秒）。`0` 表示禁用超时。
    pub timeout_ms: u64,
    /// Root of the test file search.
    pub test_directory: PathBuf,
    /// File-name glob matched against each discovered file.
    pub file_pattern: String,
    /// Upper bound on concurrently running files. `None` means unbounded.
    pub jobs: Option<usize>,
    /// Clear the terminal before printing the summary.
    pub clear_console: bool,
    /// Explicit `tracing` filter directive, e.g. `info` or `suite_runner=debug`.
    pub log_level: Option<String>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            bail: false,
            timeout_ms: 5000,
            test_directory: PathBuf::from("tests"),
            file_pattern: "*.test.toml".to_string(),
            jobs: None,
            clear_console: false,
            log_level: None,
        }
    }
}

impl RunnerConfig {
    /// The effective per-file timeout, or `None` when disabled.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms))
    }

    fn apply_file(&mut self, file: ConfigFile) {
        let ConfigFile {
            verbose,
            bail,
            timeout,
            test_directory,
            file_pattern,
            jobs,
            clear_console,
            log_level,
        } = file;

        if let Some(v) = verbose {
            self.verbose = v;
        }
        if let Some(v) = bail {
            self.bail = v;
        }
        if let Some(v) = timeout {
            self.timeout_ms = v;
        }
        if let Some(v) = test_directory {
            self.test_directory = v;
        }
        if let Some(v) = file_pattern {
            self.file_pattern = v;
        }
        if let Some(v) = jobs {
            self.jobs = Some(v);
        }
        if let Some(v) = clear_console {
            self.clear_console = v;
        }
        if let Some(v) = log_level {
            self.log_level = Some(v);
        }
    }

    fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        // Flags can only switch boolean options on.
        if overrides.verbose {
            self.verbose = true;
        }
        if overrides.bail {
            self.bail = true;
        }
        if overrides.clear_console {
            self.clear_console = true;
        }
        if let Some(v) = overrides.timeout {
            self.timeout_ms = v;
        }
        if let Some(v) = &overrides.test_directory {
            self.test_directory = v.clone();
        }
        if let Some(v) = &overrides.file_pattern {
            self.file_pattern = v.clone();
        }
        if let Some(v) = overrides.jobs {
            self.jobs = Some(v);
        }
        if let Some(v) = &overrides.log_level {
            self.log_level = Some(v.clone());
        }
    }

    fn validate(&self) -> Result<()> {
        if self.jobs == Some(0) {
            bail!("`jobs` must be at least 1");
        }
        if self.file_pattern.trim().is_empty() {
            bail!("`file_pattern` must not be empty");
        }
        Ok(())
    }
}

/// The optional keys accepted in `suite-runner.toml`.
/// `suite-runner.toml` 中可接受的可选键。
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields, rename_all = "snake_case")]
pub struct ConfigFile {
    pub verbose: Option<bool>,
    pub bail: Option<bool>,
    /// Milliseconds.
    pub timeout: Option<u64>,
    pub test_directory: Option<PathBuf>,
    pub file_pattern: Option<String>,
    pub jobs: Option<usize>,
    pub clear_console: Option<bool>,
    pub log_level: Option<String>,
}

/// Loads and parses a config file.
pub fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let file: ConfigFile = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
    Ok(file)
}

/// Values given on the command line. These win over the config file.
/// 命令行给出的值，优先级高于配置文件。
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub config_path: Option<PathBuf>,
    pub verbose: bool,
    pub bail: bool,
    pub clear_console: bool,
    pub timeout: Option<u64>,
    pub test_directory: Option<PathBuf>,
    pub file_pattern: Option<String>,
    pub jobs: Option<usize>,
    pub log_level: Option<String>,
}

/// Produces the final configuration for a run rooted at `cwd`, together with
/// the config file that contributed to it, if any.
///
/// An explicit `config_path` must exist; the default `suite-runner.toml` is
/// optional. The resulting `test_directory` is absolute.
///
/// 为以 `cwd` 为根的运行生成最终配置，并返回参与合并的配置文件（如果有）。
/// 显式给出的 `config_path` 必须存在；默认的 `suite-runner.toml` 是可选的。
pub fn resolve(cwd: &Path, overrides: &ConfigOverrides) -> Result<(RunnerConfig, Option<PathBuf>)> {
    let mut config = RunnerConfig::default();

    let source = match &overrides.config_path {
        Some(path) => Some(resolve_against(cwd, path)),
        None => Some(cwd.join(DEFAULT_CONFIG_FILE)).filter(|p| p.is_file()),
    };
    if let Some(path) = &source {
        config.apply_file(load_config_file(path)?);
    }

    config.apply_overrides(overrides);
    config.test_directory = resolve_against(cwd, &config.test_directory);
    config.validate()?;

    Ok((config, source))
}
