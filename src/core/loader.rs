//! # Test Loader Module / 测试加载模块
//!
//! Turns a test file path into an ordered list of named cases with executable
//! bodies. The engine only depends on the `TestLoader` trait; the default
//! `ManifestLoader` reads TOML manifests whose cases are shell commands.
//!
//! 将测试文件路径转换为有序的、带可执行体的命名用例列表。
//! 引擎只依赖 `TestLoader` trait；默认的 `ManifestLoader` 读取用例为 shell 命令的 TOML 清单。

use anyhow::{anyhow, bail, Context, Result};
use futures::future::BoxFuture;
use futures::FutureExt;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::debug;

use crate::infra::command::{parse_command_line, spawn_and_capture};
use crate::infra::fs::resolve_against;

/// The future returned by a case body. `Err` marks the case as failed.
pub type CaseFuture = BoxFuture<'static, Result<()>>;

/// A case body. It is called at most once, inside its own task.
pub type CaseBody = Box<dyn FnOnce() -> CaseFuture + Send + 'static>;

/// One declared test case.
/// 一个已声明的测试用例。
pub struct CaseDecl {
    name: String,
    body: CaseBody,
}

impl CaseDecl {
    pub fn new<F, Fut>(name: impl Into<String>, body: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        Self {
            name: name.into(),
            body: Box::new(move || body().boxed()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn into_parts(self) -> (String, CaseBody) {
        (self.name, self.body)
    }
}

impl std::fmt::Debug for CaseDecl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaseDecl")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Loads the test declarations of one file.
///
/// Any error returned here is a load error: the file fails as a whole and no
/// case runs.
///
/// 加载一个文件的测试声明。此处返回的任何错误都是加载错误：整个文件失败，且不运行任何用例。
pub trait TestLoader: Send + Sync + 'static {
    fn load<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, Result<Vec<CaseDecl>>>;
}

/// A test file on disk: an ordered list of command cases.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TestManifest {
    pub cases: Vec<CaseSpec>,
}

/// One `[[cases]]` entry of a manifest.
/// 清单中的一个 `[[cases]]` 条目。
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CaseSpec {
    pub name: String,
    /// Command line; exit code 0 passes the case.
    pub command: String,
    /// Working directory, relative to the manifest's directory. Defaults to that directory.
    #[serde(default)]
    pub cwd: Option<PathBuf>,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

/// The default loader, reading `TestManifest` TOML files.
#[derive(Debug, Default, Clone, Copy)]
pub struct ManifestLoader;

impl TestLoader for ManifestLoader {
    fn load<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, Result<Vec<CaseDecl>>> {
        async move {
            let content = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read test file: {}", path.display()))?;
            let manifest: TestManifest = toml::from_str(&content)
                .with_context(|| format!("Failed to parse test file: {}", path.display()))?;

            let base_dir = path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."));

            let decls = manifest
                .cases
                .into_iter()
                .enumerate()
                .map(|(i, spec)| {
                    command_case(spec, &base_dir)
                        .with_context(|| format!("Invalid case #{}", i + 1))
                })
                .collect::<Result<Vec<_>>>()?;

            debug!("Loaded {} cases from {}", decls.len(), path.display());
            Ok(decls)
        }
        .boxed()
    }
}

fn command_case(spec: CaseSpec, base_dir: &Path) -> Result<CaseDecl> {
    if spec.name.trim().is_empty() {
        bail!("Case name must not be empty");
    }
    let parts = parse_command_line(&spec.command)
        .with_context(|| format!("Case '{}' has an invalid command", spec.name))?;
    let cwd = match &spec.cwd {
        Some(dir) => resolve_against(base_dir, dir),
        None => base_dir.to_path_buf(),
    };
    let command_line = spec.command.clone();
    let env = spec.env;

    Ok(CaseDecl::new(spec.name, move || async move {
        let (program, args) = parts
            .split_first()
            .ok_or_else(|| anyhow!("Empty command"))?;
        let mut cmd = Command::new(program);
        cmd.args(args).envs(&env).current_dir(&cwd);

        let captured = spawn_and_capture(cmd)
            .await
            .with_context(|| format!("Failed to run `{command_line}`"))?;

        if captured.status.success() {
            Ok(())
        } else {
            Err(anyhow!(captured.output)
                .context(format!("`{}` exited with {}", command_line, captured.status)))
        }
    }))
}
