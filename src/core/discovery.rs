//! # Suite Discovery Module / 套件发现模块
//!
//! Walks the configured test directory and returns an ordered list of pending
//! descriptors for every file whose name matches the configured glob.
//!
//! 遍历配置的测试目录，为每个文件名匹配配置 glob 的文件返回有序的待执行描述符列表。

use anyhow::{bail, Context, Result};
use glob::Pattern;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::core::models::TestFileDescriptor;
use crate::infra::fs::{absolute_path, is_directory};

/// A compiled file-name glob (`*`, `?`, `[...]`, `[!...]`). It is matched
/// against the file name only, never against directory components.
#[derive(Debug, Clone)]
pub struct FilePattern(Pattern);

impl FilePattern {
    pub fn new(glob: &str) -> Result<Self> {
        Pattern::new(glob)
            .map(Self)
            .with_context(|| format!("Invalid file pattern: {glob}"))
    }

    pub fn matches(&self, file_name: &str) -> bool {
        self.0.matches(file_name)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Discovers test files under `root` matching `pattern`.
///
/// Results are absolute, deduplicated, and sorted by path so that a run is
/// reproducible. A missing directory is an error; an empty result is not.
///
/// 在 `root` 下发现匹配 `pattern` 的测试文件。
/// 结果为绝对路径、已去重并按路径排序。目录不存在是错误，结果为空则不是。
pub fn discover(root: &Path, pattern: &str) -> Result<Vec<TestFileDescriptor>> {
    if !is_directory(root) {
        bail!("Test directory not found: {}", root.display());
    }
    let pattern = FilePattern::new(pattern)?;
    let root = absolute_path(root)?;

    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in WalkDir::new(&root).follow_links(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry during discovery: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        if pattern.matches(name) {
            paths.push(absolute_path(entry.path())?);
        }
    }

    paths.sort();
    paths.dedup();
    debug!(
        "Discovered {} test files in {} matching '{}'",
        paths.len(),
        root.display(),
        pattern.as_str()
    );

    Ok(paths.into_iter().map(TestFileDescriptor::new).collect())
}
