// Shared test helpers for integration tests
#![allow(dead_code)]

use anyhow::anyhow;
use futures::future::BoxFuture;
use futures::FutureExt;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::{tempdir, TempDir};

use suite_runner::core::loader::{CaseDecl, TestLoader};
use suite_runner::core::models::TestFileDescriptor;

/// What a scripted case does when run.
#[derive(Debug, Clone)]
pub enum Step {
    Pass,
    Fail(&'static str),
    Panic(&'static str),
    /// Sleeps, then passes.
    Sleep(Duration),
    /// Sleeps, then fails.
    SleepThenFail(Duration, &'static str),
}

/// How a scripted file behaves when loaded.
#[derive(Debug, Clone)]
pub enum FileScript {
    Cases(Vec<(&'static str, Step)>),
    LoadError(&'static str),
    LoadPanic(&'static str),
}

/// An in-process loader driven by per-path scripts. It records the order in
/// which case bodies start and finish, and how many files run at once.
#[derive(Clone, Default)]
pub struct ScriptedLoader {
    files: Arc<HashMap<PathBuf, FileScript>>,
    pub journal: Arc<Mutex<Vec<String>>>,
    pub loads: Arc<AtomicUsize>,
    running: Arc<AtomicUsize>,
    pub max_running: Arc<AtomicUsize>,
}

impl ScriptedLoader {
    pub fn new(files: Vec<(&str, FileScript)>) -> Self {
        Self {
            files: Arc::new(
                files
                    .into_iter()
                    .map(|(p, s)| (PathBuf::from(p), s))
                    .collect(),
            ),
            ..Self::default()
        }
    }

    /// Pending descriptors for every scripted file, in the order given.
    pub fn descriptors(paths: &[&str]) -> Vec<TestFileDescriptor> {
        paths.iter().map(|p| TestFileDescriptor::new(*p)).collect()
    }

    pub fn journal(&self) -> Vec<String> {
        self.journal.lock().unwrap().clone()
    }
}

struct RunningGuard(Arc<AtomicUsize>);

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl TestLoader for ScriptedLoader {
    fn load<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, anyhow::Result<Vec<CaseDecl>>> {
        async move {
            self.loads.fetch_add(1, Ordering::SeqCst);
            let script = self
                .files
                .get(path)
                .cloned()
                .ok_or_else(|| anyhow!("no such test file: {}", path.display()))?;

            let cases = match script {
                FileScript::LoadError(msg) => return Err(anyhow!(msg)),
                FileScript::LoadPanic(msg) => panic!("{}", msg),
                FileScript::Cases(cases) => cases,
            };

            let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_running.fetch_max(now, Ordering::SeqCst);
            // Counted as running until the last case body is dropped.
            let guard = Arc::new(RunningGuard(Arc::clone(&self.running)));

            let file = path.display().to_string();
            Ok(cases
                .into_iter()
                .map(|(name, step)| {
                    let journal = Arc::clone(&self.journal);
                    let guard = Arc::clone(&guard);
                    let label = format!("{}::{}", file, name);
                    CaseDecl::new(name, move || async move {
                        let _guard = guard;
                        journal.lock().unwrap().push(format!("start {}", label));
                        let result = match step {
                            Step::Pass => Ok(()),
                            Step::Fail(msg) => Err(anyhow!(msg)),
                            Step::Panic(msg) => panic!("{}", msg),
                            Step::Sleep(d) => {
                                tokio::time::sleep(d).await;
                                Ok(())
                            }
                            Step::SleepThenFail(d, msg) => {
                                tokio::time::sleep(d).await;
                                Err(anyhow!(msg))
                            }
                        };
                        journal.lock().unwrap().push(format!("end {}", label));
                        result
                    })
                })
                .collect())
        }
        .boxed()
    }
}

/// Creates a temporary test directory with the given `(relative path, content)` files.
pub fn setup_test_directory(files: &[(&str, &str)]) -> TempDir {
    let temp_dir = tempdir().expect("Failed to create temporary directory");
    for (rel, content) in files {
        let path = temp_dir.path().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&path, content).expect("Failed to write test file");
    }
    temp_dir
}

pub const PASSING_MANIFEST: &str = r#"
[[cases]]
name = "true exits zero"
command = "true"

[[cases]]
name = "echo works"
command = "sh -c 'echo hello'"
"#;

pub const FAILING_MANIFEST: &str = r#"
[[cases]]
name = "passes"
command = "true"

[[cases]]
name = "exits one"
command = "sh -c 'echo boom 1>&2; exit 1'"
"#;

pub const BROKEN_MANIFEST: &str = r#"
[[cases]
name = "missing bracket"
"#;
