//! # Command Execution Module / 命令执行模块
//!
//! Spawns external processes for command-backed test cases and captures their
//! combined stdout and stderr.
//!
//! 为基于命令的测试用例派生外部进程，并捕获其合并的 stdout 和 stderr。

use anyhow::{anyhow, Context, Result};
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::Mutex;

/// The exit status and interleaved output of a finished process.
#[derive(Debug)]
pub struct CapturedOutput {
    pub status: ExitStatus,
    pub output: String,
}

/// Spawns a command and captures its stdout and stderr.
/// Both streams are read concurrently and combined line by line into a single string.
///
/// The child is killed if the returned future is dropped, so a timed-out file
/// does not leave processes behind.
///
/// 派生一个命令，捕获其 stdout 和 stderr。
/// 两个输出流被并发读取并逐行合并到一个字符串中。
pub async fn spawn_and_capture(mut cmd: Command) -> Result<CapturedOutput> {
    let mut child = cmd
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .context("Failed to spawn process")?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| anyhow!("Failed to capture stdout"))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| anyhow!("Failed to capture stderr"))?;

    let output = Arc::new(Mutex::new(String::new()));
    let stdout_handle = tokio::spawn(read_lines_into(stdout, Arc::clone(&output)));
    let stderr_handle = tokio::spawn(read_lines_into(stderr, Arc::clone(&output)));

    let status = child.wait().await.context("Failed to get process status")?;

    // Drain both readers so no trailing output is lost.
    stdout_handle.await.context("Failed to join stdout reader")?;
    stderr_handle.await.context("Failed to join stderr reader")?;

    let output = output.lock().await.clone();
    Ok(CapturedOutput { status, output })
}

async fn read_lines_into<R>(stream: R, sink: Arc<Mutex<String>>)
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(stream).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        let mut out = sink.lock().await;
        out.push_str(&line);
        out.push('\n');
    }
}

/// Expands `~` and environment variables, then splits a command line into
/// program and arguments using shell quoting rules.
pub fn parse_command_line(command_line: &str) -> Result<Vec<String>> {
    let expanded = shellexpand::full(command_line)
        .with_context(|| format!("Failed to expand command: {command_line}"))?
        .to_string();

    let parts = shlex::split(&expanded)
        .ok_or_else(|| anyhow!("Failed to parse command: {}", expanded))?;

    if parts.is_empty() {
        return Err(anyhow!("Empty command after parsing."));
    }
    Ok(parts)
}
