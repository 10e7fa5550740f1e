//! External yt-dlp process execution
//!
//! Wraps the media-fetch binary behind two invocation modes: a supervised
//! spawn with piped output streams for downloads, and a run-to-completion
//! capture for probes and version queries. The binary path comes from
//! configuration or PATH discovery.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use tokio::process::{Child, ChildStderr, ChildStdout, Command};

/// Handle to the yt-dlp binary
///
/// # Examples
///
/// ```no_run
/// use media_dl::runner::YtDlp;
/// use std::path::PathBuf;
///
/// // Create with explicit path
/// let tool = YtDlp::new(PathBuf::from("/usr/local/bin/yt-dlp"));
///
/// // Or auto-discover from PATH
/// let tool = YtDlp::from_path().expect("yt-dlp not found in PATH");
/// ```
pub struct YtDlp {
    binary_path: PathBuf,
}

impl YtDlp {
    /// Create a new handle with an explicit binary path
    pub fn new(binary_path: PathBuf) -> Self {
        Self { binary_path }
    }

    /// Attempt to find yt-dlp in PATH
    ///
    /// Uses the `which` crate to search the system PATH.
    ///
    /// # Returns
    ///
    /// `Some(YtDlp)` if the binary is found, `None` otherwise.
    pub fn from_path() -> Option<Self> {
        which::which("yt-dlp").ok().map(Self::new)
    }

    /// Path to the wrapped binary
    pub fn binary_path(&self) -> &Path {
        &self.binary_path
    }

    /// Spawn a supervised process with piped stdout/stderr
    ///
    /// The child is killed if the handle is dropped without the process
    /// having exited, so an aborted supervision task cannot leak a
    /// download process.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ExternalTool`] if the OS refuses to create the
    /// process (binary missing, not executable, resource limits).
    pub fn spawn(&self, args: &[String]) -> Result<ProcessHandle> {
        let child = Command::new(&self.binary_path)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                Error::ExternalTool(format!(
                    "failed to spawn {}: {}",
                    self.binary_path.display(),
                    e
                ))
            })?;

        Ok(ProcessHandle { child })
    }

    /// Run to completion and capture stdout (probe / version mode)
    ///
    /// # Errors
    ///
    /// Returns [`Error::ExternalTool`] if the process cannot be started or
    /// exits nonzero; the error message carries captured stderr.
    pub async fn run(&self, args: &[&str]) -> Result<String> {
        let output = Command::new(&self.binary_path)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                Error::ExternalTool(format!(
                    "failed to execute {}: {}",
                    self.binary_path.display(),
                    e
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::ExternalTool(format!(
                "{} exited with {}: {}",
                self.binary_path.display(),
                output
                    .status
                    .code()
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "signal".to_string()),
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// A spawned process under supervision
///
/// Exposes the child's output streams (each may be taken once), a
/// completion signal via [`wait`](ProcessHandle::wait), and forced
/// termination via [`start_kill`](ProcessHandle::start_kill).
pub struct ProcessHandle {
    child: Child,
}

impl ProcessHandle {
    /// Take the child's stdout stream (once)
    pub fn take_stdout(&mut self) -> Option<ChildStdout> {
        self.child.stdout.take()
    }

    /// Take the child's stderr stream (once)
    pub fn take_stderr(&mut self) -> Option<ChildStderr> {
        self.child.stderr.take()
    }

    /// Wait for the process to terminate
    ///
    /// Resources (pipes, process table entry) are released once this
    /// returns and the handle is discarded.
    pub async fn wait(&mut self) -> Result<ProcessOutcome> {
        let status = self.child.wait().await?;
        Ok(ProcessOutcome::from(status))
    }

    /// Request immediate forced termination
    ///
    /// No graceful shutdown window: the external tool is not expected to
    /// clean up. The caller still has to [`wait`](ProcessHandle::wait) to
    /// reap the process and observe the outcome.
    pub fn start_kill(&mut self) -> Result<()> {
        self.child.start_kill().map_err(Error::Io)
    }
}

/// How a supervised process ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// Process exited on its own with this code
    Exited(i32),

    /// Process was ended by a signal and produced no exit code
    ///
    /// This is the single signal for "cancelled", regardless of who
    /// initiated the termination.
    Terminated,
}

impl From<ExitStatus> for ProcessOutcome {
    fn from(status: ExitStatus) -> Self {
        match status.code() {
            Some(code) => ProcessOutcome::Exited(code),
            None => ProcessOutcome::Terminated,
        }
    }
}

impl ProcessOutcome {
    /// Whether the process exited successfully
    pub fn success(&self) -> bool {
        matches!(self, ProcessOutcome::Exited(0))
    }
}
