//! Compiler invocation for development mode.
//!
//! Every build runs the configured command line through the platform shell,
//! captures its output and prints either stdout (success) or stderr (failure)
//! to the console verbatim.
//!
//! Builds are fire-and-forget: [`Builder::spawn`] returns immediately and
//! nothing serializes, debounces or cancels builds. Two changes in quick
//! succession start two compiler processes whose output may interleave.

use crate::error::{BuildError, Result};
use crate::ui;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tokio::process::Command;
use tokio::task::JoinHandle;

/// Result of one compiler run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    /// The command exited successfully
    Succeeded {
        /// Captured standard output
        stdout: String,
        /// Wall-clock time of the run
        duration: Duration,
    },
    /// The command exited with a non-zero status or was killed by a signal
    Failed {
        /// Captured standard error
        stderr: String,
        /// Exit code, if the process exited normally
        code: Option<i32>,
        /// Wall-clock time of the run
        duration: Duration,
    },
}

impl BuildOutcome {
    /// Check if the build succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, BuildOutcome::Succeeded { .. })
    }

    /// The text that belongs on the console: stdout on success, stderr on failure.
    pub fn console_text(&self) -> &str {
        match self {
            BuildOutcome::Succeeded { stdout, .. } => stdout,
            BuildOutcome::Failed { stderr, .. } => stderr,
        }
    }

    /// How long the compiler ran.
    pub fn duration(&self) -> Duration {
        match self {
            BuildOutcome::Succeeded { duration, .. } | BuildOutcome::Failed { duration, .. } => {
                *duration
            }
        }
    }

    /// Write the console text verbatim to `out`.
    pub fn write_to(&self, out: &mut impl Write) -> std::io::Result<()> {
        out.write_all(ui::compiler_output(self.console_text()).as_bytes())?;
        out.flush()
    }
}

struct BuilderInner {
    command: String,
    cwd: PathBuf,
    invocations: AtomicUsize,
}

/// Runs the external compiler.
///
/// Cloning is cheap; clones share the command and the invocation counter.
#[derive(Clone)]
pub struct Builder {
    inner: Arc<BuilderInner>,
}

impl Builder {
    /// Create a new builder.
    ///
    /// # Arguments
    ///
    /// * `command` - Command line passed to the shell
    /// * `cwd` - Working directory for the compiler
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::EmptyCommand`] if `command` is blank
    pub fn new(command: impl Into<String>, cwd: impl Into<PathBuf>) -> Result<Self> {
        let command = command.into();
        if command.trim().is_empty() {
            return Err(BuildError::EmptyCommand.into());
        }

        Ok(Self {
            inner: Arc::new(BuilderInner {
                command,
                cwd: cwd.into(),
                invocations: AtomicUsize::new(0),
            }),
        })
    }

    /// The command line run for every build.
    pub fn command(&self) -> &str {
        &self.inner.command
    }

    /// Working directory of the compiler.
    pub fn cwd(&self) -> &Path {
        &self.inner.cwd
    }

    /// Number of builds issued so far.
    pub fn invocations(&self) -> usize {
        self.inner.invocations.load(Ordering::SeqCst)
    }

    /// Start a build in the background and print its output when it finishes.
    ///
    /// Returns immediately. The invocation is counted before this returns; the
    /// handle may be dropped without affecting the build.
    pub fn spawn(&self) -> JoinHandle<()> {
        self.inner.invocations.fetch_add(1, Ordering::SeqCst);
        let builder = self.clone();

        tokio::spawn(async move {
            match builder.execute().await {
                Ok(outcome) => report(&outcome),
                Err(e) => ui::error(&e.to_string()),
            }
        })
    }

    /// Run one build to completion and return its outcome without printing.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::SpawnFailed`] if the shell cannot be started
    pub async fn run(&self) -> Result<BuildOutcome> {
        self.inner.invocations.fetch_add(1, Ordering::SeqCst);
        self.execute().await
    }

    async fn execute(&self) -> Result<BuildOutcome> {
        tracing::debug!(command = %self.command(), "starting build");
        let start = Instant::now();

        let output = shell_command(self.command())
            .current_dir(self.cwd())
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| BuildError::SpawnFailed {
                command: self.command().to_string(),
                source,
            })?;

        let duration = start.elapsed();

        let outcome = if output.status.success() {
            BuildOutcome::Succeeded {
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                duration,
            }
        } else {
            BuildOutcome::Failed {
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                code: output.status.code(),
                duration,
            }
        };

        tracing::debug!(
            success = outcome.is_success(),
            "build finished in {}",
            ui::format_duration(duration)
        );

        Ok(outcome)
    }
}

impl std::fmt::Debug for Builder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Builder")
            .field("command", &self.inner.command)
            .field("cwd", &self.inner.cwd)
            .field("invocations", &self.invocations())
            .finish()
    }
}

/// Print a finished build to stdout.
fn report(outcome: &BuildOutcome) {
    let stdout = std::io::stdout();
    let mut lock = stdout.lock();
    if let Err(e) = outcome.write_to(&mut lock) {
        tracing::warn!("failed to write compiler output: {}", e);
    }
}

#[cfg(windows)]
fn shell_command(command: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(command);
    cmd
}

#[cfg(not(windows))]
fn shell_command(command: &str) -> Command {
    let mut cmd = Command::new("/bin/sh");
    cmd.arg("-c").arg(command);
    cmd
}
