//! Supervisor runner orchestrating the child and its stream drains.
//!
//! This module connects the process spawner, the control-channel pipeline,
//! and the report dispatcher: it launches the child, drains stdout and
//! stderr concurrently, and surfaces the child's own exit status.

use std::process::ExitStatus;
use std::sync::Arc;

use futures_util::{pin_mut, StreamExt};
use tokio::io::AsyncReadExt;
use tokio::process::{ChildStderr, ChildStdout};

use crate::child::{read_lines, ChildCommandBuilder, ChildHandle, SpawnError};
use crate::config::SupervisorConfig;
use crate::display;
use crate::protocol::{ControlPipeline, DrainStats};
use crate::report::Reporter;
use crate::supervisor::{StateMachine, SupervisorState};

/// Read buffer size for the stderr drain.
const STDERR_CHUNK: usize = 8192;

/// Error type for supervisor operations.
#[derive(thiserror::Error, Debug)]
pub enum SupervisorError {
    /// The child process could not be started.
    #[error("failed to launch child process: {0}")]
    Launch(#[from] SpawnError),
    /// Child stdout was not available.
    #[error("child stdout not available")]
    NoStdout,
    /// Child stderr was not available.
    #[error("child stderr not available")]
    NoStderr,
    /// I/O failure while waiting for the child.
    #[error("I/O error while supervising child: {0}")]
    Io(#[from] std::io::Error),
    /// A stream drain task was aborted or panicked.
    #[error("stream drain task failed: {0}")]
    Drain(#[from] tokio::task::JoinError),
}

/// Result of a completed supervision run.
#[derive(Debug, Clone, Copy)]
pub struct SupervisorOutcome {
    /// The child's exit code, to be propagated by the caller.
    pub exit_code: i32,
    /// Counters from the drained error stream.
    pub stats: DrainStats,
}

/// Supervisor owning the child process and its stream drains.
pub struct Supervisor {
    child: ChildHandle,
    reporter: Arc<dyn Reporter>,
    config: SupervisorConfig,
    state: StateMachine,
}

impl Supervisor {
    /// Launch the child and build a supervisor around it.
    ///
    /// # Errors
    ///
    /// Returns `SupervisorError::Launch` if the child cannot be started;
    /// nothing has been streamed or reported at that point.
    pub fn launch(
        builder: &ChildCommandBuilder,
        reporter: Arc<dyn Reporter>,
        config: SupervisorConfig,
    ) -> Result<Self, SupervisorError> {
        tracing::info!(command = %builder.render(), "Launching child process");
        let child = ChildHandle::spawn(builder)?;
        Ok(Self::with_child(child, reporter, config))
    }

    /// Build a supervisor around an already-running child.
    #[must_use]
    pub fn with_child(
        child: ChildHandle,
        reporter: Arc<dyn Reporter>,
        config: SupervisorConfig,
    ) -> Self {
        Self {
            child,
            reporter,
            config,
            state: StateMachine::new(),
        }
    }

    /// Get the current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SupervisorState {
        self.state.state()
    }

    /// Get the child's process ID, if still running.
    #[must_use]
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// Drain both child streams to completion, then wait for the child.
    ///
    /// The two drains run as independent tasks; the error stream feeds the
    /// control pipeline while stdout passes through verbatim. Both must
    /// reach end-of-file before the exit status is read.
    ///
    /// # Errors
    ///
    /// Returns an error if either stream handle is missing, a drain task
    /// dies, or waiting on the child fails. Protocol and delivery errors on
    /// the error stream are not fatal and are only reflected in the stats.
    pub async fn run(mut self) -> Result<SupervisorOutcome, SupervisorError> {
        let stdout = self.child.take_stdout().ok_or(SupervisorError::NoStdout)?;
        let stderr = self.child.take_stderr().ok_or(SupervisorError::NoStderr)?;
        self.state.transition(SupervisorState::Running);

        let pipeline =
            ControlPipeline::new(Arc::clone(&self.reporter), self.config.echo_diagnostics);
        let stdout_task = tokio::spawn(passthrough_stdout(stdout));
        let stderr_task = tokio::spawn(drain_stderr(stderr, pipeline));
        self.state.transition(SupervisorState::Draining);

        let (out_res, err_res) = tokio::join!(stdout_task, stderr_task);
        out_res?;
        let stats = err_res?;

        let status = self.child.wait().await?;
        self.state.transition(SupervisorState::Terminated);

        let exit_code = exit_code_of(&status);
        tracing::info!(
            exit_code,
            control_spans = stats.control_spans,
            reports = stats.reports,
            parse_failures = stats.parse_failures,
            dispatch_failures = stats.dispatch_failures,
            "Child process terminated"
        );
        Ok(SupervisorOutcome { exit_code, stats })
    }
}

/// Forward child stdout to the supervisor's stdout, line by line.
async fn passthrough_stdout(stdout: ChildStdout) {
    let lines = read_lines(stdout);
    pin_mut!(lines);
    while let Some(next) = lines.next().await {
        match next {
            Ok(line) => display::print_passthrough(&line),
            Err(e) => {
                tracing::warn!(error = %e, "Error reading child stdout");
                break;
            }
        }
    }
}

/// Feed raw stderr chunks through the control pipeline until end-of-file.
async fn drain_stderr(mut stderr: ChildStderr, mut pipeline: ControlPipeline) -> DrainStats {
    let mut buf = [0u8; STDERR_CHUNK];
    loop {
        match stderr.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => pipeline.handle_chunk(&buf[..n]).await,
            Err(e) => {
                tracing::warn!(error = %e, "Error reading child stderr");
                break;
            }
        }
    }
    pipeline.finish().await
}

/// Map an exit status to the code the supervisor itself should exit with.
///
/// A signal-terminated child on Unix maps to `128 + signal`, matching the
/// convention shells use, so a SIGKILLed child surfaces as 137.
#[cfg(unix)]
fn exit_code_of(status: &ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    status
        .code()
        .unwrap_or_else(|| status.signal().map_or(1, |sig| 128 + sig))
}

#[cfg(not(unix))]
fn exit_code_of(status: &ExitStatus) -> i32 {
    status.code().unwrap_or(1)
}
