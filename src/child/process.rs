//! Child process spawning and control.
//!
//! This module provides a builder for configuring the supervised command
//! line, along with a thin handle over the running child process.

use std::borrow::Cow;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};

use tokio::process::{Child, ChildStderr, ChildStdout, Command};

/// Error type for process launch operations.
#[derive(thiserror::Error, Debug)]
pub enum SpawnError {
    /// The child binary was not found.
    #[error("child binary not found")]
    NotFound,
    /// Permission denied when launching.
    #[error("permission denied when launching child")]
    PermissionDenied,
    /// Other I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SpawnError {
    /// Create a `SpawnError` from an I/O error, classifying common cases.
    fn from_io(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound,
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied,
            _ => Self::Io(err),
        }
    }
}

/// Builder for the supervised child command line.
#[derive(Debug, Clone, Default)]
pub struct ChildCommandBuilder {
    program: String,
    args: Vec<String>,
    working_dir: Option<PathBuf>,
    envs: Vec<(String, String)>,
}

impl ChildCommandBuilder {
    /// Create a new builder for the given program.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Default::default()
        }
    }

    /// Append one argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append arguments, forwarded to the child untouched.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set the working directory for the child process.
    #[must_use]
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Add an environment variable for the child process.
    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    /// Get the program name.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Get the configured arguments.
    #[must_use]
    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    /// Get the working directory, if set.
    #[must_use]
    pub fn get_working_dir(&self) -> Option<&PathBuf> {
        self.working_dir.as_ref()
    }

    /// Get the extra environment variables.
    #[must_use]
    pub fn get_envs(&self) -> &[(String, String)] {
        &self.envs
    }

    /// Shell-escaped one-line rendering of the command, for logs.
    #[must_use]
    pub fn render(&self) -> String {
        std::iter::once(&self.program)
            .chain(self.args.iter())
            .map(|part| shell_escape::escape(Cow::from(part.as_str())))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// A running child process with piped output streams.
#[derive(Debug)]
pub struct ChildHandle {
    child: Child,
}

impl ChildHandle {
    /// Spawn the child with both output streams piped.
    ///
    /// # Errors
    ///
    /// Returns `SpawnError` if the process fails to launch.
    pub fn spawn(builder: &ChildCommandBuilder) -> Result<Self, SpawnError> {
        let mut cmd = Command::new(builder.program());
        cmd.args(builder.get_args())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        if let Some(dir) = builder.get_working_dir() {
            cmd.current_dir(dir);
        }
        for (key, value) in builder.get_envs() {
            cmd.env(key, value);
        }

        let child = cmd.spawn().map_err(SpawnError::from_io)?;

        Ok(Self { child })
    }

    /// Take ownership of the stdout handle.
    ///
    /// This can only be called once; subsequent calls return `None`.
    pub fn take_stdout(&mut self) -> Option<ChildStdout> {
        self.child.stdout.take()
    }

    /// Take ownership of the stderr handle.
    ///
    /// This can only be called once; subsequent calls return `None`.
    pub fn take_stderr(&mut self) -> Option<ChildStderr> {
        self.child.stderr.take()
    }

    /// Get the process ID, if still running.
    #[must_use]
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// Check if the process has exited without blocking.
    ///
    /// # Errors
    ///
    /// Returns an error if the process state cannot be queried.
    pub fn try_wait(&mut self) -> std::io::Result<Option<ExitStatus>> {
        self.child.try_wait()
    }

    /// Wait for the process to exit.
    ///
    /// # Errors
    ///
    /// Returns an error if waiting fails.
    pub async fn wait(&mut self) -> std::io::Result<ExitStatus> {
        self.child.wait().await
    }

    /// Forcefully kill the process.
    ///
    /// # Errors
    ///
    /// Returns an error if the kill signal cannot be sent.
    pub async fn kill(&mut self) -> std::io::Result<()> {
        self.child.kill().await
    }
}
