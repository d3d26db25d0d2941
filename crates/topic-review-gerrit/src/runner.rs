//! Subprocess seam for the ssh client.
//!
//! All remote work goes through [`CommandRunner`], so the pipeline can be
//! driven by a recording runner in tests and by [`SystemRunner`] in the CLI.

use std::fmt;
use std::process::Command;

use topic_review_core::TopicReviewError;

/// A program and its argument vector. Never passed through a local shell.
///
/// # Examples
///
/// ```
/// use topic_review_gerrit::runner::CommandSpec;
///
/// let spec = CommandSpec::new("ssh", ["-p", "29418", "host"]);
/// assert_eq!(spec.to_string(), "ssh -p 29418 host");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Captured result of a finished subprocess.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` if the process was terminated by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// The exit code as text, `"none"` for a signal.
    pub fn code_label(&self) -> String {
        self.code.map_or_else(|| "none".to_string(), |c| c.to_string())
    }

    /// Stdout followed by stderr, trimmed, for diagnostics.
    pub fn combined(&self) -> String {
        let stdout = self.stdout.trim_end();
        let stderr = self.stderr.trim_end();
        match (stdout.is_empty(), stderr.is_empty()) {
            (_, true) => stdout.to_string(),
            (true, false) => stderr.to_string(),
            (false, false) => format!("{stdout}\n{stderr}"),
        }
    }
}

/// Runs a command to completion and captures its output.
pub trait CommandRunner {
    /// Run `spec`, blocking until it exits.
    ///
    /// # Errors
    ///
    /// Returns [`TopicReviewError::Io`] if the process cannot be spawned. A
    /// non-zero exit is not an error at this level.
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, TopicReviewError>;
}

/// Runs commands with [`std::process::Command`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, TopicReviewError> {
        let output = Command::new(&spec.program).args(&spec.args).output()?;
        Ok(CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// SSH coordinates of a Gerrit server.
///
/// # Examples
///
/// ```
/// use topic_review_gerrit::runner::Connection;
///
/// let conn = Connection::new("ssh", "host", 29418);
/// let spec = conn.command(["gerrit", "version"]);
/// assert_eq!(spec.to_string(), "ssh -p 29418 host gerrit version");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub ssh_program: String,
    pub server: String,
    pub port: u16,
}

impl Connection {
    pub fn new(ssh_program: impl Into<String>, server: impl Into<String>, port: u16) -> Self {
        Self {
            ssh_program: ssh_program.into(),
            server: server.into(),
            port,
        }
    }

    /// `ssh -p <port> <server>` followed by `remote_args`.
    pub fn command<I, S>(&self, remote_args: I) -> CommandSpec
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut args = vec!["-p".to_string(), self.port.to_string(), self.server.clone()];
        args.extend(remote_args.into_iter().map(Into::into));
        CommandSpec {
            program: self.ssh_program.clone(),
            args,
        }
    }
}
