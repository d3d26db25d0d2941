use std::path::PathBuf;

/// Errors that can stop a topic-review run.
///
/// Only configuration and query problems are represented here. Per-record and
/// per-patch problems are reported as [`PatchOutcome`](crate::PatchOutcome)
/// values so a batch keeps going.
///
/// # Examples
///
/// ```
/// use topic_review_core::TopicReviewError;
///
/// let err = TopicReviewError::Config("missing server".into());
/// assert!(err.to_string().contains("missing server"));
/// ```
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum TopicReviewError {
    /// Filesystem or process-spawn I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// The remote query exited unsuccessfully.
    #[error("query command `{command}` failed with exit code {}", display_code(.code))]
    #[diagnostic(help("output: {output}"))]
    Query {
        /// The command line that was run.
        command: String,
        /// Exit code, `None` if the process was killed by a signal.
        code: Option<i32>,
        /// Captured output of the failed command.
        output: String,
    },

    /// TOML deserialization failure.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A required file was not found.
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),
}

fn display_code(code: &Option<i32>) -> String {
    code.map_or_else(|| "none".to_string(), |c| c.to_string())
}
