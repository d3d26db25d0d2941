//! Topic queries against the Gerrit SSH interface.

use topic_review_core::{Topic, TopicReviewError};
use tracing::{debug, error, info};

use crate::runner::{CommandRunner, CommandSpec, Connection};

/// Build `ssh -p <port> <server> <remote> query --format=JSON --dependencies --current-patch-set topic:<topic>`.
///
/// # Examples
///
/// ```
/// use topic_review_core::Topic;
/// use topic_review_gerrit::query::build_query_command;
/// use topic_review_gerrit::runner::Connection;
///
/// let conn = Connection::new("ssh", "host", 29418);
/// let spec = build_query_command(&conn, "gerrit", &Topic::new("t1"));
/// assert_eq!(
///     spec.to_string(),
///     "ssh -p 29418 host gerrit query --format=JSON --dependencies --current-patch-set topic:t1"
/// );
/// ```
pub fn build_query_command(conn: &Connection, remote: &str, topic: &Topic) -> CommandSpec {
    conn.command([
        remote.to_string(),
        "query".into(),
        "--format=JSON".into(),
        "--dependencies".into(),
        "--current-patch-set".into(),
        topic.query_filter(),
    ])
}

/// Run the query for `topic` and return its output lines in order.
///
/// Trailing whitespace of the whole output is stripped before splitting, so a
/// final newline does not produce an empty line.
///
/// # Errors
///
/// Returns [`TopicReviewError::Query`] if the command exits non-zero, or
/// [`TopicReviewError::Io`] if it cannot be started. Either one ends the run.
pub fn query_topic<R: CommandRunner + ?Sized>(
    runner: &R,
    conn: &Connection,
    remote: &str,
    topic: &Topic,
) -> Result<Vec<String>, TopicReviewError> {
    let spec = build_query_command(conn, remote, topic);
    info!("Querying topic '{topic}' with command: {spec}");

    let output = runner.run(&spec)?;
    if !output.success() {
        error!(
            "Error occurred while executing command: {spec}. Error code: {}",
            output.code_label()
        );
        return Err(TopicReviewError::Query {
            command: spec.to_string(),
            code: output.code,
            output: output.combined(),
        });
    }

    let lines: Vec<String> = output
        .stdout
        .trim_end()
        .lines()
        .map(str::to_string)
        .collect();
    debug!("Raw query data received: {lines:?}");
    Ok(lines)
}
