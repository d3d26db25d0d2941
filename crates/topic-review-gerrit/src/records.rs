//! Line-oriented parsing of `gerrit query --format=JSON` output.

use serde_json::Value;
use tracing::{debug, warn};

/// Parse query output lines into candidate patch objects, in source order.
///
/// Blank lines, lines that are not JSON, and `{"type":"stats",...}` summary
/// rows are dropped. Nothing here is fatal; the caller validates each
/// candidate's fields.
///
/// # Examples
///
/// ```
/// use topic_review_gerrit::records::parse_records;
///
/// let lines = [
///     r#"{"project":"demo","number":"1"}"#,
///     "",
///     "not json",
///     r#"{"type":"stats","rowCount":1}"#,
/// ];
/// let records = parse_records(lines);
/// assert_eq!(records.len(), 1);
/// assert_eq!(records[0]["project"], "demo");
/// ```
pub fn parse_records<I, S>(lines: I) -> Vec<Value>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut records = Vec::new();
    for line in lines {
        let line = line.as_ref().trim();
        if line.is_empty() {
            debug!("Skipping empty line.");
            continue;
        }

        let value: Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(e) => {
                warn!("Skipping invalid JSON line: {line} ({e})");
                continue;
            }
        };

        if is_stats(&value) {
            debug!("Skipping stats information.");
            continue;
        }
        records.push(value);
    }
    records
}

fn is_stats(value: &Value) -> bool {
    value.get("type").and_then(Value::as_str) == Some("stats")
}
