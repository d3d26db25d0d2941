use std::fmt;

use serde::Deserialize;

/// A Gerrit topic, used as a `topic:<name>` query filter.
///
/// # Examples
///
/// ```
/// use topic_review_core::Topic;
///
/// let topic = Topic::new("release-1.2");
/// assert_eq!(topic.query_filter(), "topic:release-1.2");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Topic(String);

impl Topic {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The topic name as given on the command line.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The server-side search operator selecting this topic.
    pub fn query_filter(&self) -> String {
        format!("topic:{}", self.0)
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A change or patch set number as it appears in query output.
///
/// Gerrit versions disagree on whether these are JSON strings or integers,
/// so both are accepted and displayed verbatim.
///
/// # Examples
///
/// ```
/// use topic_review_core::ChangeNumber;
///
/// let n: ChangeNumber = serde_json::from_str("123").unwrap();
/// let s: ChangeNumber = serde_json::from_str("\"123\"").unwrap();
/// assert_eq!(n.to_string(), s.to_string());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ChangeNumber {
    Number(u64),
    Text(String),
}

impl fmt::Display for ChangeNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeNumber::Number(n) => write!(f, "{n}"),
            ChangeNumber::Text(s) => f.write_str(s),
        }
    }
}

/// Names one revision of a change: `"<change>,<patch set>"`.
///
/// # Examples
///
/// ```
/// use topic_review_core::{ChangeNumber, PatchSetRef};
///
/// let r = PatchSetRef {
///     change: ChangeNumber::Text("123".into()),
///     patch_set: ChangeNumber::Number(2),
/// };
/// assert_eq!(r.to_string(), "123,2");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchSetRef {
    pub change: ChangeNumber,
    pub patch_set: ChangeNumber,
}

impl fmt::Display for PatchSetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.change, self.patch_set)
    }
}

/// Everything needed to issue one `gerrit review` command.
///
/// A label segment is only produced when both `label` and `score` are set;
/// a score on its own has no effect.
///
/// # Examples
///
/// ```
/// use topic_review_core::{ChangeNumber, PatchSetRef, ReviewRequest};
///
/// let request = ReviewRequest {
///     project: "demo".into(),
///     patch_set: PatchSetRef {
///         change: ChangeNumber::Number(123),
///         patch_set: ChangeNumber::Number(2),
///     },
///     label: Some("Verified".into()),
///     score: Some("+1".into()),
///     message: None,
/// };
/// assert_eq!(request.label_arg().as_deref(), Some("--label=Verified=+1"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewRequest {
    pub project: String,
    pub patch_set: PatchSetRef,
    pub label: Option<String>,
    pub score: Option<String>,
    pub message: Option<String>,
}

impl ReviewRequest {
    /// The `--label=<label>=<score>` argument, if a full vote was configured.
    pub fn label_arg(&self) -> Option<String> {
        match (&self.label, &self.score) {
            (Some(label), Some(score)) => Some(format!("--label={label}={score}")),
            _ => None,
        }
    }
}

/// Why a candidate record was not labeled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// A required field was absent. Holds the JSON path, e.g. `currentPatchSet.revision`.
    MissingField(&'static str),
    /// The record was present but a field had the wrong type.
    Malformed(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingField(field) => write!(f, "missing field '{field}'"),
            SkipReason::Malformed(detail) => write!(f, "malformed record: {detail}"),
        }
    }
}

/// Final state of one candidate patch.
///
/// Each candidate is visited once and ends in exactly one of these states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchOutcome {
    Skipped(SkipReason),
    Labeled(PatchSetRef),
    /// The review command ran but failed. `exit_code` is `None` when the
    /// process could not be spawned or was killed by a signal.
    Failed {
        patch_set: PatchSetRef,
        exit_code: Option<i32>,
    },
}

/// Tally of outcomes across all topics of a run.
///
/// # Examples
///
/// ```
/// use topic_review_core::{PatchOutcome, RunSummary, SkipReason};
///
/// let mut summary = RunSummary::default();
/// summary.record(&PatchOutcome::Skipped(SkipReason::MissingField("project")));
/// assert_eq!(summary.skipped, 1);
/// assert_eq!(summary.total(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Topics queried.
    pub topics: usize,
    /// Patches labeled successfully.
    pub labeled: usize,
    /// Candidate records skipped as invalid.
    pub skipped: usize,
    /// Review commands that failed.
    pub failed: usize,
}

impl RunSummary {
    pub fn record(&mut self, outcome: &PatchOutcome) {
        match outcome {
            PatchOutcome::Skipped(_) => self.skipped += 1,
            PatchOutcome::Labeled(_) => self.labeled += 1,
            PatchOutcome::Failed { .. } => self.failed += 1,
        }
    }

    /// Number of candidate patches visited.
    pub fn total(&self) -> usize {
        self.labeled + self.skipped + self.failed
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Review Stats ---")?;
        writeln!(f, "Topics queried: {}", self.topics)?;
        writeln!(f, "Patches labeled: {}", self.labeled)?;
        writeln!(f, "Patches skipped: {}", self.skipped)?;
        writeln!(f, "Reviews failed: {}", self.failed)?;
        write!(f, "--------------------")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patch_set(change: u64, ps: u64) -> PatchSetRef {
        PatchSetRef {
            change: ChangeNumber::Number(change),
            patch_set: ChangeNumber::Number(ps),
        }
    }

    fn request(label: Option<&str>, score: Option<&str>) -> ReviewRequest {
        ReviewRequest {
            project: "demo".into(),
            patch_set: patch_set(1, 1),
            label: label.map(Into::into),
            score: score.map(Into::into),
            message: None,
        }
    }

    #[test]
    fn change_number_accepts_strings_and_integers() {
        let text: ChangeNumber = serde_json::from_str("\"42\"").unwrap();
        let number: ChangeNumber = serde_json::from_str("42").unwrap();
        assert_eq!(text, ChangeNumber::Text("42".into()));
        assert_eq!(number, ChangeNumber::Number(42));
        assert_eq!(text.to_string(), "42");
        assert_eq!(number.to_string(), "42");
    }

    #[test]
    fn change_number_rejects_objects() {
        let result: Result<ChangeNumber, _> = serde_json::from_str("{}");
        assert!(result.is_err());
    }

    #[test]
    fn patch_set_ref_joins_with_comma() {
        assert_eq!(patch_set(123, 2).to_string(), "123,2");
    }

    #[test]
    fn label_arg_needs_label_and_score() {
        assert_eq!(
            request(Some("Code-Review"), Some("-2")).label_arg().as_deref(),
            Some("--label=Code-Review=-2")
        );
        assert_eq!(request(None, None).label_arg(), None);
        assert_eq!(request(None, Some("+1")).label_arg(), None);
        assert_eq!(request(Some("Verified"), None).label_arg(), None);
    }

    #[test]
    fn topic_keeps_surrounding_whitespace() {
        let topic = Topic::new(" b");
        assert_eq!(topic.as_str(), " b");
        assert_eq!(topic.query_filter(), "topic: b");
    }

    #[test]
    fn summary_counts_each_outcome() {
        let mut summary = RunSummary::default();
        summary.record(&PatchOutcome::Labeled(patch_set(1, 1)));
        summary.record(&PatchOutcome::Labeled(patch_set(2, 1)));
        summary.record(&PatchOutcome::Failed {
            patch_set: patch_set(3, 1),
            exit_code: Some(1),
        });
        summary.record(&PatchOutcome::Skipped(SkipReason::MissingField(
            "currentPatchSet",
        )));
        assert_eq!(summary.labeled, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.total(), 4);
    }

    #[test]
    fn skip_reason_display() {
        assert_eq!(
            SkipReason::MissingField("currentPatchSet.revision").to_string(),
            "missing field 'currentPatchSet.revision'"
        );
    }
}
