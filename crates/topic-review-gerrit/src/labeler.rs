//! Applying a review vote to each candidate patch.

use std::borrow::Cow;

use serde::Deserialize;
use serde_json::Value;
use topic_review_core::{
    ChangeNumber, PatchOutcome, PatchSetRef, ReviewRequest, SkipReason, TopicReviewError,
};
use tracing::{debug, info, warn};

use crate::runner::{CommandRunner, CommandSpec, Connection};

/// Label, score, and message to apply to every patch of a run.
///
/// # Examples
///
/// ```
/// use topic_review_gerrit::labeler::ReviewOptions;
///
/// let options = ReviewOptions {
///     label: Some("Code-Review".into()),
///     score: None,
///     message: None,
/// };
/// assert!(options.validate().is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewOptions {
    pub label: Option<String>,
    pub score: Option<String>,
    pub message: Option<String>,
}

impl ReviewOptions {
    /// Reject a label without a score. A score without a label is accepted
    /// and has no effect on the review command.
    ///
    /// # Errors
    ///
    /// Returns [`TopicReviewError::Config`] when `label` is set and `score` is not.
    pub fn validate(&self) -> Result<(), TopicReviewError> {
        if self.label.is_some() && self.score.is_none() {
            return Err(TopicReviewError::Config(
                "'--score' is required when '--label' is provided".into(),
            ));
        }
        Ok(())
    }

    pub fn request_for(&self, project: String, patch_set: PatchSetRef) -> ReviewRequest {
        ReviewRequest {
            project,
            patch_set,
            label: self.label.clone(),
            score: self.score.clone(),
            message: self.message.clone(),
        }
    }
}

/// The fields of a query record that a review needs. Everything is optional
/// here so that absence can be reported per field.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CandidatePatch {
    project: Option<String>,
    number: Option<ChangeNumber>,
    current_patch_set: Option<CandidatePatchSet>,
}

#[derive(Debug, Deserialize)]
struct CandidatePatchSet {
    number: Option<ChangeNumber>,
    revision: Option<String>,
}

/// Check a candidate record and extract its project and patch set.
///
/// # Errors
///
/// Returns the [`SkipReason`] for records missing `project`, `number`,
/// `currentPatchSet`, `currentPatchSet.revision` or `currentPatchSet.number`,
/// or whose fields have the wrong JSON type.
///
/// # Examples
///
/// ```
/// use topic_review_gerrit::labeler::validate_record;
///
/// let record = serde_json::json!({
///     "project": "demo",
///     "number": "123",
///     "currentPatchSet": { "number": "2", "revision": "abcd1234" }
/// });
/// let (project, patch_set) = validate_record(&record).unwrap();
/// assert_eq!(project, "demo");
/// assert_eq!(patch_set.to_string(), "123,2");
/// ```
pub fn validate_record(record: &Value) -> Result<(String, PatchSetRef), SkipReason> {
    let candidate = CandidatePatch::deserialize(record)
        .map_err(|e| SkipReason::Malformed(e.to_string()))?;

    let project = candidate
        .project
        .ok_or(SkipReason::MissingField("project"))?;
    let change = candidate.number.ok_or(SkipReason::MissingField("number"))?;
    let current = candidate
        .current_patch_set
        .ok_or(SkipReason::MissingField("currentPatchSet"))?;
    debug!("Current Patch Set: {}", record["currentPatchSet"]);

    if current.revision.is_none() {
        return Err(SkipReason::MissingField("currentPatchSet.revision"));
    }
    let patch_set = current
        .number
        .ok_or(SkipReason::MissingField("currentPatchSet.number"))?;

    Ok((project, PatchSetRef { change, patch_set }))
}

/// Build `ssh -p <port> <server> gerrit review --project <p> [--label=<l>=<s>] <change,ps> [--message=<m>]`.
///
/// ssh hands the remote side a single command line, so the message is quoted
/// for the server's argument splitter. Single-word messages pass unchanged.
///
/// # Examples
///
/// ```
/// use topic_review_core::{ChangeNumber, PatchSetRef, ReviewRequest};
/// use topic_review_gerrit::labeler::build_review_command;
/// use topic_review_gerrit::runner::Connection;
///
/// let request = ReviewRequest {
///     project: "demo".into(),
///     patch_set: PatchSetRef {
///         change: ChangeNumber::Text("123".into()),
///         patch_set: ChangeNumber::Text("2".into()),
///     },
///     label: Some("Verified".into()),
///     score: Some("+1".into()),
///     message: None,
/// };
/// let spec = build_review_command(&Connection::new("ssh", "host", 29418), &request);
/// assert_eq!(
///     spec.to_string(),
///     "ssh -p 29418 host gerrit review --project demo --label=Verified=+1 123,2"
/// );
/// ```
pub fn build_review_command(conn: &Connection, request: &ReviewRequest) -> CommandSpec {
    let mut args = vec![
        "gerrit".to_string(),
        "review".into(),
        "--project".into(),
        request.project.clone(),
    ];
    if let Some(label) = request.label_arg() {
        args.push(label);
    }
    args.push(request.patch_set.to_string());
    if let Some(message) = &request.message {
        let quoted = shell_escape::unix::escape(Cow::Borrowed(message.as_str()));
        args.push(format!("--message={quoted}"));
    }
    conn.command(args)
}

/// Validate one candidate and, if it is usable, issue its review command.
///
/// Never fails: invalid records become [`PatchOutcome::Skipped`] and
/// unsuccessful reviews become [`PatchOutcome::Failed`], each with a
/// diagnostic.
pub fn label_patch<R: CommandRunner + ?Sized>(
    runner: &R,
    conn: &Connection,
    options: &ReviewOptions,
    record: &Value,
) -> PatchOutcome {
    let (project, patch_set) = match validate_record(record) {
        Ok(fields) => fields,
        Err(reason) => {
            warn!("Patch record skipped: {reason}");
            return PatchOutcome::Skipped(reason);
        }
    };

    let request = options.request_for(project, patch_set);
    let spec = build_review_command(conn, &request);
    info!(
        "Preparing to label patch '{}' in project '{}' with command: {spec}",
        request.patch_set, request.project
    );

    let patch_set = request.patch_set;
    match runner.run(&spec) {
        Ok(output) if output.success() => {
            info!("Successfully labeled patch '{patch_set}'");
            let captured = output.combined();
            if !captured.is_empty() {
                debug!("Output: {captured}");
            }
            PatchOutcome::Labeled(patch_set)
        }
        Ok(output) => {
            warn!(
                "Failed to label patch '{patch_set}'. Command that failed: {spec}. Return code: {}. Output: {}",
                output.code_label(),
                output.combined()
            );
            PatchOutcome::Failed {
                patch_set,
                exit_code: output.code,
            }
        }
        Err(e) => {
            warn!("Failed to label patch '{patch_set}'. Command that failed: {spec}. Error: {e}");
            PatchOutcome::Failed {
                patch_set,
                exit_code: None,
            }
        }
    }
}
