//! One run: every topic, every record, every patch, strictly in order.

use topic_review_core::{RunSummary, Topic, TopicReviewError};
use tracing::info;

use crate::labeler::{label_patch, ReviewOptions};
use crate::query::query_topic;
use crate::records::parse_records;
use crate::runner::{CommandRunner, Connection};

/// Resolved settings for a run, passed explicitly into each stage.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub connection: Connection,
    /// Remote command name used for queries, e.g. `gerrit`.
    pub remote: String,
    pub review: ReviewOptions,
}

/// Query each topic and label every valid patch it returns.
///
/// The same patch listed under two topics is labeled twice.
///
/// # Errors
///
/// Returns [`TopicReviewError::Config`] for a label without a score, before
/// any command runs. Returns [`TopicReviewError::Query`] or
/// [`TopicReviewError::Io`] from the first query that fails; topics after it
/// are not processed.
pub fn run<R: CommandRunner + ?Sized>(
    runner: &R,
    settings: &RunSettings,
    topics: &[Topic],
) -> Result<RunSummary, TopicReviewError> {
    settings.review.validate()?;

    let mut summary = RunSummary::default();
    for topic in topics {
        let lines = query_topic(runner, &settings.connection, &settings.remote, topic)?;
        summary.topics += 1;

        let candidates = parse_records(&lines);
        info!("Topic '{topic}': {} candidate patches", candidates.len());
        for record in &candidates {
            let outcome = label_patch(runner, &settings.connection, &settings.review, record);
            summary.record(&outcome);
        }
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::testing::RecordingRunner;
    use crate::topics::resolve_topics;

    fn settings(label: Option<&str>, score: Option<&str>) -> RunSettings {
        RunSettings {
            connection: Connection::new("ssh", "host", 29418),
            remote: "gerrit".into(),
            review: ReviewOptions {
                label: label.map(Into::into),
                score: score.map(Into::into),
                message: None,
            },
        }
    }

    const TWO_PATCHES: &str = concat!(
        r#"{"project":"demo","number":"10","currentPatchSet":{"number":"1","revision":"aa"}}"#,
        "\n",
        r#"{"project":"demo","number":"11","currentPatchSet":{"number":"3","revision":"bb"}}"#,
        "\n",
        r#"{"type":"stats","rowCount":2}"#,
        "\n"
    );

    fn review_calls(runner: &RecordingRunner) -> Vec<String> {
        runner
            .calls()
            .into_iter()
            .filter(|c| c.args.get(4).map(String::as_str) == Some("review"))
            .map(|c| c.to_string())
            .collect()
    }

    #[test]
    fn end_to_end_example() {
        let output = concat!(
            r#"{"project":"demo","number":"123","currentPatchSet":{"number":"2","revision":"abcd1234"}}"#,
            "\n",
            r#"{"type":"stats","rowCount":1}"#,
            "\n"
        );
        let runner = RecordingRunner::default().respond(0, output);
        let summary = run(
            &runner,
            &settings(Some("Verified"), Some("+1")),
            &resolve_topics("T"),
        )
        .unwrap();

        assert_eq!(
            review_calls(&runner),
            ["ssh -p 29418 host gerrit review --project demo --label=Verified=+1 123,2"]
        );
        assert_eq!(summary.labeled, 1);
        assert_eq!(summary.topics, 1);
    }

    #[test]
    fn two_patches_two_reviews() {
        let runner = RecordingRunner::default().respond(0, TWO_PATCHES);
        let summary = run(
            &runner,
            &settings(Some("Code-Review"), Some("+2")),
            &resolve_topics("T"),
        )
        .unwrap();

        let calls = review_calls(&runner);
        assert_eq!(calls.len(), 2);
        assert!(calls[0].ends_with(" 10,1"));
        assert!(calls[1].ends_with(" 11,3"));
        assert_eq!(summary.labeled, 2);
    }

    #[test]
    fn label_without_score_runs_nothing() {
        let runner = RecordingRunner::default();
        let result = run(
            &runner,
            &settings(Some("Code-Review"), None),
            &resolve_topics("T"),
        );
        assert!(matches!(result, Err(TopicReviewError::Config(_))));
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn failed_review_does_not_stop_next_patch() {
        let runner = RecordingRunner::default()
            .respond(0, TWO_PATCHES)
            .respond(1, "error")
            .respond(0, "");
        let summary = run(
            &runner,
            &settings(Some("Verified"), Some("-1")),
            &resolve_topics("T"),
        )
        .unwrap();

        assert_eq!(review_calls(&runner).len(), 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.labeled, 1);
    }

    #[test]
    fn record_missing_patch_set_is_skipped() {
        let output = concat!(
            r#"{"project":"demo","number":"1"}"#,
            "\n",
            r#"{"project":"demo","number":"2","currentPatchSet":{"number":"1","revision":"cc"}}"#,
        );
        let runner = RecordingRunner::default().respond(0, output);
        let summary = run(
            &runner,
            &settings(Some("Verified"), Some("+1")),
            &resolve_topics("T"),
        )
        .unwrap();

        let calls = review_calls(&runner);
        assert_eq!(calls.len(), 1);
        assert!(calls[0].ends_with(" 2,1"));
        assert_eq!(summary.skipped, 1);
    }

    #[test]
    fn stats_only_output_issues_no_review() {
        let runner = RecordingRunner::default().respond(0, r#"{"type":"stats","rowCount":3}"#);
        let summary = run(
            &runner,
            &settings(Some("Verified"), Some("+1")),
            &resolve_topics("T"),
        )
        .unwrap();
        assert!(review_calls(&runner).is_empty());
        assert_eq!(summary.total(), 0);
    }

    #[test]
    fn query_failure_stops_remaining_topics() {
        let runner = RecordingRunner::default().respond(0, "").respond(255, "");
        let result = run(
            &runner,
            &settings(Some("Verified"), Some("+1")),
            &resolve_topics("a,b,c"),
        );
        assert!(matches!(result, Err(TopicReviewError::Query { .. })));
        let calls = runner.calls();
        assert_eq!(calls.len(), 2);
        assert!(calls[1].to_string().ends_with("topic:b"));
    }

    #[test]
    fn same_patch_under_two_topics_is_labeled_twice() {
        let line = r#"{"project":"demo","number":"5","currentPatchSet":{"number":"1","revision":"dd"}}"#;
        let runner = RecordingRunner::default()
            .respond(0, line)
            .respond(0, "")
            .respond(0, line)
            .respond(0, "");
        let summary = run(
            &runner,
            &settings(Some("Verified"), Some("+1")),
            &resolve_topics("x,y"),
        )
        .unwrap();
        assert_eq!(summary.labeled, 2);
        assert_eq!(summary.topics, 2);
    }

    #[test]
    fn topics_are_queried_in_resolved_order() {
        let runner = RecordingRunner::default();
        run(&runner, &settings(None, None), &resolve_topics("b,a,b")).unwrap();
        let filters: Vec<String> = runner
            .calls()
            .into_iter()
            .filter_map(|c| c.args.last().cloned())
            .collect();
        assert_eq!(filters, ["topic:b", "topic:a"]);
    }
}
