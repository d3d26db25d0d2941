use std::collections::HashSet;

use topic_review_core::Topic;

/// Split a comma-separated topic argument into unique topics, first occurrence first.
///
/// Whitespace around commas is kept: `"a, b"` yields `"a"` and `" b"`.
///
/// # Examples
///
/// ```
/// use topic_review_gerrit::topics::resolve_topics;
///
/// let topics = resolve_topics("a,b,a,c");
/// let names: Vec<&str> = topics.iter().map(|t| t.as_str()).collect();
/// assert_eq!(names, ["a", "b", "c"]);
/// ```
pub fn resolve_topics(raw: &str) -> Vec<Topic> {
    let mut seen = HashSet::new();
    raw.split(',')
        .filter(|name| seen.insert(*name))
        .map(Topic::new)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(raw: &str) -> Vec<String> {
        resolve_topics(raw)
            .into_iter()
            .map(|t| t.as_str().to_string())
            .collect()
    }

    #[test]
    fn single_topic() {
        assert_eq!(names("release"), ["release"]);
    }

    #[test]
    fn duplicates_removed_in_first_seen_order() {
        assert_eq!(names("a,b,a,c"), ["a", "b", "c"]);
        assert_eq!(names("c,c,b,a,b"), ["c", "b", "a"]);
    }

    #[test]
    fn whitespace_is_not_normalized() {
        assert_eq!(names("a, b,b"), ["a", " b", "b"]);
    }

    #[test]
    fn empty_segments_are_kept_once() {
        assert_eq!(names("a,,b,"), ["a", "", "b"]);
    }
}
