//! Resource pattern sets and glob matching.
//!
//! Policy resources are ARNs, possibly terminated (or interrupted) by `*`
//! globs. [`ResourceSet`] wraps a [`StringSet`] of patterns and answers
//! which patterns cover a concrete resource.

use serde::{Deserialize, Serialize};

use crate::set::StringSet;

/// ARN prefix for S3 resources.
pub const AWS_RESOURCE_PREFIX: &str = "arn:aws:s3:::";

/// Match a `*`-glob pattern against a candidate string.
///
/// The pattern is split on `*`: the candidate must start with the first
/// fragment, contain each interior fragment in left-to-right order
/// without overlap, and end with the last fragment unless the pattern
/// ends in `*`. An empty pattern matches only the empty string; a lone
/// `*` matches everything.
///
/// # Examples
///
/// ```
/// use tidewater_policy::resource::wildcard_match;
///
/// assert!(wildcard_match("arn:aws:s3:::bkt/*", "arn:aws:s3:::bkt/any/thing"));
/// assert!(wildcard_match("*", "anything"));
/// assert!(!wildcard_match("", "x"));
/// ```
#[must_use]
pub fn wildcard_match(pattern: &str, candidate: &str) -> bool {
    if pattern.is_empty() {
        return candidate.is_empty();
    }
    if pattern == "*" {
        return true;
    }

    let fragments: Vec<&str> = pattern.split('*').collect();
    if fragments.len() == 1 {
        // No glob at all: exact match.
        return pattern == candidate;
    }

    let first = fragments[0];
    if !candidate.starts_with(first) {
        return false;
    }
    let mut pos = first.len();

    // Interior fragments must appear in order, each starting at or after
    // the end of the previous match.
    for fragment in &fragments[1..fragments.len() - 1] {
        if fragment.is_empty() {
            continue;
        }
        match candidate[pos..].find(fragment) {
            Some(idx) => pos += idx + fragment.len(),
            None => return false,
        }
    }

    let last = fragments[fragments.len() - 1];
    if last.is_empty() {
        // Pattern ends in '*': anything may follow.
        return true;
    }
    candidate.len() >= pos + last.len() && candidate.ends_with(last)
}

/// A set of resource patterns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceSet(StringSet);

impl ResourceSet {
    /// Create an empty resource set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a set holding a single pattern.
    #[must_use]
    pub fn of(pattern: impl Into<String>) -> Self {
        Self(StringSet::of(pattern))
    }

    /// Insert a pattern.
    pub fn insert(&mut self, pattern: impl Into<String>) {
        self.0.insert(pattern);
    }

    /// Remove a pattern; returns whether it was present.
    pub fn remove(&mut self, pattern: &str) -> bool {
        self.0.remove(pattern)
    }

    /// Whether the set contains an exact pattern.
    #[must_use]
    pub fn contains(&self, pattern: &str) -> bool {
        self.0.contains(pattern)
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of patterns in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate patterns in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter()
    }

    /// Whether this set contains every pattern of `other`.
    #[must_use]
    pub fn is_superset(&self, other: &Self) -> bool {
        self.0.is_superset(&other.0)
    }

    /// Add every pattern of `other` to this set.
    pub fn union_with(&mut self, other: &Self) {
        self.0.union_with(&other.0);
    }

    /// The subset of patterns that glob-match the candidate resource.
    #[must_use]
    pub fn matches(&self, resource: &str) -> Self {
        Self(
            self.0
                .iter()
                .filter(|pattern| wildcard_match(pattern, resource))
                .collect(),
        )
    }

    /// The subset of patterns with the given literal prefix.
    #[must_use]
    pub fn starts_with(&self, prefix: &str) -> Self {
        Self(
            self.0
                .iter()
                .filter(|pattern| pattern.starts_with(prefix))
                .collect(),
        )
    }
}

impl<S: Into<String>> FromIterator<S> for ResourceSet {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_match_trailing_glob() {
        assert!(wildcard_match(
            "arn:aws:s3:::demo-bucket/*",
            "arn:aws:s3:::demo-bucket/anything"
        ));
        assert!(wildcard_match(
            "arn:aws:s3:::demo-bucket/*",
            "arn:aws:s3:::demo-bucket/deeply/nested/key"
        ));
    }

    #[test]
    fn test_should_anchor_prefix_before_glob() {
        // "oo*" requires the key to start with "oo".
        assert!(!wildcard_match(
            "arn:aws:s3:::demo-bucket/oo*",
            "arn:aws:s3:::demo-bucket/output.txt"
        ));
        assert!(wildcard_match(
            "arn:aws:s3:::demo-bucket/oo*",
            "arn:aws:s3:::demo-bucket/ootput.txt"
        ));
        assert!(wildcard_match(
            "arn:aws:s3:::demo-bucket/oo*",
            "arn:aws:s3:::demo-bucket/oops/output.txt"
        ));
    }

    #[test]
    fn test_should_match_interior_fragments_in_order() {
        assert!(wildcard_match(
            "arn:aws:s3:::demo-bucket/*/India/*/trip/*",
            "arn:aws:s3:::demo-bucket/Asia/India/MountK2/trip/sunrise.jpg"
        ));
        assert!(!wildcard_match(
            "arn:aws:s3:::demo-bucket/*/India/*/trip/*",
            "arn:aws:s3:::demo-bucket/Asia/MountK2/trip/sunrise.jpg"
        ));
        // Fragments out of order do not match.
        assert!(!wildcard_match(
            "arn:aws:s3:::demo-bucket/*/India/*/trip/*",
            "arn:aws:s3:::demo-bucket/trip/Asia/India/sunrise.jpg"
        ));
    }

    #[test]
    fn test_should_require_suffix_without_trailing_glob() {
        assert!(wildcard_match("photos/*.jpg", "photos/cat.jpg"));
        assert!(!wildcard_match("photos/*.jpg", "photos/cat.png"));
        // The suffix cannot reuse bytes consumed by the prefix.
        assert!(!wildcard_match("ab*ba", "aba"));
        assert!(wildcard_match("ab*ba", "abba"));
    }

    #[test]
    fn test_should_handle_degenerate_patterns() {
        assert!(wildcard_match("", ""));
        assert!(!wildcard_match("", "x"));
        assert!(wildcard_match("*", ""));
        assert!(wildcard_match("*", "anything"));
        assert!(wildcard_match("exact", "exact"));
        assert!(!wildcard_match("exact", "exactly"));
    }

    #[test]
    fn test_should_collect_matching_patterns_from_set() {
        let set: ResourceSet = [
            "arn:aws:s3:::bkt/*",
            "arn:aws:s3:::bkt/photos/*",
            "arn:aws:s3:::other/*",
        ]
        .into_iter()
        .collect();

        let matched = set.matches("arn:aws:s3:::bkt/photos/cat.jpg");
        assert_eq!(matched.len(), 2);
        assert!(matched.contains("arn:aws:s3:::bkt/*"));
        assert!(matched.contains("arn:aws:s3:::bkt/photos/*"));
    }

    #[test]
    fn test_should_filter_by_literal_prefix() {
        let set: ResourceSet = ["arn:aws:s3:::bkt", "arn:aws:s3:::bkt/docs/*"]
            .into_iter()
            .collect();
        let under = set.starts_with("arn:aws:s3:::bkt/");
        assert_eq!(under.len(), 1);
        assert!(under.contains("arn:aws:s3:::bkt/docs/*"));
    }
}
