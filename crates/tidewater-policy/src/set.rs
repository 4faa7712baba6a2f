//! An ordered string set with the algebra the policy engine needs.
//!
//! Policy documents hold actions, resources, principals, and condition
//! values as JSON that may be either a single string or an array of
//! strings. [`StringSet`] deserializes both forms and always serializes
//! as a sorted array, which keeps documents deterministic across
//! round-trips.

use std::collections::BTreeSet;
use std::fmt;

use serde::de::{SeqAccess, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A set of strings with standard set semantics, kept in sorted order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringSet(BTreeSet<String>);

impl StringSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a set holding a single value.
    #[must_use]
    pub fn of(value: impl Into<String>) -> Self {
        let mut set = Self::new();
        set.insert(value.into());
        set
    }

    /// Insert a value.
    pub fn insert(&mut self, value: impl Into<String>) {
        self.0.insert(value.into());
    }

    /// Remove a value; returns whether it was present.
    pub fn remove(&mut self, value: &str) -> bool {
        self.0.remove(value)
    }

    /// Whether the set contains a value.
    #[must_use]
    pub fn contains(&self, value: &str) -> bool {
        self.0.contains(value)
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of values in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate values in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Whether this set contains every value of `other`.
    #[must_use]
    pub fn is_superset(&self, other: &Self) -> bool {
        self.0.is_superset(&other.0)
    }

    /// Whether every value of this set is contained in `other`.
    #[must_use]
    pub fn is_subset(&self, other: &Self) -> bool {
        self.0.is_subset(&other.0)
    }

    /// Add every value of `other` to this set.
    pub fn union_with(&mut self, other: &Self) {
        self.0.extend(other.0.iter().cloned());
    }

    /// Remove every value of `other` from this set.
    pub fn difference_with(&mut self, other: &Self) {
        for value in &other.0 {
            self.0.remove(value);
        }
    }

    /// The values present in both sets.
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Self {
        Self(self.0.intersection(&other.0).cloned().collect())
    }

    /// Keep only the values the predicate accepts.
    pub fn retain(&mut self, f: impl FnMut(&String) -> bool) {
        self.0.retain(f);
    }
}

impl<S: Into<String>> FromIterator<S> for StringSet {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl Serialize for StringSet {
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for value in &self.0 {
            seq.serialize_element(value)?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for StringSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct StringOrSeq;

        impl<'de> Visitor<'de> for StringOrSeq {
            type Value = StringSet;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a string or an array of strings")
            }

            fn visit_str<E: serde::de::Error>(self, value: &str) -> Result<Self::Value, E> {
                Ok(StringSet::of(value))
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                let mut set = StringSet::new();
                while let Some(value) = seq.next_element::<String>()? {
                    set.insert(value);
                }
                Ok(set)
            }
        }

        deserializer.deserialize_any(StringOrSeq)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_deserialize_single_string_as_set() {
        let set: StringSet = serde_json::from_str(r#""s3:GetObject""#).unwrap();
        assert_eq!(set.len(), 1);
        assert!(set.contains("s3:GetObject"));
    }

    #[test]
    fn test_should_deserialize_array_as_set() {
        let set: StringSet = serde_json::from_str(r#"["b", "a", "b"]"#).unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.contains("a"));
    }

    #[test]
    fn test_should_serialize_sorted() {
        let set: StringSet = ["zebra", "apple"].into_iter().collect();
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"["apple","zebra"]"#);
    }

    #[test]
    fn test_should_compute_superset_and_subset() {
        let big: StringSet = ["a", "b", "c"].into_iter().collect();
        let small: StringSet = ["a", "c"].into_iter().collect();
        assert!(big.is_superset(&small));
        assert!(small.is_subset(&big));
        assert!(!small.is_superset(&big));
    }

    #[test]
    fn test_should_union_and_difference_in_place() {
        let mut set: StringSet = ["a", "b"].into_iter().collect();
        set.union_with(&["b", "c"].into_iter().collect());
        assert_eq!(set.len(), 3);

        set.difference_with(&["a", "c"].into_iter().collect());
        assert_eq!(set.len(), 1);
        assert!(set.contains("b"));
    }
}
