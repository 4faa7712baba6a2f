//! Condition maps: operator → condition key → value set.
//!
//! Policy conditions are a two-level structure, e.g.
//!
//! ```json
//! { "StringEquals": { "s3:prefix": ["photos/", "docs/"] } }
//! ```
//!
//! The merge laws are explicit: [`ConditionKeyMap::insert`] fails when
//! the key already exists, [`ConditionKeyMap::put`] unions value sets,
//! and [`ConditionKeyMap::remove`] subtracts values and deletes the key
//! when its set empties. Strict insertion and merging are deliberately
//! separate named operations so every call site states which it wants.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::PolicyError;
use crate::set::StringSet;

/// A mapping from condition key (e.g. `s3:prefix`) to its value set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConditionKeyMap(BTreeMap<String, StringSet>);

impl ConditionKeyMap {
    /// Create an empty key map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a key map holding a single key and value.
    #[must_use]
    pub fn of(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut map = Self::new();
        map.put(key, StringSet::of(value));
        map
    }

    /// Strictly insert a key with its values.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::DuplicateConditionKey`] if the key is
    /// already present, regardless of its current values.
    pub fn insert(&mut self, key: impl Into<String>, values: StringSet) -> Result<(), PolicyError> {
        let key = key.into();
        if self.0.contains_key(&key) {
            return Err(PolicyError::DuplicateConditionKey(key));
        }
        self.0.insert(key, values);
        Ok(())
    }

    /// Merge values into a key, creating it if absent.
    ///
    /// An existing key's value set is unioned with `values` rather than
    /// replaced.
    pub fn put(&mut self, key: impl Into<String>, values: StringSet) {
        self.0
            .entry(key.into())
            .and_modify(|existing| existing.union_with(&values))
            .or_insert(values);
    }

    /// Subtract values from a key.
    ///
    /// If the key's value set becomes empty it is removed entirely.
    pub fn remove(&mut self, key: &str, values: &StringSet) {
        if let Some(existing) = self.0.get_mut(key) {
            existing.difference_with(values);
            if existing.is_empty() {
                self.0.remove(key);
            }
        }
    }

    /// Look up the value set for a key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&StringSet> {
        self.0.get(key)
    }

    /// Whether the map has no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of keys in the map.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate `(key, values)` pairs in sorted key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &StringSet)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// A mapping from condition operator (e.g. `StringEquals`) to key map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConditionMap(BTreeMap<String, ConditionKeyMap>);

impl ConditionMap {
    /// Create an empty condition map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a condition map holding a single operator and key map.
    #[must_use]
    pub fn of(operator: impl Into<String>, key_map: ConditionKeyMap) -> Self {
        let mut map = Self::new();
        map.put(operator, key_map);
        map
    }

    /// Merge a key map into an operator, creating the operator if absent.
    ///
    /// Every key of `key_map` is [`ConditionKeyMap::put`] into the
    /// existing entry, so value sets union rather than replace.
    pub fn put(&mut self, operator: impl Into<String>, key_map: ConditionKeyMap) {
        let entry = self.0.entry(operator.into()).or_default();
        for (key, values) in &key_map.0 {
            entry.put(key.clone(), values.clone());
        }
    }

    /// Merge every entry of another condition map into this one.
    pub fn put_all(&mut self, other: &ConditionMap) {
        for (operator, key_map) in &other.0 {
            self.put(operator.clone(), key_map.clone());
        }
    }

    /// Look up the key map for an operator.
    #[must_use]
    pub fn get(&self, operator: &str) -> Option<&ConditionKeyMap> {
        self.0.get(operator)
    }

    /// Mutable access to the key map for an operator.
    pub fn get_mut(&mut self, operator: &str) -> Option<&mut ConditionKeyMap> {
        self.0.get_mut(operator)
    }

    /// Remove an operator entirely.
    pub fn remove_operator(&mut self, operator: &str) {
        self.0.remove(operator);
    }

    /// Whether the map has no operators.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of operators in the map.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate `(operator, key_map)` pairs in sorted operator order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConditionKeyMap)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(items: &[&str]) -> StringSet {
        items.iter().copied().collect()
    }

    #[test]
    fn test_should_fail_strict_insert_on_existing_key() {
        let mut map = ConditionKeyMap::new();
        map.insert("s3:prefix", values(&["a"])).unwrap();
        let result = map.insert("s3:prefix", values(&["b"]));
        assert!(matches!(result, Err(PolicyError::DuplicateConditionKey(_))));
        // The original values survive a failed insert.
        assert_eq!(map.get("s3:prefix"), Some(&values(&["a"])));
    }

    #[test]
    fn test_should_union_values_on_put() {
        let mut map = ConditionKeyMap::new();
        map.put("s3:prefix", values(&["a", "b"]));
        map.put("s3:prefix", values(&["b", "c"]));
        assert_eq!(map.get("s3:prefix"), Some(&values(&["a", "b", "c"])));
    }

    #[test]
    fn test_should_delete_key_when_last_value_removed() {
        let mut map = ConditionKeyMap::new();
        map.put("s3:prefix", values(&["a", "b"]));

        map.remove("s3:prefix", &values(&["a"]));
        assert_eq!(map.get("s3:prefix"), Some(&values(&["b"])));

        map.remove("s3:prefix", &values(&["b"]));
        assert!(map.get("s3:prefix").is_none());
        assert!(map.is_empty());
    }

    #[test]
    fn test_should_ignore_remove_of_absent_key() {
        let mut map = ConditionKeyMap::new();
        map.remove("s3:prefix", &values(&["a"]));
        assert!(map.is_empty());
    }

    #[test]
    fn test_should_merge_disjoint_maps_to_union() {
        let mut left = ConditionMap::of("StringEquals", ConditionKeyMap::of("s3:prefix", "a"));
        let right = ConditionMap::of("StringNotEquals", ConditionKeyMap::of("s3:prefix", "b"));

        left.put_all(&right);

        assert_eq!(left.len(), 2);
        assert!(left.get("StringEquals").is_some());
        assert!(left.get("StringNotEquals").is_some());
    }

    #[test]
    fn test_should_merge_same_operator_by_union() {
        let mut left = ConditionMap::of("StringEquals", ConditionKeyMap::of("s3:prefix", "a"));
        let right = ConditionMap::of("StringEquals", ConditionKeyMap::of("s3:prefix", "b"));

        left.put_all(&right);

        assert_eq!(left.len(), 1);
        let key_map = left.get("StringEquals").unwrap();
        assert_eq!(
            key_map.get("s3:prefix"),
            Some(&["a", "b"].into_iter().collect())
        );
    }

    #[test]
    fn test_should_round_trip_condition_json() {
        let map = ConditionMap::of(
            "StringEquals",
            ConditionKeyMap::of("s3:prefix", "photos/"),
        );
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"StringEquals":{"s3:prefix":["photos/"]}}"#);

        let parsed: ConditionMap = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, map);
    }

    #[test]
    fn test_should_parse_single_string_condition_value() {
        let parsed: ConditionMap =
            serde_json::from_str(r#"{"StringEquals":{"s3:prefix":"photos/"}}"#).unwrap();
        let key_map = parsed.get("StringEquals").unwrap();
        assert!(key_map.get("s3:prefix").unwrap().contains("photos/"));
    }
}
