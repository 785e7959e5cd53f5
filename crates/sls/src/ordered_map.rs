//! Insertion-ordered mapping with order-insensitive equality.

use crate::emitter;
use crate::value::Value;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::fmt;

/// A mapping that preserves key insertion order.
///
/// Updating an existing key keeps the key's original position; new keys
/// append. Equality ignores iteration order: two `OrderedMap`s with the
/// same pairs in different orders compare equal, and a map also compares
/// equal to a plain [`HashMap`] holding the same pairs. Each map still
/// iterates in its own insertion order.
#[derive(Debug, Clone, Default)]
pub struct OrderedMap {
    entries: IndexMap<String, Value>,
}

impl OrderedMap {
    pub fn new() -> Self {
        OrderedMap {
            entries: IndexMap::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        OrderedMap {
            entries: IndexMap::with_capacity(capacity),
        }
    }

    /// Insert or update a key. Updates keep the key's original position
    /// and return the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.entries.insert(key.into(), value)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Key/value pairs in insertion order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.entries.iter()
    }
}

impl PartialEq for OrderedMap {
    fn eq(&self, other: &Self) -> bool {
        // IndexMap equality is already order-insensitive.
        self.entries == other.entries
    }
}

impl PartialEq<HashMap<String, Value>> for OrderedMap {
    fn eq(&self, other: &HashMap<String, Value>) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl PartialEq<OrderedMap> for HashMap<String, Value> {
    fn eq(&self, other: &OrderedMap) -> bool {
        other == self
    }
}

impl FromIterator<(String, Value)> for OrderedMap {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        OrderedMap {
            entries: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for OrderedMap {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a OrderedMap {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl fmt::Display for OrderedMap {
    /// The single-line flow form, e.g. `{foo: bar, baz: qux}`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        emitter::write_flow_mapping(&mut out, self);
        f.write_str(&out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> OrderedMap {
        let mut map = OrderedMap::new();
        map.insert("foo", Value::from("bar"));
        map.insert("baz", Value::from("qux"));
        map
    }

    #[test]
    fn test_insertion_order_preserved() {
        let map = sample();
        let keys: Vec<_> = map.keys().collect();
        assert_eq!(keys, vec!["foo", "baz"]);
    }

    #[test]
    fn test_update_keeps_position() {
        let mut map = sample();
        map.insert("foo", Value::from("updated"));
        let keys: Vec<_> = map.keys().collect();
        assert_eq!(keys, vec!["foo", "baz"]);
        assert_eq!(map.get("foo"), Some(&Value::from("updated")));
    }

    #[test]
    fn test_equality_ignores_order() {
        let a = sample();
        let mut b = OrderedMap::new();
        b.insert("baz", Value::from("qux"));
        b.insert("foo", Value::from("bar"));

        assert_eq!(a, b);
        // Each map keeps its own iteration order.
        assert_eq!(a.keys().collect::<Vec<_>>(), vec!["foo", "baz"]);
        assert_eq!(b.keys().collect::<Vec<_>>(), vec!["baz", "foo"]);
    }

    #[test]
    fn test_equality_against_unordered_map() {
        let map = sample();
        let mut plain = HashMap::new();
        plain.insert("baz".to_string(), Value::from("qux"));
        plain.insert("foo".to_string(), Value::from("bar"));

        assert_eq!(map, plain);
        assert_eq!(plain, map);

        plain.insert("extra".to_string(), Value::Null);
        assert_ne!(map, plain);
    }

    #[test]
    fn test_display_flow_form() {
        let map = sample();
        assert_eq!(map.to_string(), "{foo: bar, baz: qux}");
    }
}
