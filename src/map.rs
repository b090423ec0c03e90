//! Ordered map type for CONL map sections.
//!
//! This module provides [`ConlMap`], a wrapper around [`IndexMap`] that
//! preserves insertion order for map entries. Order matters in CONL: a
//! document round-trips through [`crate::parse`] and [`crate::serialize`]
//! with its entries in the order they were written, and key uniqueness is
//! enforced when the tree is built.
//!
//! ## Examples
//!
//! ```rust
//! use conl::{ConlMap, Value};
//!
//! let mut map = ConlMap::new();
//! map.insert("name".to_string(), Value::from("Alice"));
//! map.insert("shell".to_string(), Value::from("zsh"));
//!
//! assert_eq!(map.len(), 2);
//! assert_eq!(map.get("name").and_then(|v| v.as_str()), Some("Alice"));
//! ```

use indexmap::IndexMap;
use std::collections::HashMap;

/// An ordered map of string keys to CONL values.
///
/// A thin wrapper around [`IndexMap`] that iterates in insertion order,
/// which is what makes CONL round trips order-faithful.
///
/// # Examples
///
/// ```rust
/// use conl::{ConlMap, Value};
///
/// let mut map = ConlMap::new();
/// map.insert("first".to_string(), Value::from("1"));
/// map.insert("second".to_string(), Value::from("2"));
///
/// let keys: Vec<_> = map.keys().cloned().collect();
/// assert_eq!(keys, vec!["first", "second"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConlMap(IndexMap<String, crate::Value>);

impl ConlMap {
    /// Creates an empty `ConlMap`.
    #[must_use]
    pub fn new() -> Self {
        ConlMap(IndexMap::new())
    }

    /// Creates an empty `ConlMap` with the specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        ConlMap(IndexMap::with_capacity(capacity))
    }

    /// Inserts a key-value pair into the map.
    ///
    /// If the map already contained this key, the old value is returned
    /// and the entry keeps its original position.
    pub fn insert(&mut self, key: String, value: crate::Value) -> Option<crate::Value> {
        self.0.insert(key, value)
    }

    /// Returns a reference to the value corresponding to the key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&crate::Value> {
        self.0.get(key)
    }

    /// Returns `true` if the map contains the given key.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Returns the number of entries in the map.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the map contains no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns an iterator over the keys of the map, in insertion order.
    pub fn keys(&self) -> indexmap::map::Keys<'_, String, crate::Value> {
        self.0.keys()
    }

    /// Returns an iterator over the values of the map, in insertion order.
    pub fn values(&self) -> indexmap::map::Values<'_, String, crate::Value> {
        self.0.values()
    }

    /// Returns an iterator over the entries of the map, in insertion order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, crate::Value> {
        self.0.iter()
    }
}

impl Default for ConlMap {
    fn default() -> Self {
        Self::new()
    }
}

impl From<HashMap<String, crate::Value>> for ConlMap {
    fn from(map: HashMap<String, crate::Value>) -> Self {
        ConlMap(map.into_iter().collect())
    }
}

impl From<ConlMap> for HashMap<String, crate::Value> {
    fn from(map: ConlMap) -> Self {
        map.0.into_iter().collect()
    }
}

impl IntoIterator for ConlMap {
    type Item = (String, crate::Value);
    type IntoIter = indexmap::map::IntoIter<String, crate::Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ConlMap {
    type Item = (&'a String, &'a crate::Value);
    type IntoIter = indexmap::map::Iter<'a, String, crate::Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<(String, crate::Value)> for ConlMap {
    fn from_iter<T: IntoIterator<Item = (String, crate::Value)>>(iter: T) -> Self {
        ConlMap(IndexMap::from_iter(iter))
    }
}
