//! Nested maps addressed by path segments.
//!
//! [`Container`] is the in-memory shape of a structured attribute: an
//! insertion-ordered map from string keys to [`Value`]s, where a value may
//! itself be a `Container`. Depth is unbounded.
//!
//! # Usage
//!
//! ```
//! use jsonfield::container::{Container, Value};
//!
//! let mut address = Container::new().with("street", "Main");
//! address.set(&["location", "latitude"], 52.1)?;
//!
//! assert_eq!(address.get(&["location", "latitude"]), Some(&Value::Float(52.1)));
//! assert_eq!(address.get(&["location", "longitude"]), None);
//! assert_eq!(address.get(&["street"]), Some(&Value::from("Main")));
//! # Ok::<(), jsonfield::path::PathError>(())
//! ```

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::path::{Path, PathError};

pub mod value;

pub use value::Value;

/// An insertion-ordered nested map.
///
/// Key order is kept for listing only; equality ignores it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Container {
    entries: IndexMap<String, Value>,
}

impl Container {
    /// Creates a new empty container
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    /// Returns true if the container has no keys
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the number of top-level keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the container has the given top-level key
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Descends one segment at a time and returns the value at the end.
    ///
    /// Returns `None` (never an error) when any segment is missing or an
    /// intermediate value is not a map. An empty segment list yields `None`.
    pub fn get<S: AsRef<str>>(&self, segments: &[S]) -> Option<&Value> {
        let (first, rest) = segments.split_first()?;
        let mut current = self.entries.get(first.as_ref())?;

        for segment in rest {
            current = current.as_map()?.entries.get(segment.as_ref())?;
        }

        Some(current)
    }

    /// Path-based form of [`Container::get`].
    pub fn get_path(&self, path: impl AsRef<Path>) -> Option<&Value> {
        let segments: Vec<&str> = path.as_ref().components().collect();
        self.get(&segments)
    }

    /// Gets a mutable reference to the value at the given segments.
    pub fn get_mut<S: AsRef<str>>(&mut self, segments: &[S]) -> Option<&mut Value> {
        let (last, parents) = segments.split_last()?;
        let mut current = self;

        for segment in parents {
            current = current.entries.get_mut(segment.as_ref())?.as_map_mut()?;
        }

        current.entries.get_mut(last.as_ref())
    }

    /// Assigns `value` at the given segments, returning what was there before.
    ///
    /// Missing intermediate maps are created. An intermediate that holds a
    /// non-map value is replaced with an empty map so the descent can go on.
    /// Only the touched segment chain is rewritten: sibling keys at every
    /// level keep their values and their position.
    ///
    /// # Errors
    /// Returns [`PathError::Malformed`] for an empty segment list or an empty
    /// segment. Nothing is modified in that case.
    pub fn set<S: AsRef<str>>(
        &mut self,
        segments: &[S],
        value: impl Into<Value>,
    ) -> Result<Option<Value>, PathError> {
        let Some((last, parents)) = segments.split_last() else {
            return Err(PathError::Malformed {
                path: String::new(),
                reason: "cannot set a value at an empty path".to_string(),
            });
        };

        if segments.iter().any(|segment| segment.as_ref().is_empty()) {
            let joined: Vec<&str> = segments.iter().map(|segment| segment.as_ref()).collect();
            return Err(PathError::Malformed {
                path: joined.join(crate::path::DELIMITER),
                reason: "segments cannot be empty".to_string(),
            });
        }

        let mut current = self;

        // Navigate to the parent, creating intermediate maps as needed
        for segment in parents {
            let entry = current
                .entries
                .entry(segment.as_ref().to_string())
                .or_insert_with(|| Value::Map(Container::new()));
            if !entry.is_map() {
                // Replace scalar value with new map to allow navigation
                *entry = Value::Map(Container::new());
            }
            match entry {
                Value::Map(map) => current = map,
                _ => unreachable!(),
            }
        }

        Ok(current
            .entries
            .insert(last.as_ref().to_string(), value.into()))
    }

    /// Path-based form of [`Container::set`].
    pub fn set_path(
        &mut self,
        path: impl AsRef<Path>,
        value: impl Into<Value>,
    ) -> Result<Option<Value>, PathError> {
        let segments: Vec<&str> = path.as_ref().components().collect();
        self.set(&segments, value)
    }

    /// Inserts a top-level key, returning the old value if present.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(key.into(), value.into())
    }

    /// Removes a top-level key, keeping the order of the remaining keys.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.shift_remove(key)
    }

    /// Shallow overlay: every top-level key of `other` replaces the same key
    /// here wholesale, new keys are appended. Returns the merged container.
    pub fn merge(&self, other: &Container) -> Container {
        let mut result = self.clone();
        result.extend(other.clone());
        result
    }

    /// Returns an iterator over the top-level entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter()
    }

    /// Returns an iterator over the top-level keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    /// Returns an iterator over the top-level values in insertion order
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.values()
    }

    /// Serializes the container as a JSON object, keeping key order.
    pub fn to_json_string(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

// Builder pattern methods
impl Container {
    /// Builder method to set a top-level key and return self
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Builder method to set a nested container
    pub fn with_map(self, key: impl Into<String>, value: Container) -> Self {
        self.with(key, Value::Map(value))
    }
}

impl fmt::Display for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        let mut first = true;
        for (key, value) in self.iter() {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{key}: {value}")?;
            first = false;
        }
        write!(f, "}}")
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Container {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> Extend<(K, V)> for Container {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl IntoIterator for Container {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
