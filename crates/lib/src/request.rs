//! Submitted form values.

use indexmap::IndexMap;

use crate::{Result, container::Container, container::Value, path::Path};

/// The value bag of one inbound request.
///
/// Keys are full compound paths for fields inside a structured attribute
/// (`address->street`) and plain attribute names for everything else.
/// Missing keys read as [`Value::Null`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Request {
    values: IndexMap<String, Value>,
}

impl Request {
    /// Creates an empty request
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a flat JSON object of submitted values.
    ///
    /// ```
    /// # use jsonfield::request::Request;
    /// let request = Request::from_json(r#"{"address->street": "Main"}"#)?;
    /// assert_eq!(request.value("address->street"), "Main");
    /// assert!(request.value("address->city").is_null());
    /// # Ok::<(), jsonfield::Error>(())
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        let values: Container = serde_json::from_str(json)?;
        Ok(values.into_iter().collect())
    }

    /// Builder method to add a submitted value
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Adds or replaces a submitted value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    /// Returns the submitted value, or `None` if the key was not sent.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Returns the submitted value, or null if the key was not sent.
    pub fn value(&self, key: &str) -> Value {
        self.get(key).cloned().unwrap_or_default()
    }

    /// Returns the value submitted under a compound path.
    pub fn value_at(&self, path: impl AsRef<Path>) -> Value {
        self.value(path.as_ref().as_str())
    }

    /// Returns true if the key was sent, even with a null value
    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Returns the number of submitted keys
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if nothing was submitted
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns an iterator over submitted keys and values in order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Request {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}
