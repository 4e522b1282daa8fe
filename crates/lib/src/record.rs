//! The record a field group reads from and writes to.
//!
//! Fields never own data. They resolve values out of a [`HostRecord`] and
//! write submitted values back into it. The record decides how attributes are
//! stored; the only thing fields require is that an attribute they write
//! through is declared with a structured [`Cast`].
//!
//! [`MemoryRecord`] is a plain in-memory implementation with declared casts
//! and change tracking.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{Result, container::Container, container::Value};

/// Declared storage type of a record attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cast {
    Array,
    Json,
    Object,
    Collection,
    Text,
    Int,
    Float,
    Bool,
}

impl Cast {
    /// Returns true for casts that store a nested map.
    pub fn is_structured(self) -> bool {
        matches!(
            self,
            Cast::Array | Cast::Json | Cast::Object | Cast::Collection
        )
    }
}

/// Attribute access on a record owned by the caller.
pub trait HostRecord {
    /// Current value of an attribute, or `None` if it was never set.
    fn attribute(&self, name: &str) -> Option<&Value>;

    /// Replaces an attribute value wholesale.
    fn set_attribute(&mut self, name: &str, value: Value);

    /// Declared cast of an attribute, if any.
    fn cast_of(&self, name: &str) -> Option<Cast>;

    /// Whether an attribute is declared as structured-map storage.
    fn is_structured(&self, name: &str) -> bool {
        self.cast_of(name).is_some_and(Cast::is_structured)
    }

    /// Whether an attribute differs from its last persisted value.
    fn is_dirty(&self, name: &str) -> bool;
}

/// In-memory [`HostRecord`].
///
/// Values given at construction count as the persisted state; any later
/// [`HostRecord::set_attribute`] that changes a value marks it dirty until
/// [`MemoryRecord::sync_original`] is called.
///
/// ```
/// use jsonfield::record::{Cast, HostRecord, MemoryRecord};
/// use jsonfield::container::{Container, Value};
///
/// let mut user = MemoryRecord::new()
///     .with_cast("address", Cast::Array)
///     .with_attribute("address", Container::new().with("street", "Main"));
///
/// assert!(user.is_structured("address"));
/// assert!(!user.is_dirty("address"));
///
/// user.set_attribute("address", Value::Null);
/// assert!(user.is_dirty("address"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryRecord {
    attributes: IndexMap<String, Value>,
    original: IndexMap<String, Value>,
    casts: IndexMap<String, Cast>,
}

impl MemoryRecord {
    /// Creates an empty record with no casts
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads persisted attributes from a JSON object.
    pub fn from_json(json: &str) -> Result<Self> {
        let attributes: Container = serde_json::from_str(json)?;
        let attributes: IndexMap<String, Value> = attributes.into_iter().collect();
        Ok(Self {
            original: attributes.clone(),
            attributes,
            casts: IndexMap::new(),
        })
    }

    /// Builder method to declare an attribute cast
    pub fn with_cast(mut self, name: impl Into<String>, cast: Cast) -> Self {
        self.casts.insert(name.into(), cast);
        self
    }

    /// Builder method to set a persisted attribute value
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let name = name.into();
        let value = value.into();
        self.original.insert(name.clone(), value.clone());
        self.attributes.insert(name, value);
        self
    }

    /// Names of all attributes that changed since the last sync.
    pub fn dirty(&self) -> Vec<&str> {
        self.attributes
            .keys()
            .filter(|name| self.is_dirty(name))
            .map(String::as_str)
            .collect()
    }

    /// Marks the current attribute values as persisted.
    pub fn sync_original(&mut self) {
        self.original = self.attributes.clone();
    }

    /// Returns an iterator over attributes in insertion order
    pub fn attributes(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.attributes.iter()
    }
}

impl HostRecord for MemoryRecord {
    fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    fn set_attribute(&mut self, name: &str, value: Value) {
        self.attributes.insert(name.to_string(), value);
    }

    fn cast_of(&self, name: &str) -> Option<Cast> {
        self.casts.get(name).copied()
    }

    fn is_dirty(&self, name: &str) -> bool {
        self.attributes.get(name) != self.original.get(name)
    }
}
