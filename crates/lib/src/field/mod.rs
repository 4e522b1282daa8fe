//! Fields bound to paths inside a structured attribute.
//!
//! A [`CompositeField`] groups child fields and maps them onto one record
//! attribute. Each [`LeafField`] is bound to one key inside the attribute's
//! nested map; its fully qualified [`Path`] is computed when the enclosing
//! composites are built, so resolving and filling never inspect the tree.
//!
//! ```
//! use jsonfield::field::{CompositeField, LeafField};
//! use jsonfield::record::{Cast, MemoryRecord};
//! use jsonfield::request::Request;
//!
//! let address = CompositeField::new(
//!     "Address",
//!     vec![
//!         LeafField::new("Street").into(),
//!         CompositeField::new(
//!             "Location",
//!             vec![LeafField::new("Latitude").into(), LeafField::new("Longitude").into()],
//!         )
//!         .into(),
//!     ],
//! );
//!
//! let paths: Vec<String> = address.fields().iter().map(|f| f.path().to_string()).collect();
//! assert_eq!(
//!     paths,
//!     ["address->street", "address->location->latitude", "address->location->longitude"]
//! );
//!
//! let mut user = MemoryRecord::new().with_cast("address", Cast::Array);
//! let request = Request::new().with("address->location->latitude", 52.1);
//! address.fill(&request, &mut user)?;
//! # Ok::<(), jsonfield::Error>(())
//! ```

use std::sync::Arc;

use convert_case::{Boundary, Converter, Pattern};
use serde::Serialize;
use tracing::warn;

use crate::{
    Result,
    container::{Container, Value},
    path::{Path, PathError},
    record::HostRecord,
    request::Request,
};

pub mod composite;
pub mod errors;
pub mod leaf;
pub mod schema;

pub use composite::{CompositeField, FillMode};
pub use errors::FieldError;
pub use leaf::LeafField;
pub use schema::FieldSchema;

/// Arguments handed to a leaf's custom value extraction.
pub struct FillContext<'a> {
    pub request: &'a Request,
    pub record: &'a dyn HostRecord,
    /// The leaf's own key under its parent map.
    pub attribute: &'a str,
    /// The leaf's fully qualified path, also its request key.
    pub request_attribute: &'a Path,
}

/// Arguments handed to a leaf's display transform.
pub struct ResolveContext<'a> {
    /// The value stored at the leaf's path (null when absent).
    pub value: &'a Value,
    pub record: &'a dyn HostRecord,
    pub attribute: &'a Path,
}

/// Arguments handed to a group transform in fill-at-once mode.
pub struct GroupContext<'a> {
    pub request: &'a Request,
    /// Raw submitted values of every child, keyed by child segment.
    pub values: &'a Container,
    pub record: &'a dyn HostRecord,
    /// The composite's own attribute segment.
    pub attribute: &'a str,
    /// The composite's fully qualified path.
    pub request_attribute: &'a Path,
}

/// Custom extraction of a leaf's submitted value.
pub type FillCallback = Arc<dyn Fn(&FillContext<'_>) -> Value + Send + Sync>;

/// Transform applied to a leaf's resolved value.
pub type ResolveCallback = Arc<dyn Fn(&ResolveContext<'_>) -> Value + Send + Sync>;

/// Transform computing what a group commit merges into the container.
pub type GroupCallback = Arc<dyn Fn(&GroupContext<'_>) -> Value + Send + Sync>;

/// Attribute name used when none is given: the label lowercased, with every
/// space replaced by `_`. No other word boundaries are recognised.
///
/// ```
/// # use jsonfield::field::derive_attribute;
/// assert_eq!(derive_attribute("Address"), "address");
/// assert_eq!(derive_attribute("Street Name"), "street_name");
/// assert_eq!(derive_attribute("Address Line2"), "address_line2");
/// assert_eq!(derive_attribute("streetName"), "streetname");
/// assert_eq!(derive_attribute("E-Mail"), "e-mail");
/// ```
pub fn derive_attribute(label: &str) -> String {
    Converter::new()
        .set_boundaries(&[Boundary::Space])
        .set_patterns(&[Pattern::Lowercase])
        .set_delimiter("_")
        .convert(label)
}

/// Values that read as null once a field is nullable: just the empty string.
pub fn default_null_values() -> Vec<Value> {
    vec![Value::from("")]
}

/// When a submitted value is stored as null.
#[derive(Debug, Clone, PartialEq)]
pub struct NullPolicy {
    pub nullable: bool,
    pub null_values: Vec<Value>,
}

impl NullPolicy {
    pub fn new(nullable: bool, null_values: Vec<Value>) -> Self {
        Self {
            nullable,
            null_values,
        }
    }

    /// Returns true if `value` must be stored as null.
    ///
    /// Never true unless the policy is nullable. Null and the empty string
    /// always qualify; configured sentinels match by [`Value::loose_eq`].
    pub fn is_null_value(&self, value: &Value) -> bool {
        if !self.nullable {
            return false;
        }
        matches!(value, Value::Null)
            || *value == ""
            || self
                .null_values
                .iter()
                .any(|sentinel| sentinel.loose_eq(value))
    }

    /// Maps sentinel values to null, everything else passes through.
    pub fn apply(&self, value: Value) -> Value {
        if self.is_null_value(&value) {
            Value::Null
        } else {
            value
        }
    }
}

impl Default for NullPolicy {
    fn default() -> Self {
        Self::new(false, default_null_values())
    }
}

/// A field definition: a leaf bound to one key, or a nested group.
#[derive(Debug, Clone)]
pub enum Field {
    Leaf(LeafField),
    Composite(CompositeField),
}

impl Field {
    pub fn label(&self) -> &str {
        match self {
            Field::Leaf(leaf) => leaf.label(),
            Field::Composite(composite) => composite.label(),
        }
    }

    /// The field's own key under its parent.
    pub fn attribute(&self) -> &str {
        match self {
            Field::Leaf(leaf) => leaf.attribute(),
            Field::Composite(composite) => composite.attribute(),
        }
    }

    /// The field's fully qualified path.
    pub fn path(&self) -> &Path {
        match self {
            Field::Leaf(leaf) => leaf.path(),
            Field::Composite(composite) => composite.path(),
        }
    }

    /// Fills the field from `request` using its own mode.
    pub fn fill(&self, request: &Request, record: &mut dyn HostRecord) -> Result<()> {
        match self {
            Field::Leaf(leaf) => leaf.fill(request, record),
            Field::Composite(composite) => composite.fill(request, record),
        }
    }

    /// Re-roots the field under `base`.
    pub(crate) fn qualify(&mut self, base: &Path) {
        match self {
            Field::Leaf(leaf) => leaf.qualify(base),
            Field::Composite(composite) => composite.qualify(base),
        }
    }

    pub(crate) fn apply_null_policy(&mut self, policy: &NullPolicy) {
        match self {
            Field::Leaf(leaf) => leaf.set_null_policy(policy.clone()),
            Field::Composite(composite) => composite.cascade_null_policy(policy.clone()),
        }
    }

    pub(crate) fn mark_filled_by_group(&mut self) {
        match self {
            Field::Leaf(leaf) => leaf.mark_filled_by_group(),
            Field::Composite(composite) => composite.mark_filled_by_group(),
        }
    }
}

impl From<LeafField> for Field {
    fn from(leaf: LeafField) -> Self {
        Field::Leaf(leaf)
    }
}

impl From<CompositeField> for Field {
    fn from(composite: CompositeField) -> Self {
        Field::Composite(composite)
    }
}

/// One entry of a composite's exposed field list.
///
/// Grouped composites expose a trailing [`FieldEntry::Commit`] that stands
/// for "write the whole group".
#[derive(Debug, Clone, Copy)]
pub enum FieldEntry<'a> {
    Leaf(&'a LeafField),
    Commit(&'a CompositeField),
}

impl<'a> FieldEntry<'a> {
    pub fn label(&self) -> &'a str {
        match self {
            FieldEntry::Leaf(leaf) => leaf.label(),
            FieldEntry::Commit(composite) => composite.label(),
        }
    }

    pub fn path(&self) -> &'a Path {
        match self {
            FieldEntry::Leaf(leaf) => leaf.path(),
            FieldEntry::Commit(composite) => composite.path(),
        }
    }

    pub fn is_commit(&self) -> bool {
        matches!(self, FieldEntry::Commit(_))
    }

    /// Current value at the entry's path.
    pub fn resolve(&self, record: &dyn HostRecord) -> Value {
        match self {
            FieldEntry::Leaf(leaf) => leaf.resolve_value(record),
            FieldEntry::Commit(composite) => composite.resolve_value(record),
        }
    }

    /// Fills the entry at an explicit path.
    pub fn fill_into(
        &self,
        request: &Request,
        record: &mut dyn HostRecord,
        path: &Path,
    ) -> Result<()> {
        match self {
            FieldEntry::Leaf(leaf) => leaf.fill_into(request, record, path),
            FieldEntry::Commit(composite) => composite.commit_into(request, record, path),
        }
    }

    /// Fills the entry at its own path.
    pub fn fill(&self, request: &Request, record: &mut dyn HostRecord) -> Result<()> {
        self.fill_into(request, record, self.path())
    }
}

/// Display metadata for one resolved leaf.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedField {
    pub label: String,
    /// Fully qualified path, usable as the request key.
    pub attribute: String,
    pub value: Value,
}

fn missing_attribute(path: &Path) -> PathError {
    PathError::Malformed {
        path: path.as_str().to_string(),
        reason: "path has no segments".to_string(),
    }
}

/// A field key that would vanish from its qualified path.
fn empty_key(path: &Path, label: &str) -> PathError {
    PathError::Malformed {
        path: path.as_str().to_string(),
        reason: format!("field [{label}] has an empty key"),
    }
}

/// Fails with [`FieldError::AttributeCast`] unless `attribute` is declared
/// as structured-map storage.
fn ensure_structured(record: &dyn HostRecord, attribute: &str) -> Result<()> {
    if record.is_structured(attribute) {
        return Ok(());
    }
    warn!(attribute, "Rejected fill: attribute is not cast as structured storage");
    Err(FieldError::AttributeCast {
        attribute: attribute.to_string(),
    }
    .into())
}

/// Current value at `path`, null when any part of it is missing.
fn read_path(record: &dyn HostRecord, path: &Path) -> Value {
    let Some(current) = path.attribute().and_then(|name| record.attribute(name)) else {
        return Value::Null;
    };

    let rest = path.rest();
    if rest.is_empty() {
        return current.clone();
    }

    current
        .as_map()
        .and_then(|map| map.get(&rest))
        .cloned()
        .unwrap_or_default()
}

/// The attribute's current container, or an empty one.
fn load_container(record: &dyn HostRecord, attribute: &str) -> Container {
    record
        .attribute(attribute)
        .and_then(Value::as_map)
        .cloned()
        .unwrap_or_default()
}

/// Stores `value` at `path` and writes the attribute back wholesale.
///
/// A single-segment path is a plain attribute and is assigned directly.
/// Deeper paths require structured storage; the check runs before anything
/// is modified.
fn write_path(record: &mut dyn HostRecord, path: &Path, value: Value) -> Result<()> {
    let attribute = path.attribute().ok_or_else(|| missing_attribute(path))?;
    let rest = path.rest();

    if rest.is_empty() {
        record.set_attribute(attribute, value);
        return Ok(());
    }

    ensure_structured(record, attribute)?;

    let mut container = load_container(record, attribute);
    container.set(&rest, value)?;
    record.set_attribute(attribute, Value::Map(container));
    Ok(())
}

/// Shallow-merges `submap` into the map at `path`.
fn merge_path(record: &mut dyn HostRecord, path: &Path, submap: &Container) -> Result<()> {
    let attribute = path.attribute().ok_or_else(|| missing_attribute(path))?;
    ensure_structured(record, attribute)?;

    let container = load_container(record, attribute);
    let rest = path.rest();

    let merged = if rest.is_empty() {
        container.merge(submap)
    } else {
        let current = container
            .get(&rest)
            .and_then(Value::as_map)
            .cloned()
            .unwrap_or_default();
        let mut container = container;
        container.set(&rest, current.merge(submap))?;
        container
    };

    record.set_attribute(attribute, Value::Map(merged));
    Ok(())
}
