//! Field definitions loaded from configuration.

use serde::{Deserialize, Serialize};

use crate::{Result, container::Value};

use super::{CompositeField, Field, LeafField, default_null_values};

/// Serializable description of a field tree.
///
/// A schema with `fields` builds a [`CompositeField`], otherwise a
/// [`LeafField`]. Callbacks cannot be expressed here; attach them to the
/// built fields with the builder methods.
///
/// ```
/// use jsonfield::field::{Field, FieldSchema};
///
/// let schema = FieldSchema::from_json(
///     r#"{
///         "label": "Address",
///         "nullable": true,
///         "fields": [
///             { "label": "Street" },
///             { "label": "Location", "fields": [{ "label": "Latitude" }] }
///         ]
///     }"#,
/// )?;
///
/// let Field::Composite(address) = schema.build() else { unreachable!() };
/// assert!(address.is_nullable());
/// assert_eq!(address.fields()[1].path().as_str(), "address->location->latitude");
/// # Ok::<(), jsonfield::Error>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldSchema {
    pub label: String,
    /// Explicit attribute; derived from the label when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
    /// Child fields; present only for groups.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldSchema>>,
    pub nullable: bool,
    /// Extra values stored as null when nullable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub null_values: Option<Vec<Value>>,
    /// Groups only: commit all children in one write.
    pub fill_at_once: bool,
}

impl FieldSchema {
    pub fn leaf(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Default::default()
        }
    }

    pub fn group(label: impl Into<String>, fields: Vec<FieldSchema>) -> Self {
        Self {
            label: label.into(),
            fields: Some(fields),
            ..Default::default()
        }
    }

    /// Parses a schema from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serializes the schema to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn is_group(&self) -> bool {
        self.fields.is_some()
    }

    fn null_values(&self) -> Vec<Value> {
        self.null_values.clone().unwrap_or_else(default_null_values)
    }

    /// A null setting only overrides children when it was given explicitly.
    fn sets_null_policy(&self) -> bool {
        self.nullable || self.null_values.is_some()
    }

    /// Builds the field tree.
    ///
    /// `fill_at_once` is ignored on leaves.
    pub fn build(&self) -> Field {
        let Some(children) = &self.fields else {
            let leaf = match &self.attribute {
                Some(attribute) => LeafField::with_attribute(&self.label, attribute),
                None => LeafField::new(&self.label),
            };
            return leaf.nullable_with(self.nullable, self.null_values()).into();
        };

        let children = children.iter().map(FieldSchema::build).collect();
        let mut composite = match &self.attribute {
            Some(attribute) => CompositeField::with_attribute(&self.label, attribute, children),
            None => CompositeField::new(&self.label, children),
        };
        if self.sets_null_policy() {
            composite = composite.nullable_with(self.nullable, self.null_values());
        }
        if self.fill_at_once {
            composite = composite.fill_at_once();
        }
        composite.into()
    }
}
