//! A single editable field bound to one key of a nested map.

use std::{fmt, sync::Arc};

use tracing::{debug, trace};

use crate::{
    Result,
    container::Value,
    path::{Path, PathBuf, PathError},
    record::HostRecord,
    request::Request,
};

use super::{
    FillCallback, FillContext, NullPolicy, ResolveCallback, ResolveContext, derive_attribute,
    empty_key, read_path, write_path,
};

/// A field bound to one key inside its parent's nested map.
///
/// On its own a leaf's path is just its attribute. Once placed inside a
/// [`CompositeField`](super::CompositeField) the path is rewritten to the
/// fully qualified `attribute->…->key` form.
#[derive(Clone)]
pub struct LeafField {
    label: String,
    attribute: String,
    path: PathBuf,
    null_policy: NullPolicy,
    filled_by_group: bool,
    fill_using: Option<FillCallback>,
    resolve_using: Option<ResolveCallback>,
}

impl LeafField {
    /// Creates a leaf whose key is derived from the label.
    pub fn new(label: impl Into<String>) -> Self {
        let label = label.into();
        let attribute = derive_attribute(&label);
        Self::with_attribute(label, attribute)
    }

    /// Creates a leaf with an explicit key.
    pub fn with_attribute(label: impl Into<String>, attribute: impl Into<String>) -> Self {
        let attribute = attribute.into();
        Self {
            label: label.into(),
            path: PathBuf::new().push(&attribute),
            attribute,
            null_policy: NullPolicy::default(),
            filled_by_group: false,
            fill_using: None,
            resolve_using: None,
        }
    }

    /// Replaces request lookup with a custom extraction.
    ///
    /// ```
    /// # use jsonfield::field::LeafField;
    /// # use jsonfield::container::Value;
    /// let street = LeafField::new("Street").fill_using(|ctx| {
    ///     let raw = ctx.request.value_at(ctx.request_attribute);
    ///     Value::from(format!("{raw} Foo"))
    /// });
    /// ```
    pub fn fill_using<F>(mut self, callback: F) -> Self
    where
        F: Fn(&FillContext<'_>) -> Value + Send + Sync + 'static,
    {
        self.fill_using = Some(Arc::new(callback));
        self
    }

    /// Transforms the stored value on resolve.
    pub fn resolve_using<F>(mut self, callback: F) -> Self
    where
        F: Fn(&ResolveContext<'_>) -> Value + Send + Sync + 'static,
    {
        self.resolve_using = Some(Arc::new(callback));
        self
    }

    /// Stores null for null and the empty string.
    pub fn nullable(self, enabled: bool) -> Self {
        self.nullable_with(enabled, super::default_null_values())
    }

    /// Stores null for null, the empty string and any of `null_values`.
    pub fn nullable_with<I, V>(mut self, enabled: bool, null_values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let null_values = null_values.into_iter().map(Into::into).collect();
        self.null_policy = NullPolicy::new(enabled, null_values);
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// The leaf's own key under its parent map.
    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    /// Fully qualified path; also the request key the leaf reads.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the map holding this leaf, `None` for a standalone leaf.
    pub fn parent_path(&self) -> Option<&Path> {
        self.path.parent()
    }

    pub fn null_policy(&self) -> &NullPolicy {
        &self.null_policy
    }

    pub fn is_nullable(&self) -> bool {
        self.null_policy.nullable
    }

    /// True when an enclosing fill-at-once group writes this leaf, which
    /// makes per-leaf fills inert.
    pub fn is_filled_by_group(&self) -> bool {
        self.filled_by_group
    }

    /// Reads the value at `path` out of `record`.
    ///
    /// Missing attributes, keys or intermediate maps resolve to null.
    pub fn resolve(&self, record: &dyn HostRecord, path: &Path) -> Value {
        let value = read_path(record, path);
        trace!(path = %path, found = !value.is_null(), "Resolved leaf field");

        match &self.resolve_using {
            Some(callback) => callback(&ResolveContext {
                value: &value,
                record,
                attribute: path,
            }),
            None => value,
        }
    }

    /// [`LeafField::resolve`] at the leaf's own path.
    pub fn resolve_value(&self, record: &dyn HostRecord) -> Value {
        self.resolve(record, &self.path)
    }

    /// The submitted value before null handling: the custom extraction's
    /// result, or the request value keyed by `path`.
    pub fn raw_value(&self, request: &Request, record: &dyn HostRecord, path: &Path) -> Value {
        match &self.fill_using {
            Some(callback) => callback(&FillContext {
                request,
                record,
                attribute: &self.attribute,
                request_attribute: path,
            }),
            None => request.value_at(path),
        }
    }

    /// Writes the submitted value for `path` into `record`.
    ///
    /// # Errors
    /// - [`FieldError::AttributeCast`](super::FieldError::AttributeCast) if the
    ///   attribute at the first path segment is not structured storage. The
    ///   record is left unchanged.
    /// - [`PathError::Malformed`](crate::path::PathError::Malformed) for an
    ///   empty path or an empty key. The record is left unchanged.
    pub fn fill_into(
        &self,
        request: &Request,
        record: &mut dyn HostRecord,
        path: &Path,
    ) -> Result<()> {
        if self.filled_by_group {
            trace!(path = %path, "Leaf is written by its group, skipping");
            return Ok(());
        }
        self.check_key()?;

        let raw = self.raw_value(request, record, path);
        let value = self.null_policy.apply(raw);

        debug!(path = %path, null = value.is_null(), "Filling leaf field");
        write_path(record, path, value)
    }

    /// [`LeafField::fill_into`] at the leaf's own path.
    pub fn fill(&self, request: &Request, record: &mut dyn HostRecord) -> Result<()> {
        self.fill_into(request, record, &self.path)
    }

    /// An empty key would collapse the leaf onto its parent's path.
    pub(crate) fn check_key(&self) -> std::result::Result<(), PathError> {
        if self.attribute.is_empty() {
            return Err(empty_key(&self.path, &self.label));
        }
        Ok(())
    }

    pub(crate) fn qualify(&mut self, base: &Path) {
        self.path = base.to_path_buf().push(&self.attribute);
    }

    pub(crate) fn set_null_policy(&mut self, policy: NullPolicy) {
        self.null_policy = policy;
    }

    pub(crate) fn mark_filled_by_group(&mut self) {
        self.filled_by_group = true;
    }
}

impl fmt::Debug for LeafField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LeafField")
            .field("label", &self.label)
            .field("attribute", &self.attribute)
            .field("path", &self.path)
            .field("null_policy", &self.null_policy)
            .field("filled_by_group", &self.filled_by_group)
            .field("fill_using", &self.fill_using.is_some())
            .field("resolve_using", &self.resolve_using.is_some())
            .finish()
    }
}
