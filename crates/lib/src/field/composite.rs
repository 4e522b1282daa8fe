//! Field groups presented as one structured attribute.

use std::{fmt, sync::Arc};

use tracing::{debug, trace};

use crate::{
    Result,
    container::{Container, Value},
    path::{Path, PathBuf, PathError},
    record::HostRecord,
    request::Request,
};

use super::{
    Field, FieldEntry, GroupCallback, GroupContext, NullPolicy, ResolvedField, default_null_values,
    derive_attribute, empty_key, ensure_structured, merge_path, missing_attribute, read_path,
    write_path,
};

/// How a composite writes its children.
///
/// Picked once while the field is defined.
#[derive(Clone, Default)]
pub enum FillMode {
    /// Every leaf writes its own key.
    #[default]
    Independent,
    /// One commit merges every child's raw submitted value.
    GroupedDefault,
    /// One commit merges whatever the transform returns.
    GroupedCustom(GroupCallback),
}

impl FillMode {
    pub fn is_grouped(&self) -> bool {
        !matches!(self, FillMode::Independent)
    }
}

impl fmt::Debug for FillMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FillMode::Independent => write!(f, "Independent"),
            FillMode::GroupedDefault => write!(f, "GroupedDefault"),
            FillMode::GroupedCustom(_) => write!(f, "GroupedCustom(..)"),
        }
    }
}

/// A group of fields mapped onto one structured attribute.
///
/// Children keep their order. Building the composite rewrites every
/// descendant's path to `attribute->…->key`, so nesting composites nests the
/// maps they write.
///
/// # Write modes
///
/// By default each leaf fills its own key. [`CompositeField::fill_at_once`]
/// switches to one grouped commit per request: the raw submitted value of
/// every child is collected into a map, optionally transformed, and merged
/// into the container in a single write.
///
/// ```
/// use jsonfield::container::{Container, Value};
/// use jsonfield::field::{CompositeField, LeafField};
/// use jsonfield::record::{Cast, HostRecord, MemoryRecord};
/// use jsonfield::request::Request;
///
/// let address = CompositeField::new(
///     "Address",
///     vec![LeafField::new("Street").into(), LeafField::new("City").into()],
/// )
/// .fill_at_once();
///
/// let mut user = MemoryRecord::new().with_cast("address", Cast::Array);
/// let request = Request::new()
///     .with("address->street", "Main")
///     .with("address->city", "Springfield");
///
/// address.fill(&request, &mut user)?;
///
/// let expected = Container::new().with("street", "Main").with("city", "Springfield");
/// assert_eq!(user.attribute("address"), Some(&Value::Map(expected)));
/// # Ok::<(), jsonfield::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct CompositeField {
    label: String,
    attribute: String,
    path: PathBuf,
    fields: Vec<Field>,
    null_policy: NullPolicy,
    mode: FillMode,
    filled_by_group: bool,
}

impl CompositeField {
    /// Creates a group whose attribute is derived from the label.
    pub fn new(label: impl Into<String>, fields: Vec<Field>) -> Self {
        let label = label.into();
        let attribute = derive_attribute(&label);
        Self::with_attribute(label, attribute, fields)
    }

    /// Creates a group with an explicit attribute.
    pub fn with_attribute(
        label: impl Into<String>,
        attribute: impl Into<String>,
        fields: Vec<Field>,
    ) -> Self {
        let attribute = attribute.into();
        let mut composite = Self {
            label: label.into(),
            path: PathBuf::new(),
            attribute,
            fields,
            null_policy: NullPolicy::default(),
            mode: FillMode::Independent,
            filled_by_group: false,
        };
        composite.qualify(&PathBuf::new());
        composite
    }

    /// Makes every descendant leaf store null for null and the empty string.
    pub fn nullable(self, enabled: bool) -> Self {
        self.nullable_with(enabled, default_null_values())
    }

    /// Makes every descendant leaf store null for null, the empty string and
    /// any of `null_values`.
    ///
    /// ```
    /// # use jsonfield::field::{CompositeField, LeafField};
    /// # use jsonfield::container::Value;
    /// let address = CompositeField::new("Address", vec![LeafField::new("Street").into()])
    ///     .nullable_with(true, [Value::Int(0), Value::from("_")]);
    /// ```
    pub fn nullable_with<I, V>(mut self, enabled: bool, null_values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let null_values = null_values.into_iter().map(Into::into).collect();
        self.cascade_null_policy(NullPolicy::new(enabled, null_values));
        self
    }

    /// Commits the whole group at once, merging each child's raw submitted
    /// value under the child's key.
    pub fn fill_at_once(self) -> Self {
        self.with_mode(FillMode::GroupedDefault)
    }

    /// Commits the whole group at once, merging what `callback` returns.
    ///
    /// The callback sees the collected child values (custom leaf extractions
    /// already applied). Its result replaces the group's value; a blank
    /// result is skipped unless the group is nullable.
    pub fn fill_at_once_using<F>(self, callback: F) -> Self
    where
        F: Fn(&GroupContext<'_>) -> Value + Send + Sync + 'static,
    {
        self.with_mode(FillMode::GroupedCustom(Arc::new(callback)))
    }

    fn with_mode(mut self, mode: FillMode) -> Self {
        self.mode = mode;
        for field in &mut self.fields {
            field.mark_filled_by_group();
        }
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// The group's own key: the record attribute at the top level, a map
    /// key when nested.
    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    /// Fully qualified path of the map this group writes.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Direct children in definition order.
    pub fn children(&self) -> &[Field] {
        &self.fields
    }

    pub fn mode(&self) -> &FillMode {
        &self.mode
    }

    pub fn null_policy(&self) -> &NullPolicy {
        &self.null_policy
    }

    pub fn is_nullable(&self) -> bool {
        self.null_policy.nullable
    }

    /// The exposed field list: every leaf in order with nested groups
    /// flattened, followed by a commit entry when the group is filled at
    /// once.
    pub fn fields(&self) -> Vec<FieldEntry<'_>> {
        let mut entries = Vec::new();
        self.push_entries(&mut entries);
        entries
    }

    fn push_entries<'a>(&'a self, entries: &mut Vec<FieldEntry<'a>>) {
        for field in &self.fields {
            match field {
                Field::Leaf(leaf) => entries.push(FieldEntry::Leaf(leaf)),
                Field::Composite(composite) => composite.push_entries(entries),
            }
        }
        if self.mode.is_grouped() && !self.filled_by_group {
            entries.push(FieldEntry::Commit(self));
        }
    }

    /// Resolves every leaf against `record`.
    pub fn resolve(&self, record: &dyn HostRecord) -> Vec<ResolvedField> {
        self.fields()
            .into_iter()
            .filter_map(|entry| match entry {
                FieldEntry::Leaf(leaf) => Some(ResolvedField {
                    label: leaf.label().to_string(),
                    attribute: leaf.path().to_string(),
                    value: leaf.resolve_value(record),
                }),
                FieldEntry::Commit(_) => None,
            })
            .collect()
    }

    /// Current value of the map this group writes, null when absent.
    pub fn resolve_value(&self, record: &dyn HostRecord) -> Value {
        read_path(record, &self.path)
    }

    /// Fills the whole group from one request.
    ///
    /// Independent groups fill leaf by leaf, nested groups in their own
    /// mode. Grouped ones commit once.
    ///
    /// # Errors
    /// [`PathError::Malformed`] if any descendant has an empty key, raised
    /// before anything is written.
    pub fn fill(&self, request: &Request, record: &mut dyn HostRecord) -> Result<()> {
        if self.filled_by_group {
            trace!(path = %self.path, "Group is written by its parent, skipping");
            return Ok(());
        }
        self.check_keys()?;

        if self.mode.is_grouped() {
            return self.commit(request, record);
        }

        for field in &self.fields {
            field.fill(request, record)?;
        }
        Ok(())
    }

    /// Raw submitted values of every child, keyed by child key.
    ///
    /// Leaves contribute their custom extraction or request value, without
    /// null handling. Nested groups contribute their own collected map, or
    /// their transform's output when they have one.
    pub fn collect_values(&self, request: &Request, record: &dyn HostRecord) -> Container {
        let mut values = Container::new();
        for field in &self.fields {
            let value = match field {
                Field::Leaf(leaf) => leaf.raw_value(request, record, leaf.path()),
                Field::Composite(composite) => {
                    composite.group_value(request, record, composite.path())
                }
            };
            values.insert(field.attribute(), value);
        }
        values
    }

    fn group_value(&self, request: &Request, record: &dyn HostRecord, path: &Path) -> Value {
        let values = self.collect_values(request, record);
        match &self.mode {
            FillMode::GroupedCustom(callback) => callback(&GroupContext {
                request,
                values: &values,
                record,
                attribute: &self.attribute,
                request_attribute: path,
            }),
            FillMode::Independent | FillMode::GroupedDefault => Value::Map(values),
        }
    }

    /// [`CompositeField::commit_into`] at the group's own path.
    pub fn commit(&self, request: &Request, record: &mut dyn HostRecord) -> Result<()> {
        self.commit_into(request, record, &self.path)
    }

    /// Writes the whole group in one step.
    ///
    /// Without a transform the collected map is shallow-merged into the map
    /// at `path`. A transform's result replaces the value at `path`
    /// wholesale. A blank result leaves the record untouched unless the
    /// group is nullable, in which case null is written at `path`.
    ///
    /// # Errors
    /// - [`FieldError::AttributeCast`](super::FieldError::AttributeCast) if
    ///   the attribute is not structured storage.
    /// - [`PathError::Malformed`] if the group or a descendant has an empty
    ///   key.
    ///
    /// Both are raised before any write.
    pub fn commit_into(
        &self,
        request: &Request,
        record: &mut dyn HostRecord,
        path: &Path,
    ) -> Result<()> {
        let attribute = path.attribute().ok_or_else(|| missing_attribute(path))?;
        self.check_keys()?;
        let value = self.null_policy.apply(self.group_value(request, record, path));

        if value.is_blank() && !self.null_policy.nullable {
            debug!(path = %path, "Group produced no value, leaving attribute untouched");
            return Ok(());
        }

        debug!(path = %path, attribute, mode = ?self.mode, "Committing field group");
        match (&self.mode, value) {
            (FillMode::GroupedCustom(_), value) if !value.is_blank() => {
                ensure_structured(record, attribute)?;
                write_path(record, path, value)
            }
            (_, Value::Map(submap)) if !submap.is_empty() => merge_path(record, path, &submap),
            (_, value) => {
                ensure_structured(record, attribute)?;
                let value = if value.is_blank() { Value::Null } else { value };
                write_path(record, path, value)
            }
        }
    }

    /// Rejects the group when it or any descendant has an empty key.
    pub fn check_keys(&self) -> std::result::Result<(), PathError> {
        if self.attribute.is_empty() {
            return Err(empty_key(&self.path, &self.label));
        }
        for field in &self.fields {
            match field {
                Field::Leaf(leaf) => leaf.check_key()?,
                Field::Composite(composite) => composite.check_keys()?,
            }
        }
        Ok(())
    }

    pub(crate) fn qualify(&mut self, base: &Path) {
        self.path = base.to_path_buf().push(&self.attribute);
        for field in &mut self.fields {
            field.qualify(&self.path);
        }
    }

    pub(crate) fn cascade_null_policy(&mut self, policy: NullPolicy) {
        for field in &mut self.fields {
            field.apply_null_policy(&policy);
        }
        self.null_policy = policy;
    }

    pub(crate) fn mark_filled_by_group(&mut self) {
        self.filled_by_group = true;
        for field in &mut self.fields {
            field.mark_filled_by_group();
        }
    }
}
