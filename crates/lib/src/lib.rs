//!
//! jsonfield: editable fields bound to keys inside a structured record attribute.
//!
//! A record attribute cast as structured storage holds a nested map. This
//! library lets each key of that map be edited as its own form field.
//!
//! ## Core Concepts
//!
//! * **Paths (`path::Path`)**: Compound `attribute->key->subkey` addresses. They double
//!   as request keys and display names.
//! * **Containers (`container::Container`)**: The in-memory nested map of a structured
//!   attribute, holding `container::Value`s.
//! * **Records (`record::HostRecord`)**: The host object that owns attributes and
//!   declares which of them are structured. `record::MemoryRecord` is an in-memory
//!   implementation.
//! * **Requests (`request::Request`)**: The submitted values of one inbound request.
//! * **Fields (`field::LeafField`, `field::CompositeField`)**: Leaves read and write
//!   one key; composites group children under one attribute and can commit the
//!   whole group at once.

pub mod container;
pub mod field;
pub mod path;
pub mod record;
pub mod request;

pub use container::{Container, Value};
pub use field::{CompositeField, Field, FieldSchema, LeafField};
pub use path::{Path, PathBuf};
pub use record::{HostRecord, MemoryRecord};
pub use request::Request;

/// Result type used throughout the jsonfield library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the jsonfield library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Structured path errors from the path module
    #[error(transparent)]
    Path(path::PathError),

    /// Structured fill errors from the field module
    #[error(transparent)]
    Field(field::FieldError),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Path(_) => "path",
            Error::Field(_) => "field",
            Error::Serialize(_) => "serialize",
        }
    }

    /// Check if this error is a malformed path.
    pub fn is_malformed_path(&self) -> bool {
        match self {
            Error::Path(path_err) => path_err.is_malformed(),
            _ => false,
        }
    }

    /// Check if this error is a missing structured cast.
    pub fn is_attribute_cast(&self) -> bool {
        match self {
            Error::Field(field_err) => field_err.is_attribute_cast(),
            _ => false,
        }
    }

    /// Check if this error is a serialization failure.
    pub fn is_serialization_error(&self) -> bool {
        matches!(self, Error::Serialize(_))
    }
}
