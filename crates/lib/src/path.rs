//! Compound attribute paths.
//!
//! A path addresses one value inside a structured attribute. The first
//! segment names the record attribute itself, every following segment is a
//! key one map deeper. Segments are joined with [`DELIMITER`]:
//!
//! ```text
//! address->location->latitude
//! ^^^^^^^  ^^^^^^^^  ^^^^^^^^
//! column   map key   leaf key
//! ```
//!
//! The types follow the same borrowed/owned pattern as `std::path`:
//!
//! - [`Path`] - an unsized borrowed path (always behind a reference)
//! - [`PathBuf`] - an owned path that can be built up segment by segment
//!
//! # Usage
//!
//! ```rust
//! use jsonfield::path::{self, PathBuf};
//!
//! let parsed = PathBuf::parse("address->location->latitude")?;
//! assert_eq!(parsed.attribute(), Some("address"));
//! assert_eq!(parsed.rest(), vec!["location", "latitude"]);
//!
//! let built = PathBuf::new().push("address").push("location").push("latitude");
//! assert_eq!(built, parsed);
//!
//! assert_eq!(path::join(["a", "b"]), "a->b");
//! # Ok::<(), jsonfield::path::PathError>(())
//! ```

use std::{borrow::Borrow, fmt, ops::Deref, str::FromStr};

use thiserror::Error;

/// Separator between path segments.
pub const DELIMITER: &str = "->";

/// Error type for path validation failures.
#[non_exhaustive]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
    /// The path does not split into at least one non-empty segment.
    #[error("Malformed path '{path}': {reason}")]
    Malformed { path: String, reason: String },
}

impl PathError {
    /// Check if this error is a malformed path
    pub fn is_malformed(&self) -> bool {
        matches!(self, PathError::Malformed { .. })
    }

    /// Get the offending path string
    pub fn path(&self) -> &str {
        match self {
            PathError::Malformed { path, .. } => path,
        }
    }
}

impl From<PathError> for crate::Error {
    fn from(err: PathError) -> Self {
        crate::Error::Path(err)
    }
}

/// Splits a compound path into its segments.
///
/// Segments are opaque: no trimming or case folding is applied.
///
/// # Errors
/// Returns [`PathError::Malformed`] if the path is empty or contains an
/// empty segment (`"a->->b"`, `"->a"`, `"a->"`).
///
/// ```rust
/// # use jsonfield::path::split;
/// assert_eq!(split("address->street").unwrap(), vec!["address", "street"]);
/// assert!(split("").is_err());
/// ```
pub fn split(path: &str) -> Result<Vec<&str>, PathError> {
    if path.is_empty() {
        return Err(PathError::Malformed {
            path: String::new(),
            reason: "path has no segments".to_string(),
        });
    }

    let segments: Vec<&str> = path.split(DELIMITER).collect();
    if segments.iter().any(|segment| segment.is_empty()) {
        return Err(PathError::Malformed {
            path: path.to_string(),
            reason: "segments cannot be empty".to_string(),
        });
    }

    Ok(segments)
}

/// Joins segments back into a compound path. Inverse of [`split`].
///
/// Empty segments are skipped.
pub fn join<I, S>(segments: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut joined = String::new();
    for segment in segments {
        let segment = segment.as_ref();
        if segment.is_empty() {
            continue;
        }
        if !joined.is_empty() {
            joined.push_str(DELIMITER);
        }
        joined.push_str(segment);
    }
    joined
}

/// An owned, validated compound path.
///
/// `PathBuf` never holds an empty segment: [`PathBuf::parse`] rejects them
/// and [`PathBuf::push`] ignores them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PathBuf {
    inner: String,
}

/// A borrowed, validated compound path.
///
/// This type is unsized and must always be used behind a reference.
#[derive(Debug, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Path {
    inner: str,
}

impl PathBuf {
    /// Creates a new empty path.
    pub fn new() -> Self {
        Self {
            inner: String::new(),
        }
    }

    /// Parses and validates a compound path string.
    pub fn parse(path: &str) -> Result<Self, PathError> {
        split(path)?;
        Ok(Self {
            inner: path.to_string(),
        })
    }

    /// Builds a path from individual segments, skipping empty ones.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            inner: join(segments),
        }
    }

    /// Appends a single segment.
    ///
    /// The segment is taken verbatim, so a segment containing the delimiter
    /// adds several levels at once. Empty segments are ignored.
    pub fn push(mut self, segment: impl AsRef<str>) -> Self {
        let segment = segment.as_ref();
        if segment.is_empty() {
            return self;
        }
        if !self.inner.is_empty() {
            self.inner.push_str(DELIMITER);
        }
        self.inner.push_str(segment);
        self
    }

    /// Joins this path with another path.
    pub fn join(mut self, other: impl AsRef<Path>) -> Self {
        let other = other.as_ref();
        if self.inner.is_empty() {
            self.inner = other.inner.to_string();
        } else if !other.inner.is_empty() {
            self.inner.push_str(DELIMITER);
            self.inner.push_str(&other.inner);
        }
        self
    }

    /// Consumes the path, returning the underlying string.
    pub fn into_string(self) -> String {
        self.inner
    }
}

impl Path {
    /// Validates a string as a path without copying it.
    pub fn new(path: &str) -> Result<&Path, PathError> {
        split(path)?;
        Ok(Path::from_inner(path))
    }

    fn from_inner(inner: &str) -> &Path {
        // SAFETY: Path is repr(transparent) over str
        unsafe { &*(inner as *const str as *const Path) }
    }

    /// Returns an iterator over the path segments.
    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.inner
            .split(DELIMITER)
            .filter(|segment| !segment.is_empty())
    }

    /// Returns the number of segments in the path.
    pub fn len(&self) -> usize {
        self.components().count()
    }

    /// Returns `true` if the path has no segments.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// The record attribute this path points into (the first segment).
    pub fn attribute(&self) -> Option<&str> {
        self.components().next()
    }

    /// Segments below the record attribute.
    pub fn rest(&self) -> Vec<&str> {
        self.components().skip(1).collect()
    }

    /// Returns the last segment, or `None` if empty.
    pub fn last(&self) -> Option<&str> {
        self.inner
            .rsplit(DELIMITER)
            .find(|segment| !segment.is_empty())
    }

    /// Returns the parent path, or `None` for a single-segment path.
    pub fn parent(&self) -> Option<&Path> {
        self.inner
            .rfind(DELIMITER)
            .map(|at| Path::from_inner(&self.inner[..at]))
    }

    /// Returns `true` if `other` is this path or one of its ancestors.
    pub fn starts_with(&self, other: impl AsRef<Path>) -> bool {
        let mut mine = self.components();
        other
            .as_ref()
            .components()
            .all(|segment| mine.next() == Some(segment))
    }

    /// Returns the path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Converts this `Path` to an owned `PathBuf`.
    pub fn to_path_buf(&self) -> PathBuf {
        PathBuf {
            inner: self.inner.to_string(),
        }
    }
}

impl Deref for PathBuf {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        Path::from_inner(&self.inner)
    }
}

impl AsRef<Path> for PathBuf {
    fn as_ref(&self) -> &Path {
        self
    }
}

impl AsRef<Path> for Path {
    fn as_ref(&self) -> &Path {
        self
    }
}

impl AsRef<str> for Path {
    fn as_ref(&self) -> &str {
        &self.inner
    }
}

impl AsRef<str> for PathBuf {
    fn as_ref(&self) -> &str {
        &self.inner
    }
}

impl Borrow<Path> for PathBuf {
    fn borrow(&self) -> &Path {
        self
    }
}

impl ToOwned for Path {
    type Owned = PathBuf;

    fn to_owned(&self) -> PathBuf {
        self.to_path_buf()
    }
}

impl FromStr for PathBuf {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for PathBuf {
    type Error = PathError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl From<&Path> for PathBuf {
    fn from(path: &Path) -> Self {
        path.to_path_buf()
    }
}

impl fmt::Display for PathBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&**self, f)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.inner.is_empty() {
            write!(f, "(empty path)")
        } else {
            write!(f, "{}", &self.inner)
        }
    }
}

/// Builds a [`PathBuf`] from segments.
///
/// - `path!()` - empty path
/// - `path!("address", "street")` - one segment per argument
/// - `path!(base, "street")` - mix runtime values and literals
///
/// ```rust
/// # use jsonfield::path;
/// let p = path!("address", "location", "latitude");
/// assert_eq!(p.as_str(), "address->location->latitude");
/// ```
#[macro_export]
macro_rules! path {
    () => {
        $crate::path::PathBuf::new()
    };

    ($($segment:expr),+ $(,)?) => {{
        $crate::path::PathBuf::new()$(.push($segment.to_string()))+
    }};
}
