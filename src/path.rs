//! Key paths locating a value inside the validated input.
//!
//! Every error carries a [`KeyPath`] from the root of the input to the value
//! that failed. Segments are either object keys or array positions.

use std::fmt::{self, Display};

use crate::value::Value;

/// One step of a [`KeyPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// An object key (e.g. `user`, `email`)
    Key(String),
    /// An array position (e.g. `[0]`, `[42]`)
    Index(usize),
}

impl PathSegment {
    pub fn key(name: impl Into<String>) -> Self {
        PathSegment::Key(name.into())
    }

    pub fn index(idx: usize) -> Self {
        PathSegment::Index(idx)
    }

    /// The segment as a value: keys become strings, positions numbers.
    pub fn to_value(&self) -> Value {
        match self {
            PathSegment::Key(name) => Value::String(name.clone()),
            PathSegment::Index(idx) => Value::from(*idx),
        }
    }
}

impl Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(name) => write!(f, "{}", name),
            PathSegment::Index(idx) => write!(f, "{}", idx),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(name: &str) -> Self {
        PathSegment::Key(name.to_string())
    }
}

impl From<usize> for PathSegment {
    fn from(idx: usize) -> Self {
        PathSegment::Index(idx)
    }
}

/// A path from the validated root to a nested value.
///
/// # Example
///
/// ```rust
/// use valuate::KeyPath;
///
/// let path = KeyPath::root()
///     .push_key("users")
///     .push_index(0)
///     .push_key("email");
///
/// assert_eq!(path.to_string(), "users[0].email");
/// assert_eq!(path.dotted(), "users.0.email");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct KeyPath {
    segments: Vec<PathSegment>,
}

impl KeyPath {
    /// The empty path of the validated root.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn from_segments(segments: impl IntoIterator<Item = PathSegment>) -> Self {
        Self {
            segments: segments.into_iter().collect(),
        }
    }

    /// Returns a new path with `segment` appended.
    pub fn push(&self, segment: PathSegment) -> Self {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.extend(self.segments.iter().cloned());
        segments.push(segment);
        Self { segments }
    }

    pub fn push_key(&self, name: impl Into<String>) -> Self {
        self.push(PathSegment::Key(name.into()))
    }

    pub fn push_index(&self, index: usize) -> Self {
        self.push(PathSegment::Index(index))
    }

    /// Returns a new path with every key of `keys` appended.
    pub fn concat<S: AsRef<str>>(&self, keys: &[S]) -> Self {
        let mut path = self.clone();
        path.segments
            .extend(keys.iter().map(|k| PathSegment::Key(k.as_ref().to_string())));
        path
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> impl Iterator<Item = &PathSegment> {
        self.segments.iter()
    }

    pub fn last(&self) -> Option<&PathSegment> {
        self.segments.last()
    }

    /// Segments joined with `.`, positions included as plain numbers.
    pub fn dotted(&self) -> String {
        self.segments
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(".")
    }

    /// The path as an array value.
    pub fn to_value(&self) -> Value {
        Value::Array(self.segments.iter().map(PathSegment::to_value).collect())
    }
}

impl Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Key(name) => {
                    if i > 0 {
                        write!(f, ".")?;
                    }
                    write!(f, "{}", name)?;
                }
                PathSegment::Index(idx) => write!(f, "[{}]", idx)?,
            }
        }
        Ok(())
    }
}
