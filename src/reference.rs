//! References to other values in the validated input or the caller context.
//!
//! A [`Reference`] is a dotted path resolved at validation time. Plain
//! references resolve against the container of the value being validated
//! (its siblings); references whose key starts with the context prefix
//! (`$` by default) resolve against [`ValidationOptions::context`].
//!
//! # Example
//!
//! ```rust
//! use valuate::{Reference, ValidationOptions, Value};
//! use serde_json::json;
//!
//! let sibling = Reference::new("a.b");
//! let parent = Value::from(json!({"a": {"b": 5}}));
//! assert_eq!(sibling.resolve(Some(&parent), &ValidationOptions::default()), Value::from(5));
//! assert_eq!(sibling.to_string(), "ref:a.b");
//!
//! let context = Reference::new("$limit");
//! let options = ValidationOptions::default().with_context(json!({"limit": 3}));
//! assert_eq!(context.resolve(None, &options), Value::from(3));
//! assert_eq!(context.to_string(), "context:limit");
//! ```

use std::fmt;

use crate::error::BuildError;
use crate::options::ValidationOptions;
use crate::value::Value;

/// How a reference key is parsed and what a miss resolves to.
#[derive(Debug, Clone, PartialEq)]
pub struct RefSettings {
    pub separator: String,
    pub context_prefix: char,
    /// Value returned when a path segment is missing.
    pub default: Value,
}

impl Default for RefSettings {
    fn default() -> Self {
        Self {
            separator: ".".to_string(),
            context_prefix: '$',
            default: Value::Undefined,
        }
    }
}

/// A resolvable pointer to a sibling, ancestor member or context value.
#[derive(Debug, Clone, PartialEq)]
pub struct Reference {
    key: String,
    path: Vec<String>,
    is_context: bool,
    default: Value,
}

impl Reference {
    /// Creates a reference with default settings.
    ///
    /// # Panics
    ///
    /// Panics if `key` is empty. Use [`Reference::try_new`] to handle that case.
    pub fn new(key: impl AsRef<str>) -> Self {
        Self::try_new(key).unwrap_or_else(|e| panic!("{e}"))
    }

    pub fn try_new(key: impl AsRef<str>) -> Result<Self, BuildError> {
        Self::with_settings(key, &RefSettings::default())
    }

    /// Creates a reference resolved against the caller context, regardless
    /// of prefix.
    pub fn context(key: impl AsRef<str>) -> Self {
        let settings = RefSettings::default();
        let key = key.as_ref();
        Self {
            path: split_path(key, &settings.separator),
            key: key.to_string(),
            is_context: true,
            default: settings.default,
        }
    }

    pub fn with_settings(key: impl AsRef<str>, settings: &RefSettings) -> Result<Self, BuildError> {
        let key = key.as_ref();
        if key.is_empty() {
            return Err(BuildError::InvalidArgument(
                "reference key must be a non-empty string".to_string(),
            ));
        }
        let is_context = key.starts_with(settings.context_prefix);
        let key = if is_context {
            &key[settings.context_prefix.len_utf8()..]
        } else {
            key
        };
        Ok(Self {
            key: key.to_string(),
            path: split_path(key, &settings.separator),
            is_context,
            default: settings.default.clone(),
        })
    }

    /// The key without the context prefix.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn path(&self) -> &[String] {
        &self.path
    }

    pub fn is_context(&self) -> bool {
        self.is_context
    }

    /// First segment of the path.
    pub fn root(&self) -> &str {
        self.path.first().map(String::as_str).unwrap_or("")
    }

    pub fn depth(&self) -> usize {
        self.path.len()
    }

    /// Resolves the reference, falling back to the configured default when
    /// a segment is missing.
    pub fn resolve(&self, parent: Option<&Value>, options: &ValidationOptions) -> Value {
        match self.walk(parent, options, false) {
            Ok(value) => value,
            Err(_) => self.default.clone(),
        }
    }

    /// Resolves the reference, failing when an intermediate segment is
    /// missing.
    pub fn try_resolve(
        &self,
        parent: Option<&Value>,
        options: &ValidationOptions,
    ) -> Result<Value, BuildError> {
        self.walk(parent, options, true)
    }

    fn walk(
        &self,
        parent: Option<&Value>,
        options: &ValidationOptions,
        strict: bool,
    ) -> Result<Value, BuildError> {
        let start = if self.is_context {
            options.context.as_ref()
        } else {
            parent
        };
        let Some(mut current) = start else {
            return Ok(self.default.clone());
        };
        if self.key.is_empty() {
            return Ok(current.clone());
        }
        for (i, segment) in self.path.iter().enumerate() {
            match current.get(segment) {
                Some(next) => current = next,
                None => {
                    if strict && i + 1 != self.path.len() {
                        return Err(BuildError::MissingSegment {
                            segment: segment.clone(),
                            path: self.key.clone(),
                        });
                    }
                    tracing::debug!(reference = %self, segment = %segment, "reference did not resolve");
                    return Ok(self.default.clone());
                }
            }
        }
        Ok(current.clone())
    }
}

fn split_path(key: &str, separator: &str) -> Vec<String> {
    if key.is_empty() {
        return Vec::new();
    }
    key.split(separator).map(str::to_string).collect()
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_context { "context" } else { "ref" };
        write!(f, "{}:{}", kind, self.key)
    }
}
