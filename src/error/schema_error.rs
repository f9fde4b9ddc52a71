//! Validation error nodes.
//!
//! A [`SchemaError`] describes one failure: a dotted code such as
//! `string.min`, the path of the failing value, a context bag used to render
//! the message, and (for wrapper codes like `object.child`) the nested child
//! failures that caused it. [`SchemaErrors`] accumulates them.

use std::fmt::{self, Display};

use indexmap::IndexMap;
use stillwater::prelude::*;

use super::messages::{lookup, DEFAULT_MESSAGES};
use super::template::{interpolate, join, stringify};
use crate::options::ValidationOptions;
use crate::path::KeyPath;
use crate::value::Value;

/// Values available to message templates.
pub type Context = IndexMap<String, Value>;

/// Builds a [`Context`] from key/value pairs.
pub fn context<const N: usize>(pairs: [(&str, Value); N]) -> Context {
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

/// A single validation failure.
///
/// # Example
///
/// ```rust
/// use valuate::{KeyPath, SchemaError, Value};
///
/// let error = SchemaError::new("number.min", KeyPath::root().push_key("age"))
///     .with_context("label", "age")
///     .with_context("limit", 18);
///
/// assert_eq!(error.code, "number.min");
/// assert_eq!(error.to_string(), "\"age\" must be larger than or equal to 18");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaError {
    /// Dotted error code (e.g. `any.required`).
    pub code: String,
    pub path: KeyPath,
    pub context: Context,
    /// Child failures wrapped by this error.
    pub reason: Option<Vec<SchemaError>>,
    /// Fixed message replacing template rendering.
    pub message: Option<String>,
    /// Template used instead of the language catalog.
    pub template: Option<String>,
    pub(crate) language: serde_json::Value,
    pub(crate) escape_html: bool,
    pub(crate) override_message: Option<String>,
}

impl SchemaError {
    pub fn new(code: impl Into<String>, path: KeyPath) -> Self {
        Self {
            code: code.into(),
            path,
            context: Context::new(),
            reason: None,
            message: None,
            template: None,
            language: serde_json::Value::Null,
            escape_html: false,
            override_message: None,
        }
    }

    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    pub fn with_reason(mut self, reason: Vec<SchemaError>) -> Self {
        self.reason = Some(reason);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    /// Captures the language and escaping settings used for rendering.
    pub(crate) fn rendered_with(mut self, options: &ValidationOptions) -> Self {
        self.language = options.language.clone();
        self.escape_html = options.escape_html;
        self
    }

    /// The label of the failing value, if one was recorded.
    pub fn label(&self) -> Option<&Value> {
        self.context.get("label")
    }

    /// Renders the human-readable message.
    pub fn render(&self) -> String {
        if let Some(message) = &self.message {
            return message.clone();
        }

        let wrap_arrays = lookup(&self.language, "messages.wrapArrays")
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(true);

        let template = self
            .template
            .as_deref()
            .map(|t| Some(serde_json::Value::String(t.to_string())))
            .or_else(|| lookup(&self.language, &self.code).map(|t| Some(t.clone())))
            .or_else(|| lookup(&DEFAULT_MESSAGES, &self.code).map(|t| Some(t.clone())))
            .flatten();

        let format = match template {
            Some(serde_json::Value::String(format)) => format,
            Some(serde_json::Value::Null) => {
                return self.render_reason(false);
            }
            _ => {
                return format!(
                    "Error code \"{}\" is not defined, your custom type is missing the correct language definition",
                    self.code
                )
            }
        };

        let has_key = format.contains("{{label}}") || format.contains("{{!label}}");
        let (format, skip_key) = match format.strip_prefix("!!") {
            Some(rest) if format.len() > 2 => (rest.to_string(), true),
            _ => (format.clone(), false),
        };
        let format = if !has_key && !skip_key {
            let prefix = lookup(&self.language, "key")
                .and_then(serde_json::Value::as_str)
                .or_else(|| lookup(&DEFAULT_MESSAGES, "key").and_then(serde_json::Value::as_str))
                .unwrap_or("");
            format!("{}{}", prefix, format)
        } else {
            format
        };

        interpolate(&format, self.escape_html, |name| {
            if name == "reason" {
                return self.render_reason(wrap_arrays);
            }
            stringify(&self.lookup_context(name), wrap_arrays)
        })
    }

    fn render_reason(&self, wrap_arrays: bool) -> String {
        match &self.reason {
            Some(reason) => join(reason.iter().map(SchemaError::render), wrap_arrays),
            None => "undefined".to_string(),
        }
    }

    fn lookup_context(&self, name: &str) -> Value {
        let mut segments = name.split('.');
        let Some(first) = segments.next() else {
            return Value::Undefined;
        };
        let mut current = match self.context.get(first) {
            Some(value) => value,
            None => return Value::Undefined,
        };
        for segment in segments {
            match current.get(segment) {
                Some(next) => current = next,
                None => return Value::Undefined,
            }
        }
        current.clone()
    }
}

impl Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

impl std::error::Error for SchemaError {}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<SchemaError>();
    assert_sync::<SchemaError>();
};

/// A non-empty collection of validation failures.
///
/// Errors from independent branches are combined with
/// [`Semigroup::combine`]:
///
/// ```rust
/// use valuate::{KeyPath, SchemaError, SchemaErrors};
/// use stillwater::prelude::*;
///
/// let a = SchemaErrors::single(SchemaError::new("any.required", KeyPath::root().push_key("a")));
/// let b = SchemaErrors::single(SchemaError::new("any.required", KeyPath::root().push_key("b")));
///
/// assert_eq!(a.combine(b).len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaErrors(NonEmptyVec<SchemaError>);

impl SchemaErrors {
    pub fn single(error: SchemaError) -> Self {
        Self(NonEmptyVec::singleton(error))
    }

    /// Returns `None` when `errors` is empty.
    pub fn from_vec(errors: Vec<SchemaError>) -> Option<Self> {
        NonEmptyVec::from_vec(errors).map(Self)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; the collection holds at least one error.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn iter(&self) -> impl Iterator<Item = &SchemaError> {
        self.0.iter()
    }

    pub fn first(&self) -> &SchemaError {
        self.0.head()
    }

    pub fn at_path(&self, path: &KeyPath) -> Vec<&SchemaError> {
        self.0.iter().filter(|e| &e.path == path).collect()
    }

    pub fn with_code(&self, code: &str) -> Vec<&SchemaError> {
        self.0.iter().filter(|e| e.code == code).collect()
    }

    pub fn into_vec(self) -> Vec<SchemaError> {
        self.0.into_vec()
    }
}

impl Semigroup for SchemaErrors {
    fn combine(self, other: Self) -> Self {
        SchemaErrors(self.0.combine(other.0))
    }
}

impl Display for SchemaErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.iter().map(SchemaError::render).collect();
        write!(f, "{}", messages.join(". "))
    }
}

impl std::error::Error for SchemaErrors {}

impl IntoIterator for SchemaErrors {
    type Item = SchemaError;
    type IntoIter = std::vec::IntoIter<SchemaError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_vec().into_iter()
    }
}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<SchemaErrors>();
    assert_sync::<SchemaErrors>();
};

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn labelled(code: &str, label: &str) -> SchemaError {
        SchemaError::new(code, KeyPath::root().push_key(label)).with_context("label", label)
    }

    #[test]
    fn test_key_prefix_is_added() {
        let error = labelled("any.required", "name");
        assert_eq!(error.to_string(), "\"name\" is required");
    }

    #[test]
    fn test_double_bang_skips_prefix() {
        let error = labelled("object.allowUnknown", "extra").with_context("child", "extra");
        assert_eq!(error.to_string(), "\"extra\" is not allowed");
    }

    #[test]
    fn test_reason_renders_children() {
        let child = labelled("number.base", "a");
        let error = labelled("object.child", "value")
            .with_context("child", "a")
            .with_reason(vec![child]);
        assert_eq!(
            error.to_string(),
            "child \"a\" fails because [\"a\" must be a number]"
        );
    }

    #[test]
    fn test_null_template_renders_reason_without_brackets() {
        let error = SchemaError::new("alternatives.child", KeyPath::root()).with_reason(vec![
            labelled("string.base", "value"),
            labelled("number.base", "value"),
        ]);
        assert_eq!(
            error.to_string(),
            "\"value\" must be a string, \"value\" must be a number"
        );
    }

    #[test]
    fn test_language_override_and_template() {
        let options = ValidationOptions::default()
            .with_language(json!({"string": {"min": "{{label}} too short by {{limit}}"}}));
        let error = labelled("string.min", "pw")
            .with_context("limit", 3)
            .rendered_with(&options);
        assert_eq!(error.to_string(), "pw too short by 3");

        let templated = labelled("string.min", "pw").with_template("!!nope");
        assert_eq!(templated.to_string(), "nope");

        let fixed = labelled("string.min", "pw").with_message("fixed");
        assert_eq!(fixed.to_string(), "fixed");
    }

    #[test]
    fn test_unknown_code() {
        let error = SchemaError::new("money.base", KeyPath::root());
        assert!(error.to_string().starts_with("Error code \"money.base\" is not defined"));
    }

    #[test]
    fn test_dotted_context_lookup() {
        let error = SchemaError::new("x", KeyPath::root())
            .with_context("label", "v")
            .with_context("limit", Value::from(json!({"min": 2})))
            .with_template("{{limit.min}}");
        assert_eq!(error.to_string(), "\"v\" 2");
    }

    #[test]
    fn test_errors_combine_and_query() {
        let errors = SchemaErrors::single(labelled("any.required", "a"))
            .combine(SchemaErrors::single(labelled("any.required", "b")))
            .combine(SchemaErrors::single(labelled("string.base", "a")));
        assert_eq!(errors.len(), 3);
        assert_eq!(errors.with_code("any.required").len(), 2);
        assert_eq!(errors.at_path(&KeyPath::root().push_key("a")).len(), 2);
        assert!(SchemaErrors::from_vec(Vec::new()).is_none());
    }
}
