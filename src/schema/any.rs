//! Builders shared by every schema type.

use std::sync::Arc;

use super::{DefaultValue, ErrorOverride, ErrorReplacement, Schema};
use crate::error::SchemaError;
use crate::options::{Presence, Settings, ValidationOptions};
use crate::reference::Reference;
use crate::value::Value;
use crate::value_set::SetItem;

impl Schema {
    /// Adds values that are always accepted, bypassing every other check.
    ///
    /// # Example
    ///
    /// ```rust
    /// use valuate::{Schema, Value};
    ///
    /// let schema = Schema::number().min(10).allow([Value::Null]);
    /// assert!(schema.validate(Value::Null).error.is_none());
    /// assert!(schema.validate(3).error.is_some());
    /// ```
    pub fn allow<I>(mut self, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<SetItem>,
    {
        for item in values {
            let item = item.into();
            self.invalids.remove(&item);
            self.valids.add(item, Some(&mut self.refs));
        }
        self
    }

    /// Restricts the schema to exactly `values`.
    pub fn valid<I>(mut self, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<SetItem>,
    {
        self = self.allow(values);
        self.flags.allow_only = true;
        self
    }

    /// Alias of [`Schema::valid`].
    pub fn only<I>(self, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<SetItem>,
    {
        self.valid(values)
    }

    /// Adds values that are always rejected with `any.invalid`.
    pub fn invalid<I>(mut self, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<SetItem>,
    {
        for item in values {
            let item = item.into();
            self.valids.remove(&item);
            self.invalids.add(item, Some(&mut self.refs));
        }
        self
    }

    /// Value must not be `undefined`.
    pub fn required(self) -> Self {
        self.with_presence(Presence::Required)
    }

    pub fn optional(self) -> Self {
        self.with_presence(Presence::Optional)
    }

    /// Value must be `undefined`.
    pub fn forbidden(self) -> Self {
        self.with_presence(Presence::Forbidden)
    }

    pub(crate) fn with_presence(mut self, presence: Presence) -> Self {
        self.flags.presence = Some(presence);
        self
    }

    /// Removes the value from the validated output.
    pub fn strip(mut self) -> Self {
        self.flags.strip = true;
        self
    }

    /// Value used when the input is `undefined`.
    ///
    /// On an object schema, `Value::Undefined` requests an empty object
    /// whose children are then validated, so their own defaults apply.
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.flags.default = Some(DefaultValue::Value(value.into()));
        self
    }

    /// Default resolved from a sibling or context value.
    pub fn default_ref(mut self, reference: Reference) -> Self {
        self.flags.default = Some(DefaultValue::Ref(reference));
        self
    }

    /// Default computed when needed. The function receives the parent
    /// container and the active options; an `Err` is reported as
    /// `any.default`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use valuate::{Schema, Value};
    /// use serde_json::json;
    ///
    /// let schema = Schema::object().keys([
    ///     ("first", Schema::string()),
    ///     ("last", Schema::string()),
    ///     ("full", Schema::string().default_fn("joined names", |parent, _| {
    ///         let parent = parent.ok_or("no parent")?;
    ///         let first = parent.get("first").and_then(Value::as_str).unwrap_or("");
    ///         let last = parent.get("last").and_then(Value::as_str).unwrap_or("");
    ///         Ok(format!("{first} {last}").into())
    ///     })),
    /// ]);
    ///
    /// let result = schema.validate(json!({"first": "Ada", "last": "Lovelace"}));
    /// assert_eq!(result.value.get("full"), Some(&Value::from("Ada Lovelace")));
    /// ```
    pub fn default_fn<F>(mut self, description: impl Into<String>, func: F) -> Self
    where
        F: Fn(Option<&Value>, &ValidationOptions) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.flags.default = Some(DefaultValue::Func {
            description: description.into(),
            func: Arc::new(func),
        });
        self
    }

    /// Values matching `schema` are treated as `undefined`.
    pub fn empty(mut self, schema: Schema) -> Self {
        self.flags.empty = Some(Box::new(schema));
        self
    }

    /// Shorthand for `empty(Schema::any().valid(values))`.
    pub fn empty_values<I>(self, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<SetItem>,
    {
        self.empty(Schema::any().valid(values))
    }

    /// Name used for this value in error messages.
    pub fn label(mut self, name: impl Into<String>) -> Self {
        self.flags.label = Some(name.into());
        self
    }

    /// Replaces the whole validation error with `message` when this node
    /// fails.
    pub fn error(mut self, message: impl Into<String>) -> Self {
        self.flags.error = Some(ErrorOverride::Message(message.into()));
        self
    }

    /// Lets `func` replace the errors this node reports.
    pub fn error_fn<F>(mut self, func: F) -> Self
    where
        F: Fn(&[SchemaError]) -> ErrorReplacement + Send + Sync + 'static,
    {
        self.flags.error = Some(ErrorOverride::Func(Arc::new(func)));
        self
    }

    /// Outputs the original input instead of the converted value.
    pub fn raw(mut self) -> Self {
        self.flags.raw = true;
        self
    }

    /// Disables conversion for this node and its descendants.
    pub fn strict(self) -> Self {
        self.options(Settings::new().convert(false))
    }

    /// Overrides validation options for this node and its descendants.
    pub fn options(mut self, settings: Settings) -> Self {
        self.settings = Some(match &self.settings {
            Some(existing) => existing.merge(&settings),
            None => settings,
        });
        self
    }

    /// Compares strings case-insensitively against allowed and denied
    /// values (and, on booleans, against truthy and falsy values).
    pub fn insensitive(mut self, enabled: bool) -> Self {
        self.flags.insensitive = Some(enabled);
        self
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.docs.description = Some(text.into());
        self
    }

    pub fn notes<I>(mut self, notes: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.docs.notes.extend(notes.into_iter().map(Into::into));
        self
    }

    pub fn tags<I>(mut self, tags: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.docs.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn meta(mut self, meta: serde_json::Value) -> Self {
        self.docs.meta.push(meta);
        self
    }

    pub fn example(mut self, value: impl Into<Value>) -> Self {
        self.docs.examples.push(value.into());
        self
    }

    pub fn unit(mut self, name: impl Into<String>) -> Self {
        self.docs.unit = Some(name.into());
        self
    }
}
