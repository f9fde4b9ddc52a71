//! The recursive validation algorithm shared by every schema type.
//!
//! A node validates in a fixed order: node settings are merged into the
//! options, the `empty` schema may turn the value into `undefined`,
//! presence is resolved, the value is checked against the allowed and
//! denied sets, the type's base step converts and type-checks it (allowed
//! and denied sets are checked again when the value changed), `valid(..)`
//! exclusivity is enforced, and finally every rule runs in registration
//! order. Whatever path is taken, [`Schema::finish`] applies defaults,
//! error overrides and stripping.

use stillwater::Validation;

use super::{DefaultValue, ErrorOverride, ErrorReplacement, Flags, Kind, Schema};
use crate::error::{context, Context, SchemaError, SchemaErrors, ValidationError};
use crate::options::{Presence, ValidationOptions};
use crate::path::{KeyPath, PathSegment};
use crate::validation::State;
use crate::value::Value;

/// Result of validating one node.
#[derive(Debug, Clone)]
pub(crate) struct Outcome {
    /// The final value, before stripping.
    pub value: Value,
    /// Whether the node asked for its value to be removed from the output.
    pub stripped: bool,
    pub errors: Vec<SchemaError>,
}

impl Outcome {
    /// The value as seen by the caller.
    pub(crate) fn visible(&self) -> Value {
        if self.stripped {
            Value::Undefined
        } else {
            self.value.clone()
        }
    }

    pub(crate) fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Result of a type's base step.
#[derive(Debug, Clone)]
pub(crate) struct Coerced {
    pub value: Value,
    pub errors: Vec<SchemaError>,
}

impl Coerced {
    pub(crate) fn ok(value: Value) -> Self {
        Self {
            value,
            errors: Vec::new(),
        }
    }

    pub(crate) fn failed(value: Value, error: SchemaError) -> Self {
        Self {
            value,
            errors: vec![error],
        }
    }
}

/// The outcome of a top-level validation.
///
/// `value` is the converted value (with defaults applied and stripped keys
/// removed); `error` is set when validation failed.
///
/// # Example
///
/// ```rust
/// use valuate::Schema;
///
/// let result = Schema::number().validate("42");
/// assert_eq!(result.into_result().unwrap(), 42.into());
///
/// let failed = Schema::number().validate("x").into_result();
/// assert_eq!(failed.unwrap_err().message, "\"value\" must be a number");
/// ```
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub value: Value,
    pub error: Option<ValidationError>,
}

impl ValidationResult {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn into_result(self) -> Result<Value, ValidationError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.value),
        }
    }

    pub fn into_validation(self) -> Validation<Value, ValidationError> {
        match self.error {
            Some(error) => Validation::Failure(error),
            None => Validation::Success(self.value),
        }
    }
}

impl Schema {
    /// Validates `value` with the default options.
    pub fn validate(&self, value: impl Into<Value>) -> ValidationResult {
        self.validate_with(value, &ValidationOptions::default())
    }

    /// Validates `value` with explicit options.
    ///
    /// # Example
    ///
    /// ```rust
    /// use valuate::{Schema, ValidationOptions};
    /// use serde_json::json;
    ///
    /// let schema = Schema::object().keys([
    ///     ("a", Schema::number()),
    ///     ("b", Schema::number()),
    /// ]);
    /// let options = ValidationOptions::default().with_abort_early(false);
    ///
    /// let result = schema.validate_with(json!({"a": "x", "b": "y"}), &options);
    /// assert_eq!(result.error.unwrap().details.len(), 2);
    /// ```
    pub fn validate_with(&self, value: impl Into<Value>, options: &ValidationOptions) -> ValidationResult {
        let value = value.into();
        let _span = tracing::debug_span!("validate", schema = %self.type_name()).entered();

        let original = value.clone();
        let outcome = self.validate_node(value, &State::root(), options);
        let value = outcome.visible();
        let error = SchemaErrors::from_vec(outcome.errors)
            .map(|errors| ValidationError::process(&errors, &original));

        if let Some(error) = &error {
            tracing::debug!(details = error.details.len(), message = %error.message, "validation failed");
        }
        ValidationResult { value, error }
    }

    /// Validates `value` and hands the error and value to `callback`.
    pub fn validate_callback<R>(
        &self,
        value: impl Into<Value>,
        options: &ValidationOptions,
        callback: impl FnOnce(Option<ValidationError>, Value) -> R,
    ) -> R {
        let result = self.validate_with(value, options);
        callback(result.error, result.value)
    }

    /// Validates one node of the value tree.
    pub(crate) fn validate_node(
        &self,
        value: Value,
        state: &State<'_>,
        options: &ValidationOptions,
    ) -> Outcome {
        let merged;
        let options = match &self.settings {
            Some(settings) => {
                merged = options.apply(settings);
                &merged
            }
            None => options,
        };

        let original = if self.flags.raw {
            Some(value.clone())
        } else {
            None
        };
        let mut errors = Vec::new();
        let mut value = value;

        if let Some(coerce) = self.extension.as_ref().and_then(|ext| ext.coerce.as_ref()) {
            match coerce(self, &value, state, options) {
                Ok(coerced) => value = coerced,
                Err(error) => {
                    errors.push(error);
                    return self.finish(value, original, errors, state, options);
                }
            }
        }

        if let Some(empty) = &self.flags.empty {
            let candidate = self.prepare_empty_value(&value);
            if empty
                .validate_node(candidate, &State::root(), &ValidationOptions::default())
                .is_ok()
            {
                value = Value::Undefined;
            }
        }

        match self.flags.presence.unwrap_or(options.presence) {
            Presence::Optional if value.is_undefined() => {
                let deep_default = matches!(self.flags.default, Some(DefaultValue::Value(Value::Undefined)))
                    && matches!(self.kind, Kind::Object(_));
                if deep_default {
                    value = Value::object();
                } else {
                    tracing::trace!(path = %state.path, "optional value absent");
                    return self.finish(value, original, errors, state, options);
                }
            }
            Presence::Required if value.is_undefined() => {
                errors.push(self.error_at("any.required", Context::new(), state, options));
                return self.finish(value, original, errors, state, options);
            }
            Presence::Forbidden => {
                if !value.is_undefined() {
                    errors.push(self.error_at("any.unknown", Context::new(), state, options));
                }
                return self.finish(value, original, errors, state, options);
            }
            _ => {}
        }

        let insensitive = self.flags.is_insensitive();
        if self.valids.has(&value, Some(state), Some(options), insensitive) {
            return self.finish(value, original, errors, state, options);
        }
        if self.invalids.has(&value, Some(state), Some(options), insensitive) {
            errors.push(self.invalid_error(&value, state, options));
            if options.abort_early || value.is_undefined() {
                return self.finish(value, original, errors, state, options);
            }
        }

        let before = if self.valids.is_empty() && self.invalids.is_empty() {
            None
        } else {
            Some(value.clone())
        };
        let coerced = self.base(value, state, options);
        value = coerced.value;
        if !coerced.errors.is_empty() {
            errors.extend(coerced.errors);
            return self.finish(value, original, errors, state, options);
        }
        if let Some(before) = before {
            if before != value {
                if self.valids.has(&value, Some(state), Some(options), insensitive) {
                    return self.finish(value, original, errors, state, options);
                }
                if self.invalids.has(&value, Some(state), Some(options), insensitive) {
                    errors.push(self.invalid_error(&value, state, options));
                    if options.abort_early {
                        return self.finish(value, original, errors, state, options);
                    }
                }
            }
        }

        if self.flags.allow_only {
            let valids = Value::Array(self.valids.values(true));
            errors.push(self.error_at(
                "any.allowOnly",
                context([("value", value.clone()), ("valids", valids)]),
                state,
                options,
            ));
            if options.abort_early {
                return self.finish(value, original, errors, state, options);
            }
        }

        for rule in &self.rules {
            match (rule.check)(self, &value, state, options) {
                Ok(Some(next)) => value = next,
                Ok(None) => {}
                Err(error) => {
                    errors.push(error);
                    if options.abort_early {
                        return self.finish(value, original, errors, state, options);
                    }
                }
            }
        }

        self.finish(value, original, errors, state, options)
    }

    /// Dispatches to the type's base step, then the extension's `pre` hook.
    fn base(&self, value: Value, state: &State<'_>, options: &ValidationOptions) -> Coerced {
        let coerced = match &self.kind {
            Kind::Any => Coerced::ok(value),
            Kind::String(inner) => inner.base(self, value, state, options),
            Kind::Number(inner) => inner.base(self, value, state, options),
            Kind::Boolean(inner) => inner.base(self, value, state, options),
            Kind::Date(inner) => inner.base(self, value, state, options),
            Kind::Binary(inner) => inner.base(self, value, state, options),
            Kind::Array(inner) => inner.base(self, value, state, options),
            Kind::Object(inner) => inner.base(self, value, state, options),
            Kind::Function => super::function::base(self, value, state, options),
            Kind::Alternatives(inner) => inner.base(self, value, state, options),
            Kind::Lazy(inner) => inner.base(self, value, state, options),
        };
        if !coerced.errors.is_empty() {
            return coerced;
        }
        match self.extension.as_ref().and_then(|ext| ext.pre.as_ref()) {
            Some(pre) => match pre(self, &coerced.value, state, options) {
                Ok(value) => Coerced::ok(value),
                Err(error) => Coerced::failed(coerced.value, error),
            },
            None => coerced,
        }
    }

    fn prepare_empty_value(&self, value: &Value) -> Value {
        match (&self.kind, value) {
            (Kind::String(inner), Value::String(s)) if inner.trim => Value::String(s.trim().to_string()),
            _ => value.clone(),
        }
    }

    fn invalid_error(&self, value: &Value, state: &State<'_>, options: &ValidationOptions) -> SchemaError {
        let code = if value.as_str() == Some("") {
            "any.empty"
        } else {
            "any.invalid"
        };
        let invalids = Value::Array(self.invalids.values(true));
        self.error_at(
            code,
            context([("value", value.clone()), ("invalids", invalids)]),
            state,
            options,
        )
    }

    /// Applies defaults, the error override and stripping.
    fn finish(
        &self,
        value: Value,
        original: Option<Value>,
        mut errors: Vec<SchemaError>,
        state: &State<'_>,
        options: &ValidationOptions,
    ) -> Outcome {
        let value = if !value.is_undefined() {
            match original {
                Some(original) if self.flags.raw => original,
                _ => value,
            }
        } else if options.no_defaults {
            value
        } else {
            match &self.flags.default {
                None => value,
                Some(DefaultValue::Value(default)) => default.clone(),
                Some(DefaultValue::Ref(reference)) => reference.resolve(state.parent, options),
                Some(DefaultValue::Func { description, func }) => match func(state.parent, options) {
                    Ok(default) => default,
                    Err(reason) => {
                        tracing::debug!(%description, %reason, "default function failed");
                        errors.push(self.error_at(
                            "any.default",
                            context([("error", Value::String(reason))]),
                            state,
                            options,
                        ));
                        Value::Undefined
                    }
                },
            }
        };

        if !errors.is_empty() {
            if let Some(ErrorOverride::Func(func)) = &self.flags.error {
                errors = match func(&errors) {
                    ErrorReplacement::Message(message) => {
                        vec![self
                            .error_at("override", Context::new(), state, options)
                            .with_message(message)
                            .with_reason(errors)]
                    }
                    ErrorReplacement::Errors(replaced) => replaced,
                    ErrorReplacement::Custom(custom) => custom
                        .into_iter()
                        .map(|custom| {
                            let code = custom.code.as_deref().unwrap_or("override");
                            let mut error = self.error_at(code, custom.context, state, options);
                            error.message = custom.message;
                            error.template = custom.template;
                            error
                        })
                        .collect(),
                };
            }
        }

        Outcome {
            value,
            stripped: self.flags.strip,
            errors,
        }
    }

    /// Creates an error for the value at `state`, labelled and rendered the
    /// way this schema's errors are.
    ///
    /// Extension hooks and rules use this to report failures.
    pub fn error_at(
        &self,
        code: &str,
        context: Context,
        state: &State<'_>,
        options: &ValidationOptions,
    ) -> SchemaError {
        build_error(code, context, state.key.as_ref(), state.path.clone(), options, Some(&self.flags))
    }

    /// Creates an error for a location other than the current state.
    pub(crate) fn error_with(
        &self,
        code: &str,
        context: Context,
        key: Option<&PathSegment>,
        path: KeyPath,
        options: &ValidationOptions,
    ) -> SchemaError {
        build_error(code, context, key, path, options, Some(&self.flags))
    }

    /// The schema's label, falling back to `key`.
    pub(crate) fn label_or(&self, key: &str) -> String {
        self.flags.label.clone().unwrap_or_else(|| key.to_string())
    }
}

/// Builds a labelled error; `flags` supplies the label and a static
/// message override when present.
pub(crate) fn build_error(
    code: &str,
    mut context: Context,
    key: Option<&PathSegment>,
    path: KeyPath,
    options: &ValidationOptions,
    flags: Option<&Flags>,
) -> SchemaError {
    if let Some(last) = path.last() {
        context.insert("key".to_string(), last.to_value());
    }

    let key = key.filter(|key| !matches!(key, PathSegment::Key(name) if name.is_empty()));
    let label = flags
        .and_then(|flags| flags.label.clone())
        .map(Value::String)
        .or_else(|| key.map(PathSegment::to_value))
        .unwrap_or_else(|| Value::String(root_label(options)));
    context.insert("label".to_string(), label);

    let mut error = SchemaError::new(code, path).rendered_with(options);
    error.context = context;
    if let Some(ErrorOverride::Message(message)) = flags.and_then(|flags| flags.error.as_ref()) {
        error.override_message = Some(message.clone());
    }
    error
}

fn root_label(options: &ValidationOptions) -> String {
    options
        .language
        .get("root")
        .and_then(serde_json::Value::as_str)
        .unwrap_or("value")
        .to_string()
}
