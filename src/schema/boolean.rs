//! Boolean schema.
//!
//! Besides `true` and `false`, the strings `"true"` and `"false"` are
//! accepted when converting (case-insensitively unless
//! [`insensitive(false)`](Schema::insensitive) was set), and any value added
//! with [`Schema::truthy`] or [`Schema::falsy`] is mapped regardless of the
//! conversion option.

use super::engine::Coerced;
use super::{unsupported, Kind, Schema};
use crate::error::context;
use crate::options::ValidationOptions;
use crate::validation::State;
use crate::value::Value;
use crate::value_set::{SetItem, ValueSet};

#[derive(Debug, Clone, Default)]
pub(crate) struct BooleanInner {
    pub truthy: ValueSet,
    pub falsy: ValueSet,
}

impl BooleanInner {
    pub(crate) fn base(
        &self,
        schema: &Schema,
        value: Value,
        state: &State<'_>,
        options: &ValidationOptions,
    ) -> Coerced {
        let insensitive = schema.flags.is_insensitive();
        let converted = match &value {
            Value::String(s) if options.convert => {
                let normalized = if insensitive { s.to_lowercase() } else { s.clone() };
                match normalized.as_str() {
                    "true" => Some(true),
                    "false" => Some(false),
                    _ => None,
                }
            }
            Value::Bool(b) => Some(*b),
            _ => None,
        };

        let mapped = converted.or_else(|| {
            if self.truthy.has(&value, None, None, insensitive) {
                Some(true)
            } else if self.falsy.has(&value, None, None, insensitive) {
                Some(false)
            } else {
                None
            }
        });

        match mapped {
            Some(b) => Coerced::ok(Value::Bool(b)),
            None => {
                let error = schema.error_at("boolean.base", context([("value", value.clone())]), state, options);
                Coerced::failed(value, error)
            }
        }
    }
}

impl Schema {
    fn boolean_inner(&mut self, builder: &str) -> &mut BooleanInner {
        let schema_type = self.schema_type();
        match &mut self.kind {
            Kind::Boolean(inner) => inner,
            _ => unsupported(schema_type, builder),
        }
    }

    /// Values converted to `true`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use valuate::{Schema, Value};
    ///
    /// let schema = Schema::boolean().truthy(["Y", "yes"]).falsy(["N"]);
    /// assert_eq!(schema.validate("y").value, Value::Bool(true));
    /// assert_eq!(schema.validate("N").value, Value::Bool(false));
    /// assert!(schema.validate("maybe").error.is_some());
    /// ```
    ///
    /// # Panics
    ///
    /// When one of `values` is `undefined`.
    pub fn truthy<I>(mut self, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<SetItem>,
    {
        let inner = self.boolean_inner("truthy");
        for value in values {
            let item = value.into();
            assert!(
                !matches!(item, SetItem::Literal(Value::Undefined)),
                "cannot call truthy with undefined"
            );
            inner.truthy.add(item, None);
        }
        self
    }

    /// Values converted to `false`.
    ///
    /// # Panics
    ///
    /// When one of `values` is `undefined`.
    pub fn falsy<I>(mut self, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<SetItem>,
    {
        let inner = self.boolean_inner("falsy");
        for value in values {
            let item = value.into();
            assert!(
                !matches!(item, SetItem::Literal(Value::Undefined)),
                "cannot call falsy with undefined"
            );
            inner.falsy.add(item, None);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_booleans_pass() {
        let schema = Schema::boolean();
        assert_eq!(schema.validate(true).value, Value::Bool(true));
        assert_eq!(schema.validate(false).value, Value::Bool(false));
    }

    #[test]
    fn test_string_conversion() {
        let schema = Schema::boolean();
        assert_eq!(schema.validate("TRUE").value, Value::Bool(true));
        assert_eq!(schema.validate("false").value, Value::Bool(false));
        assert!(schema.validate("yes").error.is_some());

        let sensitive = Schema::boolean().insensitive(false);
        assert!(sensitive.validate("TRUE").error.is_some());

        let options = ValidationOptions::default().with_convert(false);
        let error = schema.validate_with("true", &options).error.unwrap();
        assert_eq!(error.details[0].code, "boolean.base");
    }

    #[test]
    fn test_truthy_applies_without_conversion() {
        let schema = Schema::boolean().truthy([1]).falsy([0]);
        let options = ValidationOptions::default().with_convert(false);
        assert_eq!(schema.validate_with(1, &options).value, Value::Bool(true));
        assert_eq!(schema.validate_with(0, &options).value, Value::Bool(false));
        assert!(schema.validate_with(2, &options).error.is_some());
    }

    #[test]
    #[should_panic(expected = "undefined")]
    fn test_truthy_rejects_undefined() {
        let _ = Schema::boolean().truthy([Value::Undefined]);
    }
}
