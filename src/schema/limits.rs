//! `min`, `max`, `length`, `greater` and `less`.
//!
//! The same builder names apply to several types: sizes for strings
//! (characters), arrays (items), objects (keys) and binaries (bytes), and
//! magnitudes for numbers and dates. A limit is a literal or a
//! [`Reference`](crate::Reference) resolved against the value's container at
//! validation time; a reference that does not resolve to a usable limit is
//! reported as `<type>.ref`.

use super::{unsupported, Limit, Rule, Schema, SchemaType};
use crate::error::context;
use crate::options::ValidationOptions;
use crate::reference::Reference;
use crate::validation::State;
use crate::value::Value;

const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

impl Schema {
    /// Lower bound: minimum size, or minimum number or date.
    ///
    /// # Example
    ///
    /// ```rust
    /// use valuate::{Reference, Schema};
    /// use serde_json::json;
    ///
    /// let schema = Schema::object().keys([
    ///     ("min", Schema::number()),
    ///     ("max", Schema::number().min(Reference::new("min"))),
    /// ]);
    ///
    /// let error = schema.validate(json!({"min": 5, "max": 3})).error.unwrap();
    /// assert_eq!(error.details[0].code, "number.min");
    /// assert_eq!(error.details[0].context.get("limit"), Some(&5.into()));
    /// ```
    pub fn min(self, limit: impl Into<Limit>) -> Self {
        let limit = limit.into();
        match self.schema_type() {
            SchemaType::String | SchemaType::Array | SchemaType::Object | SchemaType::Binary => {
                self.size_rule("min", limit, |size, bound| size >= bound)
            }
            SchemaType::Number => self.number_compare("min", limit, |value, bound| value >= bound),
            SchemaType::Date => self.date_compare("min", limit, |value, bound| value >= bound),
            other => unsupported(other, "min"),
        }
    }

    /// Upper bound: maximum size, or maximum number or date.
    pub fn max(mut self, limit: impl Into<Limit>) -> Self {
        let limit = limit.into();
        match self.schema_type() {
            SchemaType::String | SchemaType::Array | SchemaType::Object | SchemaType::Binary => {
                self.note_max_length(&limit);
                self.size_rule("max", limit, |size, bound| size <= bound)
            }
            SchemaType::Number => self.number_compare("max", limit, |value, bound| value <= bound),
            SchemaType::Date => self.date_compare("max", limit, |value, bound| value <= bound),
            other => unsupported(other, "max"),
        }
    }

    /// Exact size.
    pub fn length(self, limit: impl Into<Limit>) -> Self {
        let limit = limit.into();
        match self.schema_type() {
            SchemaType::String | SchemaType::Array | SchemaType::Object | SchemaType::Binary => {
                self.size_rule("length", limit, |size, bound| size == bound)
            }
            other => unsupported(other, "length"),
        }
    }

    /// Strict lower bound for numbers and dates.
    pub fn greater(self, limit: impl Into<Limit>) -> Self {
        let limit = limit.into();
        match self.schema_type() {
            SchemaType::Number => self.number_compare("greater", limit, |value, bound| value > bound),
            SchemaType::Date => self.date_compare("greater", limit, |value, bound| value > bound),
            other => unsupported(other, "greater"),
        }
    }

    /// Strict upper bound for numbers and dates.
    pub fn less(self, limit: impl Into<Limit>) -> Self {
        let limit = limit.into();
        match self.schema_type() {
            SchemaType::Number => self.number_compare("less", limit, |value, bound| value < bound),
            SchemaType::Date => self.date_compare("less", limit, |value, bound| value < bound),
            other => unsupported(other, "less"),
        }
    }

    fn size_rule(mut self, name: &'static str, limit: Limit, compare: fn(usize, usize) -> bool) -> Self {
        let literal = limit.expect_size(name);
        if let Some(reference) = limit.reference() {
            self.push_ref(reference);
        }
        let type_name = self.schema_type().as_str();
        let code = format!("{type_name}.{name}");
        let ref_code = format!("{type_name}.ref");
        let arg = Some(limit.describe());

        self.push_rule(Rule::new(name, arg, move |schema, value, state, options| {
            let Some(size) = size_of(value) else {
                return Ok(None);
            };
            let bound = match (literal, limit.reference()) {
                (Some(bound), _) => bound,
                (None, Some(reference)) => match resolve_size(reference, state, options) {
                    Some(bound) => bound,
                    None => {
                        return Err(schema.error_at(
                            &ref_code,
                            context([("ref", Value::from(reference.key()))]),
                            state,
                            options,
                        ))
                    }
                },
                (None, None) => return Ok(None),
            };
            if compare(size, bound) {
                Ok(None)
            } else {
                Err(schema.error_at(
                    &code,
                    context([("limit", Value::from(bound)), ("value", value.clone())]),
                    state,
                    options,
                ))
            }
        }))
    }
}

fn size_of(value: &Value) -> Option<usize> {
    match value {
        Value::String(s) => Some(s.chars().count()),
        Value::Array(items) => Some(items.len()),
        Value::Object(map) => Some(map.len()),
        Value::Binary(bytes) => Some(bytes.len()),
        _ => None,
    }
}

fn resolve_size(reference: &Reference, state: &State<'_>, options: &ValidationOptions) -> Option<usize> {
    match reference.resolve(state.lookup_target(), options) {
        Value::Number(n) if n >= 0.0 && n.fract() == 0.0 && n <= MAX_SAFE_INTEGER => Some(n as usize),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sizes_per_type() {
        assert!(Schema::array().min(2).validate(json!([1])).error.is_some());
        assert!(Schema::object().max(1).validate(json!({"a": 1, "b": 2})).error.is_some());
        assert!(Schema::binary().length(3).validate("abc").error.is_none());
    }

    #[test]
    fn test_size_context() {
        let error = Schema::array().max(1).validate(json!([1, 2])).error.unwrap();
        assert_eq!(error.details[0].code, "array.max");
        assert_eq!(error.details[0].context.get("limit"), Some(&Value::from(1)));
        assert_eq!(error.message, "\"value\" must contain less than or equal to 1 items");
    }

    #[test]
    fn test_array_ref_must_be_integer() {
        let schema = Schema::object().keys([
            ("n", Schema::any()),
            ("list", Schema::array().max(Reference::new("n"))),
        ]);
        let error = schema.validate(json!({"n": 1.5, "list": []})).error.unwrap();
        assert_eq!(error.details[0].code, "array.ref");
        assert_eq!(error.details[0].context.get("ref"), Some(&Value::from("n")));
    }

    #[test]
    fn test_ref_is_recorded() {
        let schema = Schema::string().min(Reference::new("other.len"));
        assert_eq!(schema.refs(), ["other"]);
    }

    #[test]
    #[should_panic(expected = "not supported on boolean schemas")]
    fn test_boolean_has_no_min() {
        let _ = Schema::boolean().min(1);
    }
}
