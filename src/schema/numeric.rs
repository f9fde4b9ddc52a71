//! Number schema.
//!
//! Numbers are IEEE doubles. When conversion is enabled, numeric strings
//! are parsed and values are rounded to the configured precision before any
//! rule runs. `NaN` is never a valid number; the infinities are rejected by
//! default through the denied set and can be re-allowed with
//! [`Schema::allow`].
//!
//! # Example
//!
//! ```rust
//! use valuate::Schema;
//!
//! let schema = Schema::number().precision(2).min(0);
//! assert_eq!(schema.validate("1.239").value, 1.24.into());
//!
//! let error = schema.validate(-1).error.unwrap();
//! assert_eq!(error.message, "\"value\" must be larger than or equal to 0");
//! ```

use super::engine::Coerced;
use super::{unsupported, Kind, Limit, Rule, Schema};
use crate::error::context;
use crate::options::ValidationOptions;
use crate::validation::State;
use crate::value::{format_number, Value};

const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

#[derive(Debug, Clone, Default)]
pub(crate) struct NumberInner {
    /// Decimal places kept when converting.
    pub precision: Option<u32>,
}

impl NumberInner {
    pub(crate) fn base(
        &self,
        schema: &Schema,
        value: Value,
        state: &State<'_>,
        options: &ValidationOptions,
    ) -> Coerced {
        let mut value = match value {
            Value::String(s) if options.convert => Value::Number(parse_number(&s).unwrap_or(f64::NAN)),
            other => other,
        };

        let number = match value {
            Value::Number(n) if !n.is_nan() => n,
            _ => {
                let error = schema.error_at("number.base", context([("value", value.clone())]), state, options);
                return Coerced::failed(value, error);
            }
        };

        if options.convert {
            if let Some(places) = self.precision {
                let factor = 10f64.powi(places as i32);
                value = Value::Number(round_half_up(number * factor) / factor);
            }
        }
        Coerced::ok(value)
    }
}

/// Parses a numeric string; surrounding whitespace is ignored and
/// non-finite spellings are rejected.
fn parse_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    let lower = trimmed.to_ascii_lowercase();
    if lower.contains("inf") || lower.contains("nan") {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Rounds halves towards positive infinity.
fn round_half_up(n: f64) -> f64 {
    (n + 0.5).floor()
}

/// Number of decimal places needed to write `n`.
fn decimal_places(n: f64) -> usize {
    let text = format_number(n);
    match text.split_once('.') {
        Some((_, fraction)) => fraction.len(),
        None => 0,
    }
}

fn is_safe_integer(n: f64) -> bool {
    n.is_finite() && n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER
}

impl Schema {
    fn number_inner(&mut self, builder: &str) -> &mut NumberInner {
        let schema_type = self.schema_type();
        match &mut self.kind {
            Kind::Number(inner) => inner,
            _ => unsupported(schema_type, builder),
        }
    }

    /// Adds a rule comparing the number with `limit`.
    pub(crate) fn number_compare(
        mut self,
        name: &'static str,
        limit: Limit,
        compare: fn(f64, f64) -> bool,
    ) -> Self {
        match &limit {
            Limit::Number(n) if n.is_nan() => panic!("{name} limit must be a number or reference"),
            Limit::Number(_) => {}
            Limit::Ref(reference) => self.push_ref(reference),
            other => panic!("{name} limit must be a number or reference, got {other:?}"),
        }
        let code = format!("number.{name}");
        let arg = Some(limit.describe());

        self.push_rule(Rule::new(name, arg, move |schema, value, state, options| {
            let Some(number) = value.as_f64() else {
                return Ok(None);
            };
            let bound = match &limit {
                Limit::Ref(reference) => match reference.resolve(state.lookup_target(), options) {
                    Value::Number(n) if !n.is_nan() => n,
                    _ => {
                        return Err(schema.error_at(
                            "number.ref",
                            context([("ref", Value::from(reference.key()))]),
                            state,
                            options,
                        ))
                    }
                },
                Limit::Number(n) => *n,
                _ => return Ok(None),
            };
            if compare(number, bound) {
                Ok(None)
            } else {
                Err(schema.error_at(
                    &code,
                    context([("limit", Value::Number(bound)), ("value", value.clone())]),
                    state,
                    options,
                ))
            }
        }))
    }

    /// Requires a safe integer.
    pub fn integer(mut self) -> Self {
        self.number_inner("integer");
        self.number_test("integer", "number.integer", is_safe_integer)
    }

    /// Requires a value greater than zero.
    pub fn positive(mut self) -> Self {
        self.number_inner("positive");
        self.number_test("positive", "number.positive", |n| n > 0.0)
    }

    /// Requires a value less than zero.
    pub fn negative(mut self) -> Self {
        self.number_inner("negative");
        self.number_test("negative", "number.negative", |n| n < 0.0)
    }

    /// Requires a TCP/UDP port number.
    pub fn port(mut self) -> Self {
        self.number_inner("port");
        self.number_test("port", "number.port", |n| {
            is_safe_integer(n) && (0.0..=65535.0).contains(&n)
        })
    }

    fn number_test(self, name: &'static str, code: &'static str, check: fn(f64) -> bool) -> Self {
        self.push_rule(Rule::new(name, None, move |schema, value, state, options| {
            match value.as_f64() {
                Some(n) if !check(n) => Err(schema.error_at(code, context([("value", value.clone())]), state, options)),
                _ => Ok(None),
            }
        }))
    }

    /// Limits the number of decimal places. Converted values are rounded;
    /// without conversion extra places fail with `number.precision`.
    ///
    /// # Panics
    ///
    /// When a precision was already set.
    pub fn precision(mut self, places: u32) -> Self {
        let inner = self.number_inner("precision");
        assert!(inner.precision.is_none(), "precision already set");
        inner.precision = Some(places);

        self.push_rule(Rule::new(
            "precision",
            Some(serde_json::Value::from(places)),
            move |schema, value, state, options| {
                let Some(n) = value.as_f64() else {
                    return Ok(None);
                };
                if decimal_places(n) <= places as usize {
                    return Ok(None);
                }
                Err(schema.error_at(
                    "number.precision",
                    context([("limit", Value::from(places)), ("value", value.clone())]),
                    state,
                    options,
                ))
            },
        ))
    }

    /// Requires a multiple of `base`, a positive number or a reference.
    ///
    /// # Example
    ///
    /// ```rust
    /// use valuate::Schema;
    ///
    /// let schema = Schema::number().multiple(3);
    /// assert!(schema.validate(9).error.is_none());
    /// assert_eq!(schema.validate(10).error.unwrap().message, "\"value\" must be a multiple of 3");
    /// ```
    pub fn multiple(mut self, base: impl Into<Limit>) -> Self {
        self.number_inner("multiple");
        let base = base.into();
        match &base {
            Limit::Number(n) if n.is_finite() && *n > 0.0 => {}
            Limit::Ref(reference) => self.push_ref(reference),
            other => panic!("multiple must be a positive number or reference, got {other:?}"),
        }
        let arg = Some(base.describe());

        self.push_rule(Rule::new("multiple", arg, move |schema, value, state, options| {
            let Some(n) = value.as_f64() else {
                return Ok(None);
            };
            let divisor = match &base {
                Limit::Number(divisor) => *divisor,
                Limit::Ref(reference) => match reference.resolve(state.lookup_target(), options) {
                    Value::Number(divisor) if !divisor.is_nan() => divisor,
                    _ => {
                        return Err(schema.error_at(
                            "number.ref",
                            context([("ref", Value::from(reference.key()))]),
                            state,
                            options,
                        ))
                    }
                },
                _ => return Ok(None),
            };
            if n % divisor == 0.0 {
                Ok(None)
            } else {
                Err(schema.error_at(
                    "number.multiple",
                    context([("multiple", Value::Number(divisor)), ("value", value.clone())]),
                    state,
                    options,
                ))
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::Reference;
    use serde_json::json;

    fn code(schema: &Schema, value: impl Into<Value>) -> Option<String> {
        schema.validate(value).error.map(|e| e.details[0].code.clone())
    }

    #[test]
    fn test_number_base() {
        let schema = Schema::number();
        assert_eq!(code(&schema, "abc"), Some("number.base".to_string()));
        assert_eq!(code(&schema, Value::Number(f64::NAN)), Some("number.base".to_string()));
        assert_eq!(code(&schema, true), Some("number.base".to_string()));
        assert_eq!(schema.validate(" 12 ").value, Value::from(12));
        assert_eq!(schema.validate("1e3").value, Value::from(1000));
    }

    #[test]
    fn test_numeric_strings_rejected_without_conversion() {
        let options = ValidationOptions::default().with_convert(false);
        let error = Schema::number().validate_with("1", &options).error.unwrap();
        assert_eq!(error.details[0].code, "number.base");
    }

    #[test]
    fn test_infinity_rejected_unless_allowed() {
        assert_eq!(code(&Schema::number(), f64::INFINITY), Some("any.invalid".to_string()));
        assert_eq!(code(&Schema::number(), "Infinity"), Some("number.base".to_string()));
        assert_eq!(code(&Schema::number().allow([f64::INFINITY]), f64::INFINITY), None);
    }

    #[test]
    fn test_bounds() {
        let schema = Schema::number().greater(1).less(3);
        assert_eq!(code(&schema, 2), None);
        assert_eq!(code(&schema, 1), Some("number.greater".to_string()));
        assert_eq!(code(&schema, 3), Some("number.less".to_string()));
    }

    #[test]
    fn test_reference_limits() {
        let schema = Schema::object().keys([
            ("low", Schema::any()),
            ("high", Schema::number().greater(Reference::new("low"))),
        ]);
        assert!(schema.validate(json!({"low": 1, "high": 2})).is_ok());
        let error = schema.validate(json!({"low": "x", "high": 2})).error.unwrap();
        assert_eq!(error.details[0].code, "number.ref");
        assert_eq!(
            error.message,
            "child \"high\" fails because [\"high\" references \"low\" which is not a number]"
        );
    }

    #[test]
    fn test_integer_and_sign() {
        assert_eq!(code(&Schema::number().integer(), 1.5), Some("number.integer".to_string()));
        assert_eq!(code(&Schema::number().integer(), 2), None);
        assert_eq!(code(&Schema::number().integer(), 2f64.powi(60)), Some("number.integer".to_string()));
        assert_eq!(code(&Schema::number().positive(), 0), Some("number.positive".to_string()));
        assert_eq!(code(&Schema::number().negative(), -0.5), None);
    }

    #[test]
    fn test_port() {
        let schema = Schema::number().port();
        assert_eq!(code(&schema, 65535), None);
        assert_eq!(code(&schema, 65536), Some("number.port".to_string()));
        assert_eq!(code(&schema, 80.5), Some("number.port".to_string()));
    }

    #[test]
    fn test_precision_rounds_or_rejects() {
        let schema = Schema::number().precision(1);
        assert_eq!(schema.validate(1.25).value, Value::from(1.3));
        let options = ValidationOptions::default().with_convert(false);
        let error = schema.validate_with(1.25, &options).error.unwrap();
        assert_eq!(error.details[0].code, "number.precision");
        assert_eq!(error.message, "\"value\" must have no more than 1 decimal places");
    }

    #[test]
    fn test_multiple() {
        let schema = Schema::number().multiple(0.5);
        assert_eq!(code(&schema, 1.5), None);
        assert_eq!(code(&schema, 1.2), Some("number.multiple".to_string()));
    }

    #[test]
    #[should_panic(expected = "positive number")]
    fn test_multiple_rejects_zero() {
        let _ = Schema::number().multiple(0);
    }

    #[test]
    fn test_decimal_places() {
        assert_eq!(decimal_places(1.0), 0);
        assert_eq!(decimal_places(1.25), 2);
        assert_eq!(decimal_places(1e-7), 7);
    }
}
