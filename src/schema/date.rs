//! Date schema.
//!
//! When converting, numbers are read as milliseconds since the epoch
//! (seconds for [`TimestampUnit::Unix`]), numeric strings as numbers, and
//! other strings as dates. Without conversion only [`Value::Date`] passes.
//!
//! # Example
//!
//! ```rust
//! use valuate::{Schema, Value};
//!
//! let schema = Schema::date().timestamp(valuate::TimestampUnit::Unix);
//! let date = schema.validate(86_400).value;
//! assert_eq!(date.to_string(), "1970-01-02T00:00:00.000Z");
//!
//! let error = Schema::date().validate("not a date").error.unwrap();
//! assert_eq!(error.details[0].code, "date.base");
//! ```

use chrono::{DateTime, Utc};

use super::engine::Coerced;
use super::{unsupported, Kind, Limit, Rule, Schema};
use crate::error::context;
use crate::formats;
use crate::options::ValidationOptions;
use crate::validation::State;
use crate::value::Value;

/// Unit of numeric timestamps accepted by [`Schema::timestamp`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimestampUnit {
    /// Milliseconds.
    #[default]
    Javascript,
    /// Seconds.
    Unix,
}

impl TimestampUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimestampUnit::Javascript => "javascript",
            TimestampUnit::Unix => "unix",
        }
    }

    fn multiplier(&self) -> f64 {
        match self {
            TimestampUnit::Javascript => 1.0,
            TimestampUnit::Unix => 1000.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct DateInner {
    /// Only ISO 8601 strings are converted.
    pub iso: bool,
    pub timestamp: Option<TimestampUnit>,
}

impl DateInner {
    pub(crate) fn base(
        &self,
        schema: &Schema,
        value: Value,
        state: &State<'_>,
        options: &ValidationOptions,
    ) -> Coerced {
        if let Value::Date(_) = value {
            return Coerced::ok(value);
        }
        if options.convert {
            if let Some(date) = to_date(&value, self.iso, self.timestamp) {
                return Coerced::ok(Value::Date(date));
            }
        }

        let code = if !options.convert {
            "date.strict".to_string()
        } else if self.iso {
            "date.isoDate".to_string()
        } else if let Some(unit) = self.timestamp {
            format!("date.timestamp.{}", unit.as_str())
        } else {
            "date.base".to_string()
        };
        let error = schema.error_at(&code, context([("value", value.clone())]), state, options);
        Coerced::failed(value, error)
    }
}

/// Converts a value to a date the way the base step does.
pub(crate) fn to_date(value: &Value, iso: bool, timestamp: Option<TimestampUnit>) -> Option<DateTime<Utc>> {
    let number = match value {
        Value::Date(date) => return Some(*date),
        Value::Number(n) if n.is_finite() => Some(*n),
        Value::String(s) if formats::is_numeric(s) => s.parse::<f64>().ok(),
        Value::String(_) => None,
        _ => return None,
    };

    if iso {
        return match (number, value) {
            (Some(n), _) => {
                let text = crate::value::format_number(n);
                formats::is_iso_date(&text).then(|| formats::date_from_millis(n)).flatten()
            }
            (None, Value::String(s)) if formats::is_iso_date(s) => formats::parse_date(s),
            _ => None,
        };
    }

    if let Some(unit) = timestamp {
        let millis = match (number, value) {
            (Some(n), _) => n,
            (None, Value::String(s)) => s.trim().parse::<f64>().ok()?,
            _ => return None,
        };
        return formats::date_from_millis(millis * unit.multiplier());
    }

    match (number, value) {
        (Some(n), _) => formats::date_from_millis(n),
        (None, Value::String(s)) => formats::parse_date(s),
        _ => None,
    }
}

impl Schema {
    fn date_inner(&mut self, builder: &str) -> &mut DateInner {
        let schema_type = self.schema_type();
        match &mut self.kind {
            Kind::Date(inner) => inner,
            _ => unsupported(schema_type, builder),
        }
    }

    /// Only converts ISO 8601 strings.
    pub fn iso(mut self) -> Self {
        self.date_inner("iso").iso = true;
        self
    }

    /// Reads numbers as timestamps in `unit`.
    pub fn timestamp(mut self, unit: TimestampUnit) -> Self {
        self.date_inner("timestamp").timestamp = Some(unit);
        self
    }

    /// Adds a rule comparing the date with `limit`.
    pub(crate) fn date_compare(mut self, name: &'static str, limit: Limit, compare: fn(i64, i64) -> bool) -> Self {
        let limit = match limit {
            Limit::Number(n) => match formats::date_from_millis(n) {
                Some(date) => Limit::Date(date),
                None => panic!("invalid date format for {name}: {n}"),
            },
            Limit::Ref(reference) => {
                self.push_ref(&reference);
                Limit::Ref(reference)
            }
            other => other,
        };
        let code = format!("date.{name}");
        let arg = Some(limit.describe());

        self.push_rule(Rule::new(name, arg, move |schema, value, state, options| {
            let Some(date) = value.as_date() else {
                return Ok(None);
            };
            let bound = match &limit {
                Limit::Date(bound) => *bound,
                Limit::Now => Utc::now(),
                Limit::Ref(reference) => {
                    let resolved = reference.resolve(state.lookup_target(), options);
                    match to_date(&resolved, false, None) {
                        Some(bound) => bound,
                        None => {
                            return Err(schema.error_at(
                                "date.ref",
                                context([("ref", Value::from(reference.key()))]),
                                state,
                                options,
                            ))
                        }
                    }
                }
                Limit::Number(_) => return Ok(None),
            };
            if compare(date.timestamp_millis(), bound.timestamp_millis()) {
                Ok(None)
            } else {
                Err(schema.error_at(
                    &code,
                    context([("limit", Value::Date(bound)), ("value", value.clone())]),
                    state,
                    options,
                ))
            }
        }))
    }
}
