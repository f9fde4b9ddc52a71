//! Array schema.
//!
//! Item schemas added with [`Schema::items`] are sorted by presence:
//! required schemas must each be matched by at least one item, forbidden
//! schemas must match no item, and the rest are allowed alternatives for
//! every item. Schemas added with [`Schema::ordered`] match items by
//! position instead.
//!
//! Items are checked in this order: sparse holes, exclusions, the ordered
//! schema for the position, the remaining required schemas, then the
//! inclusions. Each item is reported at its own path (`[.., index]`).
//!
//! # Example
//!
//! ```rust
//! use valuate::Schema;
//! use serde_json::json;
//!
//! let schema = Schema::array().items([
//!     Schema::string().label("name").required(),
//!     Schema::number(),
//! ]);
//!
//! assert!(schema.validate(json!([1, "a", 2])).error.is_none());
//!
//! let error = schema.validate(json!([1, 2])).error.unwrap();
//! assert_eq!(error.message, "\"value\" does not contain [name]");
//! ```

use std::collections::hash_map::{Entry, HashMap};
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::engine::{Coerced, Outcome};
use super::{unsupported, Kind, Rule, Schema};
use crate::compile::{expect_schema, SchemaLike};
use crate::error::{context, Context, SchemaError};
use crate::options::{Presence, ValidationOptions};
use crate::path::PathSegment;
use crate::validation::State;
use crate::value::Value;

/// Decides whether two items are duplicates.
pub type Comparator = Arc<dyn Fn(&Value, &Value) -> bool + Send + Sync>;

/// Options for [`Schema::unique`].
///
/// By default items are compared structurally.
#[derive(Clone, Default)]
pub struct Unique {
    /// Dotted path of the member compared instead of the whole item.
    pub path: Option<String>,
    pub comparator: Option<Comparator>,
    /// `undefined` items are never duplicates.
    pub ignore_undefined: bool,
}

impl Unique {
    /// Compares the member at the dotted `path` of every item.
    pub fn by_path(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    /// Compares items with `comparator`.
    pub fn by<F>(comparator: F) -> Self
    where
        F: Fn(&Value, &Value) -> bool + Send + Sync + 'static,
    {
        Self {
            comparator: Some(Arc::new(comparator)),
            ..Self::default()
        }
    }

    pub fn ignore_undefined(mut self, enabled: bool) -> Self {
        self.ignore_undefined = enabled;
        self
    }

    fn describe(&self) -> Option<serde_json::Value> {
        let mut arg = serde_json::Map::new();
        if let Some(path) = &self.path {
            arg.insert("path".to_string(), serde_json::Value::String(path.clone()));
        }
        if self.comparator.is_some() {
            arg.insert("comparator".to_string(), serde_json::Value::String("[function]".to_string()));
        }
        if self.ignore_undefined {
            arg.insert("ignoreUndefined".to_string(), serde_json::Value::Bool(true));
        }
        (!arg.is_empty()).then_some(serde_json::Value::Object(arg))
    }
}

impl fmt::Debug for Unique {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unique")
            .field("path", &self.path)
            .field("comparator", &self.comparator.as_ref().map(|_| ".."))
            .field("ignore_undefined", &self.ignore_undefined)
            .finish()
    }
}

/// Hashable identity of a scalar item, so duplicate scalars are found
/// without comparing against every earlier item.
#[derive(Debug, PartialEq, Eq, Hash)]
enum PrimitiveKey<'a> {
    Undefined,
    Null,
    Bool(bool),
    /// Bit pattern with `-0` folded into `0` and every NaN into one.
    Number(u64),
    String(&'a str),
    Date(&'a DateTime<Utc>),
}

impl<'a> PrimitiveKey<'a> {
    fn of(value: &'a Value) -> Option<Self> {
        Some(match value {
            Value::Undefined => PrimitiveKey::Undefined,
            Value::Null => PrimitiveKey::Null,
            Value::Bool(b) => PrimitiveKey::Bool(*b),
            Value::Number(n) if n.is_nan() => PrimitiveKey::Number(f64::NAN.to_bits()),
            Value::Number(n) if *n == 0.0 => PrimitiveKey::Number(0f64.to_bits()),
            Value::Number(n) => PrimitiveKey::Number(n.to_bits()),
            Value::String(s) => PrimitiveKey::String(s),
            Value::Date(d) => PrimitiveKey::Date(d),
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct ArrayInner {
    /// Every schema passed to `items`, in order.
    pub items: Vec<Schema>,
    pub ordereds: Vec<Schema>,
    pub inclusions: Vec<Schema>,
    pub exclusions: Vec<Schema>,
    pub requireds: Vec<Schema>,
    pub sparse: bool,
    pub single: bool,
}

/// A schema an item may match, from the inclusions or the original
/// required list.
#[derive(Clone, Copy)]
enum Candidate {
    Inclusion(usize),
    Required(usize),
}

impl ArrayInner {
    pub(crate) fn base(
        &self,
        schema: &Schema,
        value: Value,
        state: &State<'_>,
        options: &ValidationOptions,
    ) -> Coerced {
        let value = match value {
            Value::String(s) if options.convert => match serde_json::from_str::<serde_json::Value>(&s) {
                Ok(parsed @ serde_json::Value::Array(_)) => Value::from(parsed),
                _ => Value::String(s),
            },
            other => other,
        };

        let was_array = matches!(value, Value::Array(_));
        let mut items = match value {
            Value::Array(items) => items,
            other if options.convert && self.single => vec![other],
            other => {
                let error = schema.error_at("array.base", context([("value", other.clone())]), state, options);
                return Coerced::failed(other, error);
            }
        };

        let needs_check = !self.inclusions.is_empty()
            || !self.exclusions.is_empty()
            || !self.requireds.is_empty()
            || !self.ordereds.is_empty()
            || !self.sparse;
        if !needs_check {
            return Coerced::ok(Value::Array(items));
        }

        let original = items.clone();
        let errors = self.check_items(schema, &mut items, was_array, state, options);
        if errors.is_empty() {
            return Coerced::ok(Value::Array(items));
        }

        if was_array && options.convert && self.single {
            let mut wrapped = vec![Value::Array(original)];
            let retry = self.check_items(schema, &mut wrapped, was_array, state, options);
            if retry.is_empty() {
                return Coerced::ok(Value::Array(wrapped));
            }
            tracing::trace!(path = %state.path, "single-value retry failed");
        }
        Coerced {
            value: Value::Array(items),
            errors,
        }
    }

    fn check_items(
        &self,
        schema: &Schema,
        items: &mut Vec<Value>,
        was_array: bool,
        state: &State<'_>,
        options: &ValidationOptions,
    ) -> Vec<SchemaError> {
        let mut errors = Vec::new();
        let mut requireds: Vec<usize> = (0..self.requireds.len()).collect();
        let mut ordereds = self.ordereds.iter();
        let mut remaining_ordereds = self.ordereds.len();
        let strip_unknown = options.strip_unknown.arrays();

        let array_error = |code: &str, ctx: Context, index: usize| -> SchemaError {
            let path = if was_array {
                state.path.push_index(index)
            } else {
                state.path.clone()
            };
            schema.error_with(code, ctx, state.key.as_ref(), path, options)
        };

        let mut i = 0;
        while i < items.len() {
            let item = items[i].clone();
            let item_state = State {
                key: if was_array {
                    Some(PathSegment::index(i))
                } else {
                    state.key.clone()
                },
                path: if was_array {
                    state.path.push_index(i)
                } else {
                    state.path.clone()
                },
                parent: state.parent,
                reference: state.reference,
            };

            if !self.sparse && item.is_undefined() {
                errors.push(array_error("array.sparse", context([("pos", Value::from(i))]), i));
                if options.abort_early {
                    return errors;
                }
                if ordereds.next().is_some() {
                    remaining_ordereds -= 1;
                }
                i += 1;
                continue;
            }

            let defaults = ValidationOptions::default();
            let excluded = self
                .exclusions
                .iter()
                .any(|exclusion| exclusion.validate_node(item.clone(), &item_state, &defaults).is_ok());
            if excluded {
                let code = if was_array { "array.excludes" } else { "array.excludesSingle" };
                errors.push(array_error(code, context([("pos", Value::from(i)), ("value", item)]), i));
                if options.abort_early {
                    return errors;
                }
                if ordereds.next().is_some() {
                    remaining_ordereds -= 1;
                }
                i += 1;
                continue;
            }

            if !self.ordereds.is_empty() {
                if let Some(ordered) = ordereds.next() {
                    remaining_ordereds -= 1;
                    let outcome = ordered.validate_node(item.clone(), &item_state, options);
                    if !outcome.is_ok() {
                        errors.push(
                            array_error(
                                "array.ordered",
                                context([("pos", Value::from(i)), ("value", item)]),
                                i,
                            )
                            .with_reason(outcome.errors),
                        );
                        if options.abort_early {
                            return errors;
                        }
                    } else if outcome.stripped {
                        items.remove(i);
                        continue;
                    } else if !self.sparse && outcome.value.is_undefined() {
                        errors.push(array_error("array.sparse", context([("pos", Value::from(i))]), i));
                        if options.abort_early {
                            return errors;
                        }
                    } else {
                        items[i] = outcome.value;
                    }
                    i += 1;
                    continue;
                } else if self.items.is_empty() {
                    errors.push(array_error(
                        "array.orderedLength",
                        context([("pos", Value::from(i)), ("limit", Value::from(self.ordereds.len()))]),
                        i,
                    ));
                    if options.abort_early {
                        return errors;
                    }
                    i += 1;
                    continue;
                }
            }

            let mut required_checks: Vec<(usize, Outcome)> = Vec::new();
            let mut matched_required = None;
            for (position, &required) in requireds.iter().enumerate() {
                let outcome = self.requireds[required].validate_node(item.clone(), &item_state, options);
                if outcome.is_ok() {
                    items[i] = outcome.visible();
                    matched_required = Some(position);
                    break;
                }
                required_checks.push((required, outcome));
            }
            if let Some(position) = matched_required {
                requireds.remove(position);
                if !self.sparse && items[i].is_undefined() {
                    errors.push(array_error("array.sparse", context([("pos", Value::from(i))]), i));
                    if options.abort_early {
                        return errors;
                    }
                }
                i += 1;
                continue;
            }

            let mut matched = false;

            let candidates: Vec<Candidate> = (0..self.inclusions.len())
                .map(Candidate::Inclusion)
                .chain((0..self.requireds.len()).map(Candidate::Required))
                .collect();
            let single_candidate = candidates.len() == 1;
            let mut errored = false;
            let mut removed = false;
            for candidate in candidates {
                let previous = match candidate {
                    Candidate::Required(index) => required_checks
                        .iter()
                        .find(|(required, _)| *required == index)
                        .map(|(_, outcome)| outcome.clone()),
                    Candidate::Inclusion(_) => None,
                };
                let outcome = match previous {
                    Some(outcome) => outcome,
                    None => {
                        let inclusion = match candidate {
                            Candidate::Inclusion(index) => &self.inclusions[index],
                            Candidate::Required(index) => &self.requireds[index],
                        };
                        let outcome = inclusion.validate_node(item.clone(), &item_state, options);
                        if outcome.is_ok() {
                            if outcome.stripped {
                                items.remove(i);
                                removed = true;
                            } else if !self.sparse && outcome.value.is_undefined() {
                                errors.push(array_error("array.sparse", context([("pos", Value::from(i))]), i));
                                errored = true;
                            } else {
                                items[i] = outcome.value;
                            }
                            matched = true;
                            break;
                        }
                        outcome
                    }
                };

                if single_candidate {
                    if strip_unknown {
                        items.remove(i);
                        removed = true;
                        matched = true;
                        break;
                    }
                    let code = if was_array { "array.includesOne" } else { "array.includesOneSingle" };
                    errors.push(
                        array_error(code, context([("pos", Value::from(i)), ("value", item.clone())]), i)
                            .with_reason(outcome.errors),
                    );
                    errored = true;
                    if options.abort_early {
                        return errors;
                    }
                    break;
                }
            }
            if removed {
                continue;
            }
            if errored {
                i += 1;
                continue;
            }

            if !self.inclusions.is_empty() && !matched {
                if strip_unknown {
                    items.remove(i);
                    continue;
                }
                let code = if was_array { "array.includes" } else { "array.includesSingle" };
                errors.push(array_error(code, context([("pos", Value::from(i)), ("value", item)]), i));
                if options.abort_early {
                    return errors;
                }
            }
            i += 1;
        }

        if !requireds.is_empty() {
            let missed: Vec<&Schema> = requireds.iter().map(|&index| &self.requireds[index]).collect();
            errors.push(missed_error(schema, &missed, state, options));
        }
        if remaining_ordereds > 0 {
            let missed: Vec<&Schema> = self.ordereds[self.ordereds.len() - remaining_ordereds..]
                .iter()
                .filter(|ordered| ordered.presence() == Some(Presence::Required))
                .collect();
            if !missed.is_empty() {
                errors.push(missed_error(schema, &missed, state, options));
            }
        }
        errors
    }
}

/// Reports required item schemas no item matched.
fn missed_error(schema: &Schema, missed: &[&Schema], state: &State<'_>, options: &ValidationOptions) -> SchemaError {
    let known: Vec<Value> = missed
        .iter()
        .filter_map(|schema| schema.get_label())
        .map(Value::from)
        .collect();
    let unknown = missed.len() - known.len();

    let (code, ctx) = match (known.is_empty(), unknown) {
        (true, _) => (
            "array.includesRequiredUnknowns",
            context([("unknownMisses", Value::from(unknown))]),
        ),
        (false, 0) => ("array.includesRequiredKnowns", context([("knownMisses", Value::Array(known))])),
        (false, _) => (
            "array.includesRequiredBoth",
            context([
                ("knownMisses", Value::Array(known)),
                ("unknownMisses", Value::from(unknown)),
            ]),
        ),
    };
    schema.error_at(code, ctx, state, options)
}

/// The member of `item` at the dotted `path`.
fn reach(item: &Value, path: &str) -> Value {
    path.split('.')
        .try_fold(item, |current, segment| current.get(segment))
        .cloned()
        .unwrap_or(Value::Undefined)
}

impl Schema {
    fn array_inner(&mut self, builder: &str) -> &mut ArrayInner {
        let schema_type = self.schema_type();
        match &mut self.kind {
            Kind::Array(inner) => inner,
            _ => unsupported(schema_type, builder),
        }
    }

    /// Adds item schemas. Required schemas must be matched, forbidden
    /// schemas must not be, and every other schema is an allowed
    /// alternative.
    pub fn items<I>(mut self, schemas: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<SchemaLike>,
    {
        let inner = self.array_inner("items");
        for (position, schema) in schemas.into_iter().enumerate() {
            let schema = expect_schema(schema.into(), &format!("items[{position}]"));
            inner.items.push(schema.clone());
            match schema.presence() {
                Some(Presence::Required) => inner.requireds.push(schema),
                Some(Presence::Forbidden) => inner.exclusions.push(schema.optional()),
                _ => inner.inclusions.push(schema),
            }
        }
        self
    }

    /// Adds schemas matched against items by position. Items beyond the
    /// ordered schemas fall back to [`Schema::items`], and are rejected
    /// when there are none.
    ///
    /// # Example
    ///
    /// ```rust
    /// use valuate::Schema;
    /// use serde_json::json;
    ///
    /// let pair = Schema::array().ordered([Schema::string().required(), Schema::number().required()]);
    /// assert!(pair.validate(json!(["a", 1])).error.is_none());
    ///
    /// let error = pair.validate(json!(["a", 1, 2])).error.unwrap();
    /// assert_eq!(error.details[0].code, "array.orderedLength");
    /// ```
    pub fn ordered<I>(mut self, schemas: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<SchemaLike>,
    {
        let inner = self.array_inner("ordered");
        for (position, schema) in schemas.into_iter().enumerate() {
            inner.ordereds.push(expect_schema(schema.into(), &format!("ordered[{position}]")));
        }
        self
    }

    /// Allows `undefined` holes.
    pub fn sparse(mut self, enabled: bool) -> Self {
        self.array_inner("sparse").sparse = enabled;
        self
    }

    /// Accepts a single non-array value as a one-item array when
    /// converting.
    pub fn single(mut self, enabled: bool) -> Self {
        self.array_inner("single").single = enabled;
        self
    }

    /// Rejects duplicate items.
    ///
    /// # Example
    ///
    /// ```rust
    /// use valuate::{Schema, Unique};
    /// use serde_json::json;
    ///
    /// let schema = Schema::array().unique(Unique::by_path("id"));
    /// let error = schema.validate(json!([{"id": 1}, {"id": 2}, {"id": 1}])).error.unwrap();
    ///
    /// assert_eq!(error.details[0].code, "array.unique");
    /// assert_eq!(error.details[0].path.to_string(), "[2]");
    /// assert_eq!(error.details[0].context.get("dupePos"), Some(&0.into()));
    /// ```
    pub fn unique(mut self, settings: Unique) -> Self {
        self.array_inner("unique");
        let arg = settings.describe();
        self.push_rule(Rule::new("unique", arg, move |schema, value, state, options| {
            let Value::Array(items) = value else {
                return Ok(None);
            };
            let keyed: Vec<Value> = match &settings.path {
                Some(path) => items.iter().map(|item| reach(item, path)).collect(),
                None => items.clone(),
            };

            let mut seen: HashMap<PrimitiveKey<'_>, usize> = HashMap::new();
            let mut complex: Vec<usize> = Vec::new();
            for (i, current) in keyed.iter().enumerate() {
                if settings.ignore_undefined && settings.comparator.is_none() && current.is_undefined() {
                    continue;
                }
                let duplicate = match &settings.comparator {
                    Some(compare) => keyed[..i].iter().position(|previous| compare(previous, current)),
                    None => match PrimitiveKey::of(current) {
                        Some(key) => match seen.entry(key) {
                            Entry::Occupied(first) => Some(*first.get()),
                            Entry::Vacant(slot) => {
                                slot.insert(i);
                                None
                            }
                        },
                        None => {
                            let found = complex.iter().copied().find(|&j| keyed[j] == *current);
                            if found.is_none() {
                                complex.push(i);
                            }
                            found
                        }
                    },
                };
                if let Some(dupe) = duplicate {
                    let mut ctx = context([
                        ("pos", Value::from(i)),
                        ("value", items[i].clone()),
                        ("dupePos", Value::from(dupe)),
                        ("dupeValue", items[dupe].clone()),
                    ]);
                    if let Some(path) = &settings.path {
                        ctx.insert("path".to_string(), Value::from(path.as_str()));
                    }
                    return Err(schema.error_with(
                        "array.unique",
                        ctx,
                        state.key.as_ref(),
                        state.path.push_index(i),
                        options,
                    ));
                }
            }
            Ok(None)
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::StripUnknown;
    use serde_json::json;

    fn codes(schema: &Schema, value: serde_json::Value, options: &ValidationOptions) -> Vec<String> {
        schema
            .validate_with(value, options)
            .error
            .map(|e| e.details.iter().map(|d| d.code.clone()).collect())
            .unwrap_or_default()
    }

    fn all_errors() -> ValidationOptions {
        ValidationOptions::default().with_abort_early(false)
    }

    #[test]
    fn test_array_base() {
        let schema = Schema::array();
        assert!(schema.validate(json!([1, "a"])).is_ok());
        assert_eq!(codes(&schema, json!({}), &all_errors()), vec!["array.base"]);
        assert_eq!(schema.validate("[1,2]").value, Value::from(json!([1, 2])));
        assert_eq!(codes(&schema, json!("{}"), &all_errors()), vec!["array.base"]);
    }

    #[test]
    fn test_items_convert_values() {
        let schema = Schema::array().items([Schema::number()]);
        assert_eq!(schema.validate(json!(["1", 2])).value, Value::from(json!([1, 2])));
    }

    #[test]
    fn test_single_inclusion_reports_reason() {
        let schema = Schema::array().items([Schema::number()]);
        let error = schema.validate(json!([1, "x"])).error.unwrap();
        assert_eq!(error.details[0].code, "number.base");
        assert_eq!(error.details[0].path.to_string(), "[1]");
        assert_eq!(
            error.message,
            "\"value\" at position 1 fails because [\"1\" must be a number]"
        );
    }

    #[test]
    fn test_multiple_inclusions() {
        let schema = Schema::array().items([Schema::number(), Schema::boolean()]);
        let error = schema.validate(json!([1, true, "x"])).error.unwrap();
        assert_eq!(error.details[0].code, "array.includes");
        assert_eq!(
            error.message,
            "\"value\" at position 2 does not match any of the allowed types"
        );
    }

    #[test]
    fn test_exclusions() {
        let schema = Schema::array().items([Schema::string().forbidden()]);
        let error = schema.validate(json!([1, "a"])).error.unwrap();
        assert_eq!(error.details[0].code, "array.excludes");
        assert_eq!(error.details[0].context.get("pos"), Some(&Value::from(1)));
    }

    #[test]
    fn test_required_misses() {
        let schema = Schema::array().items([
            Schema::string().label("title").required(),
            Schema::number().required(),
            Schema::boolean(),
        ]);
        assert_eq!(
            codes(&schema, json!([true]), &all_errors()),
            vec!["array.includesRequiredBoth"]
        );
        let error = schema.validate(json!([true])).error.unwrap();
        assert_eq!(
            error.message,
            "\"value\" does not contain [title] and 1 other required value(s)"
        );

        let unknowns = Schema::array().items([Schema::number().required()]);
        let error = unknowns.validate(json!([])).error.unwrap();
        assert_eq!(error.message, "\"value\" does not contain 1 required value(s)");
    }

    #[test]
    fn test_ordered() {
        let schema = Schema::array().ordered([Schema::string(), Schema::number().required()]);
        assert_eq!(codes(&schema, json!([1, 2]), &all_errors()), vec!["string.base"]);
        assert_eq!(
            codes(&schema, json!(["a"]), &all_errors()),
            vec!["array.includesRequiredUnknowns"]
        );

        let with_items = Schema::array()
            .ordered([Schema::string()])
            .items([Schema::number()]);
        assert!(with_items.validate(json!(["a", 1, 2])).is_ok());
    }

    #[test]
    fn test_sparse() {
        let holes = Value::Array(vec![Value::from(1), Value::Undefined]);
        let error = Schema::array().validate(holes.clone()).error.unwrap();
        assert_eq!(error.details[0].code, "array.sparse");
        assert!(Schema::array().sparse(true).validate(holes).is_ok());
    }

    #[test]
    fn test_single() {
        let schema = Schema::array().items([Schema::number()]).single(true);
        assert_eq!(schema.validate(5).value, Value::from(json!([5])));
        let error = schema.validate("x").error.unwrap();
        assert_eq!(error.details[0].code, "number.base");
        assert_eq!(
            error.message,
            "single value of \"value\" fails because [\"value\" must be a number]"
        );

        let nested = Schema::array().items([Schema::array().items([Schema::number()])]).single(true);
        assert_eq!(nested.validate(json!([1, 2])).value, Value::from(json!([[1, 2]])));
    }

    #[test]
    fn test_strip_items() {
        let schema = Schema::array().items([Schema::number(), Schema::string().strip()]);
        assert_eq!(schema.validate(json!([1, "a", 2])).value, Value::from(json!([1, 2])));
    }

    #[test]
    fn test_strip_unknown_items() {
        let options = ValidationOptions::default().with_strip_unknown(StripUnknown::All(true));
        let schema = Schema::array().items([Schema::number()]);
        let result = schema.validate_with(json!([1, "x", 2]), &options);
        assert!(result.is_ok());
        assert_eq!(result.value, Value::from(json!([1, 2])));
    }

    #[test]
    fn test_unique_defaults() {
        let schema = Schema::array().unique(Unique::default());
        assert!(schema.validate(json!([1, "1", {"a": 1}, {"a": 2}])).is_ok());
        let error = schema.validate(json!([{"a": 1}, {"a": 1}])).error.unwrap();
        assert_eq!(error.message, "\"value\" position 1 contains a duplicate value");
    }

    #[test]
    fn test_unique_comparator_and_undefined() {
        let schema = Schema::array().unique(Unique::by(|a, b| {
            a.as_str().map(str::to_lowercase) == b.as_str().map(str::to_lowercase)
        }));
        assert!(schema.validate(json!(["a", "A"])).error.is_some());

        let holes = Value::Array(vec![Value::Undefined, Value::Undefined]);
        let lenient = Schema::array().sparse(true).unique(Unique::default().ignore_undefined(true));
        assert!(lenient.validate(holes.clone()).is_ok());
        let strict = Schema::array().sparse(true).unique(Unique::default());
        assert!(strict.validate(holes).error.is_some());
    }

    #[test]
    fn test_unique_finds_first_duplicate_in_large_arrays() {
        let schema = Schema::array().unique(Unique::default());
        let mut items: Vec<serde_json::Value> = (0..20_000).map(|n| json!(n)).collect();
        assert!(schema.validate(serde_json::Value::Array(items.clone())).is_ok());

        items.push(json!(17_345));
        items.push(json!(3));
        let error = schema.validate(serde_json::Value::Array(items)).error.unwrap();
        let detail = &error.details[0];
        assert_eq!(detail.path.to_string(), "[20000]");
        assert_eq!(detail.context.get("dupePos"), Some(&Value::from(17_345)));
        assert_eq!(detail.context.get("dupeValue"), Some(&Value::from(17_345)));
    }

    #[test]
    fn test_unique_scalar_identity() {
        let schema = Schema::array().unique(Unique::default());
        let zeros = Value::Array(vec![Value::from(0.0), Value::from(-0.0)]);
        assert!(schema.validate(zeros).error.is_some());
        let nans = Value::Array(vec![Value::from(f64::NAN), Value::from(1), Value::from(f64::NAN)]);
        let error = schema.validate(nans).error.unwrap();
        assert_eq!(error.details[0].context.get("dupePos"), Some(&Value::from(0)));
        assert!(schema.validate(json!([1, "1", true, null, [1], {"a": 1}])).is_ok());

        let error = schema.validate(json!(["x", [1, 2], "y", [1, 2]])).error.unwrap();
        assert_eq!(error.details[0].path.to_string(), "[3]");
        assert_eq!(error.details[0].context.get("dupePos"), Some(&Value::from(1)));
    }

    #[test]
    fn test_abort_early_stops_at_first_item() {
        let schema = Schema::array().items([Schema::number()]);
        assert_eq!(codes(&schema, json!(["a", "b"]), &ValidationOptions::default()).len(), 1);
        assert_eq!(codes(&schema, json!(["a", "b"]), &all_errors()).len(), 2);
    }
}
