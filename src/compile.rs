//! Turning schema-like literals into schemas.
//!
//! Anywhere a builder accepts a child schema it also accepts a literal:
//!
//! | input                   | schema                              |
//! |-------------------------|-------------------------------------|
//! | a [`Schema`]            | unchanged                           |
//! | a JSON object / `Keys`  | `object().keys(..)`, recursively    |
//! | a JSON array            | `alternatives().try_all(..)`        |
//! | a [`Regex`]             | `string().regex(..)`                |
//! | a date                  | `date().valid(date)`                |
//! | a string/number/boolean | `<type>().valid(value)`             |
//! | a [`Reference`]         | `any().valid(reference)`            |
//! | `null`                  | `any().valid(null)`                 |
//!
//! # Example
//!
//! ```rust
//! use valuate::compile;
//! use serde_json::json;
//!
//! let schema = compile(json!({"kind": ["a", "b"], "count": 1})).unwrap();
//! assert!(schema.validate(json!({"kind": "b", "count": 1})).error.is_none());
//! assert!(schema.validate(json!({"kind": "c"})).error.is_some());
//! ```

use chrono::{DateTime, Utc};
use regex::Regex;

use crate::error::BuildError;
use crate::reference::Reference;
use crate::schema::{RegexOptions, Schema};
use crate::value::Value;

/// Anything that compiles to a [`Schema`].
#[derive(Debug, Clone)]
pub enum SchemaLike {
    Schema(Schema),
    Value(Value),
    Ref(Reference),
    Regex(Regex),
    /// Children of an object schema.
    Keys(Vec<(String, SchemaLike)>),
    /// Candidates of an alternatives schema.
    Alternatives(Vec<SchemaLike>),
}

impl From<Schema> for SchemaLike {
    fn from(schema: Schema) -> Self {
        SchemaLike::Schema(schema)
    }
}

impl From<Reference> for SchemaLike {
    fn from(reference: Reference) -> Self {
        SchemaLike::Ref(reference)
    }
}

impl From<Regex> for SchemaLike {
    fn from(regex: Regex) -> Self {
        SchemaLike::Regex(regex)
    }
}

impl From<Value> for SchemaLike {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => SchemaLike::Keys(
                map.into_iter()
                    .map(|(key, value)| (key, SchemaLike::from(value)))
                    .collect(),
            ),
            Value::Array(items) => SchemaLike::Alternatives(items.into_iter().map(SchemaLike::from).collect()),
            other => SchemaLike::Value(other),
        }
    }
}

impl From<serde_json::Value> for SchemaLike {
    fn from(value: serde_json::Value) -> Self {
        SchemaLike::from(Value::from(value))
    }
}

impl From<Vec<SchemaLike>> for SchemaLike {
    fn from(items: Vec<SchemaLike>) -> Self {
        SchemaLike::Alternatives(items)
    }
}

macro_rules! impl_literal_like {
    ($($t:ty),*) => {
        $(
            impl From<$t> for SchemaLike {
                fn from(value: $t) -> Self {
                    SchemaLike::Value(Value::from(value))
                }
            }
        )*
    };
}

impl_literal_like!(&str, String, bool, f64, i32, i64, u32, u64, usize, DateTime<Utc>);

/// Compiles a schema-like value.
///
/// # Errors
///
/// `undefined` and function literals are not schemas, and compiling an
/// empty candidate list or malformed children fails the same way the
/// corresponding builder would.
pub fn compile(like: impl Into<SchemaLike>) -> Result<Schema, BuildError> {
    match like.into() {
        SchemaLike::Schema(schema) => Ok(schema),
        SchemaLike::Ref(reference) => Ok(Schema::any().valid([reference])),
        SchemaLike::Regex(regex) => Ok(Schema::string().regex_with(regex, RegexOptions::default())),
        SchemaLike::Keys(children) => Schema::object().try_keys(children),
        SchemaLike::Alternatives(candidates) => {
            if candidates.is_empty() {
                return Err(BuildError::InvalidArgument(
                    "cannot add other alternatives without at least one schema".to_string(),
                ));
            }
            let schemas = candidates.into_iter().map(compile).collect::<Result<Vec<_>, _>>()?;
            Ok(Schema::alternatives().try_all(schemas))
        }
        SchemaLike::Value(value) => match value {
            Value::Null => Ok(Schema::any().valid([Value::Null])),
            Value::String(_) => Ok(Schema::string().valid([value])),
            Value::Number(_) => Ok(Schema::number().valid([value])),
            Value::Bool(_) => Ok(Schema::boolean().valid([value])),
            Value::Date(_) => Ok(Schema::date().valid([value])),
            Value::Binary(_) => Ok(Schema::binary().valid([value])),
            Value::Object(_) | Value::Array(_) => compile(SchemaLike::from(value)),
            Value::Undefined | Value::Function(_) => Err(BuildError::InvalidArgument(format!(
                "invalid schema content: {}",
                value.type_name()
            ))),
        },
    }
}

/// Compiles `like` for a builder that cannot report errors.
///
/// # Panics
///
/// When `like` does not compile; `label` names the offending argument.
pub(crate) fn expect_schema(like: SchemaLike, label: &str) -> Schema {
    compile(like).unwrap_or_else(|error| panic!("invalid schema for {label}: {error}"))
}
