//! Schema definitions.
//!
//! A [`Schema`] is an immutable description of what a value must look like.
//! Every builder consumes the schema and returns a modified copy, so a schema
//! can be shared, extended and reused freely:
//!
//! ```rust
//! use valuate::{Schema, Value};
//! use serde_json::json;
//!
//! let base = Schema::string().min(2);
//! let name = base.clone().max(10).required();
//!
//! assert!(base.validate("a").error.is_some());
//! assert!(name.validate("valuate").error.is_none());
//! assert!(name.validate(Value::Undefined).error.is_some());
//! ```
//!
//! Type-specific builders (`email`, `items`, `keys`, ...) panic when called
//! on a schema of another type, the same way a misspelled method fails to
//! compile. Builders whose arguments can be malformed at runtime (regular
//! expressions, conditions, extension rules) return
//! `Result<Schema, BuildError>` instead.

mod alternatives;
mod any;
mod array;
mod binary;
mod boolean;
mod concat;
mod date;
mod describe;
mod engine;
mod function;
mod lazy;
mod limits;
mod numeric;
mod object;
mod string;

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::error::SchemaError;
use crate::options::{Presence, Settings, ValidationOptions};
use crate::reference::Reference;
use crate::registry::Extension;
use crate::validation::State;
use crate::value::Value;
use crate::value_set::ValueSet;

pub use alternatives::{Condition, When};
pub use array::Unique;
pub use binary::Encoding;
pub use date::TimestampUnit;
pub use engine::ValidationResult;
pub use object::RenameOptions;
pub use string::{
    Base64Options, EmailOptions, GuidVersion, IpOptions, IpVersion, NormalizationForm,
    RegexOptions, UriOptions,
};

pub(crate) use alternatives::{AlternativesInner, Match};
pub(crate) use array::ArrayInner;
pub(crate) use binary::BinaryInner;
pub(crate) use boolean::BooleanInner;
pub(crate) use date::DateInner;
pub(crate) use engine::Outcome;
pub(crate) use lazy::LazyInner;
pub(crate) use numeric::NumberInner;
pub(crate) use object::ObjectInner;
pub(crate) use string::StringInner;

/// The built-in schema types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaType {
    Any,
    String,
    Number,
    Boolean,
    Date,
    Binary,
    Array,
    Object,
    Function,
    Alternatives,
    Lazy,
}

impl SchemaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaType::Any => "any",
            SchemaType::String => "string",
            SchemaType::Number => "number",
            SchemaType::Boolean => "boolean",
            SchemaType::Date => "date",
            SchemaType::Binary => "binary",
            SchemaType::Array => "array",
            SchemaType::Object => "object",
            SchemaType::Function => "func",
            SchemaType::Alternatives => "alternatives",
            SchemaType::Lazy => "lazy",
        }
    }
}

impl fmt::Display for SchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type-specific state.
#[derive(Clone)]
pub(crate) enum Kind {
    Any,
    String(StringInner),
    Number(NumberInner),
    Boolean(BooleanInner),
    Date(DateInner),
    Binary(BinaryInner),
    Array(ArrayInner),
    Object(ObjectInner),
    Function,
    Alternatives(AlternativesInner),
    Lazy(LazyInner),
}

impl Kind {
    pub(crate) fn schema_type(&self) -> SchemaType {
        match self {
            Kind::Any => SchemaType::Any,
            Kind::String(_) => SchemaType::String,
            Kind::Number(_) => SchemaType::Number,
            Kind::Boolean(_) => SchemaType::Boolean,
            Kind::Date(_) => SchemaType::Date,
            Kind::Binary(_) => SchemaType::Binary,
            Kind::Array(_) => SchemaType::Array,
            Kind::Object(_) => SchemaType::Object,
            Kind::Function => SchemaType::Function,
            Kind::Alternatives(_) => SchemaType::Alternatives,
            Kind::Lazy(_) => SchemaType::Lazy,
        }
    }
}

/// Signature of a default value factory: receives the parent container
/// and the active options.
pub type DefaultFn =
    Arc<dyn Fn(Option<&Value>, &ValidationOptions) -> Result<Value, String> + Send + Sync>;

/// Value used when validation finishes with `undefined`.
#[derive(Clone)]
pub enum DefaultValue {
    /// A literal. `Value::Undefined` on an object schema means "default to
    /// an empty object and validate its children".
    Value(Value),
    /// Resolved against the parent container.
    Ref(Reference),
    /// Computed per validation.
    Func { description: String, func: DefaultFn },
}

impl fmt::Debug for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultValue::Value(value) => f.debug_tuple("Value").field(value).finish(),
            DefaultValue::Ref(reference) => f.debug_tuple("Ref").field(reference).finish(),
            DefaultValue::Func { description, .. } => {
                f.debug_struct("Func").field("description", description).finish()
            }
        }
    }
}

/// A custom error produced by an [`ErrorOverride::Func`].
#[derive(Debug, Clone, Default)]
pub struct CustomError {
    /// Error code; defaults to `override`.
    pub code: Option<String>,
    pub context: crate::error::Context,
    pub message: Option<String>,
    pub template: Option<String>,
}

/// What an error override function replaces the collected errors with.
#[derive(Debug, Clone)]
pub enum ErrorReplacement {
    /// A single `override` error with this message.
    Message(String),
    /// Errors used as-is.
    Errors(Vec<SchemaError>),
    /// Errors created at the current node.
    Custom(Vec<CustomError>),
}

pub type ErrorFn = Arc<dyn Fn(&[SchemaError]) -> ErrorReplacement + Send + Sync>;

/// Replacement for the errors a node reports.
#[derive(Clone)]
pub enum ErrorOverride {
    /// Fixed message reported instead of the whole error.
    Message(String),
    Func(ErrorFn),
}

impl fmt::Debug for ErrorOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorOverride::Message(message) => f.debug_tuple("Message").field(message).finish(),
            ErrorOverride::Func(_) => f.write_str("Func(..)"),
        }
    }
}

/// Flags shared by every schema type.
#[derive(Debug, Clone, Default)]
pub(crate) struct Flags {
    pub presence: Option<Presence>,
    pub default: Option<DefaultValue>,
    pub strip: bool,
    pub allow_only: bool,
    pub insensitive: Option<bool>,
    pub label: Option<String>,
    pub error: Option<ErrorOverride>,
    pub raw: bool,
    pub empty: Option<Box<Schema>>,
}

impl Flags {
    /// Flags of `self` overridden by every flag set on `other`.
    pub(crate) fn merge(&self, other: &Flags) -> Flags {
        Flags {
            presence: other.presence.or(self.presence),
            default: other.default.clone().or_else(|| self.default.clone()),
            strip: self.strip || other.strip,
            allow_only: self.allow_only || other.allow_only,
            insensitive: other.insensitive.or(self.insensitive),
            label: other.label.clone().or_else(|| self.label.clone()),
            error: other.error.clone().or_else(|| self.error.clone()),
            raw: self.raw || other.raw,
            empty: other.empty.clone().or_else(|| self.empty.clone()),
        }
    }

    pub(crate) fn is_insensitive(&self) -> bool {
        self.insensitive.unwrap_or(false)
    }
}

/// Documentation attached to a schema; only used by `describe`.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Docs {
    pub description: Option<String>,
    pub notes: Vec<String>,
    pub tags: Vec<String>,
    pub meta: Vec<serde_json::Value>,
    pub examples: Vec<Value>,
    pub unit: Option<String>,
}

impl Docs {
    pub(crate) fn concat(&self, other: &Docs) -> Docs {
        let mut docs = self.clone();
        if other.description.is_some() {
            docs.description = other.description.clone();
        }
        docs.notes.extend(other.notes.iter().cloned());
        docs.tags.extend(other.tags.iter().cloned());
        docs.meta.extend(other.meta.iter().cloned());
        docs.examples.extend(other.examples.iter().cloned());
        if other.unit.is_some() {
            docs.unit = other.unit.clone();
        }
        docs
    }
}

/// Check run by a rule: returns `Ok(Some(v))` to replace the value,
/// `Ok(None)` to keep it.
pub type RuleFn = Arc<
    dyn Fn(&Schema, &Value, &State<'_>, &ValidationOptions) -> Result<Option<Value>, SchemaError>
        + Send
        + Sync,
>;

/// A named test run after the base step.
#[derive(Clone)]
pub(crate) struct Rule {
    pub name: String,
    /// Argument shown by `describe`.
    pub arg: Option<serde_json::Value>,
    pub check: RuleFn,
}

impl Rule {
    pub(crate) fn new<F>(name: impl Into<String>, arg: Option<serde_json::Value>, check: F) -> Self
    where
        F: Fn(&Schema, &Value, &State<'_>, &ValidationOptions) -> Result<Option<Value>, SchemaError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            name: name.into(),
            arg,
            check: Arc::new(check),
        }
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("arg", &self.arg)
            .finish()
    }
}

/// A numeric or date bound: a literal, the current time, or a reference
/// resolved at validation time.
#[derive(Debug, Clone, PartialEq)]
pub enum Limit {
    Number(f64),
    Date(DateTime<Utc>),
    Now,
    Ref(Reference),
}

impl Limit {
    pub(crate) fn describe(&self) -> serde_json::Value {
        match self {
            Limit::Number(n) => Value::Number(*n).to_json(),
            Limit::Date(d) => Value::Date(*d).to_json(),
            Limit::Now => serde_json::Value::String("now".to_string()),
            Limit::Ref(reference) => serde_json::Value::String(reference.to_string()),
        }
    }

    pub(crate) fn reference(&self) -> Option<&Reference> {
        match self {
            Limit::Ref(reference) => Some(reference),
            _ => None,
        }
    }

    /// A literal size limit; panics unless it is a non-negative integer.
    pub(crate) fn expect_size(&self, rule: &str) -> Option<usize> {
        match self {
            Limit::Number(n) if n.fract() == 0.0 && *n >= 0.0 && *n <= 9_007_199_254_740_991.0 => {
                Some(*n as usize)
            }
            Limit::Ref(_) => None,
            other => panic!("{rule} limit must be a positive integer or reference, got {other:?}"),
        }
    }
}

impl From<f64> for Limit {
    fn from(n: f64) -> Self {
        Limit::Number(n)
    }
}

macro_rules! impl_limit_from_integer {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Limit {
                fn from(n: $t) -> Self {
                    Limit::Number(n as f64)
                }
            }
        )*
    };
}

impl_limit_from_integer!(i32, i64, u32, u64, usize);

impl From<DateTime<Utc>> for Limit {
    fn from(date: DateTime<Utc>) -> Self {
        Limit::Date(date)
    }
}

impl From<Reference> for Limit {
    fn from(reference: Reference) -> Self {
        Limit::Ref(reference)
    }
}

/// An immutable validation schema.
///
/// Create one with a type constructor ([`Schema::string`],
/// [`Schema::object`], ...) or through a [`Root`](crate::Root), refine it
/// with builders, then call [`Schema::validate`].
///
/// # Example
///
/// ```rust
/// use valuate::Schema;
/// use serde_json::json;
///
/// let schema = Schema::object().keys([
///     ("a", Schema::number().required()),
///     ("b", Schema::string().default("x")),
/// ]);
///
/// let result = schema.validate(json!({"a": 5}));
/// assert!(result.error.is_none());
/// assert_eq!(result.value.to_json(), json!({"a": 5, "b": "x"}));
/// ```
#[derive(Clone)]
pub struct Schema {
    pub(crate) kind: Kind,
    pub(crate) flags: Flags,
    pub(crate) settings: Option<Settings>,
    pub(crate) valids: ValueSet,
    pub(crate) invalids: ValueSet,
    pub(crate) rules: Vec<Rule>,
    pub(crate) refs: Vec<String>,
    pub(crate) docs: Docs,
    pub(crate) base_type: Option<Box<Schema>>,
    pub(crate) extension: Option<Arc<Extension>>,
}

impl Schema {
    pub(crate) fn with_kind(kind: Kind) -> Self {
        Self {
            kind,
            flags: Flags::default(),
            settings: None,
            valids: ValueSet::new(),
            invalids: ValueSet::new(),
            rules: Vec::new(),
            refs: Vec::new(),
            docs: Docs::default(),
            base_type: None,
            extension: None,
        }
    }

    /// Accepts any value.
    pub fn any() -> Self {
        Self::with_kind(Kind::Any)
    }

    /// Accepts strings. The empty string is rejected unless explicitly
    /// allowed.
    ///
    /// # Example
    ///
    /// ```rust
    /// use valuate::Schema;
    ///
    /// assert!(Schema::string().validate("").error.is_some());
    /// assert!(Schema::string().allow([""]).validate("").error.is_none());
    /// ```
    pub fn string() -> Self {
        let mut schema = Self::with_kind(Kind::String(StringInner::default()));
        schema.invalids.add(Value::from("").into(), None);
        schema
    }

    /// Accepts numbers, and numeric strings when converting.
    pub fn number() -> Self {
        let mut schema = Self::with_kind(Kind::Number(NumberInner::default()));
        schema.invalids.add(Value::Number(f64::INFINITY).into(), None);
        schema.invalids.add(Value::Number(f64::NEG_INFINITY).into(), None);
        schema
    }

    /// Accepts booleans, and `"true"` / `"false"` when converting.
    pub fn boolean() -> Self {
        let mut schema = Self::with_kind(Kind::Boolean(BooleanInner::default()));
        schema.flags.insensitive = Some(true);
        schema
    }

    pub fn date() -> Self {
        Self::with_kind(Kind::Date(DateInner::default()))
    }

    pub fn binary() -> Self {
        Self::with_kind(Kind::Binary(BinaryInner::default()))
    }

    pub fn array() -> Self {
        Self::with_kind(Kind::Array(ArrayInner::default()))
    }

    /// Accepts objects. Without [`keys`](Schema::keys) any key is allowed.
    pub fn object() -> Self {
        Self::with_kind(Kind::Object(ObjectInner::default()))
    }

    pub fn function() -> Self {
        Self::with_kind(Kind::Function)
    }

    pub fn alternatives() -> Self {
        Self::with_kind(Kind::Alternatives(AlternativesInner::default()))
    }

    /// A schema built on demand by `factory`, for recursive structures.
    ///
    /// # Example
    ///
    /// ```rust
    /// use valuate::Schema;
    /// use serde_json::json;
    ///
    /// fn node() -> Schema {
    ///     Schema::object().keys([
    ///         ("name", Schema::string().required()),
    ///         ("children", Schema::array().items([Schema::lazy(node)])),
    ///     ])
    /// }
    ///
    /// let tree = json!({"name": "root", "children": [{"name": "leaf", "children": []}]});
    /// assert!(node().validate(tree).error.is_none());
    /// ```
    pub fn lazy<F>(factory: F) -> Self
    where
        F: Fn() -> Schema + Send + Sync + 'static,
    {
        Self::lazy_with(move || Some(factory()))
    }

    /// Like [`Schema::lazy`], but the factory may fail to produce a schema,
    /// which is reported as `lazy.schema`.
    pub fn lazy_with<F>(factory: F) -> Self
    where
        F: Fn() -> Option<Schema> + Send + Sync + 'static,
    {
        Self::with_kind(Kind::Lazy(LazyInner {
            factory: Some(Arc::new(factory)),
        }))
    }

    /// The schema's type.
    pub fn schema_type(&self) -> SchemaType {
        self.kind.schema_type()
    }

    /// Type name used in error codes and descriptions; the extension name
    /// for extension schemas.
    pub fn type_name(&self) -> &str {
        match &self.extension {
            Some(extension) => extension.name(),
            None => self.kind.schema_type().as_str(),
        }
    }

    /// The label set with [`Schema::label`], if any.
    pub fn get_label(&self) -> Option<&str> {
        self.flags.label.as_deref()
    }

    /// Keys of siblings this schema reads through references.
    pub fn refs(&self) -> &[String] {
        &self.refs
    }

    /// Effective presence; `None` when inherited from the options.
    pub fn presence(&self) -> Option<Presence> {
        self.flags.presence
    }

    pub(crate) fn push_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub(crate) fn push_ref(&mut self, reference: &Reference) {
        if !reference.is_context() {
            self.refs.push(reference.root().to_string());
        }
    }
}

/// Panics for a builder used on the wrong schema type.
pub(crate) fn unsupported(type_name: SchemaType, builder: &str) -> ! {
    panic!("{builder}() is not supported on {type_name} schemas")
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("type", &self.type_name())
            .field("flags", &self.flags)
            .field("valids", &self.valids)
            .field("invalids", &self.invalids)
            .field("rules", &self.rules)
            .finish_non_exhaustive()
    }
}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<Schema>();
    assert_sync::<Schema>();
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_names() {
        assert_eq!(Schema::any().type_name(), "any");
        assert_eq!(Schema::function().type_name(), "func");
        assert_eq!(Schema::alternatives().schema_type(), SchemaType::Alternatives);
    }

    #[test]
    fn test_string_rejects_empty_by_default() {
        let schema = Schema::string();
        assert_eq!(schema.invalids.len(), 1);
    }

    #[test]
    fn test_flags_merge_prefers_other() {
        let a = Flags {
            presence: Some(Presence::Required),
            label: Some("a".to_string()),
            strip: true,
            ..Flags::default()
        };
        let b = Flags {
            presence: Some(Presence::Optional),
            ..Flags::default()
        };
        let merged = a.merge(&b);
        assert_eq!(merged.presence, Some(Presence::Optional));
        assert_eq!(merged.label.as_deref(), Some("a"));
        assert!(merged.strip);
    }

    #[test]
    fn test_limit_size() {
        assert_eq!(Limit::from(3).expect_size("min"), Some(3));
        assert_eq!(Limit::from(Reference::new("a")).expect_size("min"), None);
    }

    #[test]
    #[should_panic(expected = "positive integer")]
    fn test_limit_size_rejects_fraction() {
        Limit::from(1.5).expect_size("min");
    }

    #[test]
    #[should_panic(expected = "not supported on number schemas")]
    fn test_type_specific_builder_panics() {
        let _ = Schema::number().email(Default::default());
    }
}
