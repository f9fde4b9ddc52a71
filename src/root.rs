//! The schema factory.
//!
//! [`Root`] creates schemas the same way the `Schema` constructors do, but
//! can carry two pieces of shared configuration: a defaults function applied
//! to every schema it creates, and a registry of custom types.
//!
//! # Example
//!
//! ```rust
//! use valuate::Root;
//! use serde_json::json;
//!
//! let root = Root::new().defaults(|schema| schema.required());
//! let schema = root.object().keys([("name", root.string())]);
//!
//! assert!(root.validate(json!({"name": "ada"}), &schema).error.is_none());
//! let error = root.validate(json!({}), &schema).error.unwrap();
//! assert_eq!(error.details[0].code, "any.required");
//! ```

use std::fmt;
use std::sync::Arc;

use rayon::prelude::*;

use crate::compile::SchemaLike;
use crate::error::BuildError;
use crate::options::ValidationOptions;
use crate::reference::Reference;
use crate::registry::{Extension, ExtensionRegistry};
use crate::schema::{Schema, ValidationResult};
use crate::value::Value;

type DefaultsFn = Arc<dyn Fn(Schema) -> Schema + Send + Sync>;

/// Creates schemas, optionally post-processed by a defaults function and
/// extended with custom types.
#[derive(Clone, Default)]
pub struct Root {
    extensions: ExtensionRegistry,
    defaults: Option<DefaultsFn>,
}

impl Root {
    pub fn new() -> Self {
        Self::default()
    }

    fn make(&self, schema: Schema) -> Schema {
        match &self.defaults {
            Some(defaults) => defaults(schema),
            None => schema,
        }
    }

    pub fn any(&self) -> Schema {
        self.make(Schema::any())
    }

    pub fn string(&self) -> Schema {
        self.make(Schema::string())
    }

    pub fn number(&self) -> Schema {
        self.make(Schema::number())
    }

    pub fn boolean(&self) -> Schema {
        self.make(Schema::boolean())
    }

    pub fn date(&self) -> Schema {
        self.make(Schema::date())
    }

    pub fn binary(&self) -> Schema {
        self.make(Schema::binary())
    }

    pub fn array(&self) -> Schema {
        self.make(Schema::array())
    }

    pub fn object(&self) -> Schema {
        self.make(Schema::object())
    }

    pub fn function(&self) -> Schema {
        self.make(Schema::function())
    }

    pub fn alternatives(&self) -> Schema {
        self.make(Schema::alternatives())
    }

    pub fn lazy<F>(&self, factory: F) -> Schema
    where
        F: Fn() -> Schema + Send + Sync + 'static,
    {
        self.make(Schema::lazy(factory))
    }

    /// Compiles a schema-like literal; see [`compile`](crate::compile()).
    pub fn compile(&self, like: impl Into<SchemaLike>) -> Result<Schema, BuildError> {
        crate::compile::compile(like)
    }

    pub fn validate(&self, value: impl Into<Value>, schema: &Schema) -> ValidationResult {
        schema.validate(value)
    }

    pub fn validate_with(
        &self,
        value: impl Into<Value>,
        schema: &Schema,
        options: &ValidationOptions,
    ) -> ValidationResult {
        schema.validate_with(value, options)
    }

    /// Validates every value against `schema` in parallel; results keep the
    /// order of `values`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use valuate::{Root, ValidationOptions, Value};
    ///
    /// let root = Root::new();
    /// let schema = root.number().min(0);
    /// let values: Vec<Value> = vec![1.into(), (-1).into(), "2".into()];
    ///
    /// let results = root.validate_many(&schema, values, &ValidationOptions::default());
    /// let ok: Vec<bool> = results.iter().map(|r| r.is_ok()).collect();
    /// assert_eq!(ok, vec![true, false, true]);
    /// ```
    pub fn validate_many(
        &self,
        schema: &Schema,
        values: Vec<Value>,
        options: &ValidationOptions,
    ) -> Vec<ValidationResult> {
        let _span = tracing::debug_span!("validate_many", count = values.len()).entered();
        values
            .into_par_iter()
            .map(|value| schema.validate_with(value, options))
            .collect()
    }

    pub fn describe(&self, schema: &Schema) -> serde_json::Value {
        schema.describe()
    }

    /// A reference to a sibling key, dotted for nested keys.
    pub fn reference(&self, key: &str) -> Result<Reference, BuildError> {
        Reference::try_new(key)
    }

    /// A reference into [`ValidationOptions::context`].
    pub fn context_ref(&self, key: &str) -> Reference {
        Reference::context(key)
    }

    /// A root whose factory methods also pass every schema through
    /// `defaults`, after any defaults this root already applies.
    pub fn defaults<F>(&self, defaults: F) -> Root
    where
        F: Fn(Schema) -> Schema + Send + Sync + 'static,
    {
        let composed: DefaultsFn = match &self.defaults {
            Some(existing) => {
                let existing = Arc::clone(existing);
                Arc::new(move |schema| defaults(existing(schema)))
            }
            None => Arc::new(defaults),
        };
        Root {
            extensions: self.extensions.clone(),
            defaults: Some(composed),
        }
    }

    /// Registers a custom type, shared with every root derived from this
    /// one.
    pub fn extend(&self, extension: Extension) -> Result<(), BuildError> {
        self.extensions.register(extension)
    }

    /// A new schema of the registered custom type `name`.
    pub fn ext(&self, name: &str) -> Result<Schema, BuildError> {
        let extension = self
            .extensions
            .get(name)
            .ok_or_else(|| BuildError::UnknownExtension(name.to_string()))?;
        Ok(self.make(extension.instantiate()))
    }

    pub fn extensions(&self) -> &ExtensionRegistry {
        &self.extensions
    }
}

impl fmt::Debug for Root {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Root")
            .field("extensions", &self.extensions)
            .field("defaults", &self.defaults.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaType;
    use serde_json::json;

    #[test]
    fn test_factories() {
        let root = Root::new();
        assert_eq!(root.string().schema_type(), SchemaType::String);
        assert_eq!(root.function().type_name(), "func");
        assert_eq!(root.lazy(Schema::any).schema_type(), SchemaType::Lazy);
    }

    #[test]
    fn test_defaults_compose() {
        let root = Root::new()
            .defaults(|schema| schema.label("field"))
            .defaults(|schema| schema.required());
        let schema = root.number();
        assert_eq!(schema.get_label(), Some("field"));
        let error = root.validate(Value::Undefined, &schema).error.unwrap();
        assert_eq!(error.message, "\"field\" is required");
    }

    #[test]
    fn test_unknown_extension() {
        assert_eq!(
            Root::new().ext("nope").unwrap_err(),
            BuildError::UnknownExtension("nope".to_string())
        );
    }

    #[test]
    fn test_extensions_shared_with_derived_roots() {
        let root = Root::new();
        let strict = root.defaults(|schema| schema.strict());
        root.extend(Extension::new("thing")).unwrap();
        assert_eq!(strict.ext("thing").unwrap().type_name(), "thing");
    }

    #[test]
    fn test_references() {
        let root = Root::new();
        assert_eq!(root.reference("a.b").unwrap().depth(), 2);
        assert!(root.context_ref("x").is_context());
    }

    #[test]
    fn test_compile_and_describe() {
        let root = Root::new();
        let schema = root.compile(json!({"a": 1})).unwrap();
        assert_eq!(root.describe(&schema)["children"]["a"]["valids"], json!([1]));
    }
}
