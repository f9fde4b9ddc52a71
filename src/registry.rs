//! Custom schema types.
//!
//! An [`Extension`] derives a named type from a base schema. It may add
//! message templates, a `coerce` hook (run before presence checks), a `pre`
//! hook (run after the base type check) and named rules applied with
//! [`Schema::rule`]. Extensions live in an [`ExtensionRegistry`], which a
//! [`Root`](crate::Root) consults when [`Root::ext`](crate::Root::ext) is
//! called.
//!
//! # Example
//!
//! ```rust
//! use valuate::{context, Extension, ExtensionRule, Root, Schema, Value};
//! use serde_json::json;
//!
//! let root = Root::new();
//! root.extend(
//!     Extension::new("million")
//!         .base(Schema::number())
//!         .language(json!({"big": "needs to be bigger than a million"}))
//!         .rule(ExtensionRule::new("big").validate(|_, schema, value, state, options| {
//!             match value.as_f64() {
//!                 Some(n) if n < 1_000_000.0 => Err(schema.error_at(
//!                     "million.big",
//!                     context([("value", value.clone())]),
//!                     state,
//!                     options,
//!                 )),
//!                 _ => Ok(None),
//!             }
//!         })),
//! )
//! .unwrap();
//!
//! let schema = root.ext("million").unwrap().rule("big", json!(null)).unwrap();
//! let error = schema.validate(10).error.unwrap();
//! assert_eq!(error.message, "\"value\" needs to be bigger than a million");
//! assert!(schema.validate(2_000_000).error.is_none());
//! ```

use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{BuildError, SchemaError};
use crate::options::{Settings, ValidationOptions};
use crate::schema::{Rule, Schema};
use crate::validation::State;
use crate::value::Value;

/// Hook replacing the value before (`coerce`) or after (`pre`) the base
/// type check.
pub type HookFn =
    Arc<dyn Fn(&Schema, &Value, &State<'_>, &ValidationOptions) -> Result<Value, SchemaError> + Send + Sync>;

/// Check run by an extension rule; receives the rule parameters first.
pub type ExtensionRuleFn = Arc<
    dyn Fn(&serde_json::Value, &Schema, &Value, &State<'_>, &ValidationOptions) -> Result<Option<Value>, SchemaError>
        + Send
        + Sync,
>;

/// Transforms the schema when a rule is applied.
pub type SetupFn = Arc<dyn Fn(Schema, &serde_json::Value) -> Result<Schema, BuildError> + Send + Sync>;

/// A named rule of an [`Extension`].
#[derive(Clone)]
pub struct ExtensionRule {
    name: String,
    params: Option<Schema>,
    setup: Option<SetupFn>,
    validate: Option<ExtensionRuleFn>,
}

impl ExtensionRule {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: None,
            setup: None,
            validate: None,
        }
    }

    /// Schema the rule parameters must satisfy.
    pub fn params(mut self, schema: Schema) -> Self {
        self.params = Some(schema);
        self
    }

    /// Rewrites the schema when the rule is applied, e.g. to set flags.
    pub fn setup<F>(mut self, setup: F) -> Self
    where
        F: Fn(Schema, &serde_json::Value) -> Result<Schema, BuildError> + Send + Sync + 'static,
    {
        self.setup = Some(Arc::new(setup));
        self
    }

    /// Check run against every validated value.
    pub fn validate<F>(mut self, validate: F) -> Self
    where
        F: Fn(&serde_json::Value, &Schema, &Value, &State<'_>, &ValidationOptions) -> Result<Option<Value>, SchemaError>
            + Send
            + Sync
            + 'static,
    {
        self.validate = Some(Arc::new(validate));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for ExtensionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionRule")
            .field("name", &self.name)
            .field("params", &self.params.is_some())
            .finish_non_exhaustive()
    }
}

/// A custom schema type.
#[derive(Clone)]
pub struct Extension {
    name: String,
    base: Schema,
    language: Option<serde_json::Value>,
    pub(crate) coerce: Option<HookFn>,
    pub(crate) pre: Option<HookFn>,
    rules: Vec<ExtensionRule>,
}

impl Extension {
    /// An extension of `any` named `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base: Schema::any(),
            language: None,
            coerce: None,
            pre: None,
            rules: Vec::new(),
        }
    }

    pub fn base(mut self, schema: Schema) -> Self {
        self.base = schema;
        self
    }

    /// Message templates, keyed by rule name.
    pub fn language(mut self, language: serde_json::Value) -> Self {
        self.language = Some(language);
        self
    }

    pub fn coerce<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Schema, &Value, &State<'_>, &ValidationOptions) -> Result<Value, SchemaError> + Send + Sync + 'static,
    {
        self.coerce = Some(Arc::new(hook));
        self
    }

    pub fn pre<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Schema, &Value, &State<'_>, &ValidationOptions) -> Result<Value, SchemaError> + Send + Sync + 'static,
    {
        self.pre = Some(Arc::new(hook));
        self
    }

    pub fn rule(mut self, rule: ExtensionRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn find_rule(&self, name: &str) -> Option<&ExtensionRule> {
        self.rules.iter().find(|rule| rule.name == name)
    }

    /// A fresh schema of this type.
    pub(crate) fn instantiate(self: &Arc<Self>) -> Schema {
        let mut schema = self.base.clone();
        if let Some(language) = &self.language {
            let mut scoped = serde_json::Map::new();
            scoped.insert(self.name.clone(), language.clone());
            let settings = Settings::new().language(serde_json::Value::Object(scoped));
            schema.settings = Some(match &schema.settings {
                Some(existing) => existing.merge(&settings),
                None => settings,
            });
        }
        schema.extension = Some(Arc::clone(self));
        schema
    }
}

impl fmt::Debug for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Extension")
            .field("name", &self.name)
            .field("base", &self.base.type_name())
            .field("rules", &self.rules)
            .finish_non_exhaustive()
    }
}

type ExtensionMap = Arc<RwLock<HashMap<String, Arc<Extension>>>>;

/// A thread-safe table of extensions by name.
///
/// Clones share the same table, so an extension registered through one
/// handle is visible through every other.
#[derive(Clone, Default)]
pub struct ExtensionRegistry {
    extensions: ExtensionMap,
}

impl ExtensionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `extension`.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::DuplicateExtension`] when the name is taken.
    pub fn register(&self, extension: Extension) -> Result<(), BuildError> {
        let mut extensions = self.extensions.write();
        if extensions.contains_key(&extension.name) {
            tracing::warn!(name = %extension.name, "extension already registered");
            return Err(BuildError::DuplicateExtension(extension.name));
        }
        tracing::debug!(name = %extension.name, base = %extension.base.type_name(), "extension registered");
        extensions.insert(extension.name.clone(), Arc::new(extension));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<Extension>> {
        self.extensions.read().get(name).cloned()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.extensions.read().keys().cloned().collect();
        names.sort();
        names
    }
}

impl fmt::Debug for ExtensionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionRegistry").field("names", &self.names()).finish()
    }
}

impl Schema {
    /// Applies the extension rule `name` with `params`.
    ///
    /// # Errors
    ///
    /// [`BuildError::UnknownRule`] when the schema's type has no such rule,
    /// [`BuildError::InvalidArgument`] when `params` fail the rule's
    /// parameter schema, and whatever the rule's setup returns.
    pub fn rule(self, name: &str, params: serde_json::Value) -> Result<Self, BuildError> {
        let unknown = || BuildError::UnknownRule {
            type_name: self.type_name().to_string(),
            rule: name.to_string(),
        };
        let extension = self.extension.clone().ok_or_else(unknown)?;
        let rule = extension.find_rule(name).cloned().ok_or_else(unknown)?;

        if let Some(schema) = &rule.params {
            if let Some(error) = schema.validate(params.clone()).error {
                return Err(BuildError::InvalidArgument(format!("{name}: {}", error.message)));
            }
        }

        let mut schema = self;
        if let Some(setup) = &rule.setup {
            schema = setup(schema, &params)?;
        }
        if let Some(validate) = rule.validate {
            let arg = (!params.is_null()).then(|| params.clone());
            schema = schema.push_rule(Rule::new(name, arg, move |schema, value, state, options| {
                validate(&params, schema, value, state, options)
            }));
        }
        Ok(schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::context;
    use crate::schema::SchemaType;
    use serde_json::json;

    fn even() -> Extension {
        Extension::new("even")
            .base(Schema::number())
            .language(json!({"base": "must be even", "divisible": "must be divisible by {{n}}"}))
            .pre(|schema, value, state, options| match value.as_f64() {
                Some(n) if n % 2.0 == 0.0 => Ok(value.clone()),
                _ => Err(schema.error_at("even.base", context([("value", value.clone())]), state, options)),
            })
            .rule(
                ExtensionRule::new("divisible")
                    .params(Schema::object().keys([("n", Schema::number().integer().min(1).required())]))
                    .validate(|params, schema, value, state, options| {
                        let n = params["n"].as_f64().unwrap_or(1.0);
                        match value.as_f64() {
                            Some(v) if v % n != 0.0 => Err(schema.error_at(
                                "even.divisible",
                                context([("n", Value::from(n))]),
                                state,
                                options,
                            )),
                            _ => Ok(None),
                        }
                    }),
            )
    }

    fn instantiate(extension: Extension) -> Schema {
        Arc::new(extension).instantiate()
    }

    #[test]
    fn test_extension_type() {
        let schema = instantiate(even());
        assert_eq!(schema.type_name(), "even");
        assert_eq!(schema.schema_type(), SchemaType::Number);
        assert!(schema.validate("4").is_ok());
        let error = schema.validate(3).error.unwrap();
        assert_eq!(error.details[0].code, "even.base");
        assert_eq!(error.message, "\"value\" must be even");
        assert_eq!(schema.validate("x").error.unwrap().details[0].code, "number.base");
    }

    #[test]
    fn test_extension_rule() {
        let schema = instantiate(even()).rule("divisible", json!({"n": 4})).unwrap();
        assert!(schema.validate(8).is_ok());
        let error = schema.validate(6).error.unwrap();
        assert_eq!(error.message, "\"value\" must be divisible by 4");
        assert_eq!(schema.describe()["rules"][0], json!({"name": "divisible", "arg": {"n": 4}}));
    }

    #[test]
    fn test_rule_params_are_checked() {
        let result = instantiate(even()).rule("divisible", json!({"n": 0}));
        assert!(matches!(result, Err(BuildError::InvalidArgument(_))));
    }

    #[test]
    fn test_unknown_rule() {
        assert!(matches!(
            instantiate(even()).rule("odd", json!(null)),
            Err(BuildError::UnknownRule { .. })
        ));
        assert!(matches!(
            Schema::number().rule("divisible", json!(null)),
            Err(BuildError::UnknownRule { .. })
        ));
    }

    #[test]
    fn test_coerce_runs_before_presence() {
        let schema = instantiate(
            Extension::new("csv").base(Schema::array().items([Schema::string()])).coerce(
                |_, value, _, _| {
                    Ok(match value {
                        Value::String(s) => Value::Array(s.split(',').map(Value::from).collect()),
                        other => other.clone(),
                    })
                },
            ),
        );
        let result = schema.validate("a,b");
        assert_eq!(result.value.to_json(), json!(["a", "b"]));
    }

    #[test]
    fn test_setup_transforms_schema() {
        let schema = instantiate(
            Extension::new("tagged")
                .rule(ExtensionRule::new("required").setup(|schema, _| Ok(schema.required()))),
        )
        .rule("required", json!(null))
        .unwrap();
        assert_eq!(
            schema.validate(Value::Undefined).error.unwrap().details[0].code,
            "any.required"
        );
    }

    #[test]
    fn test_registry_rejects_duplicates() {
        let registry = ExtensionRegistry::new();
        registry.register(even()).unwrap();
        assert_eq!(
            registry.register(even()),
            Err(BuildError::DuplicateExtension("even".to_string()))
        );
        assert_eq!(registry.names(), vec!["even"]);
        assert!(registry.clone().get("even").is_some());
    }
}
