//! Alternatives schema.
//!
//! An alternatives schema holds an ordered list of matches. Plain matches
//! (added with [`Schema::try_all`]) are tried in order and the first that
//! validates wins. Conditional matches (added with [`Schema::when`]) pick
//! a branch: a reference condition resolves a sibling and tests it against
//! `is`, while a schema condition peeks at the value itself.
//!
//! # Example
//!
//! ```rust
//! use valuate::{Reference, Schema, When};
//! use serde_json::json;
//!
//! let schema = Schema::object().keys([
//!     ("kind", Schema::string()),
//!     (
//!         "val",
//!         Schema::alternatives()
//!             .when(
//!                 Reference::new("kind"),
//!                 When::is("num").then(Schema::number()).otherwise(Schema::string()),
//!             )
//!             .unwrap(),
//!     ),
//! ]);
//!
//! assert!(schema.validate(json!({"kind": "num", "val": 5})).error.is_none());
//! let error = schema.validate(json!({"kind": "num", "val": "x"})).error.unwrap();
//! assert_eq!(error.details[0].code, "number.base");
//! ```

use super::engine::Coerced;
use super::{Kind, Schema};
use crate::compile::{compile, expect_schema, SchemaLike};
use crate::error::{BuildError, Context};
use crate::options::{Presence, ValidationOptions};
use crate::path::KeyPath;
use crate::reference::Reference;
use crate::validation::State;
use crate::value::Value;

/// What a conditional match tests.
#[derive(Debug, Clone)]
pub enum Condition {
    /// A sibling (or context) value, tested against [`When::is`].
    Ref(Reference),
    /// The validated value itself.
    Peek(Schema),
}

impl From<Reference> for Condition {
    fn from(reference: Reference) -> Self {
        Condition::Ref(reference)
    }
}

impl From<&str> for Condition {
    fn from(key: &str) -> Self {
        Condition::Ref(Reference::new(key))
    }
}

impl From<Schema> for Condition {
    fn from(schema: Schema) -> Self {
        Condition::Peek(schema)
    }
}

/// Branches of a conditional match.
///
/// At least one of `then` and `otherwise` must be set. A literal `is` is
/// compiled and made required, so an absent sibling never matches it.
#[derive(Debug, Clone, Default)]
pub struct When {
    is: Option<SchemaLike>,
    then: Option<SchemaLike>,
    otherwise: Option<SchemaLike>,
}

impl When {
    /// Branches for a reference condition matching `is`.
    pub fn is(is: impl Into<SchemaLike>) -> Self {
        Self {
            is: Some(is.into()),
            ..Self::default()
        }
    }

    /// Branches for a schema condition, which takes no `is`.
    pub fn peek() -> Self {
        Self::default()
    }

    pub fn then(mut self, schema: impl Into<SchemaLike>) -> Self {
        self.then = Some(schema.into());
        self
    }

    pub fn otherwise(mut self, schema: impl Into<SchemaLike>) -> Self {
        self.otherwise = Some(schema.into());
        self
    }
}

#[derive(Debug, Clone)]
pub(crate) enum Test {
    Ref { reference: Reference, is: Schema },
    Peek(Schema),
}

#[derive(Debug, Clone)]
pub(crate) enum Match {
    Schema(Schema),
    When {
        test: Test,
        then: Option<Schema>,
        otherwise: Option<Schema>,
    },
}

#[derive(Debug, Clone, Default)]
pub(crate) struct AlternativesInner {
    pub matches: Vec<Match>,
}

impl AlternativesInner {
    pub(crate) fn base(
        &self,
        schema: &Schema,
        value: Value,
        state: &State<'_>,
        options: &ValidationOptions,
    ) -> Coerced {
        let mut errors = Vec::new();
        let last = self.matches.len().saturating_sub(1);

        for (i, item) in self.matches.iter().enumerate() {
            match item {
                Match::When { test, then, otherwise } => {
                    let condition_state = State {
                        key: None,
                        path: KeyPath::root(),
                        parent: None,
                        reference: state.lookup_target(),
                    };
                    let failed = match test {
                        Test::Ref { reference, is } => {
                            let input = reference.resolve(state.lookup_target(), options);
                            !is.validate_node(input, &condition_state, options).is_ok()
                        }
                        Test::Peek(peek) => !peek.validate_node(value.clone(), &condition_state, options).is_ok(),
                    };

                    let branch = if failed { otherwise } else { then };
                    if let Some(branch) = branch {
                        tracing::trace!(path = %state.path, matched = !failed, "alternatives branch selected");
                        return from_outcome(branch.validate_node(value, state, options));
                    }
                    if i == last {
                        if let Some(base) = &schema.base_type {
                            return from_outcome(base.validate_node(value, state, options));
                        }
                    }
                }
                Match::Schema(candidate) => {
                    let outcome = candidate.validate_node(value.clone(), state, options);
                    if outcome.is_ok() {
                        return from_outcome(outcome);
                    }
                    errors.extend(outcome.errors);
                }
            }
        }

        let error = if errors.is_empty() {
            schema.error_at("alternatives.base", Context::new(), state, options)
        } else {
            schema
                .error_at("alternatives.child", Context::new(), state, options)
                .with_reason(errors)
        };
        Coerced::failed(value, error)
    }
}

fn from_outcome(outcome: super::Outcome) -> Coerced {
    Coerced {
        value: outcome.value,
        errors: outcome.errors,
    }
}

impl Schema {
    /// Adds candidates tried in order; the first that validates wins.
    ///
    /// # Panics
    ///
    /// When `schemas` is empty, or on a schema that is not an
    /// alternatives schema.
    ///
    /// # Example
    ///
    /// ```rust
    /// use valuate::Schema;
    ///
    /// let schema = Schema::alternatives().try_all([Schema::number(), Schema::boolean()]);
    /// assert!(schema.validate(true).error.is_none());
    /// assert_eq!(schema.validate(Vec::<valuate::Value>::new()).error.unwrap().details.len(), 2);
    /// ```
    pub fn try_all<I, S>(mut self, schemas: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SchemaLike>,
    {
        let schemas: Vec<Schema> = schemas
            .into_iter()
            .enumerate()
            .map(|(i, like)| expect_schema(like.into(), &format!("try[{i}]")))
            .collect();
        assert!(!schemas.is_empty(), "cannot add other alternatives without at least one schema");

        let schema_type = self.schema_type();
        let Kind::Alternatives(inner) = &mut self.kind else {
            super::unsupported(schema_type, "try_all")
        };
        for schema in schemas {
            self.refs.extend(schema.refs.iter().cloned());
            inner.matches.push(Match::Schema(schema));
        }
        self
    }

    /// Adds a conditional match.
    ///
    /// On an alternatives schema the match is appended. On any other schema
    /// the result is a new alternatives schema whose branches are the
    /// receiver concatenated with `then` and `otherwise`; when no branch
    /// applies, the receiver itself validates the value.
    ///
    /// # Example
    ///
    /// ```rust
    /// use valuate::{Reference, Schema, When};
    /// use serde_json::json;
    ///
    /// let schema = Schema::object().keys([
    ///     ("admin", Schema::boolean()),
    ///     (
    ///         "level",
    ///         Schema::number()
    ///             .when(Reference::new("admin"), When::is(true).then(Schema::number().min(10)))
    ///             .unwrap(),
    ///     ),
    /// ]);
    ///
    /// assert!(schema.validate(json!({"admin": false, "level": 1})).error.is_none());
    /// assert!(schema.validate(json!({"admin": true, "level": 1})).error.is_some());
    /// assert!(schema.validate(json!({"admin": false, "level": "x"})).error.is_some());
    /// ```
    pub fn when(self, condition: impl Into<Condition>, when: When) -> Result<Self, BuildError> {
        let condition = condition.into();
        if when.then.is_none() && when.otherwise.is_none() {
            return Err(BuildError::InvalidCondition(
                "options must have at least one of \"then\" or \"otherwise\"".to_string(),
            ));
        }

        if !matches!(self.kind, Kind::Alternatives(_)) {
            let then = when
                .then
                .map(|then| self.clone().concat(compile(then)?))
                .transpose()?;
            let otherwise = when
                .otherwise
                .map(|otherwise| self.clone().concat(compile(otherwise)?))
                .transpose()?;
            let branches = When {
                is: when.is,
                then: then.map(SchemaLike::Schema),
                otherwise: otherwise.map(SchemaLike::Schema),
            };
            let mut alternatives = Schema::alternatives().when(condition, branches)?;
            alternatives.flags.presence = Some(Presence::Ignore);
            alternatives.base_type = Some(Box::new(self));
            return Ok(alternatives);
        }

        self.add_when(condition, when)
    }

    fn add_when(mut self, condition: Condition, when: When) -> Result<Self, BuildError> {
        let test = match condition {
            Condition::Peek(peek) => {
                if when.is.is_some() {
                    return Err(BuildError::InvalidCondition(
                        "\"is\" can not be used with a schema condition".to_string(),
                    ));
                }
                Test::Peek(peek)
            }
            Condition::Ref(reference) => {
                let Some(is) = when.is else {
                    return Err(BuildError::InvalidCondition("missing \"is\" directive".to_string()));
                };
                let explicit = matches!(is, SchemaLike::Schema(_) | SchemaLike::Ref(_));
                let mut is = compile(is)?;
                if !explicit {
                    is = is.required();
                }
                self.push_ref(&reference);
                self.refs.extend(is.refs.iter().cloned());
                Test::Ref { reference, is }
            }
        };

        let mut then = when.then.map(compile).transpose()?;
        let mut otherwise = when.otherwise.map(compile).transpose()?;
        if let Some(base) = &self.base_type {
            then = then.map(|then| base.as_ref().clone().concat(then)).transpose()?;
            otherwise = otherwise
                .map(|otherwise| base.as_ref().clone().concat(otherwise))
                .transpose()?;
        }
        for branch in then.iter().chain(otherwise.iter()) {
            self.refs.extend(branch.refs.iter().cloned());
        }

        if let Kind::Alternatives(inner) = &mut self.kind {
            inner.matches.push(Match::When { test, then, otherwise });
        }
        Ok(self)
    }
}
