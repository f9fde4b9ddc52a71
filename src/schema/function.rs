//! Function schema.

use super::engine::Coerced;
use super::{unsupported, Rule, Schema, SchemaType};
use crate::error::context;
use crate::options::ValidationOptions;
use crate::validation::State;
use crate::value::Value;

pub(crate) fn base(schema: &Schema, value: Value, state: &State<'_>, options: &ValidationOptions) -> Coerced {
    if let Value::Function(_) = value {
        Coerced::ok(value)
    } else {
        let error = schema.error_at("function.base", context([("value", value.clone())]), state, options);
        Coerced::failed(value, error)
    }
}

impl Schema {
    /// Requires exactly `n` declared parameters.
    ///
    /// # Example
    ///
    /// ```rust
    /// use valuate::{Function, Schema, Value};
    ///
    /// let add = Function::new("add", 2, |args| {
    ///     let a = args[0].as_f64().unwrap_or(0.0);
    ///     let b = args[1].as_f64().unwrap_or(0.0);
    ///     Value::Number(a + b)
    /// });
    ///
    /// assert!(Schema::function().arity(2).validate(add.clone()).error.is_none());
    /// let error = Schema::function().arity(1).validate(add).error.unwrap();
    /// assert_eq!(error.message, "\"value\" must have an arity of 1");
    /// ```
    pub fn arity(self, n: usize) -> Self {
        self.arity_rule("arity", "function.arity", n, |arity, n| arity == n)
    }

    pub fn min_arity(self, n: usize) -> Self {
        assert!(n > 0, "min_arity must be a strictly positive integer");
        self.arity_rule("minArity", "function.minArity", n, |arity, n| arity >= n)
    }

    pub fn max_arity(self, n: usize) -> Self {
        self.arity_rule("maxArity", "function.maxArity", n, |arity, n| arity <= n)
    }

    fn arity_rule(
        self,
        name: &'static str,
        code: &'static str,
        n: usize,
        compare: fn(usize, usize) -> bool,
    ) -> Self {
        if self.schema_type() != SchemaType::Function {
            unsupported(self.schema_type(), name);
        }
        self.push_rule(Rule::new(
            name,
            Some(serde_json::Value::from(n)),
            move |schema, value, state, options| match value {
                Value::Function(function) if !compare(function.arity(), n) => Err(schema.error_at(
                    code,
                    context([("n", Value::from(n)), ("value", value.clone())]),
                    state,
                    options,
                )),
                _ => Ok(None),
            },
        ))
    }
}
