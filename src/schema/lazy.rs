//! Lazy schema: the schema is produced by a factory on every validation,
//! which is how recursive structures refer to themselves.

use std::sync::Arc;

use super::engine::Coerced;
use super::Schema;
use crate::error::Context;
use crate::options::ValidationOptions;
use crate::validation::State;
use crate::value::Value;

pub(crate) type Factory = Arc<dyn Fn() -> Option<Schema> + Send + Sync>;

#[derive(Clone, Default)]
pub(crate) struct LazyInner {
    pub factory: Option<Factory>,
}

impl LazyInner {
    pub(crate) fn base(
        &self,
        schema: &Schema,
        value: Value,
        state: &State<'_>,
        options: &ValidationOptions,
    ) -> Coerced {
        let Some(factory) = &self.factory else {
            let error = schema.error_at("lazy.base", Context::new(), state, options);
            return Coerced::failed(value, error);
        };
        match factory() {
            Some(resolved) => {
                let outcome = resolved.validate_node(value, state, options);
                Coerced {
                    value: outcome.value,
                    errors: outcome.errors,
                }
            }
            None => {
                tracing::debug!(path = %state.path, "lazy factory returned no schema");
                let error = schema.error_at("lazy.schema", Context::new(), state, options);
                Coerced::failed(value, error)
            }
        }
    }
}
