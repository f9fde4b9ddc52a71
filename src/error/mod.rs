//! Error types.
//!
//! Validation failures are [`SchemaError`] trees accumulated into
//! [`SchemaErrors`] and presented to callers as a [`ValidationError`].
//! Mistakes made while assembling a schema are reported as [`BuildError`].

mod build_error;
pub(crate) mod messages;
mod schema_error;
pub mod template;
mod validation_error;

pub use build_error::BuildError;
pub use schema_error::{context, Context, SchemaError, SchemaErrors};
pub use validation_error::{ErrorDetail, ValidationError};
