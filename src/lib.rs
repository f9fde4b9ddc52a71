//! # Valuate
//!
//! An immutable, composable schema validation engine.
//!
//! ## Overview
//!
//! A [`Schema`] describes what a value must look like. Validating a value
//! against it produces the coerced value (strings trimmed, numbers parsed,
//! defaults filled in, unknown keys stripped) and, when something is wrong,
//! a [`ValidationError`] carrying a tree of [`SchemaError`]s flattened into
//! human-readable [`ErrorDetail`]s. By default validation stops at the first
//! error; with `abort_early` disabled every error is reported.
//!
//! ## Core Types
//!
//! - [`Schema`]: an immutable schema node, built with chainable builders
//! - [`Value`]: the dynamic value being validated
//! - [`Reference`]: a pointer to a sibling value or a context entry, usable
//!   wherever a builder takes a limit or an allowed value
//! - [`ValidationOptions`]: per-call options (conversion, presence, unknown
//!   keys, language)
//! - [`Root`]: a schema factory with defaults and custom types
//!
//! ## Example
//!
//! ```rust
//! use valuate::{Reference, Schema, Value};
//! use serde_json::json;
//!
//! let schema = Schema::object().keys([
//!     ("name", Schema::string().trim().min(1).required()),
//!     ("min", Schema::number()),
//!     ("max", Schema::number().min(Reference::new("min"))),
//! ]);
//!
//! let result = schema.validate(json!({"name": "  ada ", "min": 1, "max": "5"}));
//! assert!(result.error.is_none());
//! assert_eq!(result.value, Value::from(json!({"name": "ada", "min": 1, "max": 5})));
//!
//! let error = schema.validate(json!({"name": "x", "min": 5, "max": 1})).error.unwrap();
//! assert_eq!(error.details[0].code, "number.min");
//! assert_eq!(error.details[0].path.to_string(), "max");
//! ```

pub mod compile;
pub mod error;
pub mod formats;
pub mod options;
pub mod path;
pub mod reference;
pub mod registry;
pub mod root;
pub mod schema;
pub mod topo;
pub mod validation;
pub mod value;
pub mod value_set;

pub use compile::{compile, SchemaLike};
pub use error::{context, BuildError, Context, ErrorDetail, SchemaError, SchemaErrors, ValidationError};
pub use formats::Cidr;
pub use options::{Presence, Settings, StripUnknown, ValidationOptions};
pub use path::{KeyPath, PathSegment};
pub use reference::Reference;
pub use registry::{Extension, ExtensionRegistry, ExtensionRule};
pub use root::Root;
pub use schema::{
    Base64Options, Condition, CustomError, DefaultValue, EmailOptions, Encoding, ErrorOverride,
    ErrorReplacement, GuidVersion, IpOptions, IpVersion, Limit, NormalizationForm, RegexOptions,
    RenameOptions, Schema, SchemaType, TimestampUnit, Unique, UriOptions, ValidationResult, When,
};
pub use validation::State;
pub use value::{Function, Map, Value};
