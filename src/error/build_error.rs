//! Errors raised while constructing schemas.

use thiserror::Error;

/// A schema was assembled incorrectly.
///
/// These are programmer errors: they surface from fallible builders and
/// never describe the data being validated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("cannot merge type {left} with another type: {right}")]
    IncompatibleConcat { left: String, right: String },

    #[error("invalid regex pattern `{pattern}`: {reason}")]
    InvalidRegex { pattern: String, reason: String },

    #[error("{0}")]
    Dependencies(String),

    #[error("invalid condition: {0}")]
    InvalidCondition(String),

    #[error("unknown rule `{rule}` for type {type_name}")]
    UnknownRule { type_name: String, rule: String },

    #[error("unknown extension type `{0}`")]
    UnknownExtension(String),

    #[error("extension type `{0}` is already registered")]
    DuplicateExtension(String),

    #[error("missing segment {segment} in reach path {path}")]
    MissingSegment { segment: String, path: String },

    #[error("cannot use assertions for root level references - use only for sibling keys: {0}")]
    RootAssertion(String),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("invalid options: {0}")]
    InvalidOptions(String),
}

impl BuildError {
    pub(crate) fn invalid_regex(pattern: &str, error: regex::Error) -> Self {
        BuildError::InvalidRegex {
            pattern: pattern.to_string(),
            reason: error.to_string(),
        }
    }
}
