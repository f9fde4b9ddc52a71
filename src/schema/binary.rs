//! Binary schema.
//!
//! Accepts [`Value::Binary`], and strings decoded with the configured
//! [`Encoding`] when converting.

use base64::Engine as _;

use super::engine::Coerced;
use super::{unsupported, Kind, Schema};
use crate::error::context;
use crate::options::ValidationOptions;
use crate::validation::State;
use crate::value::Value;

/// String encodings understood by [`Schema::encoding`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Encoding {
    #[default]
    Utf8,
    Hex,
    Base64,
}

impl Encoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            Encoding::Utf8 => "utf8",
            Encoding::Hex => "hex",
            Encoding::Base64 => "base64",
        }
    }

    fn decode(&self, s: &str) -> Option<Vec<u8>> {
        match self {
            Encoding::Utf8 => Some(s.as_bytes().to_vec()),
            Encoding::Hex => hex::decode(s).ok(),
            Encoding::Base64 => base64::engine::general_purpose::STANDARD.decode(s).ok(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct BinaryInner {
    /// `None` decodes as UTF-8 and is left out of descriptions.
    pub encoding: Option<Encoding>,
}

impl BinaryInner {
    pub(crate) fn base(
        &self,
        schema: &Schema,
        value: Value,
        state: &State<'_>,
        options: &ValidationOptions,
    ) -> Coerced {
        let decoded = match &value {
            Value::Binary(_) => return Coerced::ok(value),
            Value::String(s) if options.convert => self.encoding.unwrap_or_default().decode(s),
            _ => None,
        };
        match decoded {
            Some(bytes) => Coerced::ok(Value::Binary(bytes)),
            None => {
                tracing::trace!(path = %state.path, "value is not binary");
                let error = schema.error_at("binary.base", context([("value", value.clone())]), state, options);
                Coerced::failed(value, error)
            }
        }
    }
}

impl Schema {
    /// Encoding used to decode strings.
    ///
    /// # Example
    ///
    /// ```rust
    /// use valuate::{Encoding, Schema, Value};
    ///
    /// let schema = Schema::binary().encoding(Encoding::Hex).min(2);
    /// assert_eq!(schema.validate("cafe").value, Value::Binary(vec![0xca, 0xfe]));
    /// assert!(schema.validate("zz").error.is_some());
    /// ```
    pub fn encoding(mut self, encoding: Encoding) -> Self {
        let schema_type = self.schema_type();
        match &mut self.kind {
            Kind::Binary(inner) => inner.encoding = Some(encoding),
            _ => unsupported(schema_type, "encoding"),
        }
        self
    }
}
