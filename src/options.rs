//! Validation options and per-schema setting overrides.
//!
//! [`ValidationOptions`] is the full set of knobs a validation run uses. A
//! schema can carry a partial [`Settings`] record (set via
//! [`Schema::options`](crate::Schema::options)) which is merged over the
//! inherited options for that node and everything below it.
//!
//! Both types deserialize from camelCase JSON so options can be loaded from
//! configuration files:
//!
//! ```rust
//! use valuate::ValidationOptions;
//! use serde_json::json;
//!
//! let options = ValidationOptions::from_json(json!({
//!     "abortEarly": false,
//!     "stripUnknown": { "objects": true }
//! }))
//! .unwrap();
//!
//! assert!(!options.abort_early);
//! assert!(options.strip_unknown.objects());
//! assert!(!options.strip_unknown.arrays());
//! ```

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::BuildError;
use crate::value::Value;

/// Whether a value must, may, or must not be present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Presence {
    #[default]
    Optional,
    Required,
    Forbidden,
    /// Skip presence checks entirely.
    Ignore,
}

impl Presence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Presence::Optional => "optional",
            Presence::Required => "required",
            Presence::Forbidden => "forbidden",
            Presence::Ignore => "ignore",
        }
    }
}

/// Which containers drop unknown members instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StripUnknown {
    /// `true` strips unknown object keys and unmatched array items.
    All(bool),
    Targets {
        #[serde(default)]
        arrays: bool,
        #[serde(default)]
        objects: bool,
    },
}

impl Default for StripUnknown {
    fn default() -> Self {
        StripUnknown::All(false)
    }
}

impl StripUnknown {
    pub fn objects(&self) -> bool {
        match self {
            StripUnknown::All(enabled) => *enabled,
            StripUnknown::Targets { objects, .. } => *objects,
        }
    }

    pub fn arrays(&self) -> bool {
        match self {
            StripUnknown::All(enabled) => *enabled,
            StripUnknown::Targets { arrays, .. } => *arrays,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.objects() || self.arrays()
    }
}

/// Options controlling a validation run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ValidationOptions {
    /// Stop at the first error.
    pub abort_early: bool,
    /// Coerce values to the schema type where possible.
    pub convert: bool,
    /// Accept unknown object keys.
    pub allow_unknown: bool,
    /// Ignore unknown keys holding functions.
    pub skip_functions: bool,
    pub strip_unknown: StripUnknown,
    /// Message overrides, shaped like the default catalog.
    pub language: serde_json::Value,
    /// Presence applied to schemas without an explicit one.
    pub presence: Presence,
    /// Value resolved by context references.
    #[serde(deserialize_with = "deserialize_context")]
    pub context: Option<Value>,
    /// Skip applying defaults.
    pub no_defaults: bool,
    /// Escape interpolated values in messages.
    pub escape_html: bool,
}

fn deserialize_context<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<serde_json::Value>::deserialize(deserializer).map(|v| v.map(Value::from))
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            abort_early: true,
            convert: true,
            allow_unknown: false,
            skip_functions: false,
            strip_unknown: StripUnknown::default(),
            language: serde_json::Value::Null,
            presence: Presence::Optional,
            context: None,
            no_defaults: false,
            escape_html: false,
        }
    }
}

impl ValidationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses options from camelCase JSON; missing fields take defaults.
    pub fn from_json(json: serde_json::Value) -> Result<Self, BuildError> {
        serde_json::from_value(json).map_err(|e| BuildError::InvalidOptions(e.to_string()))
    }

    pub fn with_abort_early(mut self, enabled: bool) -> Self {
        self.abort_early = enabled;
        self
    }

    pub fn with_convert(mut self, enabled: bool) -> Self {
        self.convert = enabled;
        self
    }

    pub fn with_allow_unknown(mut self, enabled: bool) -> Self {
        self.allow_unknown = enabled;
        self
    }

    pub fn with_skip_functions(mut self, enabled: bool) -> Self {
        self.skip_functions = enabled;
        self
    }

    pub fn with_strip_unknown(mut self, strip: StripUnknown) -> Self {
        self.strip_unknown = strip;
        self
    }

    pub fn with_language(mut self, language: serde_json::Value) -> Self {
        self.language = language;
        self
    }

    pub fn with_presence(mut self, presence: Presence) -> Self {
        self.presence = presence;
        self
    }

    pub fn with_context(mut self, context: impl Into<Value>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_no_defaults(mut self, enabled: bool) -> Self {
        self.no_defaults = enabled;
        self
    }

    pub fn with_escape_html(mut self, enabled: bool) -> Self {
        self.escape_html = enabled;
        self
    }

    /// Returns these options with every field set in `settings` overridden.
    ///
    /// Language overrides are merged key by key rather than replaced.
    pub fn apply(&self, settings: &Settings) -> ValidationOptions {
        let mut merged = self.clone();
        if let Some(v) = settings.abort_early {
            merged.abort_early = v;
        }
        if let Some(v) = settings.convert {
            merged.convert = v;
        }
        if let Some(v) = settings.allow_unknown {
            merged.allow_unknown = v;
        }
        if let Some(v) = settings.skip_functions {
            merged.skip_functions = v;
        }
        if let Some(v) = settings.strip_unknown {
            merged.strip_unknown = v;
        }
        if let Some(language) = &settings.language {
            merge_json(&mut merged.language, language);
        }
        if let Some(v) = settings.presence {
            merged.presence = v;
        }
        if let Some(v) = settings.no_defaults {
            merged.no_defaults = v;
        }
        if let Some(v) = settings.escape_html {
            merged.escape_html = v;
        }
        merged
    }
}

/// Deep merge of JSON objects; `source` wins on conflicts.
pub(crate) fn merge_json(target: &mut serde_json::Value, source: &serde_json::Value) {
    match (target, source) {
        (serde_json::Value::Object(target), serde_json::Value::Object(source)) => {
            for (key, value) in source {
                match target.get_mut(key) {
                    Some(existing) => merge_json(existing, value),
                    None => {
                        target.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (target, source) => *target = source.clone(),
    }
}

/// A partial set of options attached to a schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abort_early: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub convert: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_unknown: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_functions: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strip_unknown: Option<StripUnknown>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presence: Option<Presence>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_defaults: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub escape_html: Option<bool>,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: serde_json::Value) -> Result<Self, BuildError> {
        serde_json::from_value(json).map_err(|e| BuildError::InvalidOptions(e.to_string()))
    }

    pub fn abort_early(mut self, enabled: bool) -> Self {
        self.abort_early = Some(enabled);
        self
    }

    pub fn convert(mut self, enabled: bool) -> Self {
        self.convert = Some(enabled);
        self
    }

    pub fn allow_unknown(mut self, enabled: bool) -> Self {
        self.allow_unknown = Some(enabled);
        self
    }

    pub fn skip_functions(mut self, enabled: bool) -> Self {
        self.skip_functions = Some(enabled);
        self
    }

    pub fn strip_unknown(mut self, strip: StripUnknown) -> Self {
        self.strip_unknown = Some(strip);
        self
    }

    pub fn language(mut self, language: serde_json::Value) -> Self {
        self.language = Some(language);
        self
    }

    pub fn presence(mut self, presence: Presence) -> Self {
        self.presence = Some(presence);
        self
    }

    pub fn no_defaults(mut self, enabled: bool) -> Self {
        self.no_defaults = Some(enabled);
        self
    }

    pub fn escape_html(mut self, enabled: bool) -> Self {
        self.escape_html = Some(enabled);
        self
    }

    /// Overlays `other` on top of `self`; fields set in `other` win.
    pub fn merge(&self, other: &Settings) -> Settings {
        let mut language = self.language.clone();
        if let Some(source) = &other.language {
            match &mut language {
                Some(target) => merge_json(target, source),
                None => language = Some(source.clone()),
            }
        }
        Settings {
            abort_early: other.abort_early.or(self.abort_early),
            convert: other.convert.or(self.convert),
            allow_unknown: other.allow_unknown.or(self.allow_unknown),
            skip_functions: other.skip_functions.or(self.skip_functions),
            strip_unknown: other.strip_unknown.or(self.strip_unknown),
            language,
            presence: other.presence.or(self.presence),
            no_defaults: other.no_defaults.or(self.no_defaults),
            escape_html: other.escape_html.or(self.escape_html),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let options = ValidationOptions::default();
        assert!(options.abort_early);
        assert!(options.convert);
        assert!(!options.allow_unknown);
        assert_eq!(options.presence, Presence::Optional);
        assert!(!options.strip_unknown.is_enabled());
    }

    #[test]
    fn test_from_json_with_context() {
        let options = ValidationOptions::from_json(json!({
            "presence": "required",
            "context": { "limit": 3 },
            "stripUnknown": true
        }))
        .unwrap();
        assert_eq!(options.presence, Presence::Required);
        assert_eq!(options.context, Some(Value::from(json!({"limit": 3}))));
        assert!(options.strip_unknown.objects());
        assert!(options.strip_unknown.arrays());
    }

    #[test]
    fn test_unknown_presence_is_rejected() {
        let result = ValidationOptions::from_json(json!({"presence": "sometimes"}));
        assert!(matches!(result, Err(BuildError::InvalidOptions(_))));
    }

    #[test]
    fn test_apply_settings_overrides_set_fields_only() {
        let settings = Settings::new().convert(false);
        let options = ValidationOptions::default().with_abort_early(false).apply(&settings);
        assert!(!options.convert);
        assert!(!options.abort_early);
    }

    #[test]
    fn test_language_merges_deeply() {
        let base = Settings::new().language(json!({"string": {"min": "too short"}}));
        let merged = base.merge(&Settings::new().language(json!({"string": {"max": "too long"}})));
        assert_eq!(
            merged.language,
            Some(json!({"string": {"min": "too short", "max": "too long"}}))
        );
    }

    #[test]
    fn test_settings_serialize_only_set_fields() {
        let settings = Settings::new().abort_early(false);
        assert_eq!(settings.to_json(), json!({"abortEarly": false}));
    }
}
