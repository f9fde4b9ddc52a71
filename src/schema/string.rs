//! String schema.
//!
//! When conversion is enabled the input passes through a fixed pipeline
//! before any rule runs: unicode normalization, trimming, case folding,
//! replacements, truncation to the `max` length and hex byte alignment.
//! Rules then check the converted string.
//!
//! # Example
//!
//! ```rust
//! use valuate::Schema;
//!
//! let schema = Schema::string().trim().uppercase().max(3).truncate(true);
//! assert_eq!(schema.validate("  abcdef ").value, "ABC".into());
//! ```

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use super::{unsupported, Kind, Limit, Rule, Schema};
use crate::error::{context, BuildError, Context};
use crate::formats::{self, Cidr};
use crate::options::ValidationOptions;
use crate::validation::State;
use crate::value::Value;

use super::engine::Coerced;

pub use crate::formats::{EmailOptions, IpVersion};

/// Case applied by the conversion pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Case {
    Lower,
    Upper,
}

/// Unicode normalization forms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NormalizationForm {
    #[default]
    Nfc,
    Nfd,
    Nfkc,
    Nfkd,
}

impl NormalizationForm {
    pub fn as_str(&self) -> &'static str {
        match self {
            NormalizationForm::Nfc => "NFC",
            NormalizationForm::Nfd => "NFD",
            NormalizationForm::Nfkc => "NFKC",
            NormalizationForm::Nfkd => "NFKD",
        }
    }

    fn apply(&self, s: &str) -> String {
        match self {
            NormalizationForm::Nfc => s.nfc().collect(),
            NormalizationForm::Nfd => s.nfd().collect(),
            NormalizationForm::Nfkc => s.nfkc().collect(),
            NormalizationForm::Nfkd => s.nfkd().collect(),
        }
    }
}

/// Options for [`Schema::regex`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegexOptions {
    /// Name shown in the error message instead of the pattern.
    pub name: Option<String>,
    /// Fail when the pattern matches instead of when it does not.
    pub invert: bool,
}

impl RegexOptions {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            invert: false,
        }
    }

    pub fn inverted() -> Self {
        Self {
            name: None,
            invert: true,
        }
    }
}

/// Options for [`Schema::ip`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IpOptions {
    /// Accepted versions; empty accepts every version.
    pub versions: Vec<IpVersion>,
    pub cidr: Cidr,
}

/// Options for [`Schema::uri`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UriOptions {
    /// Accepted schemes; empty accepts any scheme.
    pub schemes: Vec<String>,
    pub allow_relative: bool,
    pub relative_only: bool,
}

/// Options for [`Schema::base64`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Base64Options {
    pub padding_required: bool,
}

impl Default for Base64Options {
    fn default() -> Self {
        Self {
            padding_required: true,
        }
    }
}

/// GUID versions accepted by [`Schema::guid`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuidVersion {
    V1,
    V2,
    V3,
    V4,
    V5,
}

impl GuidVersion {
    fn number(&self) -> u8 {
        match self {
            GuidVersion::V1 => 1,
            GuidVersion::V2 => 2,
            GuidVersion::V3 => 3,
            GuidVersion::V4 => 4,
            GuidVersion::V5 => 5,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GuidVersion::V1 => "uuidv1",
            GuidVersion::V2 => "uuidv2",
            GuidVersion::V3 => "uuidv3",
            GuidVersion::V4 => "uuidv4",
            GuidVersion::V5 => "uuidv5",
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Replacement {
    pub pattern: Regex,
    pub replacement: String,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct StringInner {
    pub normalize: Option<NormalizationForm>,
    pub case: Option<Case>,
    pub trim: bool,
    pub replacements: Vec<Replacement>,
    pub truncate: bool,
    /// Literal limit of the first `max` rule, used for truncation.
    pub max_length: Option<usize>,
    pub byte_aligned: bool,
}

impl StringInner {
    pub(crate) fn base(
        &self,
        schema: &Schema,
        value: Value,
        state: &State<'_>,
        options: &ValidationOptions,
    ) -> Coerced {
        let value = match value {
            Value::String(s) if options.convert => Value::String(self.convert(s)),
            other => other,
        };
        if matches!(value, Value::String(_)) {
            Coerced::ok(value)
        } else {
            let error = schema.error_at("string.base", context([("value", value.clone())]), state, options);
            Coerced::failed(value, error)
        }
    }

    fn convert(&self, mut s: String) -> String {
        if let Some(form) = self.normalize {
            s = form.apply(&s);
        }
        if self.trim {
            s = s.trim().to_string();
        }
        match self.case {
            Some(Case::Upper) => s = s.to_uppercase(),
            Some(Case::Lower) => s = s.to_lowercase(),
            None => {}
        }
        for replacement in &self.replacements {
            s = replacement
                .pattern
                .replace_all(&s, replacement.replacement.as_str())
                .into_owned();
        }
        if self.truncate {
            if let Some(max) = self.max_length {
                s = s.chars().take(max).collect();
            }
        }
        if self.byte_aligned && s.chars().count() % 2 != 0 {
            s = format!("0{s}");
        }
        s
    }
}

impl Schema {
    fn string_inner(&mut self, builder: &str) -> &mut StringInner {
        let schema_type = self.schema_type();
        match &mut self.kind {
            Kind::String(inner) => inner,
            _ => unsupported(schema_type, builder),
        }
    }

    /// Adds a rule that fails with `code` when `check` rejects the string.
    fn string_test<F>(
        self,
        name: &str,
        arg: Option<serde_json::Value>,
        code: &'static str,
        extra: Context,
        check: F,
    ) -> Self
    where
        F: Fn(&str, &ValidationOptions) -> bool + Send + Sync + 'static,
    {
        self.push_rule(Rule::new(name, arg, move |schema, value, state, options| {
            let Some(s) = value.as_str() else {
                return Ok(None);
            };
            if check(s, options) {
                return Ok(None);
            }
            let mut ctx = context([("value", value.clone())]);
            ctx.extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));
            Err(schema.error_at(code, ctx, state, options))
        }))
    }

    /// Requires every character to be an ASCII letter or digit.
    pub fn alphanum(mut self) -> Self {
        self.string_inner("alphanum");
        self.string_test("alphanum", None, "string.alphanum", Context::new(), |s, _| {
            !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric())
        })
    }

    /// Requires every character to be an ASCII letter, digit or `_`.
    pub fn token(mut self) -> Self {
        self.string_inner("token");
        self.string_test("token", None, "string.token", Context::new(), |s, _| {
            !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        })
    }

    /// Requires the string to match `pattern`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use valuate::{RegexOptions, Schema};
    ///
    /// let schema = Schema::string()
    ///     .regex(r"^[a-z]+$", RegexOptions::named("lowercase word"))
    ///     .unwrap();
    /// let error = schema.validate("Abc").error.unwrap();
    /// assert_eq!(
    ///     error.message,
    ///     "\"value\" with value \"Abc\" fails to match the lowercase word pattern"
    /// );
    ///
    /// assert!(Schema::string().regex("(", RegexOptions::default()).is_err());
    /// ```
    pub fn regex(self, pattern: &str, options: RegexOptions) -> Result<Self, BuildError> {
        let regex = Regex::new(pattern).map_err(|e| BuildError::invalid_regex(pattern, e))?;
        Ok(self.regex_with(regex, options))
    }

    /// [`Schema::regex`] with an already compiled expression.
    pub fn regex_with(mut self, regex: Regex, options: RegexOptions) -> Self {
        self.string_inner("regex");
        let code = match (options.invert, options.name.is_some()) {
            (false, false) => "string.regex.base",
            (false, true) => "string.regex.name",
            (true, false) => "string.regex.invert.base",
            (true, true) => "string.regex.invert.name",
        };
        let pattern = format!("/{}/", regex.as_str());
        let mut arg = serde_json::json!({ "pattern": pattern });
        if let Some(name) = &options.name {
            arg["name"] = serde_json::Value::String(name.clone());
        }
        if options.invert {
            arg["invert"] = serde_json::Value::Bool(true);
        }
        let mut extra = Context::new();
        extra.insert("name".to_string(), Value::from(options.name.clone()));
        extra.insert("pattern".to_string(), Value::String(pattern));
        let invert = options.invert;
        self.string_test("regex", Some(arg), code, extra, move |s, _| regex.is_match(s) != invert)
    }

    /// Replaces every occurrence of `pattern` during conversion.
    pub fn replace(mut self, pattern: &str, replacement: impl Into<String>) -> Self {
        let literal = regex::escape(pattern);
        match Regex::new(&literal) {
            Ok(pattern) => self.string_inner("replace").replacements.push(Replacement {
                pattern,
                replacement: replacement.into().replace('$', "$$"),
            }),
            Err(error) => tracing::debug!(%error, "escaped pattern failed to compile"),
        }
        self
    }

    /// Replaces every match of the regular expression `pattern` during
    /// conversion. `replacement` may refer to capture groups as `$1`.
    pub fn replace_regex(mut self, pattern: &str, replacement: impl Into<String>) -> Result<Self, BuildError> {
        let regex = Regex::new(pattern).map_err(|e| BuildError::invalid_regex(pattern, e))?;
        self.string_inner("replace").replacements.push(Replacement {
            pattern: regex,
            replacement: replacement.into(),
        });
        Ok(self)
    }

    pub fn email(mut self, options: EmailOptions) -> Self {
        self.string_inner("email");
        let arg = serde_json::json!({
            "minDomainAtoms": options.min_domain_atoms,
            "tldWhitelist": options.tld_whitelist,
        });
        self.string_test("email", Some(arg), "string.email", Context::new(), move |s, _| {
            formats::is_valid_email(s, &options)
        })
    }

    /// Requires an IP address.
    ///
    /// # Example
    ///
    /// ```rust
    /// use valuate::{Cidr, IpOptions, IpVersion, Schema};
    ///
    /// let schema = Schema::string().ip(IpOptions {
    ///     versions: vec![IpVersion::Ipv4],
    ///     cidr: Cidr::Forbidden,
    /// });
    /// assert!(schema.validate("10.0.0.1").error.is_none());
    /// let error = schema.validate("::1").error.unwrap();
    /// assert_eq!(
    ///     error.message,
    ///     "\"value\" must be a valid ip address of one of the following versions [ipv4] with a forbidden CIDR"
    /// );
    /// ```
    pub fn ip(mut self, options: IpOptions) -> Self {
        self.string_inner("ip");
        let explicit = !options.versions.is_empty();
        let versions = if explicit {
            options.versions.clone()
        } else {
            vec![IpVersion::Ipv4, IpVersion::Ipv6, IpVersion::IpvFuture]
        };
        let names: Vec<Value> = versions.iter().map(|v| Value::from(v.as_str())).collect();
        let cidr = options.cidr;

        let mut extra = Context::new();
        extra.insert("cidr".to_string(), Value::from(cidr.as_str()));
        let code = if explicit {
            extra.insert("version".to_string(), Value::Array(names.clone()));
            "string.ipVersion"
        } else {
            "string.ip"
        };
        let arg = serde_json::json!({
            "version": names.iter().map(Value::to_json).collect::<Vec<_>>(),
            "cidr": cidr.as_str(),
        });
        self.string_test("ip", Some(arg), code, extra, move |s, _| {
            formats::is_valid_ip(s, &versions, cidr)
        })
    }

    pub fn uri(mut self, options: UriOptions) -> Self {
        self.string_inner("uri");
        let mut extra = Context::new();
        let code = if options.relative_only {
            "string.uriRelativeOnly"
        } else if !options.schemes.is_empty() {
            extra.insert("scheme".to_string(), Value::from(options.schemes.join("|")));
            "string.uriCustomScheme"
        } else {
            "string.uri"
        };
        let arg = serde_json::json!({
            "scheme": options.schemes,
            "allowRelative": options.allow_relative,
            "relativeOnly": options.relative_only,
        });
        self.string_test("uri", Some(arg), code, extra, move |s, _| {
            formats::is_valid_uri(s, &options.schemes, options.allow_relative, options.relative_only)
        })
    }

    /// Requires a GUID of one of `versions` (any version when empty).
    pub fn guid(mut self, versions: &[GuidVersion]) -> Self {
        self.string_inner("guid");
        let numbers: Vec<u8> = versions.iter().map(GuidVersion::number).collect();
        let arg = (!versions.is_empty()).then(|| {
            serde_json::json!({ "version": versions.iter().map(GuidVersion::as_str).collect::<Vec<_>>() })
        });
        self.string_test("guid", arg, "string.guid", Context::new(), move |s, _| {
            formats::is_valid_guid(s, &numbers)
        })
    }

    /// Alias of [`Schema::guid`].
    pub fn uuid(self, versions: &[GuidVersion]) -> Self {
        self.guid(versions)
    }

    /// Requires hexadecimal characters. With `byte_aligned`, odd-length
    /// strings are zero-padded when converting and rejected otherwise.
    pub fn hex(mut self, byte_aligned: bool) -> Self {
        self.string_inner("hex").byte_aligned = byte_aligned;
        let arg = byte_aligned.then(|| serde_json::json!({ "byteAligned": true }));
        self.push_rule(Rule::new("hex", arg, move |schema, value, state, options| {
            let Some(s) = value.as_str() else {
                return Ok(None);
            };
            if !formats::is_hex(s) {
                return Err(schema.error_at("string.hex", context([("value", value.clone())]), state, options));
            }
            if byte_aligned && s.len() % 2 != 0 {
                return Err(schema.error_at("string.hexAlign", context([("value", value.clone())]), state, options));
            }
            Ok(None)
        }))
    }

    pub fn base64(mut self, options: Base64Options) -> Self {
        self.string_inner("base64");
        let padding = options.padding_required;
        let arg = serde_json::json!({ "paddingRequired": padding });
        self.string_test("base64", Some(arg), "string.base64", Context::new(), move |s, _| {
            formats::is_base64(s, padding)
        })
    }

    pub fn hostname(mut self) -> Self {
        self.string_inner("hostname");
        self.string_test("hostname", None, "string.hostname", Context::new(), |s, _| {
            formats::is_valid_hostname(s)
        })
    }

    /// Requires an ISO 8601 date string.
    pub fn iso_date(mut self) -> Self {
        self.string_inner("isoDate");
        self.string_test("isoDate", None, "string.isoDate", Context::new(), |s, _| formats::is_iso_date(s))
    }

    /// Requires a digit string passing the Luhn checksum.
    pub fn credit_card(mut self) -> Self {
        self.string_inner("creditCard");
        self.string_test("creditCard", None, "string.creditCard", Context::new(), |s, _| {
            formats::is_credit_card(s)
        })
    }

    /// Normalizes to `form` when converting; otherwise requires the string
    /// to already be in that form.
    pub fn normalize(mut self, form: NormalizationForm) -> Self {
        self.string_inner("normalize").normalize = Some(form);
        let mut extra = Context::new();
        extra.insert("form".to_string(), Value::from(form.as_str()));
        self.string_test(
            "normalize",
            Some(serde_json::Value::from(form.as_str())),
            "string.normalize",
            extra,
            move |s, options| options.convert || form.apply(s) == s,
        )
    }

    /// Lowercases when converting; otherwise requires lowercase input.
    pub fn lowercase(mut self) -> Self {
        self.string_inner("lowercase").case = Some(Case::Lower);
        self.string_test("lowercase", None, "string.lowercase", Context::new(), |s, options| {
            options.convert || s.to_lowercase() == s
        })
    }

    /// Uppercases when converting; otherwise requires uppercase input.
    pub fn uppercase(mut self) -> Self {
        self.string_inner("uppercase").case = Some(Case::Upper);
        self.string_test("uppercase", None, "string.uppercase", Context::new(), |s, options| {
            options.convert || s.to_uppercase() == s
        })
    }

    /// Trims whitespace when converting; otherwise rejects surrounding
    /// whitespace.
    pub fn trim(mut self) -> Self {
        self.string_inner("trim").trim = true;
        self.string_test("trim", None, "string.trim", Context::new(), |s, options| {
            options.convert || s.trim() == s
        })
    }

    /// Cuts converted strings down to the `max` length instead of failing.
    pub fn truncate(mut self, enabled: bool) -> Self {
        self.string_inner("truncate").truncate = enabled;
        self
    }

    /// Records the literal `max` limit used by truncation.
    pub(crate) fn note_max_length(&mut self, limit: &Limit) {
        if let Kind::String(inner) = &mut self.kind {
            if inner.max_length.is_none() {
                if let Limit::Number(n) = limit {
                    inner.max_length = Some(*n as usize);
                }
            }
        }
    }
}
