//! Format checks used by string and date rules.
//!
//! Each check is a pure predicate over a string. Network formats lean on
//! `std::net`, `url` and `uuid`; the rest are anchored regular expressions
//! compiled once.

use std::net::{Ipv4Addr, Ipv6Addr};

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use url::{ParseError, Url};
use uuid::{Uuid, Variant};

static EMAIL_LOCAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~\x{80}-\x{10FFFF}-]+(?:\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~\x{80}-\x{10FFFF}-]+)*$")
        .expect("email local part pattern")
});

static DOMAIN_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[A-Za-z0-9\x{80}-\x{10FFFF}]|[A-Za-z0-9\x{80}-\x{10FFFF}][A-Za-z0-9\x{80}-\x{10FFFF}-]{0,61}[A-Za-z0-9\x{80}-\x{10FFFF}])$")
        .expect("domain label pattern")
});

static HOSTNAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(([a-zA-Z0-9]|[a-zA-Z0-9][a-zA-Z0-9\-]*[a-zA-Z0-9])\.)*([A-Za-z0-9]|[A-Za-z0-9][A-Za-z0-9\-]*[A-Za-z0-9])$")
        .expect("hostname pattern")
});

static IPVFUTURE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^v[0-9A-Fa-f]+\.[A-Za-z0-9\-._~!$&'()*+,;=:]+$").expect("ipvfuture pattern")
});

static URI_CHARS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[A-Za-z0-9\-._~:/?#\[\]@!$&'()*+,;=]|%[0-9A-Fa-f]{2})*$").expect("uri character pattern")
});

static HEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-fA-F0-9]+$").expect("hex pattern"));

static BASE64_PADDED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[A-Za-z0-9+/]{2}[A-Za-z0-9+/]{2})*(?:[A-Za-z0-9+/]{2}==|[A-Za-z0-9+/]{3}=)?$")
        .expect("base64 pattern")
});

static BASE64_UNPADDED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[A-Za-z0-9+/]{2}[A-Za-z0-9+/]{2})*(?:[A-Za-z0-9+/]{2}(?:==)?|[A-Za-z0-9+/]{3}=?)?$")
        .expect("base64 pattern")
});

static ISO_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^(?:[-+]\d{2})?\d{4}",
        r"(?:-(?:0[1-9]|1[0-2])(?:-(?:0[1-9]|[12]\d|3[01]))?",
        r"(?:[T ](?:[01]\d|2[0-3]):[0-5]\d(?::[0-5]\d(?:[.,]\d+)?)?",
        r"(?:Z|[+-](?:[01]\d|2[0-3])(?::?[0-5]\d)?)?)?)?$",
    ))
    .expect("iso date pattern")
});

static NUMERIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[+-]?\d+(?:\.\d+)?$").expect("numeric pattern"));

/// Constraints on an email address.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmailOptions {
    /// Minimum number of dot-separated domain segments.
    pub min_domain_atoms: Option<usize>,
    /// Accepted top-level domains (case-insensitive); empty accepts all.
    pub tld_whitelist: Vec<String>,
}

pub fn is_valid_email(value: &str, options: &EmailOptions) -> bool {
    let Some((local, domain)) = value.rsplit_once('@') else {
        return false;
    };
    if local.is_empty() || local.len() > 64 || value.len() > 254 {
        return false;
    }
    if !EMAIL_LOCAL.is_match(local) {
        return false;
    }
    if domain.is_empty() || domain.len() > 255 {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    if !labels.iter().all(|label| DOMAIN_LABEL.is_match(label)) {
        return false;
    }
    if let Some(min) = options.min_domain_atoms {
        if labels.len() < min {
            return false;
        }
    }
    if !options.tld_whitelist.is_empty() {
        let tld = labels.last().map(|tld| tld.to_lowercase()).unwrap_or_default();
        if !options.tld_whitelist.iter().any(|allowed| allowed.to_lowercase() == tld) {
            return false;
        }
    }
    true
}

pub fn is_valid_hostname(value: &str) -> bool {
    (value.len() <= 255 && HOSTNAME.is_match(value)) || value.parse::<Ipv6Addr>().is_ok()
}

/// IP address families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpVersion {
    Ipv4,
    Ipv6,
    IpvFuture,
}

impl IpVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            IpVersion::Ipv4 => "ipv4",
            IpVersion::Ipv6 => "ipv6",
            IpVersion::IpvFuture => "ipvfuture",
        }
    }

    fn matches(&self, address: &str) -> bool {
        match self {
            IpVersion::Ipv4 => address.parse::<Ipv4Addr>().is_ok(),
            IpVersion::Ipv6 => address.parse::<Ipv6Addr>().is_ok(),
            IpVersion::IpvFuture => IPVFUTURE.is_match(address),
        }
    }

    fn max_prefix(&self) -> u32 {
        match self {
            IpVersion::Ipv4 => 32,
            IpVersion::Ipv6 | IpVersion::IpvFuture => 128,
        }
    }
}

/// Whether an IP address may carry a `/prefix` suffix.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Cidr {
    #[default]
    Optional,
    Required,
    Forbidden,
}

impl Cidr {
    pub fn as_str(&self) -> &'static str {
        match self {
            Cidr::Optional => "optional",
            Cidr::Required => "required",
            Cidr::Forbidden => "forbidden",
        }
    }
}

/// Checks `value` is an address of one of `versions`, with a CIDR suffix
/// as required by `cidr`.
pub fn is_valid_ip(value: &str, versions: &[IpVersion], cidr: Cidr) -> bool {
    let (address, prefix) = match value.split_once('/') {
        Some((address, prefix)) => (address, Some(prefix)),
        None => (value, None),
    };
    match (cidr, prefix) {
        (Cidr::Required, None) | (Cidr::Forbidden, Some(_)) => return false,
        _ => {}
    }
    versions.iter().any(|version| {
        if !version.matches(address) {
            return false;
        }
        match prefix {
            None => true,
            Some(prefix) => {
                !prefix.is_empty()
                    && prefix.chars().all(|c| c.is_ascii_digit())
                    && prefix
                        .parse::<u32>()
                        .map(|bits| bits <= version.max_prefix())
                        .unwrap_or(false)
            }
        }
    })
}

/// Checks `value` is an RFC 3986 URI.
///
/// `schemes` (compared case-insensitively) restricts absolute URIs;
/// relative references are accepted only when `allow_relative` is set and
/// required when `relative_only` is.
pub fn is_valid_uri(value: &str, schemes: &[String], allow_relative: bool, relative_only: bool) -> bool {
    if value.is_empty() || !URI_CHARS.is_match(value) {
        return false;
    }
    match Url::parse(value) {
        Ok(url) => {
            if relative_only {
                return false;
            }
            schemes.is_empty()
                || schemes
                    .iter()
                    .any(|scheme| scheme.eq_ignore_ascii_case(url.scheme()))
        }
        Err(ParseError::RelativeUrlWithoutBase) => {
            (allow_relative || relative_only) && is_valid_relative(value)
        }
        Err(_) => false,
    }
}

fn is_valid_relative(value: &str) -> bool {
    match Url::parse("http://relative.invalid/") {
        Ok(base) => base.join(value).is_ok(),
        Err(_) => false,
    }
}

/// Checks `value` is a GUID, optionally braced, of one of `versions`
/// (any version when empty).
pub fn is_valid_guid(value: &str, versions: &[u8]) -> bool {
    let inner = match (value.chars().next(), value.chars().last()) {
        (Some('['), Some(']')) | (Some('{'), Some('}')) if value.len() > 2 => &value[1..value.len() - 1],
        (Some('[' | '{'), _) | (_, Some(']' | '}')) => return false,
        _ => value,
    };
    if inner.len() != 32 && inner.len() != 36 {
        return false;
    }
    let normalized;
    let candidate = if inner.contains(':') {
        if inner.contains('-') {
            return false;
        }
        normalized = inner.replace(':', "-");
        normalized.as_str()
    } else {
        inner
    };
    let Ok(uuid) = Uuid::try_parse(candidate) else {
        return false;
    };
    if versions.is_empty() {
        return true;
    }
    versions.contains(&(uuid.get_version_num() as u8)) && uuid.get_variant() == Variant::RFC4122
}

pub fn is_hex(value: &str) -> bool {
    HEX.is_match(value)
}

pub fn is_base64(value: &str, padding_required: bool) -> bool {
    if padding_required {
        BASE64_PADDED.is_match(value)
    } else {
        BASE64_UNPADDED.is_match(value)
    }
}

pub fn is_iso_date(value: &str) -> bool {
    ISO_DATE.is_match(value)
}

/// Luhn checksum over a string of digits.
pub fn is_credit_card(value: &str) -> bool {
    let mut sum = 0u32;
    let mut double = false;
    for c in value.chars().rev() {
        let Some(digit) = c.to_digit(10) else {
            return false;
        };
        let digit = if double {
            let doubled = digit * 2;
            if doubled > 9 {
                doubled - 9
            } else {
                doubled
            }
        } else {
            digit
        };
        sum += digit;
        double = !double;
    }
    sum > 0 && sum % 10 == 0
}

pub fn is_numeric(value: &str) -> bool {
    NUMERIC.is_match(value)
}

/// Parses the date formats accepted by date coercion: RFC 3339 and other
/// ISO 8601 forms (a missing offset is UTC), bare dates, and RFC 2822.
pub fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(date) = DateTime::parse_from_rfc3339(value) {
        return Some(date.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%dT%H:%M%z", "%Y-%m-%d %H:%M:%S%.f%z"] {
        if let Ok(date) = DateTime::parse_from_str(value, format) {
            return Some(date.with_timezone(&Utc));
        }
    }
    let naive = value.strip_suffix('Z').unwrap_or(value);
    for format in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(date) = NaiveDateTime::parse_from_str(naive, format) {
            return Some(Utc.from_utc_datetime(&date));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|d| Utc.from_utc_datetime(&d));
    }
    if value.len() == 7 {
        if let Ok(date) = NaiveDate::parse_from_str(&format!("{value}-01"), "%Y-%m-%d") {
            return date.and_hms_opt(0, 0, 0).map(|d| Utc.from_utc_datetime(&d));
        }
    }
    if value.len() == 4 && value.chars().all(|c| c.is_ascii_digit()) {
        if let Ok(date) = NaiveDate::parse_from_str(&format!("{value}-01-01"), "%Y-%m-%d") {
            return date.and_hms_opt(0, 0, 0).map(|d| Utc.from_utc_datetime(&d));
        }
    }
    DateTime::parse_from_rfc2822(value)
        .ok()
        .map(|date| date.with_timezone(&Utc))
}

/// Converts milliseconds since the epoch to a date.
pub fn date_from_millis(millis: f64) -> Option<DateTime<Utc>> {
    if !millis.is_finite() {
        return None;
    }
    let millis = millis.trunc();
    if millis.abs() > 8.64e15 {
        return None;
    }
    Utc.timestamp_millis_opt(millis as i64).single()
}
