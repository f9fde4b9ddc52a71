//! Message template interpolation.
//!
//! `{{name}}` is replaced by the stringified context value `name` (dotted
//! paths reach into nested values). `{{!name}}` is additionally HTML-escaped
//! when escaping is enabled.

use chrono::SecondsFormat;

use crate::value::{format_number, Value};

/// Renders a value for inclusion in a message.
///
/// Arrays render as their comma-separated elements, bracketed when
/// `wrap_arrays` is set.
pub fn stringify(value: &Value, wrap_arrays: bool) -> String {
    match value {
        Value::Undefined => "undefined".to_string(),
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => format_number(*n),
        Value::String(s) => s.clone(),
        Value::Date(d) => d.to_rfc3339_opts(SecondsFormat::Millis, true),
        Value::Binary(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        Value::Array(items) => join(items.iter().map(|v| stringify(v, wrap_arrays)), wrap_arrays),
        Value::Object(_) => value.to_json().to_string(),
        Value::Function(func) => format!("[Function {}]", func.name()),
    }
}

/// Joins already rendered parts the way arrays are rendered.
pub(crate) fn join(parts: impl Iterator<Item = String>, wrap_arrays: bool) -> String {
    let joined = parts.collect::<Vec<_>>().join(", ");
    if wrap_arrays {
        format!("[{}]", joined)
    } else {
        joined
    }
}

/// Replaces every `{{name}}` / `{{!name}}` in `format` with `resolve(name)`.
pub(crate) fn interpolate(
    format: &str,
    escape: bool,
    mut resolve: impl FnMut(&str) -> String,
) -> String {
    let mut out = String::with_capacity(format.len());
    let mut rest = format;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let (secure, body) = match after.strip_prefix('!') {
            Some(body) => (true, body),
            None => (false, after),
        };
        let name_len = body.find('}').unwrap_or(body.len());
        if name_len == 0 || !body[name_len..].starts_with("}}") {
            out.push_str("{{");
            rest = after;
            continue;
        }
        let rendered = resolve(&body[..name_len]);
        if secure && escape {
            out.push_str(&escape_html(&rendered));
        } else {
            out.push_str(&rendered);
        }
        rest = &body[name_len + 2..];
    }
    out.push_str(rest);
    out
}

/// Escapes every character outside a small safe set as an HTML entity.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if c.is_ascii_alphanumeric() || matches!(c, ' ' | ',' | '.' | '-' | '_') {
            out.push(c);
            continue;
        }
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            c if (c as u32) >= 256 => out.push_str(&format!("&#{};", c as u32)),
            c => out.push_str(&format!("&#x{:02x};", c as u32)),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_stringify_arrays() {
        let value = Value::from(json!(["a", 1, null]));
        assert_eq!(stringify(&value, true), "[a, 1, null]");
        assert_eq!(stringify(&value, false), "a, 1, null");
    }

    #[test]
    fn test_interpolate_plain_and_secure() {
        let rendered = interpolate("\"{{!label}}\" is {{limit}}", true, |name| match name {
            "label" => "<b>".to_string(),
            "limit" => "<5>".to_string(),
            _ => String::new(),
        });
        assert_eq!(rendered, "\"&lt;b&gt;\" is <5>");
    }

    #[test]
    fn test_interpolate_leaves_unterminated_braces() {
        let rendered = interpolate("a {{ b", false, |_| "x".to_string());
        assert_eq!(rendered, "a {{ b");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("a&b"), "a&amp;b");
        assert_eq!(escape_html("x'y"), "x&#x27;y");
        assert_eq!(escape_html("é"), "&#xe9;");
        assert_eq!(escape_html("✓"), "&#10003;");
    }
}
