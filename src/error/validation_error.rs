//! The error returned by a failed validation run.

use indexmap::IndexMap;
use thiserror::Error;

use super::schema_error::{Context, SchemaError, SchemaErrors};
use crate::path::{KeyPath, PathSegment};
use crate::value::Value;

/// One leaf failure of a [`ValidationError`].
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorDetail {
    pub message: String,
    pub path: KeyPath,
    /// Dotted error code (e.g. `string.min`).
    pub code: String,
    pub context: Context,
}

/// The failure of a whole validation run.
///
/// `message` joins the messages of the top-level errors with `". "`, while
/// `details` lists every leaf failure with wrapper errors such as
/// `object.child` flattened out.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub message: String,
    pub details: Vec<ErrorDetail>,
    object: Value,
}

impl ValidationError {
    pub(crate) fn process(errors: &SchemaErrors, object: &Value) -> ValidationError {
        let mut messages = Vec::new();
        let mut details = Vec::new();
        if let Some(message) = flatten(errors.iter(), true, None, &mut messages, &mut details) {
            let path = errors.first().path.clone();
            return ValidationError {
                details: vec![ErrorDetail {
                    message: message.clone(),
                    path,
                    code: "override".to_string(),
                    context: Context::new(),
                }],
                message,
                object: object.clone(),
            };
        }
        ValidationError {
            message: messages.join(". "),
            details,
            object: object.clone(),
        }
    }

    pub fn name(&self) -> &'static str {
        "ValidationError"
    }

    /// The original input that failed validation.
    pub fn object(&self) -> &Value {
        &self.object
    }

    pub fn first(&self) -> Option<&ErrorDetail> {
        self.details.first()
    }

    pub fn with_code(&self, code: &str) -> Vec<&ErrorDetail> {
        self.details.iter().filter(|d| d.code == code).collect()
    }

    pub fn at_path(&self, path: &KeyPath) -> Vec<&ErrorDetail> {
        self.details.iter().filter(|d| &d.path == path).collect()
    }

    /// Renders the original input with numbered markers next to every
    /// failing key, followed by the numbered list of messages.
    ///
    /// ANSI colors are used unless `strip_colors` is set.
    pub fn annotate(&self, strip_colors: bool) -> String {
        let colors = Colors::new(strip_colors);
        if !matches!(self.object, Value::Object(_) | Value::Array(_)) {
            return self
                .details
                .first()
                .map(|d| d.message.clone())
                .unwrap_or_default();
        }

        let mut notes = Notes::default();
        for (i, detail) in self.details.iter().enumerate().rev() {
            let label = detail
                .context
                .get("label")
                .map(ToString::to_string)
                .unwrap_or_default();
            notes.record(&self.object, &detail.path, i + 1, &label);
        }

        let mut out = String::new();
        write_value(&mut out, &self.object, Some(&notes), 0, &colors);
        out.push('\n');
        out.push_str(colors.red);
        for (i, detail) in self.details.iter().enumerate() {
            out.push_str(&format!("\n[{}] {}", i + 1, detail.message));
        }
        out.push_str(colors.end);
        out
    }
}

/// Collects leaf details; returns a static override message if one applies.
fn flatten<'a>(
    errors: impl Iterator<Item = &'a SchemaError>,
    top: bool,
    parent_message: Option<&str>,
    messages: &mut Vec<String>,
    details: &mut Vec<ErrorDetail>,
) -> Option<String> {
    for error in errors {
        if let Some(message) = &error.override_message {
            return Some(message.clone());
        }
        let rendered = if top {
            let rendered = error.render();
            messages.push(rendered.clone());
            Some(rendered)
        } else {
            None
        };
        match &error.reason {
            Some(reason) => {
                let message = error.message.as_deref().or(parent_message);
                if let Some(over) = flatten(reason.iter(), false, message, messages, details) {
                    return Some(over);
                }
            }
            None => details.push(ErrorDetail {
                message: parent_message
                    .map(str::to_string)
                    .or(rendered)
                    .unwrap_or_else(|| error.render()),
                path: error.path.clone(),
                code: error.code.clone(),
                context: error.context.clone(),
            }),
        }
    }
    None
}

struct Colors {
    red: &'static str,
    red_bg: &'static str,
    end: &'static str,
}

impl Colors {
    fn new(strip: bool) -> Self {
        if strip {
            Self {
                red: "",
                red_bg: "",
                end: "",
            }
        } else {
            Self {
                red: "\u{1b}[31m",
                red_bg: "\u{1b}[41m",
                end: "\u{1b}[0m",
            }
        }
    }
}

/// Error markers attached to one container of the annotated value.
#[derive(Default)]
struct Notes {
    errors: IndexMap<String, Vec<usize>>,
    missing: IndexMap<String, usize>,
    children: IndexMap<String, Notes>,
}

impl Notes {
    fn record(&mut self, root: &Value, path: &KeyPath, pos: usize, label: &str) {
        let segments: Vec<&PathSegment> = path.segments().collect();
        let mut notes = self;
        let mut current = root;
        for (j, segment) in segments.iter().enumerate() {
            let key = segment.to_string();
            let child = current.get(&key);
            let descend = j + 1 < segments.len()
                && matches!(child, Some(Value::Object(_)) | Some(Value::Array(_)));
            if descend {
                if let Some(child) = child {
                    current = child;
                }
                notes = notes.children.entry(key).or_default();
                continue;
            }
            let cache_key = if key.is_empty() { label.to_string() } else { key };
            match child {
                Some(value) if !value.is_undefined() => {
                    notes.errors.entry(cache_key).or_default().push(pos)
                }
                _ => {
                    notes.missing.insert(cache_key, pos);
                }
            }
            return;
        }
    }

    fn positions(&self, key: &str) -> Option<String> {
        self.errors.get(key).map(|positions| {
            let mut sorted = positions.clone();
            sorted.sort_unstable();
            sorted
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        })
    }
}

fn write_value(out: &mut String, value: &Value, notes: Option<&Notes>, indent: usize, colors: &Colors) {
    match value {
        Value::Object(map) => {
            let pad = "  ".repeat(indent + 1);
            let mut lines = Vec::new();
            let errored = |key: &str| notes.is_some_and(|n| n.errors.contains_key(key));
            let render_entry = |key: &str, child: &Value, marker: Option<String>| {
                let mut entry = String::new();
                entry.push_str(&pad);
                entry.push_str(&quote(key));
                if let Some(marker) = marker {
                    entry.push_str(&format!(" {}[{}]{}", colors.red, marker, colors.end));
                }
                entry.push_str(": ");
                write_value(
                    &mut entry,
                    child,
                    notes.and_then(|n| n.children.get(key)),
                    indent + 1,
                    colors,
                );
                entry
            };
            for (key, child) in map
                .iter()
                .filter(|(k, v)| !v.is_undefined() && !errored(k.as_str()))
            {
                lines.push(render_entry(key.as_str(), child, None));
            }
            if let Some(notes) = notes {
                for key in notes.errors.keys() {
                    if let Some(child) = map.get(key) {
                        lines.push(render_entry(key.as_str(), child, notes.positions(key)));
                    }
                }
                for (key, pos) in &notes.missing {
                    lines.push(format!(
                        "{}{}{}{}{} [{}]: -- missing --{}",
                        pad,
                        colors.red_bg,
                        quote(key),
                        colors.end,
                        colors.red,
                        pos,
                        colors.end
                    ));
                }
            }
            write_block(out, '{', '}', lines, indent);
        }
        Value::Array(items) => {
            let pad = "  ".repeat(indent + 1);
            let count = items.len();
            let mut lines = Vec::with_capacity(count);
            for (i, item) in items.iter().enumerate() {
                let key = i.to_string();
                let mut entry = pad.clone();
                write_value(
                    &mut entry,
                    item,
                    notes.and_then(|n| n.children.get(&key)),
                    indent + 1,
                    colors,
                );
                if i + 1 < count {
                    entry.push(',');
                }
                if let Some(marker) = notes.and_then(|n| n.positions(&key)) {
                    let first_line_end = entry.find('\n').unwrap_or(entry.len());
                    entry.insert_str(
                        first_line_end,
                        &format!(" {}[{}]{}", colors.red, marker, colors.end),
                    );
                }
                lines.push(entry);
            }
            if lines.is_empty() {
                out.push_str("[]");
            } else {
                out.push_str("[\n");
                out.push_str(&lines.join("\n"));
                out.push('\n');
                out.push_str(&"  ".repeat(indent));
                out.push(']');
            }
        }
        Value::Undefined => out.push_str("undefined"),
        Value::Number(n) if !n.is_finite() => out.push_str(&crate::value::format_number(*n)),
        Value::Function(func) => out.push_str(&format!("[Function {}]", func.name())),
        other => out.push_str(&other.to_json().to_string()),
    }
}

fn write_block(out: &mut String, open: char, close: char, lines: Vec<String>, indent: usize) {
    if lines.is_empty() {
        out.push(open);
        out.push(close);
        return;
    }
    out.push(open);
    out.push('\n');
    out.push_str(&lines.join(",\n"));
    out.push('\n');
    out.push_str(&"  ".repeat(indent));
    out.push(close);
}

fn quote(key: &str) -> String {
    serde_json::Value::String(key.to_string()).to_string()
}
