//! Object schema.
//!
//! An object is validated in stages: renames are applied to a copy of the
//! input, each declared child is validated against its schema (with the
//! object under construction as the parent for references), remaining keys
//! are matched against patterns, leftover keys are stripped, ignored or
//! reported, and finally the peer dependencies (`with`, `xor`, ...) are
//! checked.
//!
//! Children are ordered so that a key is validated after every sibling its
//! schema references, which lets a reference see the converted value.
//!
//! # Example
//!
//! ```rust
//! use valuate::{Reference, Schema};
//! use serde_json::json;
//!
//! let schema = Schema::object()
//!     .keys([
//!         ("password", Schema::string().min(8)),
//!         ("confirm", Schema::any().valid([Reference::new("password")])),
//!     ])
//!     .with("password", ["confirm"]);
//!
//! assert!(schema.validate(json!({"password": "hunter2!", "confirm": "hunter2!"})).error.is_none());
//!
//! let error = schema.validate(json!({"password": "hunter2!"})).error.unwrap();
//! assert_eq!(error.message, "\"password\" missing required peer \"confirm\"");
//! ```

use regex::Regex;

use super::engine::{build_error, Coerced};
use super::{unsupported, Kind, Schema};
use crate::compile::SchemaLike;
use crate::error::{context, BuildError, SchemaError};
use crate::options::{Presence, ValidationOptions};
use crate::path::PathSegment;
use crate::reference::Reference;
use crate::topo::{Topo, TopoOptions};
use crate::validation::State;
use crate::value::{Map, Value};

/// A declared key and its schema.
#[derive(Debug, Clone)]
pub(crate) struct Child {
    pub key: String,
    pub schema: Schema,
}

/// Options for [`Schema::rename`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenameOptions {
    /// Keep the old key as well.
    pub alias: bool,
    /// Allow several keys to be renamed to the same target.
    pub multiple: bool,
    /// Replace an existing target key.
    pub allow_override: bool,
    /// Skip the rename when the source is `undefined`.
    pub ignore_undefined: bool,
}

#[derive(Debug, Clone)]
pub(crate) enum RenameSource {
    Key(String),
    Pattern(Regex),
}

#[derive(Debug, Clone)]
pub(crate) struct Rename {
    pub from: RenameSource,
    pub to: String,
    pub options: RenameOptions,
}

#[derive(Debug, Clone)]
pub(crate) struct Pattern {
    pub regex: Regex,
    pub schema: Schema,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DependencyKind {
    With,
    Without,
    Xor,
    Or,
    And,
    Nand,
}

impl DependencyKind {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            DependencyKind::With => "with",
            DependencyKind::Without => "without",
            DependencyKind::Xor => "xor",
            DependencyKind::Or => "or",
            DependencyKind::And => "and",
            DependencyKind::Nand => "nand",
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Dependency {
    pub kind: DependencyKind,
    /// Key the dependency hangs off (`with` and `without` only).
    pub key: Option<String>,
    pub peers: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct ObjectInner {
    /// `None` accepts any key; `Some(empty)` accepts none.
    pub children: Option<Vec<Child>>,
    pub renames: Vec<Rename>,
    pub dependencies: Vec<Dependency>,
    pub patterns: Vec<Pattern>,
    pub allow_unknown: Option<bool>,
}

/// Writes `key` into both the object being built and its parent snapshot,
/// skipping the snapshot when the entry is unchanged.
fn set_entry(target: &mut Map, parent: &mut Value, key: &str, value: Option<Value>) {
    let Some(snapshot) = parent.as_object_mut() else {
        return;
    };
    match value {
        Some(value) => {
            if snapshot.get(key) != Some(&value) {
                snapshot.insert(key.to_string(), value.clone());
            }
            target.insert(key.to_string(), value);
        }
        None => {
            snapshot.shift_remove(key);
            target.shift_remove(key);
        }
    }
}

fn present(target: &Map, key: &str) -> bool {
    target.get(key).is_some_and(|value| !value.is_undefined())
}

impl ObjectInner {
    pub(crate) fn base(
        &self,
        schema: &Schema,
        value: Value,
        state: &State<'_>,
        options: &ValidationOptions,
    ) -> Coerced {
        let value = match value {
            Value::String(s) if options.convert => match serde_json::from_str::<serde_json::Value>(&s) {
                Ok(parsed @ serde_json::Value::Object(_)) => Value::from(parsed),
                _ => Value::String(s),
            },
            other => other,
        };
        let mut target = match value {
            Value::Object(map) => map,
            other => {
                let error = schema.error_at("object.base", context([("value", other.clone())]), state, options);
                return Coerced::failed(other, error);
            }
        };

        if self.renames.is_empty()
            && self.dependencies.is_empty()
            && self.children.is_none()
            && self.patterns.is_empty()
        {
            return Coerced::ok(Value::Object(target));
        }

        let mut errors = Vec::new();
        macro_rules! bail {
            () => {
                if options.abort_early {
                    return Coerced {
                        value: Value::Object(target),
                        errors,
                    };
                }
            };
        }

        let mut renamed: Vec<String> = Vec::new();
        for rename in &self.renames {
            let to = rename.to.as_str();
            let already_renamed = renamed.iter().any(|key| key == to);
            match &rename.from {
                RenameSource::Pattern(regex) => {
                    let matched: Vec<String> = target.keys().filter(|key| regex.is_match(key)).cloned().collect();
                    let all_undefined = matched.iter().all(|key| !present(&target, key));
                    if rename.options.ignore_undefined && all_undefined {
                        continue;
                    }
                    let from = Value::Array(matched.iter().map(|key| Value::from(key.as_str())).collect());
                    if !rename.options.multiple && already_renamed {
                        errors.push(schema.error_at(
                            "object.rename.regex.multiple",
                            context([("from", from.clone()), ("to", Value::from(to))]),
                            state,
                            options,
                        ));
                        bail!();
                    }
                    if target.contains_key(to) && !rename.options.allow_override && !already_renamed {
                        errors.push(schema.error_at(
                            "object.rename.regex.override",
                            context([("from", from), ("to", Value::from(to))]),
                            state,
                            options,
                        ));
                        bail!();
                    }
                    if all_undefined {
                        target.shift_remove(to);
                    } else if let Some(last) = matched.last().and_then(|key| target.get(key)).cloned() {
                        target.insert(to.to_string(), last);
                    }
                    renamed.push(to.to_string());
                    if !rename.options.alias {
                        for key in &matched {
                            if key != to {
                                target.shift_remove(key);
                            }
                        }
                    }
                }
                RenameSource::Key(from) => {
                    let source = match target.get(from) {
                        Some(source) => source.clone(),
                        None => continue,
                    };
                    if rename.options.ignore_undefined && source.is_undefined() {
                        continue;
                    }
                    let ctx = || context([("from", Value::from(from.as_str())), ("to", Value::from(to))]);
                    if !rename.options.multiple && already_renamed {
                        errors.push(schema.error_at("object.rename.multiple", ctx(), state, options));
                        bail!();
                    }
                    if target.contains_key(to) && !rename.options.allow_override && !already_renamed {
                        errors.push(schema.error_at("object.rename.override", ctx(), state, options));
                        bail!();
                    }
                    if source.is_undefined() {
                        target.shift_remove(to);
                    } else {
                        target.insert(to.to_string(), source);
                    }
                    renamed.push(to.to_string());
                    if !rename.options.alias {
                        target.shift_remove(from);
                    }
                }
            }
        }

        let mut unprocessed: Vec<String> = target.keys().cloned().collect();
        // Children see the object under construction as their parent. The
        // snapshot is taken once and kept in step with `target`.
        let mut parent = Value::Object(target.clone());

        if let Some(children) = &self.children {
            for child in children {
                unprocessed.retain(|key| key != &child.key);
                let item = target.get(&child.key).cloned().unwrap_or(Value::Undefined);
                let was_defined = !item.is_undefined();
                let child_state = state.child(PathSegment::key(&child.key), &parent);
                let outcome = child.schema.validate_node(item, &child_state, options);

                if !outcome.is_ok() {
                    errors.push(
                        schema
                            .error_at(
                                "object.child",
                                context([
                                    ("key", Value::from(child.key.as_str())),
                                    ("child", Value::from(child.schema.label_or(&child.key))),
                                ]),
                                &child_state,
                                options,
                            )
                            .with_reason(outcome.errors),
                    );
                    bail!();
                    continue;
                }

                let visible = outcome.visible();
                if outcome.stripped || (visible.is_undefined() && was_defined) {
                    set_entry(&mut target, &mut parent, &child.key, None);
                } else if !visible.is_undefined() {
                    set_entry(&mut target, &mut parent, &child.key, Some(visible));
                }
            }
        }

        if !unprocessed.is_empty() && !self.patterns.is_empty() {
            let keys = unprocessed.clone();
            for key in keys {
                let item = target.get(&key).cloned().unwrap_or(Value::Undefined);
                for pattern in &self.patterns {
                    if !pattern.regex.is_match(&key) {
                        continue;
                    }
                    unprocessed.retain(|k| k != &key);
                    let key_state = state.child(PathSegment::key(&key), &parent);
                    let outcome = pattern.schema.validate_node(item.clone(), &key_state, options);
                    if !outcome.is_ok() {
                        errors.push(
                            schema
                                .error_at(
                                    "object.child",
                                    context([
                                        ("key", Value::from(key.as_str())),
                                        ("child", Value::from(pattern.schema.label_or(&key))),
                                    ]),
                                    &key_state,
                                    options,
                                )
                                .with_reason(outcome.errors.clone()),
                        );
                        bail!();
                    }
                    match outcome.visible() {
                        Value::Undefined => set_entry(&mut target, &mut parent, &key, None),
                        visible => set_entry(&mut target, &mut parent, &key, Some(visible)),
                    }
                }
            }
        }

        if (self.children.is_some() || !self.patterns.is_empty()) && !unprocessed.is_empty() {
            if (options.strip_unknown.is_enabled() && self.allow_unknown != Some(true)) || options.skip_functions {
                let strip = options.strip_unknown.objects();
                unprocessed.retain(|key| {
                    if strip {
                        target.shift_remove(key);
                        false
                    } else {
                        !matches!(target.get(key), Some(Value::Function(_)))
                    }
                });
            }

            let allow_unknown = self.allow_unknown.unwrap_or(options.allow_unknown);
            if !allow_unknown {
                for key in &unprocessed {
                    let segment = PathSegment::key(key);
                    errors.push(build_error(
                        "object.allowUnknown",
                        context([("child", Value::from(key.as_str()))]),
                        Some(&segment),
                        state.path.push_key(key),
                        options,
                        None,
                    ));
                }
            }
        }

        for dependency in &self.dependencies {
            if let Some(error) = self.check_dependency(schema, dependency, &target, state, options) {
                errors.push(error);
                bail!();
            }
        }

        Coerced {
            value: Value::Object(target),
            errors,
        }
    }

    /// Label of the child declared under `key`, or the key itself.
    fn key_label(&self, key: &str) -> Value {
        let label = self
            .children
            .as_ref()
            .and_then(|children| children.iter().find(|child| child.key == key))
            .map(|child| child.schema.label_or(key))
            .unwrap_or_else(|| key.to_string());
        Value::String(label)
    }

    fn key_labels(&self, keys: &[String]) -> Value {
        Value::Array(keys.iter().map(|key| self.key_label(key)).collect())
    }

    fn check_dependency(
        &self,
        schema: &Schema,
        dependency: &Dependency,
        target: &Map,
        state: &State<'_>,
        options: &ValidationOptions,
    ) -> Option<SchemaError> {
        let peers = &dependency.peers;
        let names = |keys: &[String]| Value::Array(keys.iter().map(|key| Value::from(key.as_str())).collect());
        let at_key = |code: &str, ctx| {
            let key = dependency.key.as_deref().unwrap_or_default();
            let segment = PathSegment::key(key);
            schema.error_with(code, ctx, Some(&segment), state.path.push_key(key), options)
        };
        let at_object = |code: &str, ctx| schema.error_with(code, ctx, None, state.path.clone(), options);

        match dependency.kind {
            DependencyKind::With | DependencyKind::Without => {
                let main = dependency.key.as_deref()?;
                if !present(target, main) {
                    return None;
                }
                let (code, offending) = if dependency.kind == DependencyKind::With {
                    ("object.with", peers.iter().find(|peer| !present(target, peer)))
                } else {
                    ("object.without", peers.iter().find(|peer| present(target, peer)))
                };
                let peer = offending?;
                Some(at_key(
                    code,
                    context([
                        ("main", Value::from(main)),
                        ("mainWithLabel", self.key_label(main)),
                        ("peer", Value::from(peer.as_str())),
                        ("peerWithLabel", self.key_label(peer)),
                    ]),
                ))
            }
            DependencyKind::Xor => {
                let count = peers.iter().filter(|peer| present(target, peer)).count();
                let ctx = context([("peers", names(peers)), ("peersWithLabels", self.key_labels(peers))]);
                match count {
                    1 => None,
                    0 => Some(at_object("object.missing", ctx)),
                    _ => Some(at_object("object.xor", ctx)),
                }
            }
            DependencyKind::Or => {
                if peers.iter().any(|peer| present(target, peer)) {
                    return None;
                }
                Some(at_object(
                    "object.missing",
                    context([("peers", names(peers)), ("peersWithLabels", self.key_labels(peers))]),
                ))
            }
            DependencyKind::And => {
                let (present_keys, missing): (Vec<String>, Vec<String>) =
                    peers.iter().cloned().partition(|peer| present(target, peer));
                if present_keys.is_empty() || missing.is_empty() {
                    return None;
                }
                Some(at_object(
                    "object.and",
                    context([
                        ("present", names(&present_keys)),
                        ("presentWithLabels", self.key_labels(&present_keys)),
                        ("missing", names(&missing)),
                        ("missingWithLabels", self.key_labels(&missing)),
                    ]),
                ))
            }
            DependencyKind::Nand => {
                if !peers.iter().all(|peer| present(target, peer)) {
                    return None;
                }
                let (main, rest) = peers.split_first()?;
                Some(at_object(
                    "object.nand",
                    context([
                        ("main", Value::from(main.as_str())),
                        ("mainWithLabel", self.key_label(main)),
                        ("peers", names(rest)),
                        ("peersWithLabels", self.key_labels(rest)),
                    ]),
                ))
            }
        }
    }
}

impl Schema {
    fn object_inner(&mut self, builder: &str) -> &mut ObjectInner {
        let schema_type = self.schema_type();
        match &mut self.kind {
            Kind::Object(inner) => inner,
            _ => unsupported(schema_type, builder),
        }
    }

    /// Declares children. Keys already declared are replaced; an empty
    /// list forbids every key.
    ///
    /// # Panics
    ///
    /// When the children's references form a cycle; see
    /// [`Schema::try_keys`].
    pub fn keys<I, K, S>(self, children: I) -> Self
    where
        I: IntoIterator<Item = (K, S)>,
        K: Into<String>,
        S: Into<SchemaLike>,
    {
        self.try_keys(children).unwrap_or_else(|error| panic!("{error}"))
    }

    /// Fallible form of [`Schema::keys`].
    ///
    /// # Example
    ///
    /// ```rust
    /// use valuate::{BuildError, Reference, Schema};
    ///
    /// let cyclic = Schema::object().try_keys([
    ///     ("a", Schema::any().valid([Reference::new("b")])),
    ///     ("b", Schema::any().valid([Reference::new("a")])),
    /// ]);
    /// assert!(matches!(cyclic, Err(BuildError::Dependencies(_))));
    /// ```
    pub fn try_keys<I, K, S>(mut self, children: I) -> Result<Self, BuildError>
    where
        I: IntoIterator<Item = (K, S)>,
        K: Into<String>,
        S: Into<SchemaLike>,
    {
        let added: Vec<Child> = children
            .into_iter()
            .map(|(key, schema)| {
                let key = key.into();
                let schema = crate::compile::compile(schema.into())?;
                Ok(Child { key, schema })
            })
            .collect::<Result<_, BuildError>>()?;

        let inner = self.object_inner("keys");
        if added.is_empty() {
            inner.children = Some(Vec::new());
            return Ok(self);
        }

        let mut topo = Topo::new();
        if let Some(existing) = &inner.children {
            for child in existing.iter().filter(|child| !added.iter().any(|a| a.key == child.key)) {
                topo.add([child.clone()], child_placement(child))?;
            }
        }
        for child in added {
            let placement = child_placement(&child);
            topo.add([child], placement)?;
        }
        inner.children = Some(topo.into_nodes());
        Ok(self)
    }

    /// Like [`Schema::keys`], but leaves the schema unchanged when
    /// `children` is empty.
    pub fn append<I, K, S>(self, children: I) -> Self
    where
        I: IntoIterator<Item = (K, S)>,
        K: Into<String>,
        S: Into<SchemaLike>,
    {
        let children: Vec<(K, S)> = children.into_iter().collect();
        if children.is_empty() {
            return self;
        }
        self.keys(children)
    }

    /// Allows (or forbids) keys that are not declared.
    pub fn unknown(mut self, allow: bool) -> Self {
        self.object_inner("unknown").allow_unknown = Some(allow);
        self
    }

    /// Moves the value of key `from` to `to` before validation.
    ///
    /// # Panics
    ///
    /// When `from` equals `to` or `from` is already renamed.
    ///
    /// # Example
    ///
    /// ```rust
    /// use valuate::{RenameOptions, Schema};
    /// use serde_json::json;
    ///
    /// let schema = Schema::object()
    ///     .keys([("name", Schema::string())])
    ///     .rename("username", "name", RenameOptions::default());
    /// let result = schema.validate(json!({"username": "ada"}));
    /// assert_eq!(result.value.to_json(), json!({"name": "ada"}));
    /// ```
    pub fn rename(mut self, from: &str, to: &str, options: RenameOptions) -> Self {
        assert!(from != to, "cannot rename key to same name: {from}");
        let inner = self.object_inner("rename");
        assert!(
            !inner
                .renames
                .iter()
                .any(|rename| matches!(&rename.from, RenameSource::Key(key) if key == from)),
            "cannot rename the same key multiple times"
        );
        inner.renames.push(Rename {
            from: RenameSource::Key(from.to_string()),
            to: to.to_string(),
            options,
        });
        self
    }

    /// Moves the value of every key matching `pattern` to `to`; when
    /// several keys match, the last one wins.
    pub fn rename_regex(mut self, pattern: &str, to: &str, options: RenameOptions) -> Result<Self, BuildError> {
        let regex = Regex::new(pattern).map_err(|e| BuildError::invalid_regex(pattern, e))?;
        let inner = self.object_inner("rename");
        if inner
            .renames
            .iter()
            .any(|rename| matches!(&rename.from, RenameSource::Pattern(existing) if existing.as_str() == pattern))
        {
            return Err(BuildError::InvalidArgument(
                "cannot rename the same key multiple times".to_string(),
            ));
        }
        inner.renames.push(Rename {
            from: RenameSource::Pattern(regex),
            to: to.to_string(),
            options,
        });
        Ok(self)
    }

    /// Validates undeclared keys matching `pattern` against `schema`.
    pub fn pattern(self, pattern: &str, schema: impl Into<SchemaLike>) -> Result<Self, BuildError> {
        let regex = Regex::new(pattern).map_err(|e| BuildError::invalid_regex(pattern, e))?;
        let schema = crate::compile::compile(schema.into())?;
        Ok(self.pattern_with(regex, schema))
    }

    /// [`Schema::pattern`] with an already compiled expression.
    pub fn pattern_with(mut self, regex: Regex, schema: Schema) -> Self {
        self.object_inner("pattern").patterns.push(Pattern { regex, schema });
        self
    }

    fn dependency<I>(mut self, kind: DependencyKind, key: Option<&str>, peers: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let peers: Vec<String> = peers.into_iter().map(Into::into).collect();
        self.object_inner(kind.as_str()).dependencies.push(Dependency {
            kind,
            key: key.map(str::to_string),
            peers,
        });
        self
    }

    /// When `key` is present, every peer must be present.
    pub fn with<I>(self, key: &str, peers: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.dependency(DependencyKind::With, Some(key), peers)
    }

    /// When `key` is present, no peer may be present.
    pub fn without<I>(self, key: &str, peers: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.dependency(DependencyKind::Without, Some(key), peers)
    }

    /// Exactly one of `peers` must be present.
    pub fn xor<I>(self, peers: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.dependency(DependencyKind::Xor, None, peers)
    }

    /// At least one of `peers` must be present.
    pub fn or<I>(self, peers: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.dependency(DependencyKind::Or, None, peers)
    }

    /// Either all or none of `peers` must be present.
    pub fn and<I>(self, peers: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.dependency(DependencyKind::And, None, peers)
    }

    /// Not all of `peers` may be present together.
    pub fn nand<I>(self, peers: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.dependency(DependencyKind::Nand, None, peers)
    }

    /// Requires the member at `reference` to match `schema`, whose own
    /// references resolve against the whole object. `message` completes
    /// the sentence "failed to ..." and defaults to "pass the assertion
    /// test".
    ///
    /// Sibling members must be addressed with a nested path (`a.b`);
    /// single-segment references are rejected with
    /// [`BuildError::RootAssertion`].
    ///
    /// # Example
    ///
    /// ```rust
    /// use valuate::{Reference, Schema};
    /// use serde_json::json;
    ///
    /// let schema = Schema::object()
    ///     .keys([("range", Schema::object().keys([("low", Schema::number()), ("high", Schema::number())]))])
    ///     .assert(
    ///         Reference::new("range.high"),
    ///         Schema::number().min(Reference::new("range.low")),
    ///         Some("stay above the lower bound"),
    ///     )
    ///     .unwrap();
    ///
    /// let error = schema.validate(json!({"range": {"low": 5, "high": 1}})).error.unwrap();
    /// assert_eq!(error.details[0].code, "object.assert");
    /// assert_eq!(error.details[0].path.to_string(), "range.high");
    /// ```
    pub fn assert(
        mut self,
        reference: Reference,
        schema: impl Into<SchemaLike>,
        message: Option<&str>,
    ) -> Result<Self, BuildError> {
        if !reference.is_context() && reference.depth() <= 1 {
            return Err(BuildError::RootAssertion(reference.key().to_string()));
        }
        let schema = crate::compile::compile(schema.into())?;
        self.object_inner("assert");
        let message = message.unwrap_or("pass the assertion test").to_string();
        let dotted = reference.path().join(".");
        let last = reference.path().last().cloned().unwrap_or_default();
        let arg = serde_json::json!({ "schema": schema.describe(), "ref": reference.to_string() });

        Ok(self.push_rule(super::Rule::new("assert", Some(arg), move |this, value, state, options| {
            let target = reference.resolve(Some(value), options);
            if schema
                .validate_node(target, &State::with_reference(value), options)
                .is_ok()
            {
                return Ok(None);
            }
            let segment = PathSegment::key(&last);
            Err(this.error_with(
                "object.assert",
                context([("ref", Value::from(dotted.as_str())), ("message", Value::from(message.as_str()))]),
                Some(&segment),
                state.path.concat(reference.path()),
                options,
            ))
        })))
    }

    /// Marks the given (possibly dotted) children as required.
    ///
    /// # Example
    ///
    /// ```rust
    /// use valuate::Schema;
    /// use serde_json::json;
    ///
    /// let schema = Schema::object()
    ///     .keys([("a", Schema::object().keys([("b", Schema::number())]))])
    ///     .required_keys(["a", "a.b"])
    ///     .unwrap();
    ///
    /// let error = schema.validate(json!({"a": {}})).error.unwrap();
    /// assert_eq!(error.details[0].path.to_string(), "a.b");
    /// ```
    pub fn required_keys<I>(self, children: I) -> Result<Self, BuildError>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let children: Vec<String> = children.into_iter().map(Into::into).collect();
        self.apply_presence(&children, Presence::Required, "")
    }

    pub fn optional_keys<I>(self, children: I) -> Result<Self, BuildError>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let children: Vec<String> = children.into_iter().map(Into::into).collect();
        self.apply_presence(&children, Presence::Optional, "")
    }

    pub fn forbidden_keys<I>(self, children: I) -> Result<Self, BuildError>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let children: Vec<String> = children.into_iter().map(Into::into).collect();
        self.apply_presence(&children, Presence::Forbidden, "")
    }

    /// Applies `presence` to the children named by dotted paths; the empty
    /// path names the schema itself.
    fn apply_presence(mut self, children: &[String], presence: Presence, root: &str) -> Result<Self, BuildError> {
        if children.is_empty() {
            return Err(BuildError::InvalidArgument("expected at least one children".to_string()));
        }
        let prefix = if root.is_empty() {
            String::new()
        } else {
            format!("{root}.")
        };

        let mut grouped: Vec<(String, Vec<String>)> = Vec::new();
        let mut sorted = children.to_vec();
        sorted.sort();
        for child in sorted {
            let (head, rest) = match child.split_once('.') {
                Some((head, rest)) => (head.to_string(), rest.to_string()),
                None => (child.clone(), String::new()),
            };
            match grouped.iter_mut().find(|(key, _)| *key == head) {
                Some((_, group)) => group.push(rest),
                None => grouped.push((head, vec![rest])),
            }
        }

        if let Some(position) = grouped.iter().position(|(key, _)| key.is_empty()) {
            grouped.remove(position);
            self = self.with_presence(presence);
        }

        if let Kind::Object(inner) = &mut self.kind {
            if let Some(existing) = &mut inner.children {
                for child in existing.iter_mut() {
                    if let Some(position) = grouped.iter().position(|(key, _)| *key == child.key) {
                        let (_, group) = grouped.remove(position);
                        let path = format!("{prefix}{}", child.key);
                        child.schema = child.schema.clone().apply_presence(&group, presence, &path)?;
                    }
                }
            }
        }

        if grouped.is_empty() {
            Ok(self)
        } else {
            let unknown: Vec<String> = grouped.iter().map(|(key, _)| format!("{prefix}{key}")).collect();
            Err(BuildError::InvalidArgument(format!("unknown key(s) {}", unknown.join(", "))))
        }
    }

    /// The schema of the descendant at the dotted `path`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use valuate::{Schema, SchemaType};
    ///
    /// let schema = Schema::object().keys([("a", Schema::object().keys([("b", Schema::number())]))]);
    /// assert_eq!(schema.reach("a.b").map(|s| s.schema_type()), Some(SchemaType::Number));
    /// assert!(schema.reach("a.c").is_none());
    /// ```
    pub fn reach(&self, path: &str) -> Option<&Schema> {
        if path.is_empty() {
            return Some(self);
        }
        path.split('.').try_fold(self, |current, segment| match &current.kind {
            Kind::Object(inner) => inner
                .children
                .as_ref()?
                .iter()
                .find(|child| child.key == segment)
                .map(|child| &child.schema),
            _ => None,
        })
    }
}

fn child_placement(child: &Child) -> TopoOptions {
    TopoOptions::group(child.key.clone()).after(child.schema.refs().iter().cloned())
}
