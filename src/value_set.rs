//! Ordered sets of allowed or disallowed values.

use crate::options::ValidationOptions;
use crate::reference::Reference;
use crate::validation::State;
use crate::value::Value;

/// A member of a [`ValueSet`].
#[derive(Debug, Clone, PartialEq)]
pub enum SetItem {
    Literal(Value),
    Ref(Reference),
}

impl SetItem {
    /// The item as a value; references render as `ref:key`.
    pub fn to_value(&self) -> Value {
        match self {
            SetItem::Literal(value) => value.clone(),
            SetItem::Ref(reference) => Value::String(reference.to_string()),
        }
    }
}

macro_rules! impl_literal_item {
    ($($t:ty),*) => {
        $(
            impl From<$t> for SetItem {
                fn from(value: $t) -> Self {
                    SetItem::Literal(Value::from(value))
                }
            }
        )*
    };
}

impl_literal_item!(
    Value,
    serde_json::Value,
    &str,
    String,
    bool,
    f64,
    i32,
    i64,
    u32,
    u64,
    usize,
    chrono::DateTime<chrono::Utc>
);

impl From<Reference> for SetItem {
    fn from(reference: Reference) -> Self {
        SetItem::Ref(reference)
    }
}

/// Insertion-ordered set of literals and references.
///
/// Membership is checked in insertion order, so the first matching entry
/// wins. Literal duplicates are never inserted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueSet {
    items: Vec<SetItem>,
}

impl ValueSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[SetItem] {
        &self.items
    }

    /// Inserts `item`, recording the root key of non-context references in
    /// `refs`.
    pub fn add(&mut self, item: SetItem, refs: Option<&mut Vec<String>>) {
        match &item {
            SetItem::Literal(value) => {
                if self.has(value, None, None, false) {
                    return;
                }
            }
            SetItem::Ref(reference) => {
                if let Some(refs) = refs {
                    if !reference.is_context() {
                        refs.push(reference.root().to_string());
                    }
                }
            }
        }
        self.items.push(item);
    }

    pub fn remove(&mut self, item: &SetItem) {
        self.items.retain(|existing| existing != item);
    }

    /// Tests membership of `value`.
    ///
    /// References are only resolved when `state` is supplied; they resolve
    /// against `state.reference` or `state.parent`, and an array result
    /// matches when any of its elements matches.
    pub fn has(
        &self,
        value: &Value,
        state: Option<&State<'_>>,
        options: Option<&ValidationOptions>,
        insensitive: bool,
    ) -> bool {
        for item in &self.items {
            match item {
                SetItem::Literal(candidate) => {
                    if matches_value(value, candidate, insensitive) {
                        return true;
                    }
                }
                SetItem::Ref(reference) => {
                    let Some(state) = state else { continue };
                    let default_options;
                    let options = match options {
                        Some(options) => options,
                        None => {
                            default_options = ValidationOptions::default();
                            &default_options
                        }
                    };
                    let resolved = reference.resolve(state.lookup_target(), options);
                    let found = match &resolved {
                        Value::Array(candidates) => candidates
                            .iter()
                            .any(|candidate| matches_value(value, candidate, insensitive)),
                        other => matches_value(value, other, insensitive),
                    };
                    if found {
                        return true;
                    }
                }
            }
        }
        false
    }

    /// Adds every item of `add` then removes every item of `remove`.
    pub fn merge(&self, add: &ValueSet, remove: &ValueSet) -> ValueSet {
        let mut merged = self.clone();
        for item in &add.items {
            merged.add(item.clone(), None);
        }
        for item in &remove.items {
            merged.remove(item);
        }
        merged
    }

    pub fn concat(&self, other: &ValueSet) -> ValueSet {
        self.merge(other, &ValueSet::new())
    }

    /// All members as values, references rendered as `ref:key`.
    pub fn values(&self, strip_undefined: bool) -> Vec<Value> {
        self.items
            .iter()
            .filter(|item| !(strip_undefined && matches!(item, SetItem::Literal(Value::Undefined))))
            .map(SetItem::to_value)
            .collect()
    }

    pub fn describe(&self) -> Vec<serde_json::Value> {
        self.values(false).iter().map(Value::to_json).collect()
    }
}

fn matches_value(value: &Value, candidate: &Value, insensitive: bool) -> bool {
    if value == candidate {
        return true;
    }
    match (value, candidate) {
        (Value::String(a), Value::String(b)) if insensitive => a.to_lowercase() == b.to_lowercase(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::PathSegment;
    use serde_json::json;

    #[test]
    fn test_literal_duplicates_are_skipped() {
        let mut set = ValueSet::new();
        set.add(SetItem::from("a"), None);
        set.add(SetItem::from("a"), None);
        set.add(SetItem::from(1), None);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_reference_roots_are_recorded() {
        let mut set = ValueSet::new();
        let mut refs = Vec::new();
        set.add(SetItem::from(Reference::new("a.b")), Some(&mut refs));
        set.add(SetItem::from(Reference::new("$ctx")), Some(&mut refs));
        assert_eq!(refs, vec!["a".to_string()]);
    }

    #[test]
    fn test_nan_matches_nan() {
        let mut set = ValueSet::new();
        set.add(SetItem::from(Value::from(f64::NAN)), None);
        set.add(SetItem::from(Value::from(f64::NAN)), None);
        assert_eq!(set.len(), 1);
        assert!(set.has(&Value::from(f64::NAN), None, None, false));
        assert!(!set.has(&Value::from(0), None, None, false));
    }

    #[test]
    fn test_insensitive_match() {
        let mut set = ValueSet::new();
        set.add(SetItem::from("Hello"), None);
        assert!(!set.has(&Value::from("hello"), None, None, false));
        assert!(set.has(&Value::from("hello"), None, None, true));
    }

    #[test]
    fn test_reference_membership() {
        let mut set = ValueSet::new();
        set.add(SetItem::from(Reference::new("choices")), None);
        let parent = Value::from(json!({"choices": ["x", "y"]}));
        let root = State::root();
        let state = root.child(PathSegment::key("pick"), &parent);
        assert!(set.has(&Value::from("y"), Some(&state), None, false));
        assert!(!set.has(&Value::from("z"), Some(&state), None, false));
        assert!(!set.has(&Value::from("y"), None, None, false));
    }

    #[test]
    fn test_merge_cross_removes() {
        let mut a = ValueSet::new();
        a.add(SetItem::from(1), None);
        a.add(SetItem::from(2), None);
        let mut add = ValueSet::new();
        add.add(SetItem::from(3), None);
        let mut remove = ValueSet::new();
        remove.add(SetItem::from(1), None);
        let merged = a.merge(&add, &remove);
        assert_eq!(merged.values(false), vec![Value::from(2), Value::from(3)]);
    }

    #[test]
    fn test_values_strip_undefined() {
        let mut set = ValueSet::new();
        set.add(SetItem::Literal(Value::Undefined), None);
        set.add(SetItem::from(Reference::new("a")), None);
        assert_eq!(set.values(true), vec![Value::from("ref:a")]);
        assert_eq!(set.values(false).len(), 2);
    }
}
