//! Per-node validation state.
//!
//! [`State`] tells a schema where the value it is checking lives: the key it
//! sits under, the full path from the root, the container holding it (used
//! to resolve references and defaults), and an optional explicit reference
//! target that overrides the container for reference resolution.

use crate::path::{KeyPath, PathSegment};
use crate::value::Value;

/// Location of the value currently being validated.
#[derive(Debug, Clone, Default)]
pub struct State<'a> {
    /// Key of the value within its container; `None` at the root.
    pub key: Option<PathSegment>,
    pub path: KeyPath,
    /// The container the value was found in.
    pub parent: Option<&'a Value>,
    /// Explicit target for reference resolution.
    pub reference: Option<&'a Value>,
}

impl State<'static> {
    /// State of the validated root.
    pub fn root() -> Self {
        Self::default()
    }
}

impl<'a> State<'a> {
    /// A root state whose references resolve against `target`.
    pub fn with_reference(target: &'a Value) -> Self {
        Self {
            key: None,
            path: KeyPath::root(),
            parent: None,
            reference: Some(target),
        }
    }

    /// State of a member of `parent` reached through `segment`.
    pub fn child<'b>(&'b self, segment: PathSegment, parent: &'b Value) -> State<'b> {
        State {
            path: self.path.push(segment.clone()),
            key: Some(segment),
            parent: Some(parent),
            reference: self.reference,
        }
    }

    /// Same key and path, with a different container.
    pub fn with_parent<'b>(&'b self, parent: Option<&'b Value>) -> State<'b> {
        State {
            key: self.key.clone(),
            path: self.path.clone(),
            parent,
            reference: self.reference,
        }
    }

    /// The value references resolve against.
    pub fn lookup_target(&self) -> Option<&'a Value> {
        self.reference.or(self.parent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_root_state() {
        let state = State::root();
        assert!(state.key.is_none());
        assert!(state.path.is_root());
        assert!(state.lookup_target().is_none());
    }

    #[test]
    fn test_child_state_tracks_path_and_parent() {
        let parent = Value::from(json!({"a": 1}));
        let root = State::root();
        let child = root.child(PathSegment::key("a"), &parent);
        assert_eq!(child.key, Some(PathSegment::key("a")));
        assert_eq!(child.path.to_string(), "a");
        assert_eq!(child.lookup_target(), Some(&parent));
    }

    #[test]
    fn test_reference_overrides_parent() {
        let target = Value::from(json!({"b": 2}));
        let parent = Value::from(json!({"a": 1}));
        let state = State::with_reference(&target);
        let child = state.child(PathSegment::key("a"), &parent);
        assert_eq!(child.lookup_target(), Some(&target));
    }
}
