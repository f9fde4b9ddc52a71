//! Dependency-aware ordering of grouped items.
//!
//! Object schemas use [`Topo`] to order their children so that a key whose
//! schema references another key is validated after it.

use std::collections::HashMap;

use crate::error::BuildError;

/// Placement constraints for items added to a [`Topo`].
#[derive(Debug, Clone, Default)]
pub struct TopoOptions {
    pub group: Option<String>,
    /// Groups that must come after the added items.
    pub before: Vec<String>,
    /// Groups that must come before the added items.
    pub after: Vec<String>,
}

impl TopoOptions {
    pub fn group(name: impl Into<String>) -> Self {
        Self {
            group: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn after(mut self, groups: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.after.extend(groups.into_iter().map(Into::into));
        self
    }

    pub fn before(mut self, groups: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.before.extend(groups.into_iter().map(Into::into));
        self
    }
}

#[derive(Debug, Clone)]
struct TopoItem<T> {
    seq: usize,
    group: String,
    before: Vec<String>,
    after: Vec<String>,
    node: T,
}

/// An ordered collection re-sorted on every insertion.
#[derive(Debug, Clone)]
pub struct Topo<T> {
    items: Vec<TopoItem<T>>,
    nodes: Vec<T>,
}

impl<T> Default for Topo<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            nodes: Vec::new(),
        }
    }
}

impl<T: Clone> Topo<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `nodes` under the given constraints and re-sorts.
    pub fn add(
        &mut self,
        nodes: impl IntoIterator<Item = T>,
        options: TopoOptions,
    ) -> Result<(), BuildError> {
        let group = options.group.clone().unwrap_or_else(|| "?".to_string());
        for node in nodes {
            self.items.push(TopoItem {
                seq: self.items.len(),
                group: group.clone(),
                before: options.before.clone(),
                after: options.after.clone(),
                node,
            });
        }
        if self.sort() {
            Ok(())
        } else {
            Err(BuildError::Dependencies(match &options.group {
                Some(group) => format!("item added into group {} created a dependencies error", group),
                None => "item created a dependencies error".to_string(),
            }))
        }
    }

    /// Appends the items of `others`, renumbering insertion order, and
    /// re-sorts.
    pub fn merge(&mut self, others: &[&Topo<T>]) -> Result<(), BuildError> {
        for other in others {
            self.items.extend(other.items.iter().cloned());
        }
        for (i, item) in self.items.iter_mut().enumerate() {
            item.seq = i;
        }
        if self.sort() {
            Ok(())
        } else {
            Err(BuildError::Dependencies(
                "merge created a dependencies error".to_string(),
            ))
        }
    }

    /// The items in their current valid order.
    pub fn nodes(&self) -> &[T] {
        &self.nodes
    }

    pub fn into_nodes(self) -> Vec<T> {
        self.nodes
    }

    fn sort(&mut self) -> bool {
        let count = self.items.len();

        let mut groups: HashMap<&str, Vec<usize>> = HashMap::new();
        for item in &self.items {
            groups.entry(item.group.as_str()).or_default().push(item.seq);
        }

        // Edges from each item to the items that must follow it.
        let mut graph: Vec<Vec<usize>> = vec![Vec::new(); count];
        for item in &self.items {
            for group in &item.before {
                if let Some(members) = groups.get(group.as_str()) {
                    graph[item.seq].extend(members.iter().copied());
                }
            }
        }
        for item in &self.items {
            for group in &item.after {
                if let Some(members) = groups.get(group.as_str()) {
                    for &member in members {
                        graph[member].push(item.seq);
                    }
                }
            }
        }

        let mut ancestors: Vec<Option<Vec<usize>>> = vec![None; count];
        for (node, children) in graph.iter().enumerate() {
            for &child in children {
                ancestors[child].get_or_insert_with(Vec::new).push(node);
            }
        }

        let mut visited = vec![false; count];
        let mut sorted = Vec::with_capacity(count);
        for i in 0..count {
            let mut next = Some(i);
            if ancestors[i].is_some() {
                next = None;
                for j in 0..count {
                    if visited[j] {
                        continue;
                    }
                    let required = ancestors[j].get_or_insert_with(Vec::new);
                    if required.iter().all(|&k| visited[k]) {
                        next = Some(j);
                        break;
                    }
                }
            }
            if let Some(next) = next {
                visited[next] = true;
                sorted.push(next);
            }
        }

        if sorted.len() != count {
            return false;
        }

        let mut by_seq: Vec<Option<TopoItem<T>>> = vec![None; count];
        for item in self.items.drain(..) {
            let seq = item.seq;
            by_seq[seq] = Some(item);
        }
        self.nodes.clear();
        for seq in sorted {
            if let Some(item) = by_seq[seq].take() {
                self.nodes.push(item.node.clone());
                self.items.push(item);
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_order_without_constraints() {
        let mut topo = Topo::new();
        topo.add(["a"], TopoOptions::group("a")).unwrap();
        topo.add(["b"], TopoOptions::group("b")).unwrap();
        topo.add(["c"], TopoOptions::group("c")).unwrap();
        assert_eq!(topo.nodes(), ["a", "b", "c"]);
    }

    #[test]
    fn test_after_constraint_reorders() {
        let mut topo = Topo::new();
        topo.add(["max"], TopoOptions::group("max").after(["min"])).unwrap();
        topo.add(["min"], TopoOptions::group("min")).unwrap();
        assert_eq!(topo.nodes(), ["min", "max"]);
    }

    #[test]
    fn test_before_constraint_reorders() {
        let mut topo = Topo::new();
        topo.add(["a"], TopoOptions::group("a")).unwrap();
        topo.add(["b"], TopoOptions::group("b").before(["a"])).unwrap();
        assert_eq!(topo.nodes(), ["b", "a"]);
    }

    #[test]
    fn test_cycle_is_rejected() {
        let mut topo = Topo::new();
        topo.add(["a"], TopoOptions::group("a").after(["b"])).unwrap();
        let result = topo.add(["b"], TopoOptions::group("b").after(["a"]));
        match result {
            Err(BuildError::Dependencies(message)) => {
                assert_eq!(message, "item added into group b created a dependencies error")
            }
            other => panic!("expected dependencies error, got {:?}", other),
        }
    }

    #[test]
    fn test_merge_keeps_insertion_tiebreak() {
        let mut first = Topo::new();
        first.add(["a"], TopoOptions::group("a")).unwrap();
        let mut second = Topo::new();
        second.add(["c"], TopoOptions::group("c").after(["b"])).unwrap();
        second.add(["b"], TopoOptions::group("b")).unwrap();
        first.merge(&[&second]).unwrap();
        assert_eq!(first.nodes(), ["a", "b", "c"]);
    }

    #[test]
    fn test_unknown_groups_are_ignored() {
        let mut topo = Topo::new();
        topo.add(["a"], TopoOptions::group("a").after(["missing"])).unwrap();
        assert_eq!(topo.nodes(), ["a"]);
    }
}
