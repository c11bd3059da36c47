//! Nested-set index over tree-structured masters.
//!
//! Accounts, cost centers and tree-shaped accounting dimensions are filtered
//! by "this node or anything below it". Each node gets a `(lft, rgt)`
//! interval such that a node's subtree is exactly the set of nodes whose
//! `lft` falls inside its interval, so subtree listing is a range scan over
//! nodes sorted by `lft`.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while building a tree index.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    /// The same node name appears twice.
    #[error("Duplicate tree node: {0}")]
    DuplicateNode(String),

    /// A node cannot be reached from any root.
    #[error("Cycle detected at tree node: {0}")]
    Cycle(String),
}

/// Nested-set interval of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    /// Left boundary.
    pub lft: u32,
    /// Right boundary.
    pub rgt: u32,
}

/// Subtree index for one hierarchy.
#[derive(Debug, Clone, Default)]
pub struct TreeIndex {
    bounds: HashMap<String, Bounds>,
    by_lft: Vec<(u32, String)>,
}

impl TreeIndex {
    /// Builds an index from precomputed intervals.
    pub fn from_bounds(nodes: impl IntoIterator<Item = (String, Bounds)>) -> Self {
        let bounds: HashMap<String, Bounds> = nodes.into_iter().collect();
        let mut by_lft: Vec<(u32, String)> = bounds
            .iter()
            .map(|(name, b)| (b.lft, name.clone()))
            .collect();
        by_lft.sort_unstable();
        Self { bounds, by_lft }
    }

    /// Numbers a parent-linked hierarchy.
    ///
    /// Nodes whose parent is missing or unknown become roots. Siblings are
    /// numbered in name order so the result does not depend on input order.
    pub fn from_parents<I, S>(nodes: I) -> Result<Self, TreeError>
    where
        I: IntoIterator<Item = (S, Option<S>)>,
        S: Into<String>,
    {
        let mut parents: BTreeMap<String, Option<String>> = BTreeMap::new();
        for (name, parent) in nodes {
            let name = name.into();
            if parents.contains_key(&name) {
                return Err(TreeError::DuplicateNode(name));
            }
            parents.insert(name, parent.map(Into::into));
        }

        let mut children: BTreeMap<Option<&str>, Vec<&str>> = BTreeMap::new();
        for (name, parent) in &parents {
            let parent = parent
                .as_deref()
                .filter(|p| *p != name && parents.contains_key(*p));
            children.entry(parent).or_default().push(name.as_str());
        }

        let mut bounds = HashMap::with_capacity(parents.len());
        let mut counter = 0u32;
        // Explicit stack of (node, visited-children) to avoid recursion on deep trees.
        let mut stack: Vec<(&str, bool)> = children
            .get(&None)
            .map(|roots| roots.iter().rev().map(|r| (*r, false)).collect())
            .unwrap_or_default();
        let mut open: HashMap<&str, u32> = HashMap::new();

        while let Some((node, expanded)) = stack.pop() {
            counter += 1;
            if expanded {
                let lft = open.remove(node).unwrap_or(counter);
                bounds.insert(node.to_string(), Bounds { lft, rgt: counter });
                continue;
            }
            open.insert(node, counter);
            stack.push((node, true));
            if let Some(kids) = children.get(&Some(node)) {
                stack.extend(kids.iter().rev().map(|k| (*k, false)));
            }
        }

        if let Some(orphan) = parents.keys().find(|name| !bounds.contains_key(*name)) {
            return Err(TreeError::Cycle(orphan.clone()));
        }

        Ok(Self::from_bounds(bounds))
    }

    /// Interval of a node.
    #[must_use]
    pub fn bounds(&self, name: &str) -> Option<Bounds> {
        self.bounds.get(name).copied()
    }

    /// All nodes in the subtrees of `roots`, roots included.
    ///
    /// Unknown roots contribute nothing.
    #[must_use]
    pub fn descendants_of<S: AsRef<str>>(&self, roots: &[S]) -> BTreeSet<String> {
        let mut result = BTreeSet::new();
        for root in roots {
            let Some(b) = self.bounds(root.as_ref()) else {
                continue;
            };
            let start = self.by_lft.partition_point(|(lft, _)| *lft < b.lft);
            let end = self.by_lft.partition_point(|(lft, _)| *lft <= b.rgt);
            result.extend(self.by_lft[start..end].iter().map(|(_, n)| n.clone()));
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chart() -> TreeIndex {
        TreeIndex::from_parents([
            ("Assets", None),
            ("Assets/Cash", Some("Assets")),
            ("Assets/Bank", Some("Assets")),
            ("Assets/Bank/EUR", Some("Assets/Bank")),
            ("Liabilities", None),
            ("Liabilities/Creditors", Some("Liabilities")),
        ])
        .unwrap()
    }

    #[test]
    fn test_descendants_include_root_and_all_levels() {
        let tree = chart();
        let names: Vec<String> = tree.descendants_of(&["Assets"]).into_iter().collect();
        assert_eq!(
            names,
            vec!["Assets", "Assets/Bank", "Assets/Bank/EUR", "Assets/Cash"]
        );
    }

    #[test]
    fn test_leaf_subtree_is_itself() {
        let tree = chart();
        let names = tree.descendants_of(&["Assets/Cash"]);
        assert_eq!(names.len(), 1);
        assert!(names.contains("Assets/Cash"));
    }

    #[test]
    fn test_union_of_subtrees_and_unknown_roots() {
        let tree = chart();
        let names = tree.descendants_of(&["Assets/Bank", "Liabilities", "Equity"]);
        assert_eq!(names.len(), 4);
        assert!(!names.contains("Assets"));
    }

    #[test]
    fn test_intervals_nest() {
        let tree = chart();
        let root = tree.bounds("Assets").unwrap();
        let leaf = tree.bounds("Assets/Bank/EUR").unwrap();
        assert!(root.lft < leaf.lft && leaf.rgt < root.rgt);
        assert_eq!(root.rgt - root.lft + 1, 8);
        assert_eq!(leaf.rgt, leaf.lft + 1);
        assert_eq!(tree.bounds("Equity"), None);
    }

    #[test]
    fn test_unknown_parent_becomes_root() {
        let tree = TreeIndex::from_parents([("Main", Some("Deleted"))]).unwrap();
        assert_eq!(tree.descendants_of(&["Main"]).len(), 1);
        assert!(tree.descendants_of(&["Deleted"]).is_empty());
    }

    #[test]
    fn test_duplicate_and_cycle_are_rejected() {
        assert_eq!(
            TreeIndex::from_parents([("A", None), ("A", None)]).unwrap_err(),
            TreeError::DuplicateNode("A".to_string())
        );
        assert!(matches!(
            TreeIndex::from_parents([("A", Some("B")), ("B", Some("A"))]),
            Err(TreeError::Cycle(_))
        ));
    }

    #[test]
    fn test_from_bounds_keeps_intervals() {
        let tree = TreeIndex::from_bounds([
            ("Root".to_string(), Bounds { lft: 1, rgt: 4 }),
            ("Child".to_string(), Bounds { lft: 2, rgt: 3 }),
        ]);
        assert_eq!(tree.descendants_of(&["Root"]).len(), 2);
        assert_eq!(tree.descendants_of(&["Child"]).len(), 1);
    }
}
