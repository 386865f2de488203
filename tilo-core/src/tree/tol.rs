// Tree-of-life input data.
//
// The backend serves nodes keyed by name, each listing its children by
// name. Only the part of that record the layout engine needs is modelled
// here; other fields in the JSON are ignored on deserialization.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Map from tree-of-life node names to nodes.
pub type TolMap = HashMap<String, TolNode>;

/// A tree-of-life node as served by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TolNode {
    /// Child names, in display order. May name nodes not (yet) present
    /// in the map when only part of the tree has been fetched.
    pub children: Vec<String>,
    pub parent: Option<String>,
    /// Number of descendant tips in the full tree (not the visible tree).
    pub tips: usize,
}

impl TolNode {
    pub fn new(children: &[&str]) -> Self {
        Self {
            children: children.iter().map(|c| c.to_string()).collect(),
            parent: None,
            tips: 0,
        }
    }
}

/// Children of `name` that can be materialized from `map`.
///
/// Returns `None` when the node is unknown, has no children, or when its
/// children have not been fetched yet (the first child is missing).
pub(crate) fn expandable_children<'m>(map: &'m TolMap, name: &str) -> Option<&'m [String]> {
    let node = map.get(name)?;
    let first = node.children.first()?;
    if !map.contains_key(first) {
        return None;
    }
    Some(&node.children)
}
