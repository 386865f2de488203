// Arena-backed layout tree.
//
// Nodes live in a slot vector and refer to each other by `NodeId`. The
// parent link is an index used only to push weight changes upward, so a
// whole-tree clone is a plain copy and a subtree clone is an index remap
// into a fresh arena.
//
// Layout attempts run on scratch trees (`clone_subtree`, `group`) and the
// chosen result is copied back with `graft_layout`, which reconciles the
// structure and keeps ancestor weights in sync.

use std::collections::HashMap;
use std::ops::{Index, IndexMut};

use serde::Serialize;

use super::TreeError;
use super::tol::{TolMap, expandable_children};
use crate::layout::{PointF, RectF, SizeF, SweptArea};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub usize);

/// Layout state for one visible tree-of-life node.
#[derive(Debug, Clone, Serialize)]
pub struct LayoutNode {
    pub id: NodeId,
    pub name: String,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Number of descendant leaves (1 for a leaf).
    pub weight: usize,
    /// Number of ancestors.
    pub depth: usize,
    /// Position relative to the parent's top-left corner.
    pub pos: PointF,
    pub dims: SizeF,
    pub show_header: bool,
    /// Offered area left uncovered by leaf tiles in the last layout pass.
    pub empty_space: f64,
    /// Parent-owned area holding this node's leaves, if one was negotiated.
    pub swept_area: Option<SweptArea>,
    /// Hidden by an expand-to-view.
    pub hidden: bool,
}

impl LayoutNode {
    fn new(id: NodeId, name: String, parent: Option<NodeId>, depth: usize) -> Self {
        Self {
            id,
            name,
            parent,
            children: Vec::new(),
            weight: 1,
            depth,
            pos: PointF::ZERO,
            dims: SizeF::ZERO,
            show_header: false,
            empty_space: 0.0,
            swept_area: None,
            hidden: false,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Bounds relative to the parent.
    pub fn rect(&self) -> RectF {
        RectF::new(self.pos, self.dims)
    }

    fn copy_layout_from(&mut self, other: &LayoutNode) {
        self.pos = other.pos;
        self.dims = other.dims;
        self.show_header = other.show_header;
        self.empty_space = other.empty_space;
        self.swept_area = other.swept_area.clone();
        self.weight = other.weight;
    }
}

#[derive(Debug, Clone)]
pub struct LayoutTree {
    slots: Vec<Option<LayoutNode>>,
    free: Vec<usize>,
    root: NodeId,
    by_name: HashMap<String, NodeId>,
}

impl LayoutTree {
    /// A tree holding a single root node.
    pub fn new(root_name: impl Into<String>) -> Self {
        let mut tree = Self::empty();
        tree.root = tree.alloc(root_name.into(), None, 0);
        tree
    }

    fn empty() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            root: NodeId(0),
            by_name: HashMap::new(),
        }
    }

    /// Materialize `root_name` and its descendants down to `depth`
    /// generations (0 means just the root).
    pub fn from_tol(map: &TolMap, root_name: &str, depth: usize) -> Result<Self, TreeError> {
        if !map.contains_key(root_name) {
            return Err(TreeError::UnknownNode(root_name.to_string()));
        }
        let mut tree = Self::new(root_name);
        let root = tree.root;
        tree.materialize(map, root, depth);
        Ok(tree)
    }

    fn materialize(&mut self, map: &TolMap, id: NodeId, depth_left: usize) {
        if depth_left == 0 {
            return;
        }
        let Some(names) = expandable_children(map, &self[id].name) else {
            return;
        };
        for name in names {
            let child = self.push_child(id, name.clone());
            self.materialize(map, child, depth_left - 1);
        }
    }

    fn alloc(&mut self, name: String, parent: Option<NodeId>, depth: usize) -> NodeId {
        let id = match self.free.pop() {
            Some(slot) => NodeId(slot),
            None => {
                self.slots.push(None);
                NodeId(self.slots.len() - 1)
            }
        };
        self.by_name.insert(name.clone(), id);
        self.slots[id.0] = Some(LayoutNode::new(id, name, parent, depth));
        id
    }

    fn release(&mut self, id: NodeId) {
        let Some(node) = self.slots.get_mut(id.0).and_then(Option::take) else {
            return;
        };
        if self.by_name.get(&node.name) == Some(&id) {
            self.by_name.remove(&node.name);
        }
        self.free.push(id.0);
        for child in node.children {
            self.release(child);
        }
    }

    fn drop_children(&mut self, id: NodeId) {
        let children = std::mem::take(&mut self[id].children);
        for child in children {
            self.release(child);
        }
    }

    // ------------------------------------------------------------------
    // Access
    // ------------------------------------------------------------------

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn get(&self, id: NodeId) -> Option<&LayoutNode> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut LayoutNode> {
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }

    pub fn node(&self, id: NodeId) -> Result<&LayoutNode, TreeError> {
        self.get(id).ok_or(TreeError::StaleNode(id.0))
    }

    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.by_name.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self[id].children
    }

    /// True when every child of `id` is a leaf (vacuously true for a leaf).
    pub fn has_only_leaf_children(&self, id: NodeId) -> bool {
        self[id].children.iter().all(|&c| self[c].is_leaf())
    }

    /// Node ids in pre-order: parents before children, children in order.
    pub fn pre_order(&self) -> Vec<NodeId> {
        fn dfs(tree: &LayoutTree, id: NodeId, out: &mut Vec<NodeId>) {
            out.push(id);
            for &c in &tree[id].children {
                dfs(tree, c, out);
            }
        }
        let mut out = Vec::with_capacity(self.len());
        dfs(self, self.root, &mut out);
        out
    }

    /// Position of `id` relative to the root's parent frame.
    pub fn world_pos(&self, id: NodeId) -> PointF {
        let mut pos = PointF::ZERO;
        let mut cursor = Some(id);
        while let Some(cur) = cursor {
            let node = &self[cur];
            pos = pos.offset(node.pos);
            cursor = node.parent;
        }
        pos
    }

    /// Checks that every leaf weighs 1 and every other node weighs the sum
    /// of its children, and that parent links match child lists.
    pub fn check_weights(&self) -> bool {
        self.pre_order().into_iter().all(|id| {
            let node = &self[id];
            let links_ok = node.children.iter().all(|&c| self[c].parent == Some(id));
            let expected = if node.is_leaf() {
                1
            } else {
                node.children.iter().map(|&c| self[c].weight).sum()
            };
            links_ok && node.weight == expected
        })
    }

    // ------------------------------------------------------------------
    // Structure
    // ------------------------------------------------------------------

    /// Append a new leaf child, updating ancestor weights.
    pub fn push_child(&mut self, parent: NodeId, name: impl Into<String>) -> NodeId {
        let depth = self[parent].depth + 1;
        let child = self.alloc(name.into(), Some(parent), depth);
        self[parent].children.push(child);
        let weight = self.sum_child_weights(parent);
        self.reweigh(parent, weight);
        child
    }

    /// Replace the children of `id` with one generation from `map`.
    pub fn expand(&mut self, id: NodeId, map: &TolMap) -> Result<(), TreeError> {
        let name = self.node(id)?.name.clone();
        let Some(names) = expandable_children(map, &name) else {
            return Err(TreeError::NothingToExpand(name));
        };
        self.drop_children(id);
        for child in names {
            self.push_child(id, child.clone());
        }
        Ok(())
    }

    /// Drop the children of `id`, making it a leaf.
    pub fn collapse(&mut self, id: NodeId) {
        self.drop_children(id);
        self.reweigh(id, 1);
    }

    fn sum_child_weights(&self, id: NodeId) -> usize {
        self[id].children.iter().map(|&c| self[c].weight).sum()
    }

    fn reweigh(&mut self, id: NodeId, weight: usize) {
        let old = self[id].weight;
        self[id].weight = weight;
        let parent = self[id].parent;
        self.propagate_weight(parent, old, weight);
    }

    fn propagate_weight(&mut self, mut cursor: Option<NodeId>, old: usize, new: usize) {
        if old == new {
            return;
        }
        while let Some(id) = cursor {
            let node = &mut self[id];
            node.weight = node.weight - old + new;
            cursor = node.parent;
        }
    }

    // ------------------------------------------------------------------
    // Scratch trees
    // ------------------------------------------------------------------

    /// Copy the subtree at `id` into a fresh tree rooted at the copy.
    pub fn clone_subtree(&self, id: NodeId) -> LayoutTree {
        let mut out = LayoutTree::empty();
        out.root = self.copy_into(id, &mut out, None);
        out
    }

    /// A fresh tree whose root is a synthetic node named `name` holding
    /// copies of the `members` subtrees, in order.
    pub fn group(&self, name: &str, members: &[NodeId]) -> LayoutTree {
        let depth = members
            .first()
            .map_or(0, |&m| self[m].depth.saturating_sub(1));
        let mut out = LayoutTree::empty();
        let root = out.alloc(name.to_string(), None, depth);
        out.root = root;
        for &member in members {
            let copy = self.copy_into(member, &mut out, Some(root));
            out[root].children.push(copy);
        }
        out[root].weight = members.iter().map(|&m| self[m].weight).sum::<usize>().max(1);
        out
    }

    fn copy_into(&self, src: NodeId, dst: &mut LayoutTree, parent: Option<NodeId>) -> NodeId {
        let node = &self[src];
        let id = dst.alloc(node.name.clone(), parent, node.depth);
        dst[id].copy_layout_from(node);
        dst[id].hidden = node.hidden;
        for &child in &node.children {
            let copy = self.copy_into(child, dst, Some(id));
            dst[id].children.push(copy);
        }
        id
    }

    /// Copy layout results from `src_id` in `src` onto `dst`, recursively.
    ///
    /// Where child counts match, ids in `self` are kept and fields are
    /// copied node by node. Where they differ, the children of the `self`
    /// node are replaced by copies of the `src` children. The weight change
    /// at `dst` is pushed to its ancestors.
    pub fn graft_layout(&mut self, dst: NodeId, src: &LayoutTree, src_id: NodeId) {
        let old = self[dst].weight;
        self.reconcile(dst, src, src_id);
        let new = self[dst].weight;
        let parent = self[dst].parent;
        self.propagate_weight(parent, old, new);
    }

    fn reconcile(&mut self, dst: NodeId, src: &LayoutTree, src_id: NodeId) {
        let from = &src[src_id];
        self[dst].copy_layout_from(from);
        if self[dst].children.len() == from.children.len() {
            let pairs: Vec<(NodeId, NodeId)> = self[dst]
                .children
                .iter()
                .copied()
                .zip(from.children.iter().copied())
                .collect();
            for (d, s) in pairs {
                self.reconcile(d, src, s);
            }
        } else {
            self.drop_children(dst);
            for &child in &from.children {
                let adopted = src.copy_into(child, self, Some(dst));
                self[dst].children.push(adopted);
            }
        }
    }

    // ------------------------------------------------------------------
    // Layout output helpers
    // ------------------------------------------------------------------

    pub(crate) fn assign(
        &mut self,
        id: NodeId,
        pos: PointF,
        dims: SizeF,
        show_header: bool,
        empty_space: f64,
    ) {
        let node = &mut self[id];
        node.pos = pos;
        node.dims = dims;
        node.show_header = show_header;
        node.empty_space = empty_space;
        node.swept_area = None;
    }

    pub(crate) fn shift_children(&mut self, id: NodeId, by: PointF) {
        let children = self[id].children.clone();
        for child in children {
            let node = &mut self[child];
            node.pos = node.pos.offset(by);
        }
    }

    // ------------------------------------------------------------------
    // Expand-to-view visibility
    // ------------------------------------------------------------------

    /// Hide every ancestor of `id` along with the ancestors' other
    /// descendants, leaving `id`'s own subtree visible.
    pub fn hide_upward(&mut self, id: NodeId) {
        let mut current = id;
        while let Some(parent) = self[current].parent {
            self[parent].hidden = true;
            let siblings: Vec<NodeId> = self[parent]
                .children
                .iter()
                .copied()
                .filter(|&c| c != current)
                .collect();
            for sibling in siblings {
                self.hide_downward(sibling);
            }
            current = parent;
        }
    }

    fn hide_downward(&mut self, id: NodeId) {
        self[id].hidden = true;
        let children = self[id].children.clone();
        for child in children {
            self.hide_downward(child);
        }
    }

    /// Un-hide `id` and its hidden descendants.
    pub fn show_downward(&mut self, id: NodeId) {
        if !self[id].hidden {
            return;
        }
        self[id].hidden = false;
        let children = self[id].children.clone();
        for child in children {
            self.show_downward(child);
        }
    }
}

impl Index<NodeId> for LayoutTree {
    type Output = LayoutNode;

    fn index(&self, id: NodeId) -> &LayoutNode {
        match self.get(id) {
            Some(node) => node,
            None => panic!("node id {} is not part of this layout tree", id.0),
        }
    }
}

impl IndexMut<NodeId> for LayoutTree {
    fn index_mut(&mut self, id: NodeId) -> &mut LayoutNode {
        match self.get_mut(id) {
            Some(node) => node,
            None => panic!("node id {} is not part of this layout tree", id.0),
        }
    }
}
