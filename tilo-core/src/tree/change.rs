use super::{LayoutTree, NodeId, TolMap, TreeError};

/// A structural change applied to a scratch copy of the tree before a
/// layout attempt. The live tree only sees it if the layout succeeds.
#[derive(Debug, Clone, Copy)]
pub enum LayoutChange<'a> {
    /// Give `node` its children from `tol`.
    Expand { node: NodeId, tol: &'a TolMap },
    /// Drop the children of `node`.
    Collapse { node: NodeId },
}

impl LayoutChange<'_> {
    pub fn node(&self) -> NodeId {
        match *self {
            LayoutChange::Expand { node, .. } | LayoutChange::Collapse { node } => node,
        }
    }

    pub fn apply(&self, tree: &mut LayoutTree) -> Result<(), TreeError> {
        let node = self.node();
        tree.node(node)?;
        match *self {
            LayoutChange::Expand { tol, .. } => tree.expand(node, tol),
            LayoutChange::Collapse { .. } => {
                tree.collapse(node);
                Ok(())
            }
        }
    }
}
