//! Layout-tree model.
//!
//! - `tol`: the read-only tree-of-life data the layout tree is built from
//! - `arena`: the index-addressed layout tree and its clone/commit machinery
//! - `change`: expand/collapse requests applied to a layout tree

mod arena;
mod change;
mod tol;

pub use arena::{LayoutNode, LayoutTree, NodeId};
pub use change::LayoutChange;
pub use tol::{TolMap, TolNode};

use thiserror::Error;

/// Errors from building or restructuring a layout tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("no tree-of-life node named '{0}'")]
    UnknownNode(String),

    #[error("node id {0} is not part of this layout tree")]
    StaleNode(usize),

    #[error("node '{0}' has no children to expand into")]
    NothingToExpand(String),
}
