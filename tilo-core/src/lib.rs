//! Tile layout engine for the tilo tree-of-life viewer.
//!
//! A [`tree::LayoutTree`] mirrors the visible part of the tree of life.
//! [`layout::try_layout`] fills in a position and size for every node so
//! the renderer can draw each node as a tile nested inside its parent's
//! tile. The wasm bindings in [`wasm`] wrap this for the web frontend.

pub mod layout;
pub mod output;
pub mod tree;
pub mod wasm;

pub use layout::{
    LayoutAlgorithm, LayoutError, LayoutOptions, LayoutRequest, LayoutResult, PointF, RectF,
    RowBreaks, RowMode, SizeF, SweepEdge, SweepToParent, SweptArea, SweptShare, limit_vals,
    try_layout,
};
pub use output::{LayoutOutput, NodeOutput};
pub use tree::{LayoutChange, LayoutNode, LayoutTree, NodeId, TolMap, TolNode, TreeError};
