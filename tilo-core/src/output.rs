//! Output types for the tile renderer.
//!
//! These structs are serialized to JSON and sent to the frontend, which
//! draws one tile per node. Rectangles are in world coordinates.

use serde::Serialize;

use crate::layout::{LayoutError, RectF};
use crate::tree::LayoutTree;

/// One laid-out node, in pre-order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeOutput {
    pub name: String,
    pub parent: Option<String>,
    pub depth: usize,
    /// Visible leaf count below this node.
    pub tips: usize,
    pub bounds: RectF,
    pub show_header: bool,
    /// Panel holding this node's leaves inside its parent's leaf strip.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub swept_area: Option<SweptAreaOutput>,
    pub hidden: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweptAreaOutput {
    pub bounds: RectF,
    pub swept_left: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorInfo {
    pub kind: &'static str,
    pub message: String,
}

impl From<&LayoutError> for ErrorInfo {
    fn from(err: &LayoutError) -> Self {
        Self { kind: err.kind(), message: err.to_string() }
    }
}

/// The combined output sent to the frontend.
#[derive(Debug, Clone, Serialize)]
pub struct LayoutOutput {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<NodeOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}

impl LayoutOutput {
    pub fn from_tree(tree: &LayoutTree) -> Self {
        let nodes = tree
            .pre_order()
            .into_iter()
            .map(|id| {
                let node = &tree[id];
                let world = tree.world_pos(id);
                NodeOutput {
                    name: node.name.clone(),
                    parent: node.parent.map(|p| tree[p].name.clone()),
                    depth: node.depth,
                    tips: node.weight,
                    bounds: RectF::new(world, node.dims),
                    show_header: node.show_header,
                    swept_area: node.swept_area.as_ref().map(|area| SweptAreaOutput {
                        bounds: RectF::new(world.offset(area.pos), area.dims),
                        swept_left: area.swept_left,
                    }),
                    hidden: node.hidden,
                }
            })
            .collect();
        Self { nodes, error: None }
    }

    pub fn with_error(mut self, err: &LayoutError) -> Self {
        self.error = Some(ErrorInfo::from(err));
        self
    }
}
