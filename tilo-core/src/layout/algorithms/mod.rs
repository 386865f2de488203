//! Layout algorithms for tilo layout trees.
//!
//! - `square`: uniform grid of square tiles
//! - `row`: rows of rectangles proportioned by subtree weight
//! - `sweep`: leaves swept to one edge, non-leaves laid out in rows
//!
//! Every algorithm lays out one node and its descendants within a
//! [`Frame`], writing results onto the nodes. On failure with
//! `allow_collapse`, the node is collapsed to a single tile instead.

mod row;
mod square;
mod sweep;

pub use row::{RowLayout, row_layout};
pub use square::{Grid, SquareLayout, choose_grid, square_layout};
pub use sweep::{SweepLayout, sweep_layout};

use tracing::debug;

use crate::layout::{Frame, LayoutCtx, LayoutError, LayoutOptions, LayoutResult, SizeF, SweptArea};
use crate::tree::{LayoutTree, NodeId};

/// Trait for layout algorithms.
/// Allows switching between layout strategies per attempt.
pub trait LayoutStrategy {
    fn layout(
        &self,
        tree: &mut LayoutTree,
        id: NodeId,
        frame: Frame,
        ctx: LayoutCtx<'_>,
    ) -> LayoutResult<()>;
}

/// Layout used by row layout for non-leaf children whose own children
/// are not all leaves.
pub enum SubLayout<'a> {
    Row,
    /// Sweep layout, optionally offering the child part of the caller's
    /// swept strip.
    Sweep { offer: Option<&'a mut SweptArea> },
}

/// Place `id` as one square tile, ignoring its children.
pub fn one_square_layout(
    tree: &mut LayoutTree,
    id: NodeId,
    frame: Frame,
    opts: &LayoutOptions,
) -> LayoutResult<()> {
    // f64::min drops NaN, so check the frame itself too.
    let finite = frame.dims.w.is_finite() && frame.dims.h.is_finite();
    let tile = frame.dims.w.min(frame.dims.h).min(opts.max_tile_size);
    if !finite || tile < opts.min_tile_size {
        return Err(LayoutError::AreaTooSmall);
    }
    let empty = frame.dims.area() - tile * tile;
    tree.assign(id, frame.pos, SizeF::square(tile), false, empty);
    Ok(())
}

/// Drop the children of `id` and place it as one square tile.
pub(crate) fn collapse_to_tile(
    tree: &mut LayoutTree,
    id: NodeId,
    frame: Frame,
    opts: &LayoutOptions,
    cause: &LayoutError,
) -> LayoutResult<()> {
    debug!(
        node = %tree[id].name,
        dropped_tips = tree[id].weight,
        %cause,
        "collapsing node to a single tile"
    );
    tree.collapse(id);
    one_square_layout(tree, id, frame, opts)
}
