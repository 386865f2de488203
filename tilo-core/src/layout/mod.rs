// layout/mod.rs
//
// Tile layout for a LayoutTree.
//
// Goals:
// - Every visible node becomes a tile nested inside its parent's tile
// - Tiles respect the minimum/maximum tile size, spacing and headers
// - Unused area is kept low by searching over candidate arrangements
// - A failed attempt leaves the live tree untouched
//
// Submodules:
// - config: LayoutOptions and the algorithm/mode enums
// - redistribute: min/max size clipping with redistribution
// - row_breaks: candidate row groupings
// - algorithms: square, row and sweep layouts
//
// Output:
// - pos/dims/show_header/empty_space/swept_area on every LayoutNode.
//   Positions are relative to the parent; the root's is absolute.

use serde::Serialize;
use tracing::debug;

use crate::tree::{LayoutChange, LayoutTree};

mod config;
mod error;
mod redistribute;
mod row_breaks;

pub mod algorithms;

pub use config::{LayoutAlgorithm, LayoutOptions, RowMode, SweepEdge, SweepToParent, SweptShare};
pub use error::{LayoutError, LayoutResult};
pub use redistribute::limit_vals;
pub use row_breaks::{RowBreaks, advance_breaks};

/// Slack allowed when comparing computed extents against their frame.
pub(crate) const EXTENT_EPSILON: f64 = 1e-6;

#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize)]
pub struct PointF {
    pub x: f64,
    pub y: f64,
}

impl PointF {
    pub const ZERO: PointF = PointF { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset(self, by: PointF) -> PointF {
        PointF { x: self.x + by.x, y: self.y + by.y }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize)]
pub struct SizeF {
    pub w: f64,
    pub h: f64,
}

impl SizeF {
    pub const ZERO: SizeF = SizeF { w: 0.0, h: 0.0 };

    pub fn new(w: f64, h: f64) -> Self {
        Self { w, h }
    }

    pub fn square(edge: f64) -> Self {
        Self { w: edge, h: edge }
    }

    pub fn area(&self) -> f64 {
        self.w * self.h
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct RectF {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl RectF {
    pub fn new(pos: PointF, dims: SizeF) -> Self {
        Self { x: pos.x, y: pos.y, w: dims.w, h: dims.h }
    }

    pub fn right(&self) -> f64 { self.x + self.w }
    pub fn bottom(&self) -> f64 { self.y + self.h }

    pub fn overlaps(&self, other: &RectF) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// True when `other` lies inside `self`, allowing `eps` of slack.
    pub fn contains(&self, other: &RectF, eps: f64) -> bool {
        other.x >= self.x - eps
            && other.y >= self.y - eps
            && other.right() <= self.right() + eps
            && other.bottom() <= self.bottom() + eps
    }
}

/// Area a parent lets one child's leaf sweep occupy.
///
/// Offered with `used == false`. A child that takes it rewrites `pos` and
/// `dims` to the part it consumed, sets `used`, and records the leaf tile
/// area it placed there in `covered`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweptArea {
    /// Position relative to the child.
    pub pos: PointF,
    pub dims: SizeF,
    /// True if the parent's leaves were swept left (false: top).
    pub swept_left: bool,
    pub used: bool,
    pub covered: f64,
}

impl SweptArea {
    pub fn new(pos: PointF, dims: SizeF, swept_left: bool) -> Self {
        Self { pos, dims, swept_left, used: false, covered: 0.0 }
    }
}

/// Rectangle offered to one layout call.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    pub pos: PointF,
    pub dims: SizeF,
    pub show_header: bool,
}

impl Frame {
    pub fn new(pos: PointF, dims: SizeF, show_header: bool) -> Self {
        Self { pos, dims, show_header }
    }
}

/// Per-call settings threaded through the recursion.
#[derive(Debug, Copy, Clone)]
pub struct LayoutCtx<'o> {
    pub opts: &'o LayoutOptions,
    /// Collapse a node to a single tile instead of failing.
    pub allow_collapse: bool,
}

impl LayoutCtx<'_> {
    pub(crate) fn no_collapse(self) -> Self {
        Self { allow_collapse: false, ..self }
    }
}

/// Per-attempt settings for [`try_layout`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LayoutRequest<'a> {
    pub allow_collapse: bool,
    /// Structural change to apply before laying out.
    pub change: Option<LayoutChange<'a>>,
}

/// Lay out `tree` within the rectangle at `pos` with size `dims`.
///
/// Works on a copy with `req.change` applied. On success the root is
/// centered in the rectangle and the results (and the change) are copied
/// onto `tree`; on failure `tree` is left as it was.
pub fn try_layout(
    tree: &mut LayoutTree,
    pos: PointF,
    dims: SizeF,
    opts: &LayoutOptions,
    req: LayoutRequest<'_>,
) -> LayoutResult<()> {
    opts.validate()?;
    let usable = |v: f64| v.is_finite() && v > 0.0;
    if !(usable(dims.w) && usable(dims.h)) {
        return Err(LayoutError::AreaTooSmall);
    }

    let mut scratch = tree.clone();
    if let Some(change) = req.change {
        change.apply(&mut scratch)?;
    }
    let root = scratch.root();
    let ctx = LayoutCtx { opts, allow_collapse: req.allow_collapse };
    opts.algorithm
        .strategy()
        .layout(&mut scratch, root, Frame::new(pos, dims, true), ctx)?;

    let used = scratch[root].dims;
    scratch[root].pos = PointF::new(
        pos.x + (dims.w - used.w) / 2.0,
        pos.y + (dims.h - used.h) / 2.0,
    );

    let live_root = tree.root();
    tree.graft_layout(live_root, &scratch, root);
    debug!(
        algorithm = ?opts.algorithm,
        nodes = tree.len(),
        tips = tree[live_root].weight,
        empty_space = tree[live_root].empty_space,
        "layout committed"
    );
    Ok(())
}
