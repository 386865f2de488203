//! Square layout: children as equal-size square tiles in a grid.
//!
//! The grid shape is chosen from a sample of column counts by how much of
//! the content area the best-fitting grid leaves unused.

use tracing::trace;

use super::{LayoutStrategy, collapse_to_tile, one_square_layout};
use crate::layout::{Frame, LayoutCtx, LayoutError, LayoutOptions, LayoutResult, PointF, SizeF};
use crate::tree::{LayoutTree, NodeId};

/// Upper bound on the column counts tried for one node.
const MAX_GRID_TRIES: usize = 20;

pub struct SquareLayout;

impl LayoutStrategy for SquareLayout {
    fn layout(
        &self,
        tree: &mut LayoutTree,
        id: NodeId,
        frame: Frame,
        ctx: LayoutCtx<'_>,
    ) -> LayoutResult<()> {
        square_layout(tree, id, frame, ctx)
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Grid {
    pub cols: usize,
    pub rows: usize,
    /// Tile edge length.
    pub tile: f64,
}

impl Grid {
    /// Top-left corner of cell `i`, relative to the grid origin.
    fn cell(&self, i: usize, spacing: f64) -> PointF {
        let step = self.tile + spacing;
        PointF::new((i % self.cols) as f64 * step, (i / self.cols) as f64 * step)
    }
}

pub fn square_layout(
    tree: &mut LayoutTree,
    id: NodeId,
    frame: Frame,
    ctx: LayoutCtx<'_>,
) -> LayoutResult<()> {
    if tree[id].is_leaf() {
        return one_square_layout(tree, id, frame, ctx.opts);
    }
    match place_grid(tree, id, frame, ctx) {
        Err(err) if ctx.allow_collapse => collapse_to_tile(tree, id, frame, ctx.opts, &err),
        result => result,
    }
}

fn place_grid(
    tree: &mut LayoutTree,
    id: NodeId,
    frame: Frame,
    ctx: LayoutCtx<'_>,
) -> LayoutResult<()> {
    let opts = ctx.opts;
    let sp = opts.tile_spacing;
    let header = opts.header(frame.show_header);
    let content = SizeF::new(frame.dims.w - sp, frame.dims.h - sp - header);
    if content.w <= 0.0 || content.h <= 0.0 {
        return Err(LayoutError::AreaTooSmall);
    }

    let children = tree.children(id).to_vec();
    let grid = choose_grid(children.len(), content, opts).ok_or(LayoutError::AreaTooSmall)?;
    trace!(node = %tree[id].name, ?grid, "square grid chosen");

    let origin = PointF::new(sp, sp + header);
    let mut covered = 0.0;
    for (i, &child) in children.iter().enumerate() {
        let cell = Frame::new(
            origin.offset(grid.cell(i, sp)),
            SizeF::square(grid.tile),
            true,
        );
        let placed = if tree[child].is_leaf() {
            one_square_layout(tree, child, cell, opts)
        } else {
            square_layout(tree, child, cell, ctx)
        };
        placed.map_err(|_| LayoutError::ChildLayoutFailed)?;
        covered += cell.dims.area() - tree[child].empty_space;
    }

    let step = grid.tile + sp;
    let dims = SizeF::new(
        grid.cols as f64 * step + sp,
        grid.rows as f64 * step + sp + header,
    );
    tree.assign(id, frame.pos, dims, frame.show_header, frame.dims.area() - covered);
    Ok(())
}

/// Pick the grid shape for `n` tiles within `content`, or `None` if no
/// sampled shape fits tiles of the minimum size.
///
/// Each shape is scored by the content area outside the largest grid of
/// that shape that fits, plus the area of its unused cells. The lowest
/// score wins; ties keep the earlier (narrower) shape.
pub fn choose_grid(n: usize, content: SizeF, opts: &LayoutOptions) -> Option<Grid> {
    if n == 0 || content.w <= 0.0 || content.h <= 0.0 {
        return None;
    }
    let sp = opts.tile_spacing;
    let area_ar = content.w / content.h;
    let tries = n.min(MAX_GRID_TRIES);

    let mut best: Option<(f64, Grid)> = None;
    for k in 0..tries {
        let cols = sample_cols(n, tries, k);
        let rows = n.div_ceil(cols);
        let grid_ar = cols as f64 / rows as f64;
        let (used_frac, tile) = if area_ar > grid_ar {
            (grid_ar / area_ar, content.h / rows as f64 - sp)
        } else {
            (area_ar / grid_ar, content.w / cols as f64 - sp)
        };
        if tile < opts.min_tile_size {
            continue;
        }
        let tile = tile.min(opts.max_tile_size);
        let unused_cells = (cols * rows - n) as f64;
        let score = (1.0 - used_frac) * content.area() + unused_cells * (tile - sp).powi(2);
        if best.is_none_or(|(lowest, _)| score < lowest) {
            best = Some((score, Grid { cols, rows, tile }));
        }
    }
    best.map(|(_, grid)| grid)
}

// k-th of `tries` evenly spaced column counts over 1..=n, floored.
fn sample_cols(n: usize, tries: usize, k: usize) -> usize {
    if tries <= 1 {
        return 1;
    }
    1 + k * (n - 1) / (tries - 1)
}
