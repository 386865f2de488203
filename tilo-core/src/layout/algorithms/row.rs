//! Row layout: children as rows of rectangles sized by subtree weight.
//!
//! Each candidate row grouping is laid out on a scratch copy of the
//! subtree. Cells start out proportional to weight, are widened to the
//! minimum cell size where needed, and are then trimmed to what their
//! child actually used, handing the slack to the next cell or row.

use std::ops::Range;

use tracing::trace;

use super::{
    LayoutStrategy, SubLayout, collapse_to_tile, one_square_layout, square_layout, sweep_layout,
};
use crate::layout::{
    Frame, LayoutAlgorithm, LayoutCtx, LayoutError, LayoutResult, PointF, RowBreaks, SizeF,
    SweptArea, limit_vals,
};
use crate::tree::{LayoutTree, NodeId};

pub struct RowLayout;

impl LayoutStrategy for RowLayout {
    fn layout(
        &self,
        tree: &mut LayoutTree,
        id: NodeId,
        frame: Frame,
        ctx: LayoutCtx<'_>,
    ) -> LayoutResult<()> {
        row_layout(tree, id, frame, ctx, SubLayout::Row)
    }
}

pub fn row_layout(
    tree: &mut LayoutTree,
    id: NodeId,
    frame: Frame,
    ctx: LayoutCtx<'_>,
    sub: SubLayout<'_>,
) -> LayoutResult<()> {
    if tree[id].is_leaf() {
        return one_square_layout(tree, id, frame, ctx.opts);
    }
    if tree.has_only_leaf_children(id) {
        return square_layout(tree, id, frame, ctx);
    }
    match arrange_rows(tree, id, frame, ctx, sub) {
        Err(err) if ctx.allow_collapse => collapse_to_tile(tree, id, frame, ctx.opts, &err),
        result => result,
    }
}

struct Candidate {
    tree: LayoutTree,
    empty_space: f64,
    slack_right: f64,
    slack_bottom: f64,
    offer: Option<SweptArea>,
}

/// Search row groupings for the children of `id` and commit the best.
///
/// Never collapses `id` itself; children are laid out with `ctx`.
pub(crate) fn arrange_rows(
    tree: &mut LayoutTree,
    id: NodeId,
    frame: Frame,
    ctx: LayoutCtx<'_>,
    sub: SubLayout<'_>,
) -> LayoutResult<()> {
    let opts = ctx.opts;
    let sp = opts.tile_spacing;
    let header = opts.header(frame.show_header);
    let origin = PointF::new(sp, sp + header);
    let content = SizeF::new(frame.dims.w - sp, frame.dims.h - sp - header);
    if content.w <= 0.0 || content.h <= 0.0 {
        return Err(LayoutError::AreaTooSmall);
    }

    // Non-leaf children under sweep may hold a header and a swept strip.
    let (extra_w, extra_h) = if opts.algorithm == LayoutAlgorithm::Sweep {
        (2.0 * sp, 2.0 * sp + opts.header_size)
    } else {
        (0.0, 0.0)
    };
    let min_cell = SizeF::new(
        opts.min_tile_size + sp + extra_w,
        opts.min_tile_size + sp + extra_h,
    );

    let (sweep, mut offer) = match sub {
        SubLayout::Row => (false, None),
        SubLayout::Sweep { offer } => (true, offer),
    };
    let weights: Vec<usize> = tree.children(id).iter().map(|&c| tree[c].weight).collect();
    let grid = RowGrid { origin, content, min_cell };

    let mut best: Option<Candidate> = None;
    let mut tried = 0usize;
    for breaks in RowBreaks::new(opts.row_mode, &weights) {
        tried += 1;
        let mut cand_offer = offer.as_deref().cloned();
        let laid = grid.lay_out(
            tree,
            id,
            &breaks,
            &weights,
            frame,
            ctx,
            sweep,
            cand_offer.as_mut(),
        );
        let Ok(mut cand) = laid else {
            continue;
        };
        if best
            .as_ref()
            .is_none_or(|b| cand.empty_space < b.empty_space * opts.row_sensitivity)
        {
            cand.offer = cand_offer;
            best = Some(cand);
        }
    }

    let Some(best) = best else {
        trace!(node = %tree[id].name, tried, "no row grouping fits");
        return Err(LayoutError::NoFeasibleArrangement);
    };
    trace!(node = %tree[id].name, tried, empty_space = best.empty_space, "row grouping chosen");

    let scratch_root = best.tree.root();
    tree.graft_layout(id, &best.tree, scratch_root);
    let dims = SizeF::new(frame.dims.w - best.slack_right, frame.dims.h - best.slack_bottom);
    tree.assign(id, frame.pos, dims, frame.show_header, best.empty_space);
    if let (Some(slot), Some(updated)) = (offer.as_deref_mut(), best.offer) {
        *slot = updated;
    }
    Ok(())
}

struct RowGrid {
    origin: PointF,
    content: SizeF,
    min_cell: SizeF,
}

impl RowGrid {
    /// Lay out one row grouping on a scratch copy of the subtree at `id`.
    #[allow(clippy::too_many_arguments)]
    fn lay_out(
        &self,
        tree: &LayoutTree,
        id: NodeId,
        breaks: &[usize],
        weights: &[usize],
        frame: Frame,
        ctx: LayoutCtx<'_>,
        sweep: bool,
        mut offer: Option<&mut SweptArea>,
    ) -> LayoutResult<Candidate> {
        let sp = ctx.opts.tile_spacing;
        let n = weights.len();
        let rows: Vec<Range<usize>> = breaks
            .iter()
            .enumerate()
            .map(|(r, &start)| start..breaks.get(r + 1).copied().unwrap_or(n))
            .collect();
        let weight_of = |range: &Range<usize>| weights[range.clone()].iter().sum::<usize>() as f64;
        let total = weights.iter().sum::<usize>() as f64;

        let mut widths = Vec::with_capacity(rows.len());
        for range in &rows {
            let row_weight = weight_of(range);
            let proportional: Vec<f64> = range
                .clone()
                .map(|i| weights[i] as f64 / row_weight * self.content.w)
                .collect();
            let limited = limit_vals(&proportional, self.min_cell.w, f64::INFINITY)
                .ok_or(LayoutError::GroupingInfeasible)?;
            widths.push(limited);
        }
        let proportional: Vec<f64> = rows
            .iter()
            .map(|range| weight_of(range) / total * self.content.h)
            .collect();
        let mut heights = limit_vals(&proportional, self.min_cell.h, f64::INFINITY)
            .ok_or(LayoutError::GroupingInfeasible)?;

        let mut xs: Vec<Vec<f64>> = widths.iter().map(|row| running_starts(row)).collect();
        let mut ys = running_starts(&heights);

        let mut scratch = tree.clone_subtree(id);
        let kids = scratch.children(scratch.root()).to_vec();
        let mut covered = 0.0;
        let mut slack_right = f64::INFINITY;
        let mut slack_bottom = 0.0;
        for (r, range) in rows.iter().enumerate() {
            let mut tallest = 0.0f64;
            let last_col = range.len() - 1;
            for (c, idx) in range.clone().enumerate() {
                let child = kids[idx];
                let cell = Frame::new(
                    PointF::new(self.origin.x + xs[r][c], self.origin.y + ys[r]),
                    SizeF::new(widths[r][c] - sp, heights[r] - sp),
                    true,
                );
                lay_out_cell(&mut scratch, child, cell, ctx, sweep, offer.as_deref_mut())
                    .map_err(|_| LayoutError::ChildLayoutFailed)?;
                let used = scratch[child].dims;
                covered += cell.dims.area() - scratch[child].empty_space;
                tallest = tallest.max(used.h);

                let horz_slack = cell.dims.w - used.w;
                if c < last_col {
                    xs[r][c + 1] -= horz_slack;
                    widths[r][c + 1] += horz_slack;
                } else {
                    slack_right = slack_right.min(horz_slack);
                }
            }
            let vert_slack = heights[r] - sp - tallest;
            if r + 1 < rows.len() {
                ys[r + 1] -= vert_slack;
                heights[r + 1] += vert_slack;
            } else {
                slack_bottom = vert_slack;
            }
        }

        Ok(Candidate {
            tree: scratch,
            empty_space: frame.dims.area() - covered,
            slack_right,
            slack_bottom,
            offer: None,
        })
    }
}

fn lay_out_cell(
    tree: &mut LayoutTree,
    child: NodeId,
    cell: Frame,
    ctx: LayoutCtx<'_>,
    sweep: bool,
    offer: Option<&mut SweptArea>,
) -> LayoutResult<()> {
    if tree[child].is_leaf() {
        one_square_layout(tree, child, cell, ctx.opts)
    } else if tree.has_only_leaf_children(child) {
        square_layout(tree, child, cell, ctx)
    } else if sweep {
        sweep_layout(tree, child, cell, ctx, offer)
    } else {
        row_layout(tree, child, cell, ctx, SubLayout::Row)
    }
}

// Offsets at which consecutive spans of the given sizes start.
fn running_starts(sizes: &[f64]) -> Vec<f64> {
    sizes
        .iter()
        .scan(0.0, |next, &size| {
            let start = *next;
            *next += size;
            Some(start)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{LayoutOptions, RectF, RowMode};

    fn opts(mode: RowMode) -> LayoutOptions {
        LayoutOptions {
            min_tile_size: 50.0,
            max_tile_size: 200.0,
            tile_spacing: 5.0,
            header_size: 20.0,
            algorithm: LayoutAlgorithm::Row,
            row_mode: mode,
            ..LayoutOptions::default()
        }
    }

    // root -> [a -> 3 leaves, b -> 1 leaf, c (leaf)]
    fn mixed_tree() -> LayoutTree {
        let mut tree = LayoutTree::new("root");
        let root = tree.root();
        let a = tree.push_child(root, "a");
        for i in 0..3 {
            tree.push_child(a, format!("a{i}"));
        }
        let b = tree.push_child(root, "b");
        tree.push_child(b, "b0");
        tree.push_child(root, "c");
        tree
    }

    fn assert_nested(tree: &LayoutTree, id: NodeId) {
        let bounds = RectF::new(PointF::ZERO, tree[id].dims);
        let kids = tree.children(id);
        for (i, &c) in kids.iter().enumerate() {
            let rect = tree[c].rect();
            assert!(bounds.contains(&rect, 1e-6), "{} escapes {}", tree[c].name, tree[id].name);
            for &d in &kids[i + 1..] {
                assert!(!rect.overlaps(&tree[d].rect()));
            }
            assert_nested(tree, c);
        }
    }

    #[test]
    fn running_starts_accumulate() {
        assert_eq!(running_starts(&[10.0, 5.0, 2.5]), vec![0.0, 10.0, 15.0]);
    }

    #[test]
    fn lays_out_mixed_children_in_rows() {
        for mode in [RowMode::SingleRow, RowMode::Exhaustive, RowMode::ExhaustiveFirstRow] {
            let o = opts(mode);
            let ctx = LayoutCtx { opts: &o, allow_collapse: false };
            let mut tree = mixed_tree();
            let root = tree.root();
            let frame = Frame::new(PointF::ZERO, SizeF::new(800.0, 500.0), true);
            row_layout(&mut tree, root, frame, ctx, SubLayout::Row).unwrap();
            assert!(tree[root].dims.w <= 800.0 + 1e-6 && tree[root].dims.h <= 500.0 + 1e-6);
            assert!(tree[root].empty_space >= 0.0);
            assert_nested(&tree, root);
        }
    }

    #[test]
    fn single_column_stacks_children() {
        let o = opts(RowMode::SingleColumn);
        let ctx = LayoutCtx { opts: &o, allow_collapse: false };
        let mut tree = mixed_tree();
        let root = tree.root();
        let frame = Frame::new(PointF::ZERO, SizeF::new(400.0, 900.0), true);
        row_layout(&mut tree, root, frame, ctx, SubLayout::Row).unwrap();
        let ys: Vec<f64> = tree.children(root).iter().map(|&c| tree[c].pos.y).collect();
        assert!(ys.windows(2).all(|w| w[0] < w[1]));
        let xs: Vec<f64> = tree.children(root).iter().map(|&c| tree[c].pos.x).collect();
        assert!(xs.iter().all(|&x| x == 5.0));
    }

    #[test]
    fn infeasible_grouping_reports_no_arrangement() {
        let o = opts(RowMode::SingleRow);
        let ctx = LayoutCtx { opts: &o, allow_collapse: false };
        let mut tree = mixed_tree();
        let root = tree.root();
        let frame = Frame::new(PointF::ZERO, SizeF::new(150.0, 400.0), true);
        assert_eq!(
            row_layout(&mut tree, root, frame, ctx, SubLayout::Row),
            Err(LayoutError::NoFeasibleArrangement)
        );
        assert_eq!(tree[root].dims, SizeF::ZERO);
    }

    #[test]
    fn failed_search_collapses_when_allowed() {
        let o = opts(RowMode::SingleRow);
        let ctx = LayoutCtx { opts: &o, allow_collapse: true };
        let mut tree = mixed_tree();
        let root = tree.root();
        let frame = Frame::new(PointF::ZERO, SizeF::new(150.0, 400.0), true);
        row_layout(&mut tree, root, frame, ctx, SubLayout::Row).unwrap();
        assert!(tree[root].is_leaf());
        assert!(tree.check_weights());
    }
}
