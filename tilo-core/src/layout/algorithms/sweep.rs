// sweep.rs
//
// Sweep layout: leaves are pushed into a compact block along the left or
// top edge and the non-leaf children are laid out in rows beside it.
//
// Parent-area negotiation:
// - A node whose only non-leaf child sits next to a partly filled leaf
//   strip offers the rest of the strip to that child as a SweptArea.
// - The child may place its own leaves there instead of sweeping them
//   inside its own tile, and reports back the part it used.
// - sweep_to_parent decides whether the offer is tried before or after
//   the child's own area, or ignored.
//
// Both arrangements are built as plans on scratch trees; only the chosen
// plan is grafted onto the node's children.

use tracing::{debug, trace};

use super::row::arrange_rows;
use super::{
    LayoutStrategy, SubLayout, collapse_to_tile, one_square_layout, row_layout, square_layout,
};
use crate::layout::{
    EXTENT_EPSILON, Frame, LayoutCtx, LayoutError, LayoutResult, PointF, SizeF, SweepEdge,
    SweepToParent, SweptArea,
};
use crate::tree::{LayoutTree, NodeId};

pub struct SweepLayout;

impl LayoutStrategy for SweepLayout {
    fn layout(
        &self,
        tree: &mut LayoutTree,
        id: NodeId,
        frame: Frame,
        ctx: LayoutCtx<'_>,
    ) -> LayoutResult<()> {
        sweep_layout(tree, id, frame, ctx, None)
    }
}

/// Children of one node, split by kind, in child order.
struct Split {
    leaves: Vec<NodeId>,
    non_leaves: Vec<NodeId>,
}

/// A complete sweep arrangement, not yet applied to the tree.
struct SweepPlan {
    /// Leaf children under a synthetic root, positioned in node space.
    leaves: LayoutTree,
    /// Non-leaf children under a synthetic root, positioned in node space.
    non_leaves: LayoutTree,
    dims: SizeF,
    empty_space: f64,
    /// Set when the leaves went into the parent's area.
    swept_area: Option<SweptArea>,
}

pub fn sweep_layout(
    tree: &mut LayoutTree,
    id: NodeId,
    frame: Frame,
    ctx: LayoutCtx<'_>,
    offer: Option<&mut SweptArea>,
) -> LayoutResult<()> {
    if tree[id].is_leaf() {
        return one_square_layout(tree, id, frame, ctx.opts);
    }
    let (leaves, non_leaves): (Vec<NodeId>, Vec<NodeId>) =
        tree.children(id).iter().copied().partition(|&c| tree[c].is_leaf());
    if non_leaves.is_empty() {
        return square_layout(tree, id, frame, ctx);
    }
    if leaves.is_empty() {
        return row_layout(tree, id, frame, ctx, SubLayout::Sweep { offer: None });
    }
    let split = Split { leaves, non_leaves };

    let mode = ctx.opts.sweep_to_parent;
    let parent_area = offer.filter(|_| mode != SweepToParent::None);
    let planned = {
        let tree: &LayoutTree = tree;
        match (mode, parent_area.as_deref()) {
            (SweepToParent::Prefer, Some(area)) => {
                plan_in_parent_area(tree, id, &split, frame, ctx, area).or_else(|err| {
                    trace!(node = %tree[id].name, %err, "parent area rejected, using own area");
                    plan_in_own_area(tree, id, &split, frame, ctx)
                })
            }
            (SweepToParent::Fallback, Some(area)) => {
                plan_in_own_area(tree, id, &split, frame, ctx).or_else(|err| {
                    trace!(node = %tree[id].name, %err, "own area rejected, trying parent area");
                    plan_in_parent_area(tree, id, &split, frame, ctx, area)
                })
            }
            _ => plan_in_own_area(tree, id, &split, frame, ctx),
        }
    };

    match planned {
        Ok(plan) => {
            if let (Some(slot), Some(used)) = (parent_area, plan.swept_area.as_ref()) {
                debug!(
                    node = %tree[id].name,
                    covered = used.covered,
                    "leaves placed in parent area"
                );
                *slot = used.clone();
            }
            commit(tree, id, &split, frame, plan);
            Ok(())
        }
        Err(err) if ctx.allow_collapse => collapse_to_tile(tree, id, frame, ctx.opts, &err),
        Err(err) => Err(err),
    }
}

fn plan_in_own_area(
    tree: &LayoutTree,
    id: NodeId,
    split: &Split,
    frame: Frame,
    ctx: LayoutCtx<'_>,
) -> LayoutResult<SweepPlan> {
    let swept_left = match ctx.opts.sweep_edge {
        SweepEdge::Left => true,
        SweepEdge::Top => false,
        SweepEdge::Shorter => {
            let aspect = ctx
                .opts
                .viewport_aspect
                .unwrap_or(frame.dims.w / frame.dims.h);
            aspect >= 1.0
        }
        SweepEdge::Auto => return plan_auto(tree, id, split, frame, ctx),
    };
    let block = sweep_leaves(tree, id, split, frame, ctx, swept_left)?;
    plan_swept(tree, id, split, frame, ctx, block)
}

/// Pick the edge whose leaf block leaves less of its strip empty (left on
/// ties) and lay the non-leaves out once. The other edge is only tried if
/// that plan fails.
fn plan_auto(
    tree: &LayoutTree,
    id: NodeId,
    split: &Split,
    frame: Frame,
    ctx: LayoutCtx<'_>,
) -> LayoutResult<SweepPlan> {
    let left = sweep_leaves(tree, id, split, frame, ctx, true);
    let top = sweep_leaves(tree, id, split, frame, ctx, false);
    let (chosen, other) = match (left, top) {
        (Ok(left), Ok(top)) if top.empty_space() < left.empty_space() => (top, Some(left)),
        (Ok(left), Ok(top)) => (left, Some(top)),
        (Ok(left), Err(_)) => (left, None),
        (Err(_), Ok(top)) => (top, None),
        (Err(err), Err(_)) => return Err(err),
    };
    trace!(node = %tree[id].name, swept_left = chosen.swept_left, "sweep edge chosen");
    match (plan_swept(tree, id, split, frame, ctx, chosen), other) {
        (Err(err), Some(other)) => {
            trace!(node = %tree[id].name, %err, "chosen sweep edge failed, trying the other");
            plan_swept(tree, id, split, frame, ctx, other)
        }
        (planned, _) => planned,
    }
}

/// Leaf children square-laid in a strip along one edge of a node's area.
struct LeafBlock {
    /// Leaves under a synthetic root, positioned in node space.
    group: LayoutTree,
    strip: SizeF,
    swept_left: bool,
}

impl LeafBlock {
    fn dims(&self) -> SizeF {
        self.group[self.group.root()].dims
    }

    /// Strip area not covered by leaf tiles.
    fn empty_space(&self) -> f64 {
        self.group[self.group.root()].empty_space
    }

    fn covered(&self) -> f64 {
        self.strip.area() - self.empty_space()
    }
}

fn sweep_leaves(
    tree: &LayoutTree,
    id: NodeId,
    split: &Split,
    frame: Frame,
    ctx: LayoutCtx<'_>,
    swept_left: bool,
) -> LayoutResult<LeafBlock> {
    let opts = ctx.opts;
    let sp = opts.tile_spacing;
    let header = opts.header(frame.show_header);
    let area = SizeF::new(frame.dims.w, frame.dims.h - header);

    let non_leaf_tips: usize = split.non_leaves.iter().map(|&c| tree[c].weight).sum();
    let ratio = opts.swept_share.ratio(split.leaves.len(), non_leaf_tips);
    let min_strip = opts.min_tile_size + 2.0 * sp;
    let strip = if swept_left {
        SizeF::new(min_strip.max(area.w * ratio), area.h)
    } else {
        SizeF::new(area.w, min_strip.max(area.h * ratio))
    };

    let mut group = tree.group(&format!("{}/swept", tree[id].name), &split.leaves);
    let root = group.root();
    square_layout(
        &mut group,
        root,
        Frame::new(PointF::ZERO, strip, false),
        ctx.no_collapse(),
    )?;
    group.shift_children(root, PointF::new(0.0, header));
    Ok(LeafBlock { group, strip, swept_left })
}

/// Lay the non-leaves out beside a leaf block swept to one edge of the
/// node's own area.
fn plan_swept(
    tree: &LayoutTree,
    id: NodeId,
    split: &Split,
    frame: Frame,
    ctx: LayoutCtx<'_>,
    leaves: LeafBlock,
) -> LayoutResult<SweepPlan> {
    let opts = ctx.opts;
    let sp = opts.tile_spacing;
    let header = opts.header(frame.show_header);
    let area = SizeF::new(frame.dims.w, frame.dims.h - header);
    let swept_left = leaves.swept_left;
    let block = leaves.dims();
    let leaves_covered = leaves.covered();

    let (rest_pos, rest_dims) = if swept_left {
        (
            PointF::new(block.w - sp, header),
            SizeF::new(area.w - block.w + sp, area.h),
        )
    } else {
        (
            PointF::new(0.0, header + block.h - sp),
            SizeF::new(area.w, area.h - block.h + sp),
        )
    };

    // Offsets are relative to the single non-leaf child, which row layout
    // places one spacing unit into the rest rectangle.
    let mut offer = None;
    if split.non_leaves.len() == 1 && opts.sweep_to_parent != SweepToParent::None {
        let margin = if swept_left {
            area.h - block.h - sp
        } else {
            area.w - block.w - sp
        };
        if margin > 0.0 {
            offer = Some(if swept_left {
                SweptArea::new(
                    PointF::new(-block.w + sp, block.h - sp),
                    SizeF::new(block.w, margin),
                    true,
                )
            } else {
                SweptArea::new(
                    PointF::new(block.w - sp, -block.h + sp),
                    SizeF::new(margin, block.h),
                    false,
                )
            });
        }
    }

    let mut rest_group = tree.group(&format!("{}/rest", tree[id].name), &split.non_leaves);
    let rest_root = rest_group.root();
    arrange_rows(
        &mut rest_group,
        rest_root,
        Frame::new(PointF::ZERO, rest_dims, false),
        ctx,
        SubLayout::Sweep { offer: offer.as_mut() },
    )?;
    rest_group.shift_children(rest_root, rest_pos);
    let rest = rest_group[rest_root].dims;
    let rest_covered = rest_dims.area() - rest_group[rest_root].empty_space;

    let used = offer.filter(|o| o.used);
    let extra = used.as_ref().map_or(SizeF::ZERO, |o| o.dims);
    let dims = if swept_left {
        SizeF::new(
            block.w + rest.w - sp,
            (block.h + extra.h).max(rest.h) + header,
        )
    } else {
        SizeF::new(
            (block.w + extra.w).max(rest.w),
            block.h + rest.h - sp + header,
        )
    };
    check_fits(dims, frame)?;

    let child_covered = used.map_or(0.0, |o| o.covered);
    Ok(SweepPlan {
        leaves: leaves.group,
        non_leaves: rest_group,
        dims,
        empty_space: frame.dims.area() - leaves_covered - rest_covered - child_covered,
        swept_area: None,
    })
}

/// Place the leaves in the area offered by the parent and lay the
/// non-leaves out over the node's whole tile.
fn plan_in_parent_area(
    tree: &LayoutTree,
    id: NodeId,
    split: &Split,
    frame: Frame,
    ctx: LayoutCtx<'_>,
    parent_area: &SweptArea,
) -> LayoutResult<SweepPlan> {
    let opts = ctx.opts;
    let sp = opts.tile_spacing;
    let header = opts.header(frame.show_header);
    let swept_left = parent_area.swept_left;

    let name = &tree[id].name;
    let mut leaf_group = tree.group(&format!("{name}/swept"), &split.leaves);
    let leaf_root = leaf_group.root();
    square_layout(
        &mut leaf_group,
        leaf_root,
        Frame::new(PointF::ZERO, parent_area.dims, !swept_left),
        ctx.no_collapse(),
    )?;
    leaf_group.shift_children(leaf_root, parent_area.pos);
    let block = leaf_group[leaf_root].dims;
    let leaves_covered = parent_area.dims.area() - leaf_group[leaf_root].empty_space;

    let rest_header = if swept_left { header } else { 0.0 };
    let rest_dims = SizeF::new(frame.dims.w, frame.dims.h - rest_header);

    // The rest of the parent's area, passed on to a single non-leaf child.
    let child_offset = PointF::new(sp, sp + rest_header);
    let mut offer = None;
    if split.non_leaves.len() == 1 {
        let (pos, dims) = if swept_left {
            (
                PointF::new(parent_area.pos.x, parent_area.pos.y + block.h),
                SizeF::new(parent_area.dims.w, parent_area.dims.h - block.h - 2.0 * sp),
            )
        } else {
            (
                PointF::new(parent_area.pos.x + block.w, parent_area.pos.y + header),
                SizeF::new(parent_area.dims.w - block.w - 2.0 * sp, parent_area.dims.h - header),
            )
        };
        if dims.w > 0.0 && dims.h > 0.0 {
            let relative = PointF::new(pos.x - child_offset.x, pos.y - child_offset.y);
            offer = Some(SweptArea::new(relative, dims, swept_left));
        }
    }

    let mut rest_group = tree.group(&format!("{name}/rest"), &split.non_leaves);
    let rest_root = rest_group.root();
    arrange_rows(
        &mut rest_group,
        rest_root,
        Frame::new(PointF::ZERO, rest_dims, false),
        ctx,
        SubLayout::Sweep { offer: offer.as_mut() },
    )?;
    rest_group.shift_children(rest_root, PointF::new(0.0, rest_header));
    let mut rest = rest_group[rest_root].dims;
    let rest_covered = rest_dims.area() - rest_group[rest_root].empty_space;
    let nested = offer.filter(|o| o.used);

    // Report the part of the parent's area used, aligned with the
    // non-leaf block and kept one spacing unit clear of it.
    let mut used = parent_area.clone();
    if swept_left {
        used.dims.h = block.h + nested.as_ref().map_or(0.0, |o| o.dims.h + sp);
        let bottom = used.pos.y + used.dims.h;
        if bottom > rest.h + header {
            rest.h = bottom - header;
        } else {
            used.dims.h = rest.h + header - used.pos.y;
        }
        used.dims.w -= sp;
    } else {
        used.dims.w = block.w + nested.as_ref().map_or(0.0, |o| o.dims.w + sp);
        let right = used.pos.x + used.dims.w;
        if right > rest.w {
            rest.w = right;
        } else {
            used.dims.w = rest.w - used.pos.x;
        }
        used.dims.h -= sp;
    }
    used.used = true;
    used.covered = leaves_covered + nested.map_or(0.0, |o| o.covered);

    let dims = SizeF::new(rest.w, rest.h + rest_header);
    check_fits(dims, frame)?;
    Ok(SweepPlan {
        leaves: leaf_group,
        non_leaves: rest_group,
        dims,
        empty_space: frame.dims.area() - rest_covered,
        swept_area: Some(used),
    })
}

fn check_fits(dims: SizeF, frame: Frame) -> LayoutResult<()> {
    if dims.w > frame.dims.w + EXTENT_EPSILON || dims.h > frame.dims.h + EXTENT_EPSILON {
        return Err(LayoutError::AreaTooSmall);
    }
    Ok(())
}

fn commit(tree: &mut LayoutTree, id: NodeId, split: &Split, frame: Frame, plan: SweepPlan) {
    for (group, members) in [(&plan.leaves, &split.leaves), (&plan.non_leaves, &split.non_leaves)] {
        let copies = group.children(group.root());
        for (&member, &copy) in members.iter().zip(copies) {
            tree.graft_layout(member, group, copy);
        }
    }
    tree.assign(id, frame.pos, plan.dims, frame.show_header, plan.empty_space);
    tree[id].swept_area = plan.swept_area;
}
