//! Property-based invariant tests for the tile layout.
//!
//! 1. `limit_vals` keeps the total and respects both bounds.
//! 2. Exhaustive row breaks cover all 2^(n-1) groupings exactly once.
//! 3. First-row breaks yield one grouping per first-row length.
//! 4. With collapse allowed, any tree lays out in any area that fits a
//!    minimum tile, and subtree weights stay consistent.
//! 5. Without parent-area sweeping, every tile lies inside its parent and
//!    siblings never overlap.
//! 6. A failed layout leaves the tree exactly as it was.
//! 7. When leaves may move into a parent's area, leaf tiles stay pairwise
//!    disjoint, clear of non-leaf tiles other than their ancestors, and
//!    inside the root.

use std::collections::HashSet;

use proptest::prelude::*;
use tilo_core::{
    LayoutAlgorithm, LayoutOptions, LayoutOutput, LayoutRequest, LayoutTree, NodeId, PointF,
    RectF, RowBreaks, RowMode, SizeF, SweepEdge, SweepToParent, limit_vals,
};

// ── Helpers ─────────────────────────────────────────────────────────────

/// Child counts for a three-level tree: `shape[i][j]` is the number of
/// leaves under grandchild `j` of child `i` (0 makes it a leaf itself).
fn shape_strategy() -> impl Strategy<Value = Vec<Vec<usize>>> {
    prop::collection::vec(prop::collection::vec(0usize..4, 0..4), 1..6)
}

fn build_tree(shape: &[Vec<usize>]) -> LayoutTree {
    let mut tree = LayoutTree::new("root");
    let root = tree.root();
    for (i, grandchildren) in shape.iter().enumerate() {
        let child = tree.push_child(root, format!("c{i}"));
        for (j, &leaves) in grandchildren.iter().enumerate() {
            let grandchild = tree.push_child(child, format!("c{i}.{j}"));
            for k in 0..leaves {
                tree.push_child(grandchild, format!("c{i}.{j}.{k}"));
            }
        }
    }
    tree
}

fn algorithm_strategy() -> impl Strategy<Value = LayoutAlgorithm> {
    prop::sample::select(vec![
        LayoutAlgorithm::Square,
        LayoutAlgorithm::Row,
        LayoutAlgorithm::Sweep,
    ])
}

fn edge_strategy() -> impl Strategy<Value = SweepEdge> {
    prop::sample::select(vec![SweepEdge::Left, SweepEdge::Top, SweepEdge::Auto])
}

fn options(
    algorithm: LayoutAlgorithm,
    sweep_edge: SweepEdge,
    to_parent: SweepToParent,
) -> LayoutOptions {
    LayoutOptions {
        min_tile_size: 50.0,
        max_tile_size: 200.0,
        tile_spacing: 5.0,
        header_size: 20.0,
        algorithm,
        sweep_edge,
        sweep_to_parent: to_parent,
        ..LayoutOptions::default()
    }
}

/// A chain `n0 -> n1 -> ...` where node `i` also has `levels[i]` leaves and
/// the last node holds `tail` leaves only.
fn build_chain(levels: &[usize], tail: usize) -> LayoutTree {
    let mut tree = LayoutTree::new("n0");
    let mut node = tree.root();
    for (i, &leaves) in levels.iter().enumerate() {
        for k in 0..leaves {
            tree.push_child(node, format!("n{i}.{k}"));
        }
        node = tree.push_child(node, format!("n{}", i + 1));
    }
    for k in 0..tail {
        tree.push_child(node, format!("n{}.{k}", levels.len()));
    }
    tree
}

fn world_rect(tree: &LayoutTree, id: NodeId) -> RectF {
    RectF::new(tree.world_pos(id), tree[id].dims)
}

fn is_ancestor(tree: &LayoutTree, ancestor: NodeId, id: NodeId) -> bool {
    let mut cur = tree[id].parent;
    while let Some(p) = cur {
        if p == ancestor {
            return true;
        }
        cur = tree[p].parent;
    }
    false
}

// Local rect of `id` inside its parent's tile.
fn local_rect(tree: &LayoutTree, id: NodeId) -> RectF {
    tree[id].rect()
}

fn shrink(rect: RectF, by: f64) -> RectF {
    RectF::new(
        PointF::new(rect.x + by, rect.y + by),
        SizeF::new(rect.w - 2.0 * by, rect.h - 2.0 * by),
    )
}

// ═════════════════════════════════════════════════════════════════════════
// 1. limit_vals keeps the total and respects both bounds
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn limit_vals_preserves_total(
        vals in prop::collection::vec(0.0f64..500.0, 1..10),
        min in 0.0f64..60.0,
        span in 0.0f64..400.0,
    ) {
        let max = min + span;
        if let Some(out) = limit_vals(&vals, min, max) {
            prop_assert_eq!(out.len(), vals.len());
            let (before, after): (f64, f64) = (vals.iter().sum(), out.iter().sum());
            prop_assert!((before - after).abs() <= 1e-9 * before.max(1.0),
                "total changed: {} -> {}", before, after);
            for v in &out {
                prop_assert!(*v >= min - 1e-9 && *v <= max + 1e-9,
                    "{} outside [{}, {}]", v, min, max);
            }
        }
    }

    #[test]
    fn limit_vals_leaves_in_range_values_alone(
        vals in prop::collection::vec(10.0f64..20.0, 1..10),
    ) {
        prop_assert_eq!(limit_vals(&vals, 10.0, 20.0), Some(vals));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2-3. Row break enumeration
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn exhaustive_breaks_cover_every_grouping(weights in prop::collection::vec(1usize..6, 1..9)) {
        let n = weights.len();
        let all: Vec<Vec<usize>> = RowBreaks::new(RowMode::Exhaustive, &weights).collect();
        let distinct: HashSet<&Vec<usize>> = all.iter().collect();
        prop_assert_eq!(all.len(), 1 << (n - 1));
        prop_assert_eq!(distinct.len(), all.len());
        for seq in &all {
            prop_assert_eq!(seq[0], 0);
            prop_assert!(seq.windows(2).all(|w| w[0] < w[1]));
            prop_assert!(seq.iter().all(|&i| i < n));
        }
    }

    #[test]
    fn first_row_breaks_shrink_the_first_row(weights in prop::collection::vec(1usize..6, 1..9)) {
        let n = weights.len();
        let all: Vec<Vec<usize>> = RowBreaks::new(RowMode::ExhaustiveFirstRow, &weights).collect();
        prop_assert_eq!(all.len(), n);
        for (k, seq) in all.iter().enumerate() {
            prop_assert_eq!(seq[0], 0);
            prop_assert_eq!(seq.get(1).copied().unwrap_or(n), n - k);
            prop_assert!(seq.windows(2).all(|w| w[0] < w[1]));
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Collapse guarantee
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn collapse_always_yields_a_layout(
        shape in shape_strategy(),
        algorithm in algorithm_strategy(),
        edge in edge_strategy(),
        w in 50.0f64..1400.0,
        h in 50.0f64..1000.0,
    ) {
        let mut tree = build_tree(&shape);
        let opts = options(algorithm, edge, SweepToParent::Fallback);
        let req = LayoutRequest { allow_collapse: true, change: None };
        let area = SizeF::new(w, h);
        prop_assert!(tilo_core::try_layout(&mut tree, PointF::ZERO, area, &opts, req).is_ok());

        prop_assert!(tree.check_weights());
        let root = tree.root();
        let bounds = RectF::new(PointF::ZERO, area);
        prop_assert!(bounds.contains(&tree[root].rect(), 1e-6));
        for id in tree.pre_order() {
            let node = &tree[id];
            if node.is_leaf() && id != root {
                prop_assert!(node.dims.w >= 50.0 - 1e-9 && node.dims.w <= 200.0 + 1e-9);
                prop_assert_eq!(node.dims.w, node.dims.h);
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Containment and sibling separation
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn tiles_nest_without_overlap(
        shape in shape_strategy(),
        algorithm in algorithm_strategy(),
        edge in edge_strategy(),
        w in 50.0f64..1400.0,
        h in 50.0f64..1000.0,
    ) {
        let mut tree = build_tree(&shape);
        let opts = options(algorithm, edge, SweepToParent::None);
        let req = LayoutRequest { allow_collapse: true, change: None };
        tilo_core::try_layout(&mut tree, PointF::ZERO, SizeF::new(w, h), &opts, req).unwrap();

        for id in tree.pre_order() {
            let bounds = RectF::new(PointF::ZERO, tree[id].dims);
            let kids = tree.children(id);
            for (i, &a) in kids.iter().enumerate() {
                let ra = local_rect(&tree, a);
                prop_assert!(bounds.contains(&ra, 1e-6),
                    "{} escapes {}", tree[a].name, tree[id].name);
                for &b in &kids[i + 1..] {
                    let rb = local_rect(&tree, b);
                    prop_assert!(!shrink(ra, 1e-6).overlaps(&shrink(rb, 1e-6)),
                        "{} overlaps {}", tree[a].name, tree[b].name);
                }
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 6. Failed layouts are atomic
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn failed_layout_changes_nothing(
        shape in shape_strategy(),
        algorithm in algorithm_strategy(),
        w in 50.0f64..600.0,
        h in 50.0f64..400.0,
    ) {
        let mut tree = build_tree(&shape);
        let opts = options(algorithm, SweepEdge::Left, SweepToParent::Prefer);
        let roomy = LayoutRequest { allow_collapse: true, change: None };
        tilo_core::try_layout(&mut tree, PointF::ZERO, SizeF::new(2000.0, 2000.0), &opts, roomy)
            .unwrap();
        let before = serde_json::to_string(&LayoutOutput::from_tree(&tree)).unwrap();

        let strict = LayoutRequest::default();
        let area = SizeF::new(w, h);
        if tilo_core::try_layout(&mut tree, PointF::ZERO, area, &opts, strict).is_err() {
            let after = serde_json::to_string(&LayoutOutput::from_tree(&tree)).unwrap();
            prop_assert_eq!(before, after);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 7. Leaves placed in a parent's area
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn leaves_in_parent_area_stay_clear(
        levels in prop::collection::vec(1usize..4, 1..5),
        tail in 1usize..5,
        to_parent in prop::sample::select(vec![SweepToParent::Prefer, SweepToParent::Fallback]),
        edge in edge_strategy(),
        w in 100.0f64..1500.0,
        h in 100.0f64..1200.0,
    ) {
        let mut tree = build_chain(&levels, tail);
        let opts = options(LayoutAlgorithm::Sweep, edge, to_parent);
        let req = LayoutRequest { allow_collapse: true, change: None };
        let area = SizeF::new(w, h);
        tilo_core::try_layout(&mut tree, PointF::ZERO, area, &opts, req).unwrap();

        let root = tree.root();
        let root_rect = world_rect(&tree, root);
        prop_assert!(RectF::new(PointF::ZERO, area).contains(&root_rect, 1e-6));
        let ids = tree.pre_order();
        let leaves: Vec<NodeId> =
            ids.iter().copied().filter(|&id| id != root && tree[id].is_leaf()).collect();
        for (i, &a) in leaves.iter().enumerate() {
            let ra = world_rect(&tree, a);
            prop_assert!(root_rect.contains(&ra, 1e-6), "{} escapes the root", tree[a].name);
            for &b in &leaves[i + 1..] {
                let rb = world_rect(&tree, b);
                prop_assert!(!shrink(ra, 1e-6).overlaps(&shrink(rb, 1e-6)),
                    "{} overlaps {}", tree[a].name, tree[b].name);
            }
            for &n in ids.iter().filter(|&&n| !tree[n].is_leaf()) {
                if is_ancestor(&tree, n, a) {
                    continue;
                }
                let rn = world_rect(&tree, n);
                prop_assert!(!shrink(ra, 1e-6).overlaps(&shrink(rn, 1e-6)),
                    "{} overlaps {}", tree[a].name, tree[n].name);
            }
        }
    }
}
