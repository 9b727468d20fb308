// Copyright 2025 the Hypertree Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The wedge layout and the anchor correction used while zooming.

use core::f64::consts::TAU;

use hypertree_math::{Complex, Mobius, Wedge, compose, max_r, normalize_angle, shift};
use hypertree_tree::{NodeId, NodeLayout, Tree};

use crate::{LayoutConfig, LayoutMode, LayoutWeightSource};

/// Lay out the children of `start` (and, recursively, their subtrees).
///
/// When `start` is the root it is first reset to the origin with the root
/// wedge. Any other start node keeps its current position and wedge.
/// Returns the number of nodes whose layout was written.
pub fn layout_berge<D>(
    tree: &mut Tree<D>,
    start: NodeId,
    lambda: f64,
    config: &LayoutConfig,
    mode: LayoutMode,
) -> usize {
    if !tree.contains(start) {
        return 0;
    }
    let mut placed = 0;
    if tree.parent_of(start).is_none() {
        place_root(tree, start, config);
        placed += 1;
    }
    let mut stack = vec![start];
    while let Some(id) = stack.pop() {
        let children = layout_children(tree, id, lambda, config);
        placed += children.len();
        if mode == LayoutMode::Recursive {
            stack.extend(children.into_iter().filter(|&c| !tree.is_leaf(c)));
        }
    }
    log::trace!("layout placed {placed} nodes at lambda {lambda}");
    placed
}

/// Refresh the layout along the chain from the root to `to`.
///
/// Each ancestor gets a single-level pass, so `to`, its ancestors and their
/// siblings end up where a full layout at `lambda` would put them. Nodes
/// below `to` and off the chain are left untouched.
pub fn layout_path<D>(tree: &mut Tree<D>, to: NodeId, lambda: f64, config: &LayoutConfig) {
    let chain = tree.path_from_root(to);
    let Some((&root, _)) = chain.split_first() else {
        return;
    };
    place_root(tree, root, config);
    for &id in &chain[..chain.len() - 1] {
        layout_children(tree, id, lambda, config);
    }
}

/// Express `wedge`, seen from `from`, as seen from `to`.
///
/// Both points are in the same frame, and "seen from `p`" means measured
/// in the frame where the pure translation to `p` has been undone. The
/// wedge's end points are ideal points on the rim; they are carried by
/// `T(to)⁻¹ ∘ T(from)`. A full wedge stays full.
pub fn wedge_translate(wedge: Wedge, from: Complex, to: Complex) -> Wedge {
    let m = compose(&Mobius::translation(to).inverse(), &Mobius::translation(from));
    let a = m.apply(Complex::from_angle(wedge.alpha));
    if wedge.is_full() {
        return Wedge::new(a.arg(), TAU);
    }
    let o = m.apply(Complex::from_angle(wedge.omega));
    let width = normalize_angle(o.arg() - a.arg());
    Wedge::new(a.arg(), width)
}

/// The transformation that keeps an anchor visually fixed after a relayout.
///
/// `old_disk` is where the anchor was drawn before, `new_z` its model
/// position after the relayout. The result equals `t` followed by the pan
/// bringing `t(new_z)` back to `old_disk`.
pub fn preserve_anchor(t: &Mobius, old_disk: Complex, new_z: Complex) -> Mobius {
    shift(t, t.apply(new_z), old_disk)
}

fn place_root<D>(tree: &mut Tree<D>, root: NodeId, config: &LayoutConfig) {
    if let Some(layout) = tree.layout_mut(root) {
        *layout = NodeLayout {
            wedge: config.root_wedge(),
            z: Complex::ZERO,
        };
    }
}

/// Split the wedge of `id` among its children and place them.
///
/// Returns the children that were placed.
fn layout_children<D>(
    tree: &mut Tree<D>,
    id: NodeId,
    lambda: f64,
    config: &LayoutConfig,
) -> Vec<NodeId> {
    let children = tree.children_of(id).to_vec();
    let Some(&NodeLayout { wedge, z: parent_z }) = tree.layout(id) else {
        return Vec::new();
    };
    if children.is_empty() {
        return children;
    }

    let weights: Vec<f64> = children
        .iter()
        .map(|&c| child_weight(tree, c, config.weight_source))
        .collect();
    let total: f64 = weights.iter().sum();
    #[allow(clippy::cast_precision_loss, reason = "child counts are small")]
    let count = children.len() as f64;
    let capacity = row_capacity(count);
    let offset = if tree.parent_of(id).is_none() {
        config.root_child_offset
    } else {
        config.base_offset
    };
    let to_parent = Mobius::translation(parent_z);

    let mut cursor = wedge.alpha;
    let mut row = 0_u32;
    let mut on_row = 0_u32;
    for (&child, &w) in children.iter().zip(&weights) {
        if f64::from(on_row) > capacity {
            row += 1;
            on_row = 0;
        }
        let share = if total > 0.0 {
            wedge.width() * w / total
        } else {
            wedge.width() / count
        };
        let local_wedge = Wedge {
            alpha: cursor,
            omega: cursor + share,
        };
        cursor += share;
        on_row += 1;

        let step = (lambda * (offset + f64::from(row) * config.row_offset))
            .clamp(0.0, config.max_step);
        let local = Complex::from_polar(step, local_wedge.bisector());
        let z = max_r(to_parent.apply(local), config.max_radius);
        // The parent's wedge is read in the frame T(parent_z); re-express
        // the share in the frame T(z) the child's own children will use.
        let child_wedge = wedge_translate(local_wedge, parent_z, z);
        if let Some(layout) = tree.layout_mut(child) {
            *layout = NodeLayout {
                wedge: child_wedge,
                z,
            };
        }
    }
    children
}

fn child_weight<D>(tree: &Tree<D>, id: NodeId, source: LayoutWeightSource) -> f64 {
    tree.precalc(id).map_or(0.0, |p| match source {
        LayoutWeightSource::Leaves => p.layout_weight,
        LayoutWeightSource::Labels => p.vis_weight,
    })
}

/// How many children fit on one row before the next row steps outward.
fn row_capacity(count: f64) -> f64 {
    let ln = count.ln();
    if ln > 0.0 {
        count / ln / 2.0
    } else {
        f64::INFINITY
    }
}

#[cfg(test)]
mod tests {
    use core::f64::consts::{PI, TAU};

    use hypertree_math::{Complex, Mobius, Wedge, compose, normalize_angle};
    use hypertree_tree::{Generation, NodeId, SourceNode, Tree};

    use super::{layout_berge, layout_path, preserve_anchor, wedge_translate};
    use crate::{LayoutConfig, LayoutMode};

    fn binary(depth: u32) -> SourceNode<()> {
        if depth == 0 {
            return SourceNode::leaf(());
        }
        SourceNode::with_children((), vec![binary(depth - 1), binary(depth - 1)])
    }

    fn fan(n: usize) -> SourceNode<()> {
        SourceNode::with_children((), (0..n).map(|_| SourceNode::leaf(())).collect())
    }

    fn laid_out(source: SourceNode<()>, lambda: f64) -> (Tree<()>, NodeId) {
        let mut tree = Tree::from_source(source, Generation(1));
        tree.compute_precalc();
        let root = tree.root().unwrap();
        layout_berge(
            &mut tree,
            root,
            lambda,
            &LayoutConfig::default(),
            LayoutMode::Recursive,
        );
        (tree, root)
    }

    fn close(a: Complex, b: Complex) -> bool {
        a.distance(b) < 1e-9
    }

    #[test]
    fn every_node_stays_inside_the_disk() {
        for lambda in [0.05, 0.3, 0.74, 0.95] {
            let (tree, _) = laid_out(binary(9), lambda);
            for id in tree.ids() {
                let z = tree.layout(id).unwrap().z;
                assert!(z.is_finite(), "non-finite z at lambda {lambda}");
                assert!(z.norm() < 1.0, "|z| = {} at lambda {lambda}", z.norm());
            }
        }
    }

    #[test]
    fn root_shares_are_proportional_to_leaf_weight() {
        let source = SourceNode::with_children(
            (),
            vec![
                SourceNode::leaf(()),
                SourceNode::with_children((), vec![binary(0), binary(0), binary(0)]),
            ],
        );
        let (tree, root) = laid_out(source, 0.2);
        let kids = tree.children_of(root);
        // Weights 1 and 3 of 4: bisectors at π/4 and π/2 + 3π/4.
        let a0 = tree.layout(kids[0]).unwrap().z.arg();
        let a1 = tree.layout(kids[1]).unwrap().z.arg();
        assert!((a0 - PI / 4.0).abs() < 1e-9);
        assert!((a1 - 5.0 * PI / 4.0).abs() < 1e-9);
    }

    #[test]
    fn children_sit_one_step_from_their_parent() {
        let lambda = 0.3;
        let config = LayoutConfig::default();
        let (tree, root) = laid_out(binary(3), lambda);
        let child = tree.children_of(root)[0];
        let z_child = tree.layout(child).unwrap().z;
        assert!((z_child.norm() - lambda * config.root_child_offset).abs() < 1e-9);

        let grandchild = tree.children_of(child)[1];
        let local = Mobius::translation(z_child)
            .inverse()
            .apply(tree.layout(grandchild).unwrap().z);
        assert!((local.norm() - lambda * config.base_offset).abs() < 1e-9);
    }

    #[test]
    fn child_wedges_widen_away_from_the_parent() {
        let (tree, root) = laid_out(binary(4), 0.4);
        let child = tree.children_of(root)[0];
        let wedge = tree.layout(child).unwrap().wedge;
        assert!(wedge.width() > PI, "seen from the child its half looks wider");
        assert!(wedge.width() < TAU);
    }

    /// Start and width of the rim arc a node's wedge covers, in the disk frame.
    fn rim_arc(tree: &Tree<()>, id: NodeId) -> (f64, f64) {
        let layout = tree.layout(id).unwrap();
        let frame = Mobius::translation(layout.z);
        let a = frame.apply(Complex::from_angle(layout.wedge.alpha)).arg();
        if layout.wedge.is_full() {
            return (a, TAU);
        }
        let o = frame.apply(Complex::from_angle(layout.wedge.omega)).arg();
        (a, normalize_angle(o - a))
    }

    #[test]
    fn child_arcs_nest_inside_their_parent_arc() {
        for lambda in [0.2, 0.4] {
            let (tree, root) = laid_out(binary(8), lambda);
            for id in tree.ids().filter(|&id| id != root) {
                let parent = tree.parent_of(id).unwrap();
                let (pa, pw) = rim_arc(&tree, parent);
                let (ca, cw) = rim_arc(&tree, id);
                let mut offset = normalize_angle(ca - pa);
                if offset > TAU - 1e-6 {
                    offset -= TAU;
                }
                assert!(
                    offset > -1e-6 && offset + cw < pw + 1e-6,
                    "lambda {lambda}: arc of {id:?} at depth {:?} leaves its parent's",
                    tree.depth(id)
                );
            }
        }
    }

    #[test]
    fn subtrees_stay_inside_their_half_of_the_disk() {
        for lambda in [0.2, 0.4] {
            let (tree, root) = laid_out(binary(8), lambda);
            // Equal weights: the first child owns the upper half, the second the lower.
            let [upper, lower] = tree.children_of(root) else {
                panic!("binary root");
            };
            for id in tree.iter_depth_first(*upper) {
                let z = tree.layout(id).unwrap().z;
                assert!(
                    z.im > -1e-9,
                    "lambda {lambda}: {id:?} at depth {:?} in the lower half",
                    tree.depth(id)
                );
            }
            for id in tree.iter_depth_first(*lower) {
                let z = tree.layout(id).unwrap().z;
                assert!(
                    z.im < 1e-9,
                    "lambda {lambda}: {id:?} at depth {:?} in the upper half",
                    tree.depth(id)
                );
            }
        }
    }

    #[test]
    fn bushy_nodes_pack_children_into_rows() {
        let (tree, root) = laid_out(fan(40), 0.2);
        let kids = tree.children_of(root);
        let first = tree.layout(kids[0]).unwrap().z.norm();
        let last = tree.layout(kids[kids.len() - 1]).unwrap().z.norm();
        assert!(last > first, "later rows step outward");
        let rows: Vec<f64> = kids
            .iter()
            .map(|&k| tree.layout(k).unwrap().z.norm())
            .collect();
        assert!(rows.windows(2).all(|w| w[1] >= w[0] - 1e-12));
    }

    #[test]
    fn single_level_leaves_grandchildren_alone() {
        let mut tree = Tree::from_source(binary(3), Generation(1));
        tree.compute_precalc();
        let root = tree.root().unwrap();
        let placed = layout_berge(
            &mut tree,
            root,
            0.3,
            &LayoutConfig::default(),
            LayoutMode::SingleLevel,
        );
        assert_eq!(placed, 3);
        let child = tree.children_of(root)[0];
        let grandchild = tree.children_of(child)[0];
        assert_eq!(tree.layout(grandchild).unwrap().z, Complex::ZERO);
    }

    #[test]
    fn path_layout_matches_full_layout() {
        let config = LayoutConfig::default();
        let (mut tree, root) = laid_out(binary(5), 0.2);
        let deep = tree.iter_depth_first(root).find(|&id| tree.is_leaf(id)).unwrap();
        layout_path(&mut tree, deep, 0.6, &config);
        let via_path = tree.layout(deep).unwrap().z;

        let (full, _) = laid_out(binary(5), 0.6);
        assert!(close(via_path, full.layout(deep).unwrap().z));
    }

    #[test]
    fn anchor_stays_where_it_was_drawn() {
        let t = Mobius::new(Complex::new(0.3, -0.2), Complex::from_angle(0.7));
        let old_disk = t.apply(Complex::new(0.1, 0.4));
        let new_z = Complex::new(-0.25, 0.5);
        let fixed = preserve_anchor(&t, old_disk, new_z);
        assert!(close(fixed.apply(new_z), old_disk));
    }

    #[test]
    fn wedge_translation_is_consistent() {
        let w = Wedge::new(0.3, 1.2);
        assert!((wedge_translate(w, Complex::ZERO, Complex::ZERO).width() - 1.2).abs() < 1e-9);
        assert!(wedge_translate(Wedge::FULL, Complex::ZERO, Complex::new(0.5, 0.1)).is_full());

        // Moving out and back gives the original wedge.
        let p = Complex::new(0.2, 0.3);
        let there = wedge_translate(w, Complex::ZERO, p);
        let back = wedge_translate(there, p, Complex::ZERO);
        assert!((back.alpha - w.alpha).abs() < 1e-9);
        assert!((back.width() - w.width()).abs() < 1e-9);

        // Ideal points are fixed up to the frame change.
        let m = compose(&Mobius::translation(p).inverse(), &Mobius::IDENTITY);
        assert!(close(
            m.apply(Complex::from_angle(w.alpha)),
            Complex::from_angle(there.alpha)
        ));
    }

    #[test]
    fn unknown_start_places_nothing() {
        let (mut other, _) = laid_out(binary(1), 0.2);
        let stranger = Tree::<()>::from_source(binary(2), Generation(9));
        let foreign = stranger.root().unwrap();
        let placed = layout_berge(
            &mut other,
            foreign,
            0.3,
            &LayoutConfig::default(),
            LayoutMode::Recursive,
        );
        assert_eq!(placed, 0);
    }
}
