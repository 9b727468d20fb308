// Copyright 2025 the Hypertree Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bottom-up aggregates, labels and text matching.

use crate::tree::Tree;
use crate::types::{NodeId, NodePayload};

impl<D: NodePayload> Tree<D> {
    /// Compute `layout_weight`, `culling_weight`, `vis_weight` and `weight_scale`.
    ///
    /// Leaves contribute their [`NodePayload::leaf_weight`] (label length for
    /// `vis_weight`, at least 1), internal nodes contribute nothing of their
    /// own. Labels should be applied first so `vis_weight` sees them.
    pub fn compute_precalc(&mut self) {
        for p in &mut self.precalc {
            p.layout_weight = 0.0;
            p.culling_weight = 0.0;
            p.vis_weight = 0.0;
        }
        // Children always follow their parent in the arena.
        for i in (0..self.nodes.len()).rev() {
            if self.nodes[i].children.is_empty() {
                let w = self.nodes[i].data.leaf_weight().max(0.0);
                #[allow(clippy::cast_precision_loss, reason = "label lengths are small")]
                let label_weight = self.precalc[i].label_len.max(1) as f64;
                let p = &mut self.precalc[i];
                p.layout_weight = w;
                p.culling_weight = w;
                p.vis_weight = label_weight;
            }
            if let Some(parent) = self.nodes[i].parent {
                let (layout, culling, vis) = {
                    let p = &self.precalc[i];
                    (p.layout_weight, p.culling_weight, p.vis_weight)
                };
                let pp = &mut self.precalc[parent.index()];
                pp.layout_weight += layout;
                pp.culling_weight += culling;
                pp.vis_weight += vis;
            }
        }
        let root_weight = self.precalc.first().map_or(0.0, |p| p.culling_weight);
        let denom = (1.0 + root_weight).ln();
        for p in &mut self.precalc {
            p.weight_scale = if denom > 0.0 {
                ((1.0 + p.culling_weight).ln() / denom).clamp(0.0, 1.0)
            } else {
                0.0
            };
        }
    }

    /// Assign display labels from a lookup keyed by [`NodePayload::label_key`].
    ///
    /// Returns the number of nodes that received a label.
    pub fn apply_labels<'a>(&mut self, mut lookup: impl FnMut(&str) -> Option<&'a str>) -> usize {
        let mut assigned = 0;
        for i in 0..self.nodes.len() {
            let label = self.nodes[i]
                .data
                .label_key()
                .and_then(&mut lookup)
                .map(str::to_owned);
            let p = &mut self.precalc[i];
            p.label_len = label.as_ref().map_or(0, |l| l.chars().count());
            assigned += usize::from(label.is_some());
            p.label = label;
        }
        assigned
    }

    /// Display label of a node.
    pub fn label(&self, id: NodeId) -> Option<&str> {
        self.precalc(id).and_then(|p| p.label.as_deref())
    }

    /// Whether the label or search text contains `needle`, case-insensitively.
    pub fn matches_text(&self, id: NodeId, needle: &str) -> bool {
        if needle.is_empty() {
            return false;
        }
        let needle = needle.to_lowercase();
        let hit = |s: &str| s.to_lowercase().contains(&needle);
        self.label(id).is_some_and(hit)
            || self
                .data(id)
                .and_then(|d| d.search_text())
                .is_some_and(hit)
    }
}

#[cfg(test)]
mod tests {
    use crate::{Generation, SourceNode, Tree};

    fn binary(depth: u32) -> SourceNode<String> {
        fn build(prefix: &str, depth: u32) -> SourceNode<String> {
            if depth == 0 {
                return SourceNode::leaf(prefix.to_owned());
            }
            SourceNode::with_children(
                prefix.to_owned(),
                vec![
                    build(&format!("{prefix}0"), depth - 1),
                    build(&format!("{prefix}1"), depth - 1),
                ],
            )
        }
        build("n", depth)
    }

    #[test]
    fn root_culling_weight_counts_leaves() {
        let mut tree = Tree::from_source(binary(4), Generation(1));
        tree.compute_precalc();
        let root = tree.root().unwrap();
        let leaves = tree.ids().filter(|&id| tree.is_leaf(id)).count();
        assert_eq!(leaves, 16);
        #[allow(clippy::cast_precision_loss, reason = "small test count")]
        let expected = leaves as f64;
        assert_eq!(tree.precalc(root).unwrap().culling_weight, expected);
        assert_eq!(tree.precalc(root).unwrap().layout_weight, expected);
        assert_eq!(tree.precalc(root).unwrap().weight_scale, 1.0);
    }

    #[test]
    fn weight_scale_decreases_with_subtree_size() {
        let mut tree = Tree::from_source(binary(3), Generation(1));
        tree.compute_precalc();
        let root = tree.root().unwrap();
        let child = tree.children_of(root)[0];
        let leaf = tree
            .iter_depth_first(root)
            .find(|&id| tree.is_leaf(id))
            .unwrap();
        let s_child = tree.precalc(child).unwrap().weight_scale;
        let s_leaf = tree.precalc(leaf).unwrap().weight_scale;
        assert!(s_child < 1.0 && s_child > 0.0);
        assert!(s_leaf <= s_child);
    }

    #[test]
    fn labels_feed_vis_weight_and_queries() {
        let mut tree = Tree::from_source(binary(1), Generation(1));
        let assigned = tree.apply_labels(|key| match key {
            "n0" => Some("Alpha"),
            "n1" => Some("Beta Gamma"),
            _ => None,
        });
        assert_eq!(assigned, 2);
        tree.compute_precalc();
        let root = tree.root().unwrap();
        assert_eq!(tree.precalc(root).unwrap().vis_weight, 15.0, "5 + 10 characters");
        let n1 = tree.children_of(root)[1];
        assert_eq!(tree.label(n1), Some("Beta Gamma"));
        assert!(tree.matches_text(n1, "gamma"));
        assert!(tree.matches_text(root, "n"), "payload text is searched too");
        assert!(!tree.matches_text(n1, ""));
    }
}
