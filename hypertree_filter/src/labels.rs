// Copyright 2025 the Hypertree Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Label thinning.

use hypertree_tree::{NodeId, Tree};

use crate::{FilterConfig, VisibilityCache};

/// Passes before falling back to keeping the heaviest labels.
const MAX_PASSES: usize = 64;

/// Pick the labels to draw this cycle, at most `config.max_labels` of them.
///
/// Candidates are unculled nodes with a label that are either children of
/// the root or not an ancestor of the center (their subtree is not zoomed
/// past yet). Each pass drops labels whose weight (boosted for children of
/// the center) is below their per-node minimum times a damping factor; the
/// damping is relaxed by `label_relax` after every pass. Nodes in `hover`
/// are never dropped by a pass.
///
/// The cap always holds: labels still above it after the last pass are cut
/// by weight, hover nodes first.
pub fn thin_labels<D>(
    tree: &Tree<D>,
    cache: &VisibilityCache,
    config: &FilterConfig,
    hover: &[NodeId],
) -> Vec<NodeId> {
    let center = cache.center;
    let zoomed_past = |id: NodeId| {
        center.is_some_and(|c| c != id && tree.is_ancestor_or_self(id, c))
    };
    let weight_of = |id: NodeId| {
        let w = tree.precalc(id).map_or(0.0, |p| p.culling_weight);
        if center.is_some() && tree.parent_of(id) == center {
            w * config.center_label_boost
        } else {
            w
        }
    };

    let mut labels: Vec<NodeId> = cache
        .unculled
        .iter()
        .copied()
        .filter(|&id| tree.precalc(id).is_some_and(|p| p.label.is_some()))
        .filter(|&id| tree.depth(id) == Some(1) || !zoomed_past(id))
        .collect();

    let mut damping = config.label_damping_start;
    let mut passes = 0;
    while labels.len() > config.max_labels && passes < MAX_PASSES {
        labels.retain(|&id| {
            let min = tree.cache(id).map_or(0.0, |c| c.label_min_weight);
            hover.contains(&id) || weight_of(id) >= min * damping
        });
        if config.label_relax > 0.0 {
            damping /= config.label_relax;
        }
        passes += 1;
    }

    if labels.len() > config.max_labels {
        log::trace!(
            "label thinning stopped after {passes} passes with {} labels",
            labels.len()
        );
        labels.sort_by(|&a, &b| {
            hover
                .contains(&b)
                .cmp(&hover.contains(&a))
                .then_with(|| weight_of(b).total_cmp(&weight_of(a)))
        });
        labels.truncate(config.max_labels);
    }
    labels
}

#[cfg(test)]
mod tests {
    use hashbrown::HashMap;
    use hypertree_layout::{LayoutConfig, LayoutMode, layout_berge};
    use hypertree_math::{HyperbolicTransform, TransformState};
    use hypertree_tree::{Generation, SourceNode, Tree};

    use crate::{FilterConfig, MagicFilter, leaf_or_lazy};

    fn labelled_fan(leaves: usize) -> Tree<String> {
        let source = SourceNode::with_children(
            "root".to_owned(),
            (0..leaves)
                .map(|i| SourceNode::leaf(format!("leaf {i}")))
                .collect(),
        );
        let names: HashMap<String, String> = (0..leaves)
            .map(|i| (format!("leaf {i}"), format!("Leaf number {i}")))
            .chain([("root".to_owned(), "Root".to_owned())])
            .collect();
        let mut tree = Tree::from_source(source, Generation(1));
        tree.apply_labels(|key| names.get(key).map(String::as_str));
        tree.compute_precalc();
        let root = tree.root().unwrap();
        layout_berge(
            &mut tree,
            root,
            0.3,
            &LayoutConfig::default(),
            LayoutMode::Recursive,
        );
        tree
    }

    #[test]
    fn label_count_respects_the_cap() {
        for cap in [0, 1, 5, 20] {
            let mut tree = labelled_fan(120);
            let config = FilterConfig {
                max_labels: cap,
                ..FilterConfig::default()
            };
            let mut filter = MagicFilter::new(config);
            let transform = HyperbolicTransform::new(TransformState::default());
            let cache = filter.update(&mut tree, &transform, 0.3, &[], &[], leaf_or_lazy);
            assert!(cache.unculled.len() > cap);
            assert!(cache.labels.len() <= cap, "{} labels for cap {cap}", cache.labels.len());
        }
    }

    #[test]
    fn hover_labels_survive_thinning() {
        let mut tree = labelled_fan(80);
        let root = tree.root().unwrap();
        let hovered = tree.children_of(root)[17];
        let config = FilterConfig {
            max_labels: 3,
            ..FilterConfig::default()
        };
        let mut filter = MagicFilter::new(config);
        let transform = HyperbolicTransform::new(TransformState::default());
        let cache = filter.update(&mut tree, &transform, 0.3, &[], &[hovered], leaf_or_lazy);
        assert!(cache.labels.contains(&hovered));
        assert!(cache.labels.len() <= 3);
    }

    #[test]
    fn small_sets_keep_every_label() {
        let mut tree = labelled_fan(4);
        let mut filter = MagicFilter::new(FilterConfig::default());
        let transform = HyperbolicTransform::new(TransformState::default());
        let cache = filter.update(&mut tree, &transform, 0.3, &[], &[], leaf_or_lazy);
        assert_eq!(cache.labels.len(), 5, "root and four leaves");
    }
}
