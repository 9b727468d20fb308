// Copyright 2025 the Hypertree Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hypertree Filter: decides, every update cycle, which nodes are drawn.
//!
//! Rendering cost is kept roughly constant regardless of tree size. Each
//! cycle [`MagicFilter::update`] rebuilds a [`VisibilityCache`] from scratch:
//!
//! 1. find the center node (closest to the disk center) and the highway, the
//!    chain of its ancestors still inside the culling radius;
//! 2. derive a weight threshold from the highway's weight and the adaptive
//!    `magic` scalar;
//! 3. admit nodes depth-first from the top of the highway while they are
//!    inside the culling and focus radii and heavy enough, recording
//!    [`VisFlags`](hypertree_tree::VisFlags) on each visited node;
//! 4. force-include the ancestors of every active highlight path;
//! 5. derive links, leaf-or-lazy nodes and path links;
//! 6. thin labels down to a cap;
//! 7. rebuild the nearest-node [`Tessellation`] for hit testing.
//!
//! After the cycle `magic` is nudged up or down by `alpha` so the number of
//! admitted nodes drifts into the configured target band.
//!
//! ```
//! use hypertree_filter::{FilterConfig, MagicFilter, leaf_or_lazy};
//! use hypertree_math::{HyperbolicTransform, TransformState};
//! use hypertree_tree::{Generation, SourceNode, Tree};
//!
//! let source = SourceNode::with_children((), vec![SourceNode::leaf(()), SourceNode::leaf(())]);
//! let mut tree = Tree::from_source(source, Generation(1));
//! tree.compute_precalc();
//! // Children left at the origin by a missing layout still work; they are
//! // simply drawn on top of the root.
//! let transform = HyperbolicTransform::new(TransformState::default());
//!
//! let mut filter = MagicFilter::new(FilterConfig::default());
//! let cache = filter.update(&mut tree, &transform, 0.1, &[], &[], leaf_or_lazy);
//! assert_eq!(cache.center, tree.root());
//! assert_eq!(cache.unculled.len(), 3);
//! ```

mod labels;
mod magic;
mod tessellation;

pub use labels::thin_labels;
pub use magic::{MagicFilter, VisibilityCache, leaf_or_lazy};
pub use tessellation::Tessellation;

/// Filter parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FilterConfig {
    /// Disk radius beyond which nodes are never drawn.
    pub culling_radius: f64,
    /// Focus radius in units of λ.
    pub focus_extension: f64,
    /// Upper bound of the focus radius.
    pub max_focus_radius: f64,
    /// Controller gain: `magic` is multiplied or divided by this each cycle.
    pub alpha: f64,
    /// Lower end of the target visible-node band.
    pub target_min: usize,
    /// Upper end of the target visible-node band.
    pub target_max: usize,
    /// Starting value of `magic`.
    pub magic_initial: f64,
    /// Highway weight divided by this is the threshold at `magic == 1`.
    pub weight_resolution: f64,
    /// Most labels shown at once.
    pub max_labels: usize,
    /// Initial damping of the per-node label weight.
    pub label_damping_start: f64,
    /// Damping is divided by this every thinning pass.
    pub label_relax: f64,
    /// Weight boost for labels of the center's children.
    pub center_label_boost: f64,
    /// Largest distance between a pointer and the node it hits.
    pub hit_radius: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            culling_radius: 0.99,
            focus_extension: 6.0,
            max_focus_radius: 0.98,
            alpha: 1.05,
            target_min: 500,
            target_max: 1000,
            magic_initial: 1.0,
            weight_resolution: 160.0,
            max_labels: 40,
            label_damping_start: 1.0,
            label_relax: 0.8,
            center_label_boost: 4.0,
            hit_radius: 0.2,
        }
    }
}

impl FilterConfig {
    /// `min(λ · focus_extension, max_focus_radius)`.
    pub fn focus_radius(&self, lambda: f64) -> f64 {
        (lambda * self.focus_extension).min(self.max_focus_radius)
    }
}
