// Copyright 2025 the Hypertree Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The adaptive visibility pass.

use core::fmt::Write as _;

use hashbrown::HashSet;
use hypertree_math::{Complex, Transformation};
use hypertree_tree::{NodeCache, NodeId, Tree, VisFlags};

use crate::{FilterConfig, Tessellation, thin_labels};

/// Everything the paint layers and the hit test read for one frame.
///
/// Rebuilt from scratch by every [`MagicFilter::update`].
#[derive(Clone, Debug, Default)]
pub struct VisibilityCache {
    /// Node closest to the disk center.
    pub center: Option<NodeId>,
    /// Ancestors of the center inside the culling radius, top first, ending
    /// with the center.
    pub highway: Vec<NodeId>,
    /// Admitted nodes in depth-first order, followed by force-included path
    /// ancestors.
    pub unculled: Vec<NodeId>,
    /// Unculled nodes except the center; each is drawn with an edge to its parent.
    pub links: Vec<NodeId>,
    /// Unculled nodes that get a drawn circle.
    pub leaf_or_lazy: Vec<NodeId>,
    /// Links that belong to at least one highlight path.
    pub path_links: Vec<NodeId>,
    /// Nodes whose label survived thinning.
    pub labels: Vec<NodeId>,
    /// Nearest-node lookup over the clickable unculled nodes: circles,
    /// labels and the center.
    pub tessellation: Tessellation,
    /// Weight a node needed this cycle to be admitted.
    pub min_weight: f64,
    /// Focus radius used this cycle.
    pub focus_radius: f64,
    /// Update cycle that produced this cache.
    pub cycle: u64,
    members: HashSet<NodeId>,
}

impl VisibilityCache {
    /// Whether `id` is in the unculled set.
    pub fn contains(&self, id: NodeId) -> bool {
        self.members.contains(&id)
    }

    /// Whether nothing is visible.
    pub fn is_empty(&self) -> bool {
        self.unculled.is_empty()
    }

    fn admit(&mut self, id: NodeId) -> bool {
        if self.members.insert(id) {
            self.unculled.push(id);
            true
        } else {
            false
        }
    }
}

/// Default leaf-or-lazy predicate: leaves and nodes with culled children.
pub fn leaf_or_lazy<D>(tree: &Tree<D>, id: NodeId) -> bool {
    tree.is_leaf(id)
        || tree
            .cache(id)
            .is_some_and(|c| c.flags.contains(VisFlags::HAS_OUT_CHILDREN))
}

/// Holds the adaptive `magic` scalar and the last [`VisibilityCache`].
#[derive(Clone, Debug)]
pub struct MagicFilter {
    config: FilterConfig,
    magic: f64,
    cycle: u64,
    cache: VisibilityCache,
}

impl MagicFilter {
    /// Bounds that keep `magic` from collapsing or overflowing.
    const MAGIC_RANGE: (f64, f64) = (1e-6, 1e9);

    /// Create a filter with `magic` at its configured starting value.
    pub fn new(config: FilterConfig) -> Self {
        let magic = config.magic_initial;
        Self {
            config,
            magic,
            cycle: 0,
            cache: VisibilityCache::default(),
        }
    }

    /// The configuration.
    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Replace the configuration, keeping `magic`.
    pub fn set_config(&mut self, config: FilterConfig) {
        self.config = config;
    }

    /// Current `magic` value.
    pub fn magic(&self) -> f64 {
        self.magic
    }

    /// Override `magic`; clamped to a positive range.
    pub fn set_magic(&mut self, magic: f64) {
        let (lo, hi) = Self::MAGIC_RANGE;
        self.magic = if magic.is_finite() { magic.clamp(lo, hi) } else { 1.0 };
    }

    /// The cache built by the last update.
    pub fn cache(&self) -> &VisibilityCache {
        &self.cache
    }

    /// Forget the cache and restart `magic`, e.g. after a new dataset.
    pub fn reset(&mut self) {
        self.cache = VisibilityCache::default();
        self.magic = self.config.magic_initial;
    }

    /// Run one update cycle and nudge `magic` toward the target band.
    ///
    /// `path_heads` are the heads of active highlight paths, whose ancestor
    /// chains are always included. `hover` nodes keep their labels through
    /// thinning. `is_leaf_or_lazy` picks the nodes that get a drawn circle;
    /// [`leaf_or_lazy`] is the usual choice.
    pub fn update<D, T: Transformation + ?Sized>(
        &mut self,
        tree: &mut Tree<D>,
        transform: &T,
        lambda: f64,
        path_heads: &[NodeId],
        hover: &[NodeId],
        mut is_leaf_or_lazy: impl FnMut(&Tree<D>, NodeId) -> bool,
    ) -> &VisibilityCache {
        self.cycle += 1;
        let mut cache = VisibilityCache {
            cycle: self.cycle,
            focus_radius: self.config.focus_radius(lambda),
            ..VisibilityCache::default()
        };

        // Flags of the previous cycle must not leak into nodes left unvisited.
        for &id in &self.cache.unculled {
            if let Some(c) = tree.cache_mut(id) {
                c.flags -= VisFlags::UNCULLED
                    | VisFlags::HAS_OUT_CHILDREN
                    | VisFlags::HAS_OUT_99_CHILDREN
                    | VisFlags::HAS_OUT_WEIGHT_CHILDREN;
            }
        }

        let Some(center) = find_center(tree, transform) else {
            self.cache = cache;
            return &self.cache;
        };

        // 1. Center and highway.
        cache.highway = highway(tree, transform, center, self.config.culling_radius);
        cache.center = Some(center);

        // 2. Threshold.
        let top = cache.highway.first().copied().unwrap_or(center);
        let highway_weight = tree.precalc(top).map_or(0.0, |p| p.culling_weight);
        cache.min_weight = self.magic * highway_weight / self.config.weight_resolution;

        // 3. Admission.
        self.admit_depth_first(tree, transform, &mut cache, top);
        // The top's edge leads to a parent outside the admitted set.
        if let Some(parent) = tree.parent_of(top) {
            self.write_node_cache(tree, transform, &cache, parent);
        }

        // 4. Path preservation.
        let mut forced = Vec::new();
        for &head in path_heads {
            let chain: Vec<NodeId> = tree
                .ancestors(head)
                .take_while(|&id| !cache.contains(id))
                .collect();
            for id in chain.into_iter().rev() {
                self.write_node_cache(tree, transform, &cache, id);
                if let Some(c) = tree.cache_mut(id) {
                    c.flags.insert(VisFlags::UNCULLED);
                }
                cache.admit(id);
                forced.push(id);
            }
        }
        // Their other children were never visited, so they are out.
        for &id in &forced {
            let culled = tree.children_of(id).iter().any(|&c| !cache.contains(c));
            if culled && let Some(c) = tree.cache_mut(id) {
                c.flags.insert(VisFlags::HAS_OUT_CHILDREN);
            }
        }

        // 5. Derived sets.
        cache.links = cache
            .unculled
            .iter()
            .copied()
            .filter(|&id| id != center)
            .collect();
        cache.leaf_or_lazy = cache
            .unculled
            .iter()
            .copied()
            .filter(|&id| is_leaf_or_lazy(tree, id))
            .collect();
        cache.path_links = cache
            .links
            .iter()
            .copied()
            .filter(|&id| !tree.paths_of(id).is_empty())
            .collect();

        // 6. Labels.
        cache.labels = thin_labels(tree, &cache, &self.config, hover);

        // 7. Hit test.
        let clickable = clickable_sites(&cache, center);
        cache.tessellation = Tessellation::build(
            clickable
                .into_iter()
                .filter_map(|id| tree.cache(id).map(|c| (id, c.z))),
        );

        let visible = cache.unculled.len();
        log::trace!(
            "filter cycle {}: {visible} unculled, {} labels, magic {:.4}",
            self.cycle,
            cache.labels.len(),
            self.magic
        );
        self.cache = cache;
        self.adapt_magic(visible);
        &self.cache
    }

    /// One step of the integral controller.
    ///
    /// Too many visible nodes raise `magic` (a higher threshold), too few
    /// lower it; inside the band it is left alone.
    pub fn adapt_magic(&mut self, visible: usize) {
        let before = self.magic;
        if visible > self.config.target_max {
            self.set_magic(self.magic * self.config.alpha);
        } else if visible < self.config.target_min {
            self.set_magic(self.magic / self.config.alpha);
        }
        if before != self.magic {
            log::trace!("magic {before:.4} -> {:.4} ({visible} visible)", self.magic);
        }
    }

    fn admit_depth_first<D, T: Transformation + ?Sized>(
        &self,
        tree: &mut Tree<D>,
        transform: &T,
        cache: &mut VisibilityCache,
        top: NodeId,
    ) {
        let forced: HashSet<NodeId> = cache.highway.iter().copied().collect();
        let mut stack = vec![top];
        while let Some(id) = stack.pop() {
            let flags = self.write_node_cache(tree, transform, cache, id);
            let admitted = forced.contains(&id) || !flags.contains(VisFlags::OUT);
            if let Some(parent) = tree.parent_of(id)
                && cache.contains(parent)
                && let Some(pc) = tree.cache_mut(parent)
            {
                if flags.contains(VisFlags::OUT) {
                    pc.flags.insert(VisFlags::HAS_OUT_CHILDREN);
                }
                if flags.contains(VisFlags::OUT_99) {
                    pc.flags.insert(VisFlags::HAS_OUT_99_CHILDREN);
                }
                if flags.contains(VisFlags::OUT_WEIGHT) {
                    pc.flags.insert(VisFlags::HAS_OUT_WEIGHT_CHILDREN);
                }
            }
            if !admitted {
                continue;
            }
            if let Some(c) = tree.cache_mut(id) {
                c.flags.insert(VisFlags::UNCULLED);
            }
            cache.admit(id);
            stack.extend(tree.children_of(id).iter().rev().copied());
        }
    }

    /// Transform one node and write its cache entry; returns its flags.
    fn write_node_cache<D, T: Transformation + ?Sized>(
        &self,
        tree: &mut Tree<D>,
        transform: &T,
        cache: &VisibilityCache,
        id: NodeId,
    ) -> VisFlags {
        let z_model = tree.layout(id).map_or(Complex::ZERO, |l| l.z);
        let weight = tree.precalc(id).map_or(0.0, |p| p.culling_weight);
        let z = transform.transform_point(z_model);
        let r = z.norm();
        let dist_scale = transform.transform_dist(z);

        let mut flags = VisFlags::empty();
        if r >= self.config.culling_radius {
            flags |= VisFlags::OUT_99;
        }
        if r >= cache.focus_radius {
            flags |= VisFlags::OUT_LAMBDA;
        }
        if weight < cache.min_weight {
            flags |= VisFlags::OUT_WEIGHT;
        }
        if !flags.is_empty() {
            flags |= VisFlags::OUT;
        }

        if let Some(c) = tree.cache_mut(id) {
            let mut transform_attr = core::mem::take(&mut c.transform);
            transform_attr.clear();
            // Writing into a String cannot fail.
            let _ = write!(
                transform_attr,
                "translate({:.5} {:.5}) scale({:.5})",
                z.re, z.im, dist_scale
            );
            *c = NodeCache {
                z,
                polar: z.to_polar(),
                dist_scale,
                transform: transform_attr,
                flags,
                label_min_weight: cache.min_weight / dist_scale.max(1e-3),
                cycle: cache.cycle,
            };
        }
        flags
    }
}

/// The node drawn closest to the disk center.
///
/// Scans every node: the distance to the origin has local minima along the
/// tree, so a walk between neighbors can stop short of the real center.
fn find_center<D, T: Transformation + ?Sized>(tree: &Tree<D>, transform: &T) -> Option<NodeId> {
    tree.ids()
        .map(|id| {
            let z = tree.layout(id).map_or(Complex::ZERO, |l| l.z);
            let r = transform.transform_point(z).norm();
            (id, if r.is_finite() { r } else { f64::INFINITY })
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(id, _)| id)
}

/// Nodes a click can resolve to: drawn circles, drawn labels and the center.
fn clickable_sites(cache: &VisibilityCache, center: NodeId) -> Vec<NodeId> {
    let mut seen = HashSet::new();
    core::iter::once(center)
        .chain(cache.leaf_or_lazy.iter().copied())
        .chain(cache.labels.iter().copied())
        .filter(|&id| seen.insert(id))
        .collect()
}

/// Ancestors of `center` (inclusive) inside the culling radius, top first.
fn highway<D, T: Transformation + ?Sized>(
    tree: &Tree<D>,
    transform: &T,
    center: NodeId,
    culling_radius: f64,
) -> Vec<NodeId> {
    let inside = |id: NodeId| {
        let z = tree.layout(id).map_or(Complex::ZERO, |l| l.z);
        transform.transform_point(z).norm() < culling_radius
    };
    let mut chain: Vec<NodeId> = core::iter::once(center)
        .chain(tree.ancestors(center).skip(1).take_while(|&id| inside(id)))
        .collect();
    chain.reverse();
    chain
}
