// Copyright 2025 the Hypertree Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types: identifiers, payload contract and the per-node side tables.

use hypertree_math::{Complex, Polar, Wedge};

/// Identifier of one loaded dataset.
///
/// Every load gets a fresh generation so ids from a discarded tree never
/// alias nodes of the current one.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Generation(pub u32);

impl Generation {
    /// The generation following this one.
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// Identifier for a node in the tree (index plus dataset generation).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct NodeId(pub(crate) u32, pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: Generation) -> Self {
        Self(idx, generation.0)
    }

    /// Position in the arena.
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Dataset generation this id belongs to.
    pub const fn generation(self) -> Generation {
        Generation(self.1)
    }

    /// Rendering key: unique across datasets and increasing in load order.
    pub const fn merge_id(self) -> u64 {
        ((self.1 as u64) << 32) | self.0 as u64
    }
}

/// Identifier of a highlight path (hover, selection, query match).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct PathId(pub u32);

bitflags::bitflags! {
    /// Per-frame visibility flags written by the filter.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct VisFlags: u16 {
        /// Outside the focus radius derived from λ.
        const OUT_LAMBDA           = 1 << 0;
        /// Outside the culling radius (close to the rim).
        const OUT_99               = 1 << 1;
        /// Subtree weight below the adaptive threshold.
        const OUT_WEIGHT           = 1 << 2;
        /// Any of the above.
        const OUT                  = 1 << 3;
        /// At least one child is out.
        const HAS_OUT_CHILDREN     = 1 << 4;
        /// At least one child is outside the culling radius.
        const HAS_OUT_99_CHILDREN  = 1 << 5;
        /// At least one child is below the weight threshold.
        const HAS_OUT_WEIGHT_CHILDREN = 1 << 6;
        /// Part of the current unculled set.
        const UNCULLED             = 1 << 7;
    }
}

/// Contract for the application data carried by each node.
pub trait NodePayload {
    /// Weight a leaf contributes to its ancestors' aggregates.
    fn leaf_weight(&self) -> f64 {
        1.0
    }

    /// Key used to look up the display label.
    fn label_key(&self) -> Option<&str> {
        None
    }

    /// Text matched by substring queries, besides the label.
    fn search_text(&self) -> Option<&str> {
        None
    }
}

impl NodePayload for () {}

impl NodePayload for String {
    fn label_key(&self) -> Option<&str> {
        Some(self)
    }

    fn search_text(&self) -> Option<&str> {
        Some(self)
    }
}

impl NodePayload for &'static str {
    fn label_key(&self) -> Option<&str> {
        Some(self)
    }

    fn search_text(&self) -> Option<&str> {
        Some(self)
    }
}

/// The shape a data loader hands over: nested payloads.
#[derive(Clone, Debug)]
pub struct SourceNode<D> {
    /// Application payload.
    pub data: D,
    /// Child subtrees, in display order.
    pub children: Vec<SourceNode<D>>,
}

impl<D> SourceNode<D> {
    /// A node without children.
    pub fn leaf(data: D) -> Self {
        Self {
            data,
            children: Vec::new(),
        }
    }

    /// A node with the given children.
    pub fn with_children(data: D, children: Vec<Self>) -> Self {
        Self { data, children }
    }
}

/// Bottom-up aggregates computed once per dataset.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Precalc {
    /// Angular share used by the layout (sum of leaf weights).
    pub layout_weight: f64,
    /// Weight compared against the visibility threshold (sum of leaf weights).
    pub culling_weight: f64,
    /// Label-length weight (sum over leaves of their label length).
    pub vis_weight: f64,
    /// `ln(1 + weight) / ln(1 + root weight)`, in `[0, 1]`; drives stroke width.
    pub weight_scale: f64,
    /// Display label, if the language loader supplied one.
    pub label: Option<String>,
    /// Label length in characters.
    pub label_len: usize,
}

/// Layout state written top-down by the layout pass.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NodeLayout {
    /// Angular interval reserved for the subtree, in the node's local frame.
    pub wedge: Wedge,
    /// Model-space position, `|z| < 1`.
    pub z: Complex,
}

/// Per-frame transform cache written by the filter for visited nodes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NodeCache {
    /// Disk position under the current transformation.
    pub z: Complex,
    /// Polar form of `z`.
    pub polar: Polar,
    /// Size factor at `z`.
    pub dist_scale: f64,
    /// Cached SVG `transform` attribute for `z`.
    pub transform: String,
    /// Visibility flags.
    pub flags: VisFlags,
    /// Weight a label must carry to survive thinning.
    pub label_min_weight: f64,
    /// Update cycle that last wrote this entry.
    pub cycle: u64,
}
