// Copyright 2025 the Hypertree Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hypertree Layout: places every node of a tree in hyperbolic model space.
//!
//! The layout is top-down. The root sits at the origin and owns the
//! configured root wedge. Each node splits its wedge among its children in
//! proportion to their weight, and each child is placed along the bisector
//! of its share at a Euclidean step of `λ · offset` measured in the parent's
//! local frame (the parent pulled to the origin by a Möbius translation).
//! Seen from the child, the ideal end points of its share spread apart, so
//! deeper levels keep getting angular room even though the disk is finite.
//!
//! - [`layout_berge`]: lay out a subtree ([`LayoutMode::Recursive`]) or only
//!   the children of one node ([`LayoutMode::SingleLevel`]).
//! - [`layout_path`]: refresh positions along the chain root → node, the
//!   cheap update used while a zoom gesture re-anchors on one node.
//! - [`preserve_anchor`]: the pan correction that keeps an anchor visually
//!   fixed after its model position moved.
//! - [`wedge_translate`]: express a wedge in another node's frame.
//!
//! ```
//! use hypertree_layout::{LayoutConfig, LayoutMode, layout_berge};
//! use hypertree_tree::{Generation, SourceNode, Tree};
//!
//! let mut tree = Tree::from_source(
//!     SourceNode::with_children("r", vec![SourceNode::leaf("a"), SourceNode::leaf("b")]),
//!     Generation(1),
//! );
//! tree.compute_precalc();
//! let root = tree.root().unwrap();
//! layout_berge(&mut tree, root, 0.2, &LayoutConfig::default(), LayoutMode::Recursive);
//!
//! for id in tree.ids() {
//!     assert!(tree.layout(id).unwrap().z.norm() < 1.0);
//! }
//! ```

mod berge;

pub use berge::{layout_berge, layout_path, preserve_anchor, wedge_translate};

use core::f64::consts::TAU;

use hypertree_math::Wedge;

/// Which aggregate decides a child's angular share.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LayoutWeightSource {
    /// Number (weight) of leaves below the child.
    #[default]
    Leaves,
    /// Total label length below the child; gives wordy subtrees more room.
    Labels,
}

/// Whether [`layout_berge`] descends below the children of the start node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutMode {
    /// Lay out the whole subtree.
    Recursive,
    /// Lay out only the immediate children.
    SingleLevel,
}

/// Layout parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LayoutConfig {
    /// Start angle of the root wedge.
    pub root_alpha: f64,
    /// Width of the root wedge; `2π` for a full circle.
    pub root_width: f64,
    /// Edge length, in units of λ.
    pub base_offset: f64,
    /// Edge length for children of the root, in units of λ.
    pub root_child_offset: f64,
    /// Extra edge length per row of a bushy node, in units of λ.
    pub row_offset: f64,
    /// Aggregate used for angular shares.
    pub weight_source: LayoutWeightSource,
    /// Largest allowed local step; keeps each placement inside the disk.
    pub max_step: f64,
    /// Largest allowed model-space radius.
    pub max_radius: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            root_alpha: 0.0,
            root_width: TAU,
            base_offset: 1.0,
            root_child_offset: 1.3,
            row_offset: 0.4,
            weight_source: LayoutWeightSource::Leaves,
            max_step: 0.95,
            max_radius: 1.0 - 1e-9,
        }
    }
}

impl LayoutConfig {
    /// The wedge given to the root.
    pub fn root_wedge(&self) -> Wedge {
        Wedge::new(self.root_alpha, self.root_width)
    }
}
