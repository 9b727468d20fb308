// Copyright 2025 the Hypertree Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hypertree Tree: the arena that holds a loaded hierarchy.
//!
//! - [`Tree`]: nodes addressed by [`NodeId`], built once per dataset from
//!   [`SourceNode`] loader output or by incremental [`Tree::insert`].
//! - Side tables written by later passes: [`Precalc`] (weights, labels),
//!   [`NodeLayout`] (wedge and model-space position), [`NodeCache`]
//!   (per-frame disk position, [`VisFlags`]) and path membership ([`PathId`]).
//! - [`NodePayload`]: what the engine needs from application data.
//!
//! Node ids carry the dataset [`Generation`], so an id kept across a reload
//! is simply foreign to the new tree: every accessor answers `None` or an
//! empty slice instead of touching an unrelated node.
//!
//! ```rust
//! use hypertree_tree::{Generation, SourceNode, Tree};
//!
//! let mut tree = Tree::from_source(
//!     SourceNode::with_children("root", vec![SourceNode::leaf("leaf")]),
//!     Generation(7),
//! );
//! tree.apply_labels(|key| (key == "leaf").then_some("A leaf"));
//! tree.compute_precalc();
//!
//! let root = tree.root().unwrap();
//! let leaf = tree.children_of(root)[0];
//! assert_eq!(tree.label(leaf), Some("A leaf"));
//! assert_eq!(tree.path_from_root(leaf), vec![root, leaf]);
//! ```

mod precalc;
mod tree;
mod types;

pub use tree::{Ancestors, DepthFirst, Tree};
pub use types::{
    Generation, NodeCache, NodeId, NodeLayout, NodePayload, PathId, Precalc, SourceNode, VisFlags,
};
