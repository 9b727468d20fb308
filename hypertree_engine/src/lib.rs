// Copyright 2025 the Hypertree Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hypertree Engine: an interactive hyperbolic view of a large tree.
//!
//! [`Engine`] owns everything one view needs: the [`Tree`](hypertree_tree::Tree),
//! the view transformation, the magic filter and its visibility cache, the
//! gesture, hover and click state, the single transition slot, highlight
//! [paths](PathRegistry) and the [`LayerStack`].
//!
//! - Loading is a small state machine ([`InitState`]): a dataset and its
//!   labels arrive in either order for one [`Generation`](hypertree_tree::Generation)
//!   started by [`Engine::begin_load`]; deliveries for a superseded load fail
//!   with [`EngineError::Stale`].
//! - [`Engine::update`] runs one cycle: relayout when λ changed (keeping an
//!   anchor node fixed on screen), filter, report a new center with its
//!   breadcrumb, then rebuild the layers and hand them to the
//!   [`RenderSink`].
//! - Input ([`Engine::pointer_down`], [`Engine::wheel`], [`Engine::hover`],
//!   ...) and the host clock ([`Engine::tick`]) drive the view; navigation
//!   ([`Engine::goto_node`], [`Engine::goto_lambda`], ...) starts transitions.
//!
//! Configuration is a typed [`EngineConfig`]; hosts usually start from the
//! defaults and a [`ConfigOverride`], which can be read from JSON.
//!
//! ```
//! use hypertree_engine::{Engine, EngineConfig, LabelMap, LoadTiming, LoadedData};
//! use hypertree_tree::SourceNode;
//!
//! let data = || LoadedData {
//!     root: SourceNode::with_children(
//!         "root".to_owned(),
//!         vec![SourceNode::leaf("left".to_owned()), SourceNode::leaf("right".to_owned())],
//!     ),
//!     timing: LoadTiming::default(),
//! };
//! let mut labels = LabelMap::new();
//! labels.insert("right".to_owned(), "Right".to_owned());
//!
//! let mut engine = Engine::new(EngineConfig::default());
//! engine.load_with(data, labels).unwrap();
//!
//! let right = engine.tree().find(|_, d| d == "right").unwrap();
//! engine.goto_node(right, Some(300)).unwrap();
//! engine.tick(0);
//! engine.tick(300);
//! assert_eq!(engine.center(), Some(right));
//! assert_eq!(engine.breadcrumb(right), "Right");
//! ```

mod config;
mod engine;
mod error;
mod init;
mod layers;
mod paths;

pub use config::{ConfigOverride, EngineConfig, TransformKind};
pub use engine::Engine;
pub use error::{EngineError, PathError};
pub use init::{DataLoader, InitState, LabelMap, LangLoader, LoadTiming, LoadedData};
pub use layers::{
    CellSite, LabelItem, LayerFlags, LayerFrame, LayerKind, LayerStack, LinkArc, NodeDot,
    RenderSink, UpdateFlags,
};
pub use paths::{Color, Path, PathKind, PathRegistry};
