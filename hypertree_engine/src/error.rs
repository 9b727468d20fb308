// Copyright 2025 the Hypertree Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors surfaced at the engine boundary.

use hypertree_tree::{Generation, NodeId, PathId};

/// Failure of a highlight path operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// No path with this id is registered.
    #[error("no path registered under {0:?}")]
    Unknown(PathId),
    /// The node does not belong to the current dataset.
    #[error("node {0:?} is not part of the current dataset")]
    ForeignNode(NodeId),
}

/// Failure of an engine call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// A delivery belongs to a load that was superseded.
    #[error("delivery for generation {got:?} while loading {expected:?}")]
    Stale {
        /// Generation of the pending load, if any.
        expected: Option<Generation>,
        /// Generation the delivery was made for.
        got: Generation,
    },
    /// The call needs a loaded, labelled dataset.
    #[error("no dataset is ready")]
    NotReady,
    /// The node does not belong to the current dataset.
    #[error("node {0:?} is not part of the current dataset")]
    UnknownNode(NodeId),
    /// A path operation failed.
    #[error(transparent)]
    Path(#[from] PathError),
}
