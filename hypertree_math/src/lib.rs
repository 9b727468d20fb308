// Copyright 2025 the Hypertree Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hypertree Math: hyperbolic geometry primitives for the Poincaré disk.
//!
//! The whole hyperbolic plane maps into the open unit disk; a tree laid out
//! in that plane can be panned and zoomed with disk automorphisms while its
//! periphery compresses smoothly toward the rim.
//!
//! - [`Complex`] / [`Polar`]: complex numbers with the usual operators.
//! - [`Mobius`]: `z ↦ (θz + P) / (conj(P)·θz + 1)`, with [`h2e`], [`e2h`],
//!   [`compose`], [`translation_between`] and [`shift`].
//! - [`arc_center`]: the circle carrying the geodesic between two points,
//!   needed to draw tree edges as arcs.
//! - [`Wedge`], [`normalize_angle`], [`max_r`], [`length_dilation`] and the
//!   transition easing [`sigmoid`].
//! - [`Transformation`]: the drag-driven view state, implemented by
//!   [`HyperbolicTransform`], [`PanTransform`] and [`NegTransform`].
//!
//! Nothing in this crate panics or reports errors: degenerate input (zero
//! divisors, collinear arcs, points on the rim) produces finite best-effort
//! values so a renderer can keep drawing.
//!
//! ```
//! use hypertree_math::{Complex, Mobius, h2e, shift};
//!
//! // Drag the plane so the point under (0, 0) ends up at (0.3, 0).
//! let t = shift(&Mobius::IDENTITY, Complex::ZERO, Complex::new(0.3, 0.0));
//! let moved = h2e(&t, Complex::ZERO);
//! assert!((moved.re - 0.3).abs() < 1e-12);
//!
//! // And back again.
//! let z = h2e(&t.inverse(), moved);
//! assert!(z.norm() < 1e-12);
//! ```

mod complex;
mod geometry;
mod mobius;
mod transformation;

pub use complex::{Complex, Polar};
pub use geometry::{
    ArcCenter, Wedge, arc_center, finite_or_zero, length_dilation, max_r, normalize_angle, sigmoid,
};
pub use mobius::{MAX_TRANSLATION_R, Mobius, compose, e2h, h2e, shift, translation_between};
pub use transformation::{
    DEFAULT_MAX_MOUSE_R, HyperbolicTransform, NegTransform, PanTransform, TransformState,
    Transformation,
};
