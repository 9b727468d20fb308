// Copyright 2025 the Hypertree Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! View transformations: the mutable `{P, θ, λ}` state and the drag operations on it.

use crate::{Complex, Mobius, compose, length_dilation, max_r, shift};

/// Default clamp for drag points, keeps gestures away from the unstable rim.
pub const DEFAULT_MAX_MOUSE_R: f64 = 0.95;

/// Pan, rotation and scale of the current view.
///
/// `lambda` is the Euclidean edge length used when laying out the tree in
/// model space: small values show more of the hierarchy, compressed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransformState {
    /// Translation, `|p| < 1`.
    pub p: Complex,
    /// Rotation, `|theta| == 1`.
    pub theta: Complex,
    /// Layout scale, `0 < lambda < 1`.
    pub lambda: f64,
}

impl Default for TransformState {
    fn default() -> Self {
        Self {
            p: Complex::ZERO,
            theta: Complex::ONE,
            lambda: 0.1,
        }
    }
}

impl TransformState {
    /// Create a state from its parts; `p` and `theta` are normalized.
    pub fn new(p: Complex, theta: Complex, lambda: f64) -> Self {
        let m = Mobius::new(p, theta);
        Self {
            p: m.p,
            theta: m.theta,
            lambda,
        }
    }

    /// The pan/rotation part as a Möbius transformation.
    #[inline]
    pub fn mobius(&self) -> Mobius {
        Mobius {
            p: self.p,
            theta: self.theta,
        }
    }

    /// Replace the pan/rotation part, keeping `lambda`.
    #[inline]
    pub fn set_mobius(&mut self, m: Mobius) {
        self.p = m.p;
        self.theta = m.theta;
    }
}

/// A view transformation driven by drag gestures.
///
/// Drag operations are relative to the snapshot taken by
/// [`Transformation::on_drag_start`]; without a snapshot they apply to the
/// current state.
pub trait Transformation {
    /// Current state.
    fn state(&self) -> &TransformState;

    /// Mutable access to the current state.
    fn state_mut(&mut self) -> &mut TransformState;

    /// Map a model-space point to disk coordinates.
    fn transform_point(&self, z: Complex) -> Complex;

    /// Map a disk point back to model space.
    fn inverse_point(&self, w: Complex) -> Complex;

    /// Size factor for something drawn at disk point `w`.
    fn transform_dist(&self, w: Complex) -> f64;

    /// Largest radius a drag point may reach.
    fn max_mouse_r(&self) -> f64;

    /// Snapshot the state as the reference for following drag calls.
    fn on_drag_start(&mut self);

    /// Drop the drag snapshot.
    fn on_drag_end(&mut self);

    /// Whether a drag snapshot is active.
    fn is_moving(&self) -> bool;

    /// Pan so that the point shown at `s` (at drag start) is shown at `e`.
    fn on_drag_p(&mut self, s: Complex, e: Complex);

    /// Rotate about the disk center by the angle between `s` and `e`.
    fn on_drag_theta(&mut self, s: Complex, e: Complex);

    /// Set the layout scale.
    fn on_drag_lambda(&mut self, lambda: f64) {
        self.state_mut().lambda = lambda;
    }
}

/// Rotation taking the direction of `s` to the direction of `e`.
fn rotation_between(s: Complex, e: Complex) -> Complex {
    let u = e.with_norm(1.0) / s.with_norm(1.0);
    if u.norm_sq() > 0.0 { u } else { Complex::ONE }
}

/// The Möbius (Poincaré disk) view.
#[derive(Clone, Debug, Default)]
pub struct HyperbolicTransform {
    state: TransformState,
    drag_start: Option<TransformState>,
    max_mouse_r: Option<f64>,
}

impl HyperbolicTransform {
    /// Create a view from an initial state.
    pub fn new(state: TransformState) -> Self {
        Self {
            state,
            drag_start: None,
            max_mouse_r: None,
        }
    }

    /// Override the drag clamp radius.
    pub fn with_max_mouse_r(mut self, r: f64) -> Self {
        self.max_mouse_r = Some(r);
        self
    }

    fn reference(&self) -> TransformState {
        self.drag_start.unwrap_or(self.state)
    }
}

impl Transformation for HyperbolicTransform {
    fn state(&self) -> &TransformState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut TransformState {
        &mut self.state
    }

    fn transform_point(&self, z: Complex) -> Complex {
        self.state.mobius().apply(z)
    }

    fn inverse_point(&self, w: Complex) -> Complex {
        self.state.mobius().apply_inverse(w)
    }

    fn transform_dist(&self, w: Complex) -> f64 {
        length_dilation(w)
    }

    fn max_mouse_r(&self) -> f64 {
        self.max_mouse_r.unwrap_or(DEFAULT_MAX_MOUSE_R)
    }

    fn on_drag_start(&mut self) {
        self.drag_start = Some(self.state);
    }

    fn on_drag_end(&mut self) {
        self.drag_start = None;
    }

    fn is_moving(&self) -> bool {
        self.drag_start.is_some()
    }

    fn on_drag_p(&mut self, s: Complex, e: Complex) {
        let limit = self.max_mouse_r();
        let start = self.reference().mobius();
        let m = shift(&start, max_r(s, limit), max_r(e, limit));
        self.state.set_mobius(m);
    }

    fn on_drag_theta(&mut self, s: Complex, e: Complex) {
        let start = self.reference().mobius();
        let rotation = Mobius::new(Complex::ZERO, rotation_between(s, e));
        self.state.set_mobius(compose(&rotation, &start));
    }
}

/// Euclidean pan and rotation without hyperbolic distortion.
///
/// Everything is drawn at unit size; useful for flat overviews and tests.
#[derive(Clone, Debug, Default)]
pub struct PanTransform {
    state: TransformState,
    drag_start: Option<TransformState>,
}

impl PanTransform {
    /// Create a view from an initial state.
    pub fn new(state: TransformState) -> Self {
        Self {
            state,
            drag_start: None,
        }
    }
}

impl Transformation for PanTransform {
    fn state(&self) -> &TransformState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut TransformState {
        &mut self.state
    }

    fn transform_point(&self, z: Complex) -> Complex {
        self.state.theta * z + self.state.p
    }

    fn inverse_point(&self, w: Complex) -> Complex {
        (w - self.state.p) / self.state.theta
    }

    fn transform_dist(&self, _w: Complex) -> f64 {
        1.0
    }

    fn max_mouse_r(&self) -> f64 {
        f64::INFINITY
    }

    fn on_drag_start(&mut self) {
        self.drag_start = Some(self.state);
    }

    fn on_drag_end(&mut self) {
        self.drag_start = None;
    }

    fn is_moving(&self) -> bool {
        self.drag_start.is_some()
    }

    fn on_drag_p(&mut self, s: Complex, e: Complex) {
        let start = self.drag_start.unwrap_or(self.state);
        self.state.p = start.p + (e - s);
    }

    fn on_drag_theta(&mut self, s: Complex, e: Complex) {
        let start = self.drag_start.unwrap_or(self.state);
        let u = rotation_between(s, e);
        self.state.theta = (start.theta * u).with_norm(1.0);
        self.state.p = start.p * u;
    }
}

/// Mirrors another transformation through the disk center.
///
/// Points come out negated and drag input is negated before being forwarded,
/// so a dragged point still follows the pointer.
#[derive(Clone, Debug, Default)]
pub struct NegTransform<T> {
    inner: T,
}

impl<T: Transformation> NegTransform<T> {
    /// Wrap a transformation.
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    /// The wrapped transformation.
    pub fn inner(&self) -> &T {
        &self.inner
    }
}

impl<T: Transformation> Transformation for NegTransform<T> {
    fn state(&self) -> &TransformState {
        self.inner.state()
    }

    fn state_mut(&mut self) -> &mut TransformState {
        self.inner.state_mut()
    }

    fn transform_point(&self, z: Complex) -> Complex {
        -self.inner.transform_point(z)
    }

    fn inverse_point(&self, w: Complex) -> Complex {
        self.inner.inverse_point(-w)
    }

    fn transform_dist(&self, w: Complex) -> f64 {
        self.inner.transform_dist(-w)
    }

    fn max_mouse_r(&self) -> f64 {
        self.inner.max_mouse_r()
    }

    fn on_drag_start(&mut self) {
        self.inner.on_drag_start();
    }

    fn on_drag_end(&mut self) {
        self.inner.on_drag_end();
    }

    fn is_moving(&self) -> bool {
        self.inner.is_moving()
    }

    fn on_drag_p(&mut self, s: Complex, e: Complex) {
        self.inner.on_drag_p(-s, -e);
    }

    fn on_drag_theta(&mut self, s: Complex, e: Complex) {
        self.inner.on_drag_theta(-s, -e);
    }

    fn on_drag_lambda(&mut self, lambda: f64) {
        self.inner.on_drag_lambda(lambda);
    }
}
