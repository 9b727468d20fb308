// Copyright 2025 the Hypertree Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Angles, wedges, geodesic arcs and easing.

use core::f64::consts::TAU;

use crate::Complex;

/// Arc radii above this are drawn as straight lines.
const MAX_ARC_RADIUS: f64 = 1e6;

/// Normalize an angle into `[0, 2π)`.
///
/// Non-finite input yields `0`.
pub fn normalize_angle(a: f64) -> f64 {
    if !a.is_finite() {
        return 0.0;
    }
    let r = a.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs.
    if r >= TAU { 0.0 } else { r }
}

/// Clamp the modulus of `p` to at most `limit`.
pub fn max_r(p: Complex, limit: f64) -> Complex {
    if p.norm() > limit { p.with_norm(limit) } else { p }
}

/// The ease-in-ease-out curve `0.5 + 0.5·tanh(6t − 3)` used by transitions.
pub fn sigmoid(t: f64) -> f64 {
    0.5 + 0.5 * (6.0 * t - 3.0).tanh()
}

/// Euclidean size factor of a unit hyperbolic length drawn at `p`: `sqrt(1 − |p|²)`.
///
/// Drops to `0` at the rim; used for node radii and to gate hover near the boundary.
pub fn length_dilation(p: Complex) -> f64 {
    let r = p.norm().min(1.0);
    (1.0 - r * r).max(0.0).sqrt()
}

/// Replace NaN and infinities with `0`.
#[inline]
pub fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() { v } else { 0.0 }
}

/// An angular interval starting at `alpha` and sweeping counter-clockwise to `omega`.
///
/// `omega` may exceed `2π`; only `alpha` is normalized so that a full wedge
/// keeps its width.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Wedge {
    /// Start angle.
    pub alpha: f64,
    /// End angle, `alpha <= omega <= alpha + 2π`.
    pub omega: f64,
}

impl Default for Wedge {
    fn default() -> Self {
        Self::FULL
    }
}

impl Wedge {
    /// The whole circle, starting at angle 0.
    pub const FULL: Self = Self {
        alpha: 0.0,
        omega: TAU,
    };

    /// Create a wedge from a start angle and an angular width.
    pub fn new(alpha: f64, width: f64) -> Self {
        let alpha = normalize_angle(alpha);
        Self {
            alpha,
            omega: alpha + width.clamp(0.0, TAU),
        }
    }

    /// Angular width in `[0, 2π]`.
    #[inline]
    pub fn width(&self) -> f64 {
        (self.omega - self.alpha).clamp(0.0, TAU)
    }

    /// The angle halfway through the wedge.
    #[inline]
    pub fn bisector(&self) -> f64 {
        normalize_angle(self.alpha + self.width() / 2.0)
    }

    /// Whether this wedge covers the whole circle.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.width() >= TAU - 1e-12
    }
}

/// The circle carrying the hyperbolic geodesic between two disk points.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ArcCenter {
    /// Euclidean center of the geodesic circle.
    pub center: Complex,
    /// `a × b` (2-D cross product). Its sign gives the sweep direction; `0`
    /// means the points are collinear with the origin.
    pub det: f64,
    /// Euclidean radius, or `0` when the geodesic is a straight segment.
    pub radius: f64,
}

impl ArcCenter {
    /// Whether the geodesic should be drawn as a straight segment.
    #[inline]
    pub fn is_straight(&self) -> bool {
        self.radius == 0.0
    }
}

/// Compute the geodesic circle through `a` and `b`.
///
/// Geodesics are arcs of circles orthogonal to the unit circle. For such a
/// circle with center `c`, passing through `a` means `2·a·c = 1 + |a|²`; the
/// two point constraints give a 2×2 linear system in `c`.
/// Near-collinear input (radius NaN or huge) degrades to a straight segment.
pub fn arc_center(a: Complex, b: Complex) -> ArcCenter {
    let det = a.re * b.im - a.im * b.re;
    let ka = 1.0 + a.norm_sq();
    let kb = 1.0 + b.norm_sq();
    let center = Complex::new(
        (ka * b.im - kb * a.im) / (2.0 * det),
        (kb * a.re - ka * b.re) / (2.0 * det),
    );
    let radius = (center.norm_sq() - 1.0).sqrt();
    if !center.is_finite() || !radius.is_finite() || radius > MAX_ARC_RADIUS {
        return ArcCenter {
            center: Complex::ZERO,
            det: finite_or_zero(det),
            radius: 0.0,
        };
    }
    ArcCenter {
        center,
        det,
        radius,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f64::consts::PI;

    #[test]
    fn normalize_angle_wraps() {
        assert!((normalize_angle(-PI / 2.0) - 1.5 * PI).abs() < 1e-12);
        assert!((normalize_angle(5.0 * PI) - PI).abs() < 1e-12);
        assert_eq!(normalize_angle(TAU), 0.0);
        assert_eq!(normalize_angle(f64::NAN), 0.0);
        assert!(normalize_angle(-1e-18) < TAU, "never returns 2π");
    }

    #[test]
    fn sigmoid_endpoints_and_midpoint() {
        assert!(sigmoid(0.0) < 0.003, "starts near 0");
        assert!(sigmoid(1.0) > 0.997, "ends near 1");
        assert!((sigmoid(0.5) - 0.5).abs() < 1e-12, "symmetric");
        assert!(sigmoid(0.2) < sigmoid(0.3), "monotonic");
    }

    #[test]
    fn max_r_clamps_only_outside() {
        let p = Complex::new(3.0, 4.0);
        assert!((max_r(p, 0.9).norm() - 0.9).abs() < 1e-12);
        let q = Complex::new(0.1, 0.1);
        assert_eq!(max_r(q, 0.9), q);
    }

    #[test]
    fn arc_circle_is_orthogonal_and_passes_through_points() {
        let a = Complex::new(0.5, 0.1);
        let b = Complex::new(-0.2, 0.6);
        let arc = arc_center(a, b);
        assert!(!arc.is_straight());
        assert!((arc.center.distance(a) - arc.radius).abs() < 1e-9, "through a");
        assert!((arc.center.distance(b) - arc.radius).abs() < 1e-9, "through b");
        let orthogonal = arc.center.norm_sq() - arc.radius * arc.radius;
        assert!((orthogonal - 1.0).abs() < 1e-9, "orthogonal to the unit circle");
        assert!(arc.det > 0.0, "counter-clockwise pair");
    }

    #[test]
    fn collinear_points_degenerate_to_segment() {
        let arc = arc_center(Complex::new(0.2, 0.2), Complex::new(-0.4, -0.4));
        assert!(arc.is_straight());
        assert_eq!(arc.center, Complex::ZERO);
        let through_origin = arc_center(Complex::ZERO, Complex::new(0.5, 0.0));
        assert!(through_origin.is_straight());
    }

    #[test]
    fn wedge_width_and_bisector() {
        let w = Wedge::new(1.5 * PI, PI);
        assert!((w.width() - PI).abs() < 1e-12);
        assert!((w.bisector() - 0.0).abs() < 1e-12 || (w.bisector() - TAU).abs() < 1e-12);
        assert!(Wedge::FULL.is_full());
        assert!(!w.is_full());
    }

    #[test]
    fn length_dilation_shrinks_to_rim() {
        assert_eq!(length_dilation(Complex::ZERO), 1.0);
        assert!(length_dilation(Complex::new(0.99, 0.0)) < 0.15);
        assert_eq!(length_dilation(Complex::new(2.0, 0.0)), 0.0);
    }
}
