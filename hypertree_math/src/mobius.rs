// Copyright 2025 the Hypertree Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Disk-preserving Möbius transformations.

use crate::{Complex, max_r};

/// Largest modulus a translation `P` may have. Keeps every map invertible.
pub const MAX_TRANSLATION_R: f64 = 1.0 - 1e-9;

/// A disk automorphism `z ↦ (θz + P) / (conj(P)·θz + 1)`.
///
/// `p` is the image of the origin and `theta` a unit complex rotation. The
/// constructors keep `|theta| == 1` and `|p| < 1`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Mobius {
    /// Translation: where the origin is mapped to.
    pub p: Complex,
    /// Rotation, unit modulus.
    pub theta: Complex,
}

impl Default for Mobius {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mobius {
    /// The identity map.
    pub const IDENTITY: Self = Self {
        p: Complex::ZERO,
        theta: Complex::ONE,
    };

    /// Create a transformation, renormalizing `theta` and clamping `p` into the disk.
    pub fn new(p: Complex, theta: Complex) -> Self {
        let theta = if theta.is_finite() && theta.norm_sq() > 0.0 {
            theta.with_norm(1.0)
        } else {
            Complex::ONE
        };
        Self {
            p: max_r(p.finite_or_zero(), MAX_TRANSLATION_R),
            theta,
        }
    }

    /// A pure translation moving the origin to `p`.
    pub fn translation(p: Complex) -> Self {
        Self::new(p, Complex::ONE)
    }

    /// A pure rotation by `angle` radians.
    pub fn rotation(angle: f64) -> Self {
        Self::new(Complex::ZERO, Complex::from_angle(angle))
    }

    /// Map a model-space point into the disk.
    #[inline]
    pub fn apply(&self, z: Complex) -> Complex {
        h2e(self, z)
    }

    /// Map a disk point back into model space.
    #[inline]
    pub fn apply_inverse(&self, w: Complex) -> Complex {
        e2h(self, w)
    }

    /// The inverse transformation.
    ///
    /// From `w = (θz + P)/(conj(P)θz + 1)` the inverse is
    /// `z = (conj(θ)w − conj(θ)P) / (−conj(P)w + 1)`, which again has the
    /// canonical form with `θ' = conj(θ)` and `P' = −conj(θ)·P`.
    pub fn inverse(&self) -> Self {
        let theta = self.theta.conj();
        Self::new(-(theta * self.p), theta)
    }
}

/// `h2e(T, z) = (θz + P) / (conj(P)·θz + 1)`.
pub fn h2e(t: &Mobius, z: Complex) -> Complex {
    let tz = t.theta * z;
    let w = (tz + t.p) / (t.p.conj() * tz + Complex::ONE);
    w.finite_or_zero()
}

/// Inverse of [`h2e`]: `z = (w − P) / (θ·(1 − conj(P)·w))`.
pub fn e2h(t: &Mobius, w: Complex) -> Complex {
    let z = (w - t.p) / (t.theta * (Complex::ONE - t.p.conj() * w));
    z.finite_or_zero()
}

/// Compose two transformations so that `h2e(compose(a, b), z) == h2e(a, h2e(b, z))`.
///
/// Writing `a = (θ₁, P₁)` and `b = (θ₂, P₂)`:
/// `d = conj(P₁)·θ₁·P₂ + 1`, `θ = θ₂·(θ₁ + P₁·conj(P₂)) / d`,
/// `P = (θ₁·P₂ + P₁) / d`.
pub fn compose(a: &Mobius, b: &Mobius) -> Mobius {
    let d = a.p.conj() * a.theta * b.p + Complex::ONE;
    let theta = b.theta * (a.theta + a.p * b.p.conj()) / d;
    let p = (a.theta * b.p + a.p) / d;
    Mobius::new(p, theta)
}

/// The pure translation (no rotation) that maps `s` onto `e`.
///
/// Solving `(s + P) / (conj(P)·s + 1) = e` for `P` gives
/// `P = (r + k·conj(r)) / (1 − |k|²)` with `r = e − s` and `k = e·s`.
pub fn translation_between(s: Complex, e: Complex) -> Mobius {
    let k = e * s;
    let r = e - s;
    let denom = 1.0 - k.norm_sq();
    if denom <= f64::EPSILON {
        return Mobius::IDENTITY;
    }
    Mobius::translation((r + k * r.conj()) / denom)
}

/// The transformation that shows at disk point `e` what `t` shows at `s`.
///
/// The correction is a pure translation applied after `t`, so the gesture
/// drags the plane without spinning it around the pointer.
pub fn shift(t: &Mobius, s: Complex, e: Complex) -> Mobius {
    compose(&translation_between(s, e), t)
}
