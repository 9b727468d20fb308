// Copyright 2025 the Hypertree Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Complex numbers in Cartesian and polar form.

use core::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

use kurbo::{Point, Vec2};

use crate::normalize_angle;

/// Divisors with a squared modulus below this are treated as zero.
const DIVISOR_EPSILON: f64 = 1e-300;

/// A complex number `re + i·im`.
///
/// Points of the Poincaré disk, rotations (unit modulus) and translations are
/// all represented with this type.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Complex {
    /// Real part.
    pub re: f64,
    /// Imaginary part.
    pub im: f64,
}

/// A complex number in polar form.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Polar {
    /// Modulus.
    pub r: f64,
    /// Argument in `[0, 2π)`.
    pub theta: f64,
}

impl Complex {
    /// `0 + 0i`.
    pub const ZERO: Self = Self::new(0.0, 0.0);
    /// `1 + 0i`, the identity rotation.
    pub const ONE: Self = Self::new(1.0, 0.0);
    /// `0 + 1i`.
    pub const I: Self = Self::new(0.0, 1.0);

    /// Create a complex number from Cartesian parts.
    #[inline]
    pub const fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }

    /// Create a complex number from modulus and argument.
    #[inline]
    pub fn from_polar(r: f64, theta: f64) -> Self {
        let (sin, cos) = theta.sin_cos();
        Self::new(r * cos, r * sin)
    }

    /// The unit complex number at angle `theta`.
    #[inline]
    pub fn from_angle(theta: f64) -> Self {
        Self::from_polar(1.0, theta)
    }

    /// Polar representation with the argument normalized into `[0, 2π)`.
    pub fn to_polar(self) -> Polar {
        Polar {
            r: self.norm(),
            theta: self.arg(),
        }
    }

    /// Complex conjugate.
    #[inline]
    pub const fn conj(self) -> Self {
        Self::new(self.re, -self.im)
    }

    /// Multiply by a real scalar.
    #[inline]
    pub fn scale(self, k: f64) -> Self {
        Self::new(self.re * k, self.im * k)
    }

    /// Squared modulus.
    #[inline]
    pub fn norm_sq(self) -> f64 {
        self.re * self.re + self.im * self.im
    }

    /// Modulus.
    #[inline]
    pub fn norm(self) -> f64 {
        self.re.hypot(self.im)
    }

    /// Argument in `[0, 2π)`.
    pub fn arg(self) -> f64 {
        normalize_angle(self.im.atan2(self.re))
    }

    /// The same argument with modulus `r`.
    ///
    /// Zero stays zero.
    pub fn with_norm(self, r: f64) -> Self {
        let n = self.norm();
        if n < f64::MIN_POSITIVE {
            return Self::ZERO;
        }
        self.scale(r / n)
    }

    /// Euclidean distance to `other`.
    #[inline]
    pub fn distance(self, other: Self) -> f64 {
        (self - other).norm()
    }

    /// Both parts are finite.
    #[inline]
    pub fn is_finite(self) -> bool {
        self.re.is_finite() && self.im.is_finite()
    }

    /// Replace a non-finite value with zero.
    #[inline]
    pub fn finite_or_zero(self) -> Self {
        if self.is_finite() { self } else { Self::ZERO }
    }

    /// Linear interpolation between `self` and `other`.
    #[inline]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        self + (other - self).scale(t)
    }
}

impl Add for Complex {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.re + rhs.re, self.im + rhs.im)
    }
}

impl AddAssign for Complex {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.re += rhs.re;
        self.im += rhs.im;
    }
}

impl Sub for Complex {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.re - rhs.re, self.im - rhs.im)
    }
}

impl SubAssign for Complex {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        self.re -= rhs.re;
        self.im -= rhs.im;
    }
}

impl Neg for Complex {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.re, -self.im)
    }
}

impl Mul for Complex {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        Self::new(
            self.re * rhs.re - self.im * rhs.im,
            self.re * rhs.im + self.im * rhs.re,
        )
    }
}

impl Mul<f64> for Complex {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: f64) -> Self {
        self.scale(rhs)
    }
}

/// Division never panics: a divisor of (numerically) zero yields [`Complex::ZERO`].
impl Div for Complex {
    type Output = Self;

    fn div(self, rhs: Self) -> Self {
        let d = rhs.norm_sq();
        if d < DIVISOR_EPSILON {
            return Self::ZERO;
        }
        Self::new(
            (self.re * rhs.re + self.im * rhs.im) / d,
            (self.im * rhs.re - self.re * rhs.im) / d,
        )
    }
}

impl Div<f64> for Complex {
    type Output = Self;

    #[inline]
    fn div(self, rhs: f64) -> Self {
        if rhs.abs() < f64::MIN_POSITIVE {
            return Self::ZERO;
        }
        self.scale(1.0 / rhs)
    }
}

impl From<Point> for Complex {
    #[inline]
    fn from(p: Point) -> Self {
        Self::new(p.x, p.y)
    }
}

impl From<Complex> for Point {
    #[inline]
    fn from(c: Complex) -> Self {
        Self::new(c.re, c.im)
    }
}

impl From<Vec2> for Complex {
    #[inline]
    fn from(v: Vec2) -> Self {
        Self::new(v.x, v.y)
    }
}

impl From<Polar> for Complex {
    #[inline]
    fn from(p: Polar) -> Self {
        Self::from_polar(p.r, p.theta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f64::consts::{FRAC_PI_2, PI};

    fn close(a: Complex, b: Complex) -> bool {
        a.distance(b) < 1e-12
    }

    #[test]
    fn multiplication_and_division_are_inverse() {
        let a = Complex::new(0.3, -0.2);
        let b = Complex::new(-0.7, 0.4);
        assert!(close((a * b) / b, a), "(a*b)/b should be a");
        assert!(close(Complex::I * Complex::I, -Complex::ONE), "i² = -1");
    }

    #[test]
    fn division_by_zero_is_zero() {
        assert_eq!(Complex::ONE / Complex::ZERO, Complex::ZERO);
        assert_eq!(Complex::ONE / 0.0, Complex::ZERO);
    }

    #[test]
    fn polar_round_trip() {
        let c = Complex::new(-0.5, -0.5);
        let p = c.to_polar();
        assert!(p.theta >= 0.0 && p.theta < 2.0 * PI, "argument is normalized");
        assert!(close(Complex::from(p), c), "polar round trip");
        assert!((Complex::I.arg() - FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn with_norm_keeps_direction() {
        let c = Complex::new(3.0, 4.0).with_norm(0.5);
        assert!(close(c, Complex::new(0.3, 0.4)), "rescaled to 0.5");
        assert_eq!(Complex::ZERO.with_norm(1.0), Complex::ZERO);
    }

    #[test]
    fn point_conversions() {
        let p = Point::new(0.25, -0.5);
        let c = Complex::from(p);
        assert_eq!(Point::from(c), p);
    }
}
