//! Strongly-typed numeric primitives for reform (zero-cost newtypes).
//!
//! Positions are plain `glam::DVec2`; scalar parameters get their own types
//! so a length can't be handed to something expecting an angle.

use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use glam::DVec2;

/// Below this magnitude a direction vector is treated as degenerate.
pub const EPSILON: f64 = 1e-9;

/// Error type for invalid numeric values
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericError {
    /// Value is NaN
    NaN,
    /// Value is infinite
    Infinite,
}

impl fmt::Display for NumericError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericError::NaN => write!(f, "value is NaN"),
            NumericError::Infinite => write!(f, "value is infinite"),
        }
    }
}

impl std::error::Error for NumericError {}

/// Reject NaN and infinities coming from user input.
pub fn finite(val: f64) -> Result<f64, NumericError> {
    if val.is_nan() {
        Err(NumericError::NaN)
    } else if val.is_infinite() {
        Err(NumericError::Infinite)
    } else {
        Ok(val)
    }
}

/// A length parameter (width, height, radius) in drawing units
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Default)]
#[repr(transparent)]
pub struct Length(pub f64);

impl Mul<f64> for Length {
    type Output = Length;
    fn mul(self, rhs: f64) -> Length {
        Length(self.0 * rhs)
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Rotation angle, stored in radians
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Default)]
#[repr(transparent)]
pub struct Angle(pub f64);

impl Angle {
    pub const ZERO: Angle = Angle(0.0);

    #[inline]
    pub const fn from_radians(radians: f64) -> Angle {
        Angle(radians)
    }

    #[inline]
    pub fn from_degrees(degrees: f64) -> Angle {
        Angle(degrees.to_radians())
    }

    #[inline]
    pub fn radians(self) -> f64 {
        self.0
    }

    #[inline]
    pub fn degrees(self) -> f64 {
        self.0.to_degrees()
    }

    /// Angle of a vector measured from the positive x axis
    pub fn of(v: DVec2) -> Angle {
        Angle(v.y.atan2(v.x))
    }
}

impl Add for Angle {
    type Output = Angle;
    fn add(self, rhs: Angle) -> Angle {
        Angle(self.0 + rhs.0)
    }
}
impl Sub for Angle {
    type Output = Angle;
    fn sub(self, rhs: Angle) -> Angle {
        Angle(self.0 - rhs.0)
    }
}
impl Neg for Angle {
    type Output = Angle;
    fn neg(self) -> Angle {
        Angle(-self.0)
    }
}

impl fmt::Display for Angle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}deg", self.degrees())
    }
}

/// Rotate `v` counter-clockwise (in y-up terms) by `angle`
#[inline]
pub fn rotate(v: DVec2, angle: Angle) -> DVec2 {
    DVec2::from_angle(angle.0).rotate(v)
}

/// Project `v` onto the direction of `onto`.
///
/// Returns `None` when `onto` is too short to define a direction.
pub fn project(v: DVec2, onto: DVec2) -> Option<DVec2> {
    let len_sq = onto.length_squared();
    if len_sq < EPSILON * EPSILON {
        None
    } else {
        Some(onto * (v.dot(onto) / len_sq))
    }
}

/// Scale `v` by `factor` along `axis` only; a zero axis scales uniformly.
pub fn scale_along(v: DVec2, factor: f64, axis: DVec2) -> DVec2 {
    let len = axis.length();
    if len < EPSILON {
        return v * factor;
    }
    let n = axis / len;
    v + n * (v.dot(n) * (factor - 1.0))
}
