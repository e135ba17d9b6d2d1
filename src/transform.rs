//! Transform capabilities assembled from per-parameter transformers.
//!
//! A form hands out a translator, rotator or scaler built from its own
//! views. The transformers themselves are generic over the view type and
//! know nothing about the form they came from, so a new form kind only has
//! to say which views play which role.

use enum_dispatch::enum_dispatch;
use glam::DVec2;

use crate::form::{AnyAnchor, PointId};
use crate::form::params::{ReadView, WriteView};
use crate::runtime::Runtime;
use crate::types::{Angle, Length, rotate, scale_along};

pub trait Translator {
    fn translate(&self, runtime: &mut dyn Runtime, delta: DVec2);
}

pub trait Rotator {
    /// Rotate by `angle` around `fix`
    fn rotate(&self, runtime: &mut dyn Runtime, angle: Angle, fix: DVec2);
}

pub trait Scaler {
    /// Scale by `factor` away from `fix`, along `axis` (zero axis: uniformly)
    fn scale(&self, runtime: &mut dyn Runtime, factor: f64, fix: DVec2, axis: DVec2);
}

// ============================================================================
// Capabilities
// ============================================================================

#[enum_dispatch]
pub trait Translatable {
    fn translator(&self) -> Box<dyn Translator>;
}

#[enum_dispatch]
pub trait Rotatable {
    fn rotator(&self) -> Box<dyn Rotator>;
}

#[enum_dispatch]
pub trait Scalable {
    fn scaler(&self) -> Box<dyn Scaler>;
}

/// Anchors a reshaping tool may drag
#[enum_dispatch]
pub trait Morphable {
    fn anchors(&self) -> Vec<(PointId, AnyAnchor)>;

    fn anchor_for(&self, id: PointId) -> Option<AnyAnchor> {
        self.anchors().into_iter().find(|(p, _)| *p == id).map(|(_, a)| a)
    }
}

// ============================================================================
// Point transformers
// ============================================================================

pub struct PointTranslator<P> {
    points: Vec<P>,
}

impl<P> PointTranslator<P> {
    pub fn new(points: Vec<P>) -> Self {
        Self { points }
    }
}

impl<P: WriteView<Value = DVec2>> Translator for PointTranslator<P> {
    fn translate(&self, runtime: &mut dyn Runtime, delta: DVec2) {
        for point in &self.points {
            if let Some(p) = point.get(runtime) {
                point.set(runtime, p + delta);
            }
        }
    }
}

pub struct PointRotator<P> {
    points: Vec<P>,
}

impl<P> PointRotator<P> {
    pub fn new(points: Vec<P>) -> Self {
        Self { points }
    }
}

impl<P: WriteView<Value = DVec2>> Rotator for PointRotator<P> {
    fn rotate(&self, runtime: &mut dyn Runtime, angle: Angle, fix: DVec2) {
        for point in &self.points {
            if let Some(p) = point.get(runtime) {
                point.set(runtime, fix + rotate(p - fix, angle));
            }
        }
    }
}

pub struct PointScaler<P> {
    points: Vec<P>,
}

impl<P> PointScaler<P> {
    pub fn new(points: Vec<P>) -> Self {
        Self { points }
    }
}

impl<P: WriteView<Value = DVec2>> Scaler for PointScaler<P> {
    fn scale(&self, runtime: &mut dyn Runtime, factor: f64, fix: DVec2, axis: DVec2) {
        for point in &self.points {
            if let Some(p) = point.get(runtime) {
                point.set(runtime, fix + scale_along(p - fix, factor, axis));
            }
        }
    }
}

// ============================================================================
// Angle and length transformers
// ============================================================================

/// Adds the rotation to a stored orientation
pub struct AngleRotator<A> {
    angles: Vec<A>,
}

impl<A> AngleRotator<A> {
    pub fn new(angles: Vec<A>) -> Self {
        Self { angles }
    }
}

impl<A: WriteView<Value = Angle>> Rotator for AngleRotator<A> {
    fn rotate(&self, runtime: &mut dyn Runtime, angle: Angle, _fix: DVec2) {
        for view in &self.angles {
            if let Some(current) = view.get(runtime) {
                view.set(runtime, current + angle);
            }
        }
    }
}

/// Scales a length that lies along `angle + offset`.
///
/// The length is treated as a vector in that direction; the scaled vector's
/// magnitude becomes the new length. The sign of the stored value is kept.
pub struct LengthScaler<L, A> {
    length: L,
    angle: A,
    offset: Angle,
}

impl<L, A> LengthScaler<L, A> {
    pub fn new(length: L, angle: A, offset: Angle) -> Self {
        Self { length, angle, offset }
    }
}

impl<L, A> Scaler for LengthScaler<L, A>
where
    L: WriteView<Value = Length>,
    A: ReadView<Value = Angle>,
{
    fn scale(&self, runtime: &mut dyn Runtime, factor: f64, _fix: DVec2, axis: DVec2) {
        let (Some(length), Some(angle)) = (self.length.get(runtime), self.angle.get(runtime)) else {
            return;
        };
        let direction = rotate(DVec2::X, angle + self.offset);
        let stretch = scale_along(direction, factor, axis).length();
        self.length.set(runtime, length * stretch);
    }
}

// ============================================================================
// Composites
// ============================================================================

pub struct CompositeRotator {
    parts: Vec<Box<dyn Rotator>>,
}

impl CompositeRotator {
    pub fn new(parts: Vec<Box<dyn Rotator>>) -> Self {
        Self { parts }
    }
}

impl Rotator for CompositeRotator {
    fn rotate(&self, runtime: &mut dyn Runtime, angle: Angle, fix: DVec2) {
        for part in &self.parts {
            part.rotate(runtime, angle, fix);
        }
    }
}

pub struct CompositeScaler {
    parts: Vec<Box<dyn Scaler>>,
}

impl CompositeScaler {
    pub fn new(parts: Vec<Box<dyn Scaler>>) -> Self {
        Self { parts }
    }
}

impl Scaler for CompositeScaler {
    fn scale(&self, runtime: &mut dyn Runtime, factor: f64, fix: DVec2, axis: DVec2) {
        for part in &self.parts {
            part.scale(runtime, factor, fix, axis);
        }
    }
}
