//! Typed views onto parameter memory.
//!
//! A view is an address (`form`, `offset`) plus a rule for turning the
//! stored words into a value. Every float goes through `f64::to_bits` /
//! `f64::from_bits`, which is what lets one untyped store back points,
//! lengths and angles alike.

use glam::DVec2;

use crate::runtime::Runtime;
use crate::types::{Angle, Length};

use super::FormId;

#[inline]
pub fn encode(value: f64) -> u64 {
    value.to_bits()
}

#[inline]
pub fn decode(word: u64) -> f64 {
    f64::from_bits(word)
}

/// Which decode rule a view applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewKind {
    Point,
    Length,
    Angle,
}

/// Identity of a view: two views are the same view exactly when their keys match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewKey {
    pub form: FormId,
    pub offset: usize,
    pub kind: ViewKind,
}

/// Read access to a typed parameter
pub trait ReadView {
    type Value;

    fn key(&self) -> ViewKey;

    /// `None` when the owning form is not declared or the slot was never written
    fn get(&self, runtime: &dyn Runtime) -> Option<Self::Value>;
}

/// Read-write access to a typed parameter
pub trait WriteView: ReadView {
    fn set(&self, runtime: &mut dyn Runtime, value: Self::Value);
}

fn read_f64(runtime: &dyn Runtime, form: FormId, offset: usize) -> Option<f64> {
    runtime.read(form, offset).map(decode)
}

/// A position stored in two consecutive slots (x, then y)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StaticPoint {
    pub form: FormId,
    pub offset: usize,
}

impl StaticPoint {
    pub const fn new(form: FormId, offset: usize) -> Self {
        Self { form, offset }
    }
}

impl ReadView for StaticPoint {
    type Value = DVec2;

    fn key(&self) -> ViewKey {
        ViewKey { form: self.form, offset: self.offset, kind: ViewKind::Point }
    }

    fn get(&self, runtime: &dyn Runtime) -> Option<DVec2> {
        let x = read_f64(runtime, self.form, self.offset)?;
        let y = read_f64(runtime, self.form, self.offset + 1)?;
        Some(DVec2::new(x, y))
    }
}

impl WriteView for StaticPoint {
    fn set(&self, runtime: &mut dyn Runtime, value: DVec2) {
        runtime.write(self.form, self.offset, encode(value.x));
        runtime.write(self.form, self.offset + 1, encode(value.y));
    }
}

/// A length in a single slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StaticLength {
    pub form: FormId,
    pub offset: usize,
}

impl StaticLength {
    pub const fn new(form: FormId, offset: usize) -> Self {
        Self { form, offset }
    }
}

impl ReadView for StaticLength {
    type Value = Length;

    fn key(&self) -> ViewKey {
        ViewKey { form: self.form, offset: self.offset, kind: ViewKind::Length }
    }

    fn get(&self, runtime: &dyn Runtime) -> Option<Length> {
        read_f64(runtime, self.form, self.offset).map(Length)
    }
}

impl WriteView for StaticLength {
    fn set(&self, runtime: &mut dyn Runtime, value: Length) {
        runtime.write(self.form, self.offset, encode(value.0));
    }
}

/// A rotation angle (radians) in a single slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StaticAngle {
    pub form: FormId,
    pub offset: usize,
}

impl StaticAngle {
    pub const fn new(form: FormId, offset: usize) -> Self {
        Self { form, offset }
    }
}

impl ReadView for StaticAngle {
    type Value = Angle;

    fn key(&self) -> ViewKey {
        ViewKey { form: self.form, offset: self.offset, kind: ViewKind::Angle }
    }

    fn get(&self, runtime: &dyn Runtime) -> Option<Angle> {
        read_f64(runtime, self.form, self.offset).map(Angle)
    }
}

impl WriteView for StaticAngle {
    fn set(&self, runtime: &mut dyn Runtime, value: Angle) {
        runtime.write(self.form, self.offset, encode(value.0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::{Form, FormBehavior, RectangleForm};
    use crate::procedure::Library;
    use crate::runtime::DefaultRuntime;

    #[test]
    fn float_encoding_is_bit_exact() {
        for v in [0.0, -0.0, 1.5, -1234.5678, f64::MIN_POSITIVE] {
            assert_eq!(decode(encode(v)).to_bits(), v.to_bits());
        }
    }

    #[test]
    fn keys_compare_address_and_kind() {
        let id = FormId::next();
        let length = StaticLength::new(id, 2);
        let angle = StaticAngle::new(id, 2);
        assert_eq!(length.key(), StaticLength::new(id, 2).key());
        assert_ne!(length.key(), angle.key(), "same slot, different kind");
        assert_ne!(length.key(), StaticLength::new(id, 3).key());
    }

    #[test]
    fn views_read_back_what_they_wrote() {
        let form = Form::from(RectangleForm::new(FormId::next(), "R"));
        let mut rt = DefaultRuntime::new(Library::default());
        rt.run(100.0, 100.0, |rt| {
            rt.declare(&form);
            let point = StaticPoint::new(form.id(), 0);
            let length = StaticLength::new(form.id(), 2);
            let angle = StaticAngle::new(form.id(), 4);

            assert_eq!(point.get(rt), None, "fresh slots are unset");

            point.set(rt, DVec2::new(3.0, -4.0));
            length.set(rt, Length(7.5));
            angle.set(rt, Angle::from_degrees(30.0));

            assert_eq!(point.get(rt), Some(DVec2::new(3.0, -4.0)));
            assert_eq!(length.get(rt), Some(Length(7.5)));
            assert_eq!(angle.get(rt), Some(Angle::from_degrees(30.0)));
        });
    }

    #[test]
    fn undeclared_form_reads_absent() {
        let rt = DefaultRuntime::new(Library::default());
        let point = StaticPoint::new(FormId::next(), 0);
        assert_eq!(point.get(&rt), None);
    }
}
