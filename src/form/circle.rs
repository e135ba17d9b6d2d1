//! Circle form.
//!
//! Layout: center (slots 0-1), radius (2), angle (3). The angle only
//! orients the four radius anchors; it has no effect on the drawn outline.

use glam::DVec2;

use crate::graphics::{Background, Color, Path, Shape, Stroke};
use crate::runtime::Runtime;
use crate::transform::{
    AngleRotator, CompositeRotator, CompositeScaler, LengthScaler, Morphable, PointRotator,
    PointScaler, PointTranslator, Rotatable, Rotator, Scalable, Scaler, Translatable, Translator,
};
use crate::types::{Angle, Length};

use super::anchor::{AnyAnchor, PointAnchor, RadiusAnchor, Side};
use super::params::{ReadView, StaticAngle, StaticLength, StaticPoint, WriteView};
use super::{DrawingMode, Drawable, FormBehavior, FormId, Outline, PointId};

#[derive(Debug, Clone, PartialEq)]
pub struct CircleForm {
    pub id: FormId,
    pub name: String,
    pub mode: DrawingMode,
}

impl CircleForm {
    pub const SLOT_COUNT: usize = 4;

    pub fn new(id: FormId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            mode: DrawingMode::Draw,
        }
    }

    pub fn with_mode(mut self, mode: DrawingMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn center(&self) -> StaticPoint {
        StaticPoint::new(self.id, 0)
    }

    pub fn radius(&self) -> StaticLength {
        StaticLength::new(self.id, 2)
    }

    pub fn angle(&self) -> StaticAngle {
        StaticAngle::new(self.id, 3)
    }

    pub fn anchor(&self, side: Side) -> RadiusAnchor {
        RadiusAnchor {
            side,
            center: self.center(),
            radius: self.radius(),
            rotation: self.angle(),
        }
    }
}

impl FormBehavior for CircleForm {
    fn id(&self) -> FormId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn drawing_mode(&self) -> DrawingMode {
        self.mode
    }

    fn slot_count(&self) -> usize {
        Self::SLOT_COUNT
    }

    /// `from` is the center; `to` lands on the right anchor
    fn init(&self, runtime: &mut dyn Runtime, from: DVec2, to: DVec2) {
        let spoke = to - from;
        self.center().set(runtime, from);
        self.radius().set(runtime, Length(spoke.length()));
        self.angle().set(runtime, Angle::of(spoke));
    }

    fn points(&self) -> Vec<(PointId, AnyAnchor)> {
        let mut points = self.anchors();
        points.push((
            PointId::Center,
            PointAnchor { id: PointId::Center, point: self.center() }.into(),
        ));
        points
    }

    fn outline(&self, runtime: &dyn Runtime) -> Option<Outline> {
        Some(Outline::Circle {
            center: self.center().get(runtime)?,
            radius: self.radius().get(runtime)?.0,
        })
    }
}

impl Drawable for CircleForm {
    fn get_path(&self, runtime: &dyn Runtime) -> Option<Path> {
        self.outline(runtime).map(|outline| outline.to_path())
    }

    fn get_shape(&self, runtime: &dyn Runtime) -> Option<Shape> {
        Some(Shape {
            area: self.get_path(runtime)?,
            background: Background::Fill(Color::rgba(128, 128, 128, 128)),
            stroke: Stroke::Solid { width: 1.0, color: Color::rgba(50, 50, 50, 255) },
        })
    }
}

impl Translatable for CircleForm {
    fn translator(&self) -> Box<dyn Translator> {
        Box::new(PointTranslator::new(vec![self.center()]))
    }
}

impl Rotatable for CircleForm {
    fn rotator(&self) -> Box<dyn Rotator> {
        Box::new(CompositeRotator::new(vec![
            Box::new(PointRotator::new(vec![self.center()])),
            Box::new(AngleRotator::new(vec![self.angle()])),
        ]))
    }
}

impl Scalable for CircleForm {
    fn scaler(&self) -> Box<dyn Scaler> {
        Box::new(CompositeScaler::new(vec![
            Box::new(PointScaler::new(vec![self.center()])),
            Box::new(LengthScaler::new(self.radius(), self.angle(), Angle::ZERO)),
        ]))
    }
}

impl Morphable for CircleForm {
    fn anchors(&self) -> Vec<(PointId, AnyAnchor)> {
        Side::EDGES
            .into_iter()
            .map(|side| (side.point_id(), self.anchor(side).into()))
            .collect()
    }
}
