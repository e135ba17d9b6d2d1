//! Rectangle: the reference form, and the box layout it shares with pictures.
//!
//! Layout: center (slots 0-1), width (2), height (3), angle (4).

use glam::DVec2;

use crate::graphics::{Background, Color, Path, Shape, Stroke};
use crate::runtime::Runtime;
use crate::transform::{
    AngleRotator, CompositeRotator, CompositeScaler, LengthScaler, Morphable, PointRotator,
    PointScaler, PointTranslator, Rotatable, Rotator, Scalable, Scaler, Translatable, Translator,
};
use crate::types::{Angle, Length};

use super::anchor::{Anchor, AnyAnchor, BoxAnchor, PointAnchor, Side};
use super::params::{StaticAngle, StaticLength, StaticPoint, WriteView};
use super::{DrawingMode, Drawable, FormBehavior, FormId, Outline, PointId};

/// Slot layout shared by rectangles and pictures, with the anchors and
/// transforms that follow from it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxLayout {
    pub center: StaticPoint,
    pub width: StaticLength,
    pub height: StaticLength,
    pub angle: StaticAngle,
}

impl BoxLayout {
    pub const SLOT_COUNT: usize = 5;

    pub fn new(form: FormId) -> Self {
        Self {
            center: StaticPoint::new(form, 0),
            width: StaticLength::new(form, 2),
            height: StaticLength::new(form, 3),
            angle: StaticAngle::new(form, 4),
        }
    }

    pub fn anchor(&self, side: Side) -> BoxAnchor {
        BoxAnchor {
            side,
            center: self.center,
            rotation: self.angle,
            width: self.width,
            height: self.height,
        }
    }

    /// Span the two given points, unrotated
    pub fn init(&self, runtime: &mut dyn Runtime, min: DVec2, max: DVec2) {
        let size = max - min;
        self.center.set(runtime, (min + max) / 2.0);
        self.width.set(runtime, Length(size.x.abs()));
        self.height.set(runtime, Length(size.y.abs()));
        self.angle.set(runtime, Angle::ZERO);
    }

    /// Corner polygon, clockwise from the top left
    pub fn outline(&self, runtime: &dyn Runtime) -> Option<Outline> {
        let corners = Side::CORNERS
            .into_iter()
            .map(|side| self.anchor(side).position(runtime))
            .collect::<Option<Vec<_>>>()?;
        Some(Outline::Polygon(corners))
    }

    /// Corner and edge anchors
    pub fn anchors(&self) -> Vec<(PointId, AnyAnchor)> {
        Side::ALL
            .into_iter()
            .map(|side| (side.point_id(), self.anchor(side).into()))
            .collect()
    }

    /// Anchors plus the center
    pub fn points(&self) -> Vec<(PointId, AnyAnchor)> {
        let mut points = self.anchors();
        points.push((
            PointId::Center,
            PointAnchor { id: PointId::Center, point: self.center }.into(),
        ));
        points
    }

    pub fn translator(&self) -> Box<dyn Translator> {
        Box::new(PointTranslator::new(vec![self.center]))
    }

    pub fn rotator(&self) -> Box<dyn Rotator> {
        Box::new(CompositeRotator::new(vec![
            Box::new(PointRotator::new(vec![self.center])),
            Box::new(AngleRotator::new(vec![self.angle])),
        ]))
    }

    pub fn scaler(&self) -> Box<dyn Scaler> {
        Box::new(CompositeScaler::new(vec![
            Box::new(PointScaler::new(vec![self.center])),
            Box::new(LengthScaler::new(self.width, self.angle, Angle::ZERO)),
            Box::new(LengthScaler::new(self.height, self.angle, Angle::from_degrees(90.0))),
        ]))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RectangleForm {
    pub id: FormId,
    pub name: String,
    pub mode: DrawingMode,
}

impl RectangleForm {
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

    pub fn layout(&self) -> BoxLayout {
        BoxLayout::new(self.id)
    }

    pub fn center(&self) -> StaticPoint {
        self.layout().center
    }

    pub fn width(&self) -> StaticLength {
        self.layout().width
    }

    pub fn height(&self) -> StaticLength {
        self.layout().height
    }

    pub fn angle(&self) -> StaticAngle {
        self.layout().angle
    }

    pub fn anchor(&self, side: Side) -> BoxAnchor {
        self.layout().anchor(side)
    }
}

impl FormBehavior for RectangleForm {
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
        BoxLayout::SLOT_COUNT
    }

    fn init(&self, runtime: &mut dyn Runtime, from: DVec2, to: DVec2) {
        self.layout().init(runtime, from, to);
    }

    fn points(&self) -> Vec<(PointId, AnyAnchor)> {
        self.layout().points()
    }

    fn outline(&self, runtime: &dyn Runtime) -> Option<Outline> {
        self.layout().outline(runtime)
    }
}

impl Drawable for RectangleForm {
    fn get_path(&self, runtime: &dyn Runtime) -> Option<Path> {
        self.outline(runtime).map(|outline| outline.to_path())
    }

    fn get_shape(&self, runtime: &dyn Runtime) -> Option<Shape> {
        let path = self.get_path(runtime)?;
        Some(Shape {
            area: path,
            background: Background::Fill(Color::rgba(128, 128, 128, 128)),
            stroke: Stroke::Solid { width: 1.0, color: Color::rgba(50, 50, 50, 255) },
        })
    }
}

impl Translatable for RectangleForm {
    fn translator(&self) -> Box<dyn Translator> {
        self.layout().translator()
    }
}

impl Rotatable for RectangleForm {
    fn rotator(&self) -> Box<dyn Rotator> {
        self.layout().rotator()
    }
}

impl Scalable for RectangleForm {
    fn scaler(&self) -> Box<dyn Scaler> {
        self.layout().scaler()
    }
}

impl Morphable for RectangleForm {
    fn anchors(&self) -> Vec<(PointId, AnyAnchor)> {
        self.layout().anchors()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::params::ReadView;
    use crate::form::Form;
    use crate::procedure::Library;
    use crate::runtime::DefaultRuntime;

    fn with_rectangle(
        min: DVec2,
        max: DVec2,
        check: impl FnOnce(&mut DefaultRuntime, &RectangleForm),
    ) {
        let rect = RectangleForm::new(FormId::next(), "R");
        let mut rt = DefaultRuntime::new(Library::default());
        rt.run(100.0, 100.0, |rt| {
            rt.declare(&Form::from(rect.clone()));
            rect.init(rt, min, max);
            check(rt, &rect);
        });
    }

    #[test]
    fn init_from_min_max() {
        with_rectangle(DVec2::ZERO, DVec2::new(10.0, 4.0), |rt, rect| {
            assert_eq!(rect.center().get(rt), Some(DVec2::new(5.0, 2.0)));
            assert_eq!(rect.width().get(rt), Some(Length(10.0)));
            assert_eq!(rect.height().get(rt), Some(Length(4.0)));
            assert_eq!(rect.angle().get(rt), Some(Angle::ZERO));
        });
    }

    #[test]
    fn init_from_swapped_corners_keeps_sizes_positive() {
        with_rectangle(DVec2::new(10.0, 4.0), DVec2::ZERO, |rt, rect| {
            assert_eq!(rect.width().get(rt), Some(Length(10.0)));
            assert_eq!(rect.height().get(rt), Some(Length(4.0)));
        });
    }

    #[test]
    fn top_right_drag_keeps_bottom_left() {
        with_rectangle(DVec2::ZERO, DVec2::new(10.0, 4.0), |rt, rect| {
            assert_eq!(rect.anchor(Side::TopRight).position(rt), Some(DVec2::new(10.0, 0.0)));

            rect.anchor(Side::TopRight).translate(rt, DVec2::new(2.0, 0.0));

            assert_eq!(rect.width().get(rt), Some(Length(12.0)));
            assert_eq!(rect.height().get(rt), Some(Length(4.0)));
            assert_eq!(rect.center().get(rt), Some(DVec2::new(6.0, 2.0)));
            assert_eq!(rect.anchor(Side::BottomLeft).position(rt), Some(DVec2::new(0.0, 4.0)));
        });
    }

    #[test]
    fn outline_is_clockwise_from_top_left() {
        with_rectangle(DVec2::ZERO, DVec2::new(10.0, 4.0), |rt, rect| {
            let Some(Outline::Polygon(corners)) = rect.outline(rt) else {
                panic!("rectangle outline should be a polygon");
            };
            assert_eq!(
                corners,
                vec![
                    DVec2::new(0.0, 0.0),
                    DVec2::new(10.0, 0.0),
                    DVec2::new(10.0, 4.0),
                    DVec2::new(0.0, 4.0),
                ]
            );
        });
    }

    #[test]
    fn uninitialized_rectangle_has_no_shape() {
        let rect = RectangleForm::new(FormId::next(), "R");
        let mut rt = DefaultRuntime::new(Library::default());
        rt.run(100.0, 100.0, |rt| {
            rt.declare(&Form::from(rect.clone()));
            assert!(rect.get_shape(rt).is_none());
            assert!(rect.anchor(Side::Top).position(rt).is_none());
        });
    }

    #[test]
    fn exposes_eight_anchors_and_center() {
        let rect = RectangleForm::new(FormId::next(), "R");
        assert_eq!(rect.anchors().len(), 8);
        assert_eq!(rect.points().len(), 9);
        assert!(rect.point(PointId::Center).is_some());
        assert!(rect.anchor_for(PointId::Center).is_none(), "center is not a morph anchor");
    }
}
