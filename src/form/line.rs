//! Line form. Layout: start (slots 0-1), end (2-3).

use glam::DVec2;

use crate::graphics::{Background, Color, Path, Shape, Stroke};
use crate::runtime::Runtime;
use crate::transform::{
    Morphable, PointRotator, PointScaler, PointTranslator, Rotatable, Rotator, Scalable, Scaler,
    Translatable, Translator,
};

use super::anchor::{AnyAnchor, MidpointAnchor, PointAnchor};
use super::params::{ReadView, StaticPoint, WriteView};
use super::{DrawingMode, Drawable, FormBehavior, FormId, Outline, PointId};

#[derive(Debug, Clone, PartialEq)]
pub struct LineForm {
    pub id: FormId,
    pub name: String,
    pub mode: DrawingMode,
}

impl LineForm {
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

    pub fn start(&self) -> StaticPoint {
        StaticPoint::new(self.id, 0)
    }

    pub fn end(&self) -> StaticPoint {
        StaticPoint::new(self.id, 2)
    }
}

impl FormBehavior for LineForm {
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

    fn init(&self, runtime: &mut dyn Runtime, from: DVec2, to: DVec2) {
        self.start().set(runtime, from);
        self.end().set(runtime, to);
    }

    fn points(&self) -> Vec<(PointId, AnyAnchor)> {
        let mut points = self.anchors();
        points.push((
            PointId::Center,
            MidpointAnchor { a: self.start(), b: self.end() }.into(),
        ));
        points
    }

    fn outline(&self, runtime: &dyn Runtime) -> Option<Outline> {
        Some(Outline::Polyline(vec![self.start().get(runtime)?, self.end().get(runtime)?]))
    }
}

impl Drawable for LineForm {
    fn get_path(&self, runtime: &dyn Runtime) -> Option<Path> {
        self.outline(runtime).map(|outline| outline.to_path())
    }

    fn get_shape(&self, runtime: &dyn Runtime) -> Option<Shape> {
        Some(Shape {
            area: self.get_path(runtime)?,
            background: Background::None,
            stroke: Stroke::Solid { width: 1.0, color: Color::rgba(50, 50, 50, 255) },
        })
    }
}

impl Translatable for LineForm {
    fn translator(&self) -> Box<dyn Translator> {
        Box::new(PointTranslator::new(vec![self.start(), self.end()]))
    }
}

impl Rotatable for LineForm {
    fn rotator(&self) -> Box<dyn Rotator> {
        Box::new(PointRotator::new(vec![self.start(), self.end()]))
    }
}

impl Scalable for LineForm {
    fn scaler(&self) -> Box<dyn Scaler> {
        Box::new(PointScaler::new(vec![self.start(), self.end()]))
    }
}

impl Morphable for LineForm {
    fn anchors(&self) -> Vec<(PointId, AnyAnchor)> {
        vec![
            (PointId::Start, PointAnchor { id: PointId::Start, point: self.start() }.into()),
            (PointId::End, PointAnchor { id: PointId::End, point: self.end() }.into()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::anchor::Anchor;
    use crate::form::Form;
    use crate::procedure::Library;
    use crate::runtime::DefaultRuntime;

    #[test]
    fn center_drag_moves_both_ends() {
        let line = LineForm::new(FormId::next(), "L");
        let mut rt = DefaultRuntime::new(Library::default());
        rt.run(100.0, 100.0, |rt| {
            rt.declare(&Form::from(line.clone()));
            line.init(rt, DVec2::new(0.0, 0.0), DVec2::new(4.0, 2.0));

            let center = line.point(PointId::Center).unwrap();
            assert_eq!(center.position(rt), Some(DVec2::new(2.0, 1.0)));

            center.translate(rt, DVec2::new(1.0, 1.0));
            assert_eq!(line.start().get(rt), Some(DVec2::new(1.0, 1.0)));
            assert_eq!(line.end().get(rt), Some(DVec2::new(5.0, 3.0)));
        });
    }

    #[test]
    fn line_path_is_open() {
        let line = LineForm::new(FormId::next(), "L");
        let mut rt = DefaultRuntime::new(Library::default());
        rt.run(100.0, 100.0, |rt| {
            rt.declare(&Form::from(line.clone()));
            line.init(rt, DVec2::new(0.0, 0.0), DVec2::new(4.0, 2.0));
            let path = line.get_path(rt).unwrap();
            assert_eq!(path.to_string(), "M 0 0 L 4 2");
        });
    }
}
