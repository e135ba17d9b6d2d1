//! Picture form: a box that shows another drawing.
//!
//! Same slot layout and anchors as a rectangle. Its content is produced by
//! a runtime sub-call when the enclosing scope is captured; the form itself
//! only draws its frame.

use glam::{DAffine2, DVec2};

use crate::graphics::{Background, Color, Path, Shape, Stroke};
use crate::procedure::DrawingId;
use crate::runtime::{Canvas, DataSet, Runtime};
use crate::transform::{Morphable, Rotatable, Rotator, Scalable, Scaler, Translatable, Translator};
use crate::types::Angle;

use super::anchor::{AnyAnchor, BoxAnchor, Side};
use super::params::{ReadView, StaticAngle, StaticLength, StaticPoint};
use super::rectangle::BoxLayout;
use super::{DrawingMode, Drawable, FormBehavior, FormId, Outline, PointId};

#[derive(Debug, Clone, PartialEq)]
pub struct PictureForm {
    pub id: FormId,
    pub name: String,
    pub mode: DrawingMode,
    /// Drawing shown inside the frame
    pub drawing: DrawingId,
    /// Scale the drawing's native canvas into the frame instead of
    /// evaluating it at the frame's size
    pub fit: bool,
    pub data: DataSet,
}

/// Resolved frame of a picture form
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub center: DVec2,
    pub width: f64,
    pub height: f64,
    pub angle: Angle,
}

impl Frame {
    /// Maps canvas coordinates (origin top left) into the frame
    pub fn placement(&self, canvas: Canvas, fit: bool) -> DAffine2 {
        let frame = DAffine2::from_translation(self.center) * DAffine2::from_angle(self.angle.0);
        let scale = if fit { canvas.fit_scale(self.width, self.height) } else { 1.0 };
        frame
            * DAffine2::from_scale(DVec2::splat(scale))
            * DAffine2::from_translation(-canvas.size() / 2.0)
    }
}

impl PictureForm {
    pub fn new(id: FormId, name: impl Into<String>, drawing: DrawingId) -> Self {
        Self {
            id,
            name: name.into(),
            mode: DrawingMode::Draw,
            drawing,
            fit: false,
            data: DataSet::default(),
        }
    }

    pub fn with_fit(mut self, fit: bool) -> Self {
        self.fit = fit;
        self
    }

    pub fn with_data(mut self, data: DataSet) -> Self {
        self.data = data;
        self
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

    pub fn frame(&self, runtime: &dyn Runtime) -> Option<Frame> {
        Some(Frame {
            center: self.center().get(runtime)?,
            width: self.width().get(runtime)?.0.abs(),
            height: self.height().get(runtime)?.0.abs(),
            angle: self.angle().get(runtime)?,
        })
    }
}

impl FormBehavior for PictureForm {
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

impl Drawable for PictureForm {
    fn get_path(&self, runtime: &dyn Runtime) -> Option<Path> {
        self.outline(runtime).map(|outline| outline.to_path())
    }

    fn get_shape(&self, runtime: &dyn Runtime) -> Option<Shape> {
        Some(Shape {
            area: self.get_path(runtime)?,
            background: Background::None,
            stroke: Stroke::Solid { width: 0.5, color: Color::rgba(50, 50, 50, 128) },
        })
    }
}

impl Translatable for PictureForm {
    fn translator(&self) -> Box<dyn Translator> {
        self.layout().translator()
    }
}

impl Rotatable for PictureForm {
    fn rotator(&self) -> Box<dyn Rotator> {
        self.layout().rotator()
    }
}

impl Scalable for PictureForm {
    fn scaler(&self) -> Box<dyn Scaler> {
        self.layout().scaler()
    }
}

impl Morphable for PictureForm {
    fn anchors(&self) -> Vec<(PointId, AnyAnchor)> {
        self.layout().anchors()
    }
}
