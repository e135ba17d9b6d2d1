//! Forms: parametric shapes backed by runtime memory
//!
//! A form owns no geometry of its own. It knows its id, its slot layout and
//! how to build views, anchors and transformers over those slots; every
//! position it reports is recomputed from the runtime on each call.
//!
//! - `params`: typed views onto parameter slots
//! - `anchor`: editable feature points derived from views
//! - `rectangle`, `circle`, `line`, `picture`: the form kinds

pub mod anchor;
pub mod circle;
pub mod line;
pub mod params;
pub mod picture;
pub mod rectangle;

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use enum_dispatch::enum_dispatch;
use glam::DVec2;

use crate::graphics::{Path, Shape};
use crate::runtime::Runtime;
use crate::transform::{Morphable, Rotatable, Rotator, Scalable, Scaler, Translatable, Translator};

pub use anchor::{Anchor, AnyAnchor, BoxAnchor, MidpointAnchor, PointAnchor, RadiusAnchor, Side};
pub use circle::CircleForm;
pub use line::LineForm;
pub use params::{ReadView, StaticAngle, StaticLength, StaticPoint, ViewKey, ViewKind, WriteView};
pub use picture::PictureForm;
pub use rectangle::{BoxLayout, RectangleForm};

/// Process-unique identifier of a form
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FormId(u64);

static FORM_COUNTER: AtomicU64 = AtomicU64::new(1);

impl FormId {
    /// Allocate a fresh id, never handed out before in this process
    pub fn next() -> Self {
        Self(FORM_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for FormId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Whether a form ends up in the output or only helps construct other forms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrawingMode {
    #[default]
    Draw,
    Guide,
}

/// Named points a form can expose. Each kind exposes a subset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointId {
    TopLeft,
    BottomLeft,
    TopRight,
    BottomRight,
    Top,
    Bottom,
    Left,
    Right,
    Center,
    Start,
    End,
}

impl PointId {
    pub const ALL: [PointId; 11] = [
        PointId::TopLeft,
        PointId::BottomLeft,
        PointId::TopRight,
        PointId::BottomRight,
        PointId::Top,
        PointId::Bottom,
        PointId::Left,
        PointId::Right,
        PointId::Center,
        PointId::Start,
        PointId::End,
    ];

    /// Human readable label
    pub fn label(self) -> &'static str {
        match self {
            PointId::TopLeft => "Top Left",
            PointId::BottomLeft => "Bottom Left",
            PointId::TopRight => "Top Right",
            PointId::BottomRight => "Bottom Right",
            PointId::Top => "Top",
            PointId::Bottom => "Bottom",
            PointId::Left => "Left",
            PointId::Right => "Right",
            PointId::Center => "Center",
            PointId::Start => "Start",
            PointId::End => "End",
        }
    }

    /// Name used by drawing scripts (`A.top_left`)
    pub fn ident(self) -> &'static str {
        match self {
            PointId::TopLeft => "top_left",
            PointId::BottomLeft => "bottom_left",
            PointId::TopRight => "top_right",
            PointId::BottomRight => "bottom_right",
            PointId::Top => "top",
            PointId::Bottom => "bottom",
            PointId::Left => "left",
            PointId::Right => "right",
            PointId::Center => "center",
            PointId::Start => "start",
            PointId::End => "end",
        }
    }

    pub fn from_ident(name: &str) -> Option<PointId> {
        Self::ALL.into_iter().find(|p| p.ident() == name)
    }
}

impl fmt::Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Resolved outline of a form, used for drawing and hit testing
#[derive(Debug, Clone, PartialEq)]
pub enum Outline {
    /// Closed polygon through the given corners
    Polygon(Vec<DVec2>),
    /// Open polyline
    Polyline(Vec<DVec2>),
    Circle { center: DVec2, radius: f64 },
}

impl Outline {
    pub fn to_path(&self) -> Path {
        match self {
            Outline::Polygon(points) => Path::polygon(points),
            Outline::Polyline(points) => Path::polyline(points),
            Outline::Circle { center, radius } => Path::circle(*center, *radius),
        }
    }
}

/// Common behavior for all forms
#[enum_dispatch]
pub trait FormBehavior {
    fn id(&self) -> FormId;

    fn name(&self) -> &str;

    fn drawing_mode(&self) -> DrawingMode;

    /// Number of parameter slots this form occupies
    fn slot_count(&self) -> usize;

    /// Write initial parameters spanning `from` → `to`
    fn init(&self, runtime: &mut dyn Runtime, from: DVec2, to: DVec2);

    /// Every named point, including those that are not morph anchors
    fn points(&self) -> Vec<(PointId, AnyAnchor)>;

    fn outline(&self, runtime: &dyn Runtime) -> Option<Outline>;

    fn point(&self, id: PointId) -> Option<AnyAnchor> {
        self.points().into_iter().find(|(p, _)| *p == id).map(|(_, a)| a)
    }
}

/// Output side of a form
#[enum_dispatch]
pub trait Drawable {
    fn get_path(&self, runtime: &dyn Runtime) -> Option<Path>;

    fn get_shape(&self, runtime: &dyn Runtime) -> Option<Shape>;
}

/// Every form kind the runtime knows about
#[enum_dispatch(FormBehavior, Drawable, Translatable, Rotatable, Scalable, Morphable)]
#[derive(Debug, Clone, PartialEq)]
pub enum Form {
    Rectangle(RectangleForm),
    Circle(CircleForm),
    Line(LineForm),
    Picture(PictureForm),
}
