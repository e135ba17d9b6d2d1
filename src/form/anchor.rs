//! Anchors: editable feature points computed from parameter views.
//!
//! Reading an anchor derives a position from the form's parameters.
//! Translating it (a drag) solves for parameter values that keep the
//! anchor's fixed point where it was. All backing parameters are read before
//! anything is written, so one drag is consistent with itself.

use enum_dispatch::enum_dispatch;
use glam::DVec2;

use crate::log::trace;
use crate::runtime::Runtime;
use crate::types::{Length, project, rotate};

use super::params::{ReadView, StaticAngle, StaticLength, StaticPoint, WriteView};
use super::PointId;

/// A derived, draggable point of a form
#[enum_dispatch]
pub trait Anchor {
    fn name(&self) -> &'static str;

    /// Current position, or `None` if any backing parameter is absent
    fn position(&self, runtime: &dyn Runtime) -> Option<DVec2>;

    /// Drag the anchor by `delta`; does nothing when a parameter is absent
    fn translate(&self, runtime: &mut dyn Runtime, delta: DVec2);
}

#[enum_dispatch(Anchor)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnyAnchor {
    Box(BoxAnchor),
    Radius(RadiusAnchor),
    Point(PointAnchor),
    Midpoint(MidpointAnchor),
}

/// One of the eight features of a rotated box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Top,
    Bottom,
    Left,
    Right,
}

impl Side {
    pub const CORNERS: [Side; 4] = [
        Side::TopLeft,
        Side::TopRight,
        Side::BottomRight,
        Side::BottomLeft,
    ];
    pub const EDGES: [Side; 4] = [Side::Top, Side::Right, Side::Bottom, Side::Left];
    pub const ALL: [Side; 8] = [
        Side::TopLeft,
        Side::BottomLeft,
        Side::TopRight,
        Side::BottomRight,
        Side::Top,
        Side::Bottom,
        Side::Left,
        Side::Right,
    ];

    /// Horizontal unit offset from the center
    pub fn x(self) -> i8 {
        match self {
            Side::Left | Side::TopLeft | Side::BottomLeft => -1,
            Side::Right | Side::TopRight | Side::BottomRight => 1,
            Side::Top | Side::Bottom => 0,
        }
    }

    /// Vertical unit offset from the center (top is -1)
    pub fn y(self) -> i8 {
        match self {
            Side::Top | Side::TopLeft | Side::TopRight => -1,
            Side::Bottom | Side::BottomLeft | Side::BottomRight => 1,
            Side::Left | Side::Right => 0,
        }
    }

    pub fn is_corner(self) -> bool {
        self.x() != 0 && self.y() != 0
    }

    pub fn unit(self) -> DVec2 {
        DVec2::new(f64::from(self.x()), f64::from(self.y()))
    }

    pub fn opposite(self) -> Side {
        match self {
            Side::TopLeft => Side::BottomRight,
            Side::TopRight => Side::BottomLeft,
            Side::BottomLeft => Side::TopRight,
            Side::BottomRight => Side::TopLeft,
            Side::Top => Side::Bottom,
            Side::Bottom => Side::Top,
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    pub fn point_id(self) -> PointId {
        match self {
            Side::TopLeft => PointId::TopLeft,
            Side::TopRight => PointId::TopRight,
            Side::BottomLeft => PointId::BottomLeft,
            Side::BottomRight => PointId::BottomRight,
            Side::Top => PointId::Top,
            Side::Bottom => PointId::Bottom,
            Side::Left => PointId::Left,
            Side::Right => PointId::Right,
        }
    }
}

/// Corner or edge midpoint of a box described by center, size and rotation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxAnchor {
    pub side: Side,
    pub center: StaticPoint,
    pub rotation: StaticAngle,
    pub width: StaticLength,
    pub height: StaticLength,
}

impl Anchor for BoxAnchor {
    fn name(&self) -> &'static str {
        self.side.point_id().label()
    }

    fn position(&self, runtime: &dyn Runtime) -> Option<DVec2> {
        let c = self.center.get(runtime)?;
        let angle = self.rotation.get(runtime)?;
        let w = self.width.get(runtime)?;
        let h = self.height.get(runtime)?;

        Some(c + rotate(self.side.unit() * DVec2::new(w.0, h.0) / 2.0, angle))
    }

    fn translate(&self, runtime: &mut dyn Runtime, delta: DVec2) {
        let (Some(angle), Some(width), Some(height), Some(center)) = (
            self.rotation.get(runtime),
            self.width.get(runtime),
            self.height.get(runtime),
            self.center.get(runtime),
        ) else {
            return;
        };

        let (sx, sy) = (f64::from(self.side.x()), f64::from(self.side.y()));
        let offset = rotate(DVec2::new(sx * width.0, sy * height.0) / 2.0, angle);

        let old = center + offset;
        let opposite = center - offset;

        let constrained = if self.side.is_corner() {
            delta
        } else {
            match project(delta, offset) {
                Some(along_normal) => along_normal,
                None => {
                    trace!(side = ?self.side, "edge of a collapsed box, drag ignored");
                    return;
                }
            }
        };

        let new = old + constrained;
        let new_center = (opposite + new) / 2.0;
        let half = rotate(new - new_center, -angle);

        let new_width = width.0 + sx * (2.0 * half.x - sx * width.0);
        let new_height = height.0 + sy * (2.0 * half.y - sy * height.0);

        self.center.set(runtime, new_center);
        self.width.set(runtime, Length(new_width));
        self.height.set(runtime, Length(new_height));
    }
}

/// A point on a circle at a fixed direction in the circle's own frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadiusAnchor {
    pub side: Side,
    pub center: StaticPoint,
    pub radius: StaticLength,
    pub rotation: StaticAngle,
}

impl Anchor for RadiusAnchor {
    fn name(&self) -> &'static str {
        self.side.point_id().label()
    }

    fn position(&self, runtime: &dyn Runtime) -> Option<DVec2> {
        let c = self.center.get(runtime)?;
        let r = self.radius.get(runtime)?;
        let angle = self.rotation.get(runtime)?;

        Some(c + rotate(self.side.unit() * r.0, angle))
    }

    fn translate(&self, runtime: &mut dyn Runtime, delta: DVec2) {
        let (Some(c), Some(r), Some(angle)) = (
            self.center.get(runtime),
            self.radius.get(runtime),
            self.rotation.get(runtime),
        ) else {
            return;
        };

        let offset = rotate(self.side.unit() * r.0, angle);
        let Some(along_radius) = project(delta, offset) else {
            trace!("drag on a zero radius circle ignored");
            return;
        };

        let new = c + offset + along_radius;
        self.radius.set(runtime, Length((new - c).length()));
    }
}

/// A point stored directly in memory; dragging moves it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointAnchor {
    pub id: PointId,
    pub point: StaticPoint,
}

impl Anchor for PointAnchor {
    fn name(&self) -> &'static str {
        self.id.label()
    }

    fn position(&self, runtime: &dyn Runtime) -> Option<DVec2> {
        self.point.get(runtime)
    }

    fn translate(&self, runtime: &mut dyn Runtime, delta: DVec2) {
        if let Some(p) = self.point.get(runtime) {
            self.point.set(runtime, p + delta);
        }
    }
}

/// Midpoint of two stored points; dragging moves both
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MidpointAnchor {
    pub a: StaticPoint,
    pub b: StaticPoint,
}

impl Anchor for MidpointAnchor {
    fn name(&self) -> &'static str {
        PointId::Center.label()
    }

    fn position(&self, runtime: &dyn Runtime) -> Option<DVec2> {
        Some((self.a.get(runtime)? + self.b.get(runtime)?) / 2.0)
    }

    fn translate(&self, runtime: &mut dyn Runtime, delta: DVec2) {
        let (Some(a), Some(b)) = (self.a.get(runtime), self.b.get(runtime)) else {
            return;
        };
        self.a.set(runtime, a + delta);
        self.b.set(runtime, b + delta);
    }
}
