//! Drawable output: paths, styled shapes and captured pictures.
//!
//! Forms produce `Shape`s; evaluating a drawing collects them into a
//! `Picture`. Rasterising is someone else's job; paths print as SVG path
//! data for whoever does it.

use std::fmt::{self, Write as _};

use glam::{DAffine2, DVec2};

use crate::runtime::Canvas;

/// Format a coordinate for output: six decimals at most, no trailing zeros,
/// no negative zero.
pub(crate) fn fmt_num(value: f64) -> String {
    let rounded = (value * 1e6).round() / 1e6;
    if rounded == 0.0 {
        "0".to_string()
    } else {
        format!("{rounded}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    MoveTo(DVec2),
    LineTo(DVec2),
    /// Clockwise circular arc from the current point
    ArcTo { radius: f64, to: DVec2 },
    Close,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    segments: Vec<Segment>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(mut self, p: DVec2) -> Self {
        self.segments.push(Segment::MoveTo(p));
        self
    }

    pub fn line_to(mut self, p: DVec2) -> Self {
        self.segments.push(Segment::LineTo(p));
        self
    }

    pub fn arc_to(mut self, radius: f64, to: DVec2) -> Self {
        self.segments.push(Segment::ArcTo { radius, to });
        self
    }

    pub fn close(mut self) -> Self {
        self.segments.push(Segment::Close);
        self
    }

    /// Open path through `points`
    pub fn polyline(points: &[DVec2]) -> Self {
        let mut path = Self::new();
        for (i, p) in points.iter().enumerate() {
            path = if i == 0 { path.move_to(*p) } else { path.line_to(*p) };
        }
        path
    }

    /// Closed path through `points`
    pub fn polygon(points: &[DVec2]) -> Self {
        if points.is_empty() {
            return Self::new();
        }
        Self::polyline(points).close()
    }

    /// Full circle as two half arcs, starting at the leftmost point
    pub fn circle(center: DVec2, radius: f64) -> Self {
        let r = radius.abs();
        let left = center - DVec2::new(r, 0.0);
        let right = center + DVec2::new(r, 0.0);
        Self::new().move_to(left).arc_to(r, right).arc_to(r, left).close()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Apply a similarity transform. Arc radii scale with the transform's
    /// area factor, so non-uniform scales only approximate circles.
    pub fn transformed(&self, affine: &DAffine2) -> Self {
        let radius_scale = affine.matrix2.determinant().abs().sqrt();
        let segments = self
            .segments
            .iter()
            .map(|segment| match *segment {
                Segment::MoveTo(p) => Segment::MoveTo(affine.transform_point2(p)),
                Segment::LineTo(p) => Segment::LineTo(affine.transform_point2(p)),
                Segment::ArcTo { radius, to } => Segment::ArcTo {
                    radius: radius * radius_scale,
                    to: affine.transform_point2(to),
                },
                Segment::Close => Segment::Close,
            })
            .collect();
        Self { segments }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_char(' ')?;
            }
            match segment {
                Segment::MoveTo(p) => write!(f, "M {} {}", fmt_num(p.x), fmt_num(p.y))?,
                Segment::LineTo(p) => write!(f, "L {} {}", fmt_num(p.x), fmt_num(p.y))?,
                Segment::ArcTo { radius, to } => {
                    let r = fmt_num(*radius);
                    write!(f, "A {r} {r} 0 0 1 {} {}", fmt_num(to.x), fmt_num(to.y))?
                }
                Segment::Close => f.write_char('Z')?,
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Background {
    #[default]
    None,
    Fill(Color),
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Stroke {
    #[default]
    None,
    Solid { width: f64, color: Color },
}

/// A path with its styling
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub area: Path,
    pub background: Background,
    pub stroke: Stroke,
}

impl Shape {
    pub fn transformed(&self, affine: &DAffine2) -> Self {
        Self {
            area: self.area.transformed(affine),
            background: self.background,
            stroke: self.stroke,
        }
    }
}

/// Shapes captured from one drawing evaluation, in drawing coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct Picture {
    pub canvas: Canvas,
    pub shapes: Vec<Shape>,
}

impl Picture {
    pub fn new(canvas: Canvas) -> Self {
        Self {
            canvas,
            shapes: Vec::new(),
        }
    }

    pub fn push(&mut self, shape: Shape) {
        self.shapes.push(shape);
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Append another picture's shapes, mapped through `placement`
    pub fn embed(&mut self, other: &Picture, placement: &DAffine2) {
        self.shapes
            .extend(other.shapes.iter().map(|shape| shape.transformed(placement)));
    }
}
