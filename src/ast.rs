//! Abstract Syntax Tree types for drawing scripts
//!
//! Names keep their source spans so lowering can point at them in
//! diagnostics. Numbers are already validated as finite and angles are in
//! radians.

use glam::DVec2;
use miette::SourceSpan;

/// A parsed script: one or more drawings
#[derive(Debug, Clone)]
pub struct Document {
    pub drawings: Vec<DrawingDef>,
}

/// A name as written in the source
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: String,
    pub span: SourceSpan,
}

/// `drawing name W x H { ... }`
#[derive(Debug, Clone)]
pub struct DrawingDef {
    pub name: Ident,
    pub width: f64,
    pub height: f64,
    pub body: Vec<Statement>,
}

#[derive(Debug, Clone)]
pub enum Statement {
    /// `A = [guide] rect from P to Q`
    Create(CreateStmt),
    /// `P = [guide] picture of name [fit] from P to Q [with { k = v }]`
    Picture(PictureStmt),
    /// `morph A.point by (dx, dy)` or `morph A.point to P`
    Morph { point: PointRef, motion: MotionExpr },
    /// `move A by (dx, dy)` or `move A to P`
    Move { form: Ident, motion: MotionExpr },
    /// `rotate A by 30 deg [around P]`
    Rotate { form: Ident, angle: f64, around: Option<TargetExpr> },
    /// `scale A by 2 [along (x, y)] [around P]`
    Scale {
        form: Ident,
        factor: f64,
        along: Option<DVec2>,
        around: Option<TargetExpr>,
    },
    /// `repeat N { ... }`
    Repeat { count: CountExpr, body: Vec<Statement> },
    /// `group { ... }`
    Group { body: Vec<Statement> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Rect,
    Circle,
    Line,
}

#[derive(Debug, Clone)]
pub struct CreateStmt {
    pub name: Ident,
    pub guide: bool,
    pub kind: ShapeKind,
    pub from: TargetExpr,
    pub to: TargetExpr,
}

#[derive(Debug, Clone)]
pub struct PictureStmt {
    pub name: Ident,
    pub guide: bool,
    pub drawing: Ident,
    pub fit: bool,
    pub from: TargetExpr,
    pub to: TargetExpr,
    pub data: Vec<(Ident, f64)>,
}

/// `owner.point`, where owner is a form name or `canvas`
#[derive(Debug, Clone, PartialEq)]
pub struct PointRef {
    pub owner: Ident,
    pub point: Ident,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TargetExpr {
    Vector(DVec2),
    Point(PointRef),
}

#[derive(Debug, Clone, PartialEq)]
pub enum MotionExpr {
    By(DVec2),
    To(TargetExpr),
}

#[derive(Debug, Clone, PartialEq)]
pub enum CountExpr {
    Literal(usize),
    /// Read from the data set at evaluation time
    Data(Ident),
}
