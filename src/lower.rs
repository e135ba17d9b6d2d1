//! Lower a parsed document into a `Library` of procedures.
//!
//! Names are resolved here, so a procedure only holds ids. Form names are
//! lexically scoped: a form created inside `group` or `repeat` is not
//! visible after the block, matching when the runtime releases it.
//! Drawings may refer to each other in any order, including themselves.

use std::collections::HashMap;

use glam::DVec2;

use crate::ast::{
    CountExpr, CreateStmt, Document, DrawingDef, Ident, MotionExpr, PictureStmt, PointRef,
    ShapeKind, Statement, TargetExpr,
};
use crate::errors::{ParseError, SourceContext};
use crate::form::{
    CircleForm, DrawingMode, Form, FormBehavior, FormId, LineForm, PictureForm, PointId,
    RectangleForm, Side,
};
use crate::procedure::{
    Count, DrawingId, Instruction, InstructionId, Library, Motion, Node, Procedure, Target,
};
use crate::runtime::{Canvas, DataSet};
use crate::transform::Morphable;
use crate::types::Angle;

/// Build a library from a document. Drawing ids follow document order.
pub fn lower(document: &Document, ctx: &SourceContext) -> Result<Library, ParseError> {
    if document.drawings.is_empty() {
        return Err(ParseError::EmptyDocument);
    }

    let mut drawings: HashMap<&str, DrawingId> = HashMap::new();
    for (index, def) in document.drawings.iter().enumerate() {
        if drawings.contains_key(def.name.name.as_str()) {
            return Err(ParseError::DuplicateDrawing {
                name: def.name.name.clone(),
                src: ctx.named_source(),
                span: def.name.span,
            });
        }
        drawings.insert(def.name.name.as_str(), DrawingId(index as u32));
    }

    let mut library = Library::default();
    for def in &document.drawings {
        let procedure = Lowerer::new(ctx, &drawings).drawing(def)?;
        library.insert(def.name.name.clone(), Canvas::new(def.width, def.height), procedure);
    }
    Ok(library)
}

struct Lowerer<'a> {
    ctx: &'a SourceContext,
    drawings: &'a HashMap<&'a str, DrawingId>,
    /// Visible forms, innermost block last
    scopes: Vec<HashMap<String, Form>>,
}

impl<'a> Lowerer<'a> {
    fn new(ctx: &'a SourceContext, drawings: &'a HashMap<&'a str, DrawingId>) -> Self {
        Self {
            ctx,
            drawings,
            scopes: Vec::new(),
        }
    }

    fn drawing(&mut self, def: &DrawingDef) -> Result<Procedure, ParseError> {
        Ok(Procedure::new(self.block(&def.body)?))
    }

    fn block(&mut self, body: &[Statement]) -> Result<Vec<Node>, ParseError> {
        self.scopes.push(HashMap::new());
        let nodes = body.iter().map(|stmt| self.statement(stmt)).collect();
        self.scopes.pop();
        nodes
    }

    fn statement(&mut self, stmt: &Statement) -> Result<Node, ParseError> {
        let instruction = match stmt {
            Statement::Create(create) => self.create(create)?,
            Statement::Picture(picture) => self.picture(picture)?,
            Statement::Morph { point, motion } => {
                let form = self.form(&point.owner)?;
                let anchor = self.point_of(&form, &point.point, true)?;
                Instruction::Morph {
                    form: form.id(),
                    anchor,
                    motion: self.motion(motion)?,
                }
            }
            Statement::Move { form, motion } => Instruction::Translate {
                form: self.form(form)?.id(),
                motion: self.motion(motion)?,
            },
            Statement::Rotate { form, angle, around } => {
                let id = self.form(form)?.id();
                Instruction::Rotate {
                    form: id,
                    angle: Angle::from_radians(*angle),
                    pivot: self.pivot(id, around.as_ref())?,
                }
            }
            Statement::Scale { form, factor, along, around } => {
                let id = self.form(form)?.id();
                Instruction::Scale {
                    form: id,
                    factor: *factor,
                    axis: along.unwrap_or(DVec2::ZERO),
                    pivot: self.pivot(id, around.as_ref())?,
                }
            }
            Statement::Repeat { count, body } => {
                let count = match count {
                    CountExpr::Literal(n) => Count::Fixed(*n),
                    CountExpr::Data(key) => Count::Data(key.name.clone()),
                };
                return Ok(Node::Repeat {
                    id: InstructionId::next(),
                    count,
                    children: self.block(body)?,
                });
            }
            Statement::Group { body } => {
                return Ok(Node::Group {
                    id: InstructionId::next(),
                    children: self.block(body)?,
                });
            }
        };
        Ok(Node::instruction(instruction))
    }

    fn create(&mut self, stmt: &CreateStmt) -> Result<Instruction, ParseError> {
        let from = self.target(&stmt.from)?;
        let to = self.target(&stmt.to)?;
        let id = FormId::next();
        let mode = if stmt.guide { DrawingMode::Guide } else { DrawingMode::Draw };
        let name = stmt.name.name.clone();
        let form: Form = match stmt.kind {
            ShapeKind::Rect => RectangleForm::new(id, name).with_mode(mode).into(),
            ShapeKind::Circle => CircleForm::new(id, name).with_mode(mode).into(),
            ShapeKind::Line => LineForm::new(id, name).with_mode(mode).into(),
        };
        self.define(&stmt.name, form.clone())?;
        Ok(Instruction::Create { form, from, to })
    }

    fn picture(&mut self, stmt: &PictureStmt) -> Result<Instruction, ParseError> {
        let drawing = self.drawings.get(stmt.drawing.name.as_str()).copied().ok_or_else(|| {
            ParseError::UnknownDrawing {
                name: stmt.drawing.name.clone(),
                src: self.ctx.named_source(),
                span: stmt.drawing.span,
            }
        })?;
        let from = self.target(&stmt.from)?;
        let to = self.target(&stmt.to)?;
        let data: DataSet = stmt
            .data
            .iter()
            .map(|(key, value)| (key.name.clone(), *value))
            .collect();
        let mode = if stmt.guide { DrawingMode::Guide } else { DrawingMode::Draw };

        let form: Form = PictureForm::new(FormId::next(), stmt.name.name.clone(), drawing)
            .with_fit(stmt.fit)
            .with_data(data)
            .with_mode(mode)
            .into();
        self.define(&stmt.name, form.clone())?;
        Ok(Instruction::Create { form, from, to })
    }

    fn define(&mut self, name: &Ident, form: Form) -> Result<(), ParseError> {
        if self.lookup(&name.name).is_some() {
            return Err(ParseError::DuplicateForm {
                name: name.name.clone(),
                src: self.ctx.named_source(),
                span: name.span,
            });
        }
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.name.clone(), form);
        }
        Ok(())
    }

    fn lookup(&self, name: &str) -> Option<&Form> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    fn form(&self, name: &Ident) -> Result<Form, ParseError> {
        if let Some(form) = self.lookup(&name.name) {
            return Ok(form.clone());
        }
        let mut known: Vec<&str> = self
            .scopes
            .iter()
            .flat_map(|s| s.keys().map(String::as_str))
            .collect();
        known.sort_unstable();
        Err(ParseError::UnknownForm {
            name: name.name.clone(),
            src: self.ctx.named_source(),
            span: name.span,
            suggestion: (!known.is_empty())
                .then(|| format!("forms defined here: {}", known.join(", "))),
        })
    }

    /// Resolve a point name on `form`; with `morph` only draggable anchors count
    fn point_of(&self, form: &Form, point: &Ident, morph: bool) -> Result<PointId, ParseError> {
        let available: Vec<PointId> = if morph {
            form.anchors().into_iter().map(|(id, _)| id).collect()
        } else {
            form.points().into_iter().map(|(id, _)| id).collect()
        };
        match PointId::from_ident(&point.name) {
            Some(id) if available.contains(&id) => Ok(id),
            _ => Err(self.unknown_point(form.name(), point, &available)),
        }
    }

    fn unknown_point(&self, owner: &str, point: &Ident, available: &[PointId]) -> ParseError {
        let names: Vec<&str> = available.iter().map(|p| p.ident()).collect();
        ParseError::UnknownPoint {
            form: owner.to_string(),
            name: point.name.clone(),
            src: self.ctx.named_source(),
            span: point.span,
            available: Some(format!("available: {}", names.join(", "))),
        }
    }

    fn point_ref(&self, point: &PointRef) -> Result<Target, ParseError> {
        if point.owner.name == "canvas" {
            return canvas_point(&point.point.name)
                .map(Target::Canvas)
                .ok_or_else(|| self.unknown_point("canvas", &point.point, &CANVAS_POINTS));
        }
        let form = self.form(&point.owner)?;
        let id = self.point_of(&form, &point.point, false)?;
        Ok(Target::Point { form: form.id(), point: id })
    }

    fn target(&self, target: &TargetExpr) -> Result<Target, ParseError> {
        match target {
            TargetExpr::Vector(v) => Ok(Target::Absolute(*v)),
            TargetExpr::Point(point) => self.point_ref(point),
        }
    }

    fn motion(&self, motion: &MotionExpr) -> Result<Motion, ParseError> {
        match motion {
            MotionExpr::By(delta) => Ok(Motion::By(*delta)),
            MotionExpr::To(target) => Ok(Motion::To(self.target(target)?)),
        }
    }

    /// Explicit pivot, or the form's own center
    fn pivot(&self, form: FormId, around: Option<&TargetExpr>) -> Result<Target, ParseError> {
        match around {
            Some(target) => self.target(target),
            None => Ok(Target::Point { form, point: PointId::Center }),
        }
    }
}

const CANVAS_POINTS: [PointId; 9] = [
    PointId::TopLeft,
    PointId::TopRight,
    PointId::BottomLeft,
    PointId::BottomRight,
    PointId::Top,
    PointId::Bottom,
    PointId::Left,
    PointId::Right,
    PointId::Center,
];

/// Unit offset of a named canvas point from the canvas center
fn canvas_point(name: &str) -> Option<DVec2> {
    let id = PointId::from_ident(name)?;
    if id == PointId::Center {
        return Some(DVec2::ZERO);
    }
    Side::ALL.into_iter().find(|side| side.point_id() == id).map(Side::unit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse;

    fn lower_str(source: &str) -> Result<Library, ParseError> {
        let ctx = SourceContext::new("<test>", source);
        let document = parse(&ctx)?;
        lower(&document, &ctx)
    }

    #[test]
    fn drawings_get_ids_in_order_and_may_refer_forward() {
        let library = lower_str(
            "drawing main 100 x 100 { P = picture of tile from (0,0) to (10,10) }
             drawing tile 10 x 10 { }",
        )
        .unwrap();
        assert_eq!(library.find("main"), Some(DrawingId(0)));
        assert_eq!(library.find("tile"), Some(DrawingId(1)));

        let main = library.get(DrawingId(0)).unwrap();
        let [
            Node::Instruction {
                instruction: Instruction::Create { form: Form::Picture(p), .. },
                ..
            },
        ] = main.procedure.nodes.as_slice()
        else {
            panic!("expected one picture create, got {:?}", main.procedure.nodes);
        };
        assert_eq!(p.drawing, DrawingId(1));
    }

    #[test]
    fn default_pivot_is_the_form_center() {
        let source = "drawing d 1 x 1 { A = rect from (0,0) to (1,1) rotate A by 45 deg }";
        let library = lower_str(source).unwrap();
        let nodes = &library.get(DrawingId(0)).unwrap().procedure.nodes;
        let Node::Instruction { instruction: Instruction::Rotate { form, pivot, .. }, .. } =
            &nodes[1]
        else {
            panic!("expected rotate, got {:?}", nodes[1]);
        };
        assert_eq!(*pivot, Target::Point { form: *form, point: PointId::Center });
    }

    #[test]
    fn canvas_points_resolve_to_unit_offsets() {
        assert_eq!(canvas_point("center"), Some(DVec2::ZERO));
        assert_eq!(canvas_point("bottom_right"), Some(DVec2::new(1.0, 1.0)));
        assert_eq!(canvas_point("start"), None);
    }

    #[test]
    fn unknown_form_lists_known_ones() {
        let err = lower_str("drawing d 1 x 1 { A = rect from (0,0) to (1,1) move B by (1,1) }")
            .unwrap_err();
        let ParseError::UnknownForm { name, suggestion, span, .. } = err else {
            panic!("expected unknown form, got {err:?}");
        };
        assert_eq!(name, "B");
        assert_eq!(suggestion.as_deref(), Some("forms defined here: A"));
        assert_eq!(span.len(), 1);
    }

    #[test]
    fn forms_are_scoped_to_their_block() {
        let err =
            lower_str("drawing d 1 x 1 { group { A = rect from (0,0) to (1,1) } move A by (1,1) }")
                .unwrap_err();
        assert!(matches!(err, ParseError::UnknownForm { ref name, .. } if name == "A"), "{err:?}");
    }

    #[test]
    fn duplicate_names() {
        let err = lower_str(
            "drawing d 1 x 1 { A = rect from (0,0) to (1,1) A = line from (0,0) to (1,1) }",
        )
        .unwrap_err();
        assert!(matches!(err, ParseError::DuplicateForm { .. }), "{err:?}");

        let err = lower_str("drawing d 1 x 1 { } drawing d 2 x 2 { }").unwrap_err();
        assert!(matches!(err, ParseError::DuplicateDrawing { .. }), "{err:?}");
    }

    #[test]
    fn point_names_are_checked_per_kind() {
        let err = lower_str("drawing d 1 x 1 { L = line from (0,0) to (1,1) morph L.top by (1,1) }")
            .unwrap_err();
        let ParseError::UnknownPoint { form, available, .. } = err else {
            panic!("expected unknown point, got {err:?}");
        };
        assert_eq!(form, "L");
        assert_eq!(available.as_deref(), Some("available: start, end"));

        // center is a point of a line but not a morph anchor
        let err =
            lower_str("drawing d 1 x 1 { L = line from (0,0) to (1,1) morph L.center by (1,1) }")
                .unwrap_err();
        assert!(matches!(err, ParseError::UnknownPoint { .. }), "{err:?}");
        let moved =
            lower_str("drawing d 1 x 1 { L = line from (0,0) to (1,1) move L to L.center }");
        assert!(moved.is_ok());
    }

    #[test]
    fn unknown_drawing_and_empty_document() {
        let err = lower_str("drawing d 1 x 1 { P = picture of nowhere from (0,0) to (1,1) }")
            .unwrap_err();
        assert!(
            matches!(err, ParseError::UnknownDrawing { ref name, .. } if name == "nowhere"),
            "{err:?}"
        );
        assert!(matches!(lower_str("# nothing here").unwrap_err(), ParseError::EmptyDocument));
    }
}
