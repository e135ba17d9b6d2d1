//! Instructions, procedures and the drawing library.
//!
//! A drawing is a named procedure with a native canvas. A procedure is a
//! tree of nodes: plain instructions, groups and counted repeats. Groups
//! and each repeat iteration run in their own scope; when a scope closes,
//! the shapes of the forms it declared are captured into the output
//! picture. Picture forms are captured by evaluating their drawing through
//! a sub-call and placing the result into the form's frame.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use glam::DVec2;

use crate::errors::{RuntimeError, RuntimeErrorKind};
use crate::form::{
    Anchor, Drawable, DrawingMode, Form, FormBehavior, FormId, PictureForm, PointId,
};
use crate::graphics::Picture;
use crate::log::debug;
use crate::runtime::{Canvas, DefaultRuntime, Runtime};
use crate::transform::{Morphable, Rotatable, Scalable, Translatable};
use crate::types::Angle;

/// Index of a drawing in its `Library`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DrawingId(pub u32);

impl fmt::Display for DrawingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}

/// Process-unique identifier of an instruction node
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InstructionId(u64);

static INSTRUCTION_COUNTER: AtomicU64 = AtomicU64::new(1);

impl InstructionId {
    pub fn next() -> Self {
        Self(INSTRUCTION_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for InstructionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "i{}", self.0)
    }
}

// ============================================================================
// Instructions
// ============================================================================

/// A position an instruction refers to
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Target {
    Absolute(DVec2),
    /// Named point of a visible form
    Point { form: FormId, point: PointId },
    /// Point of the current canvas: `(-1, -1)` is the top left corner,
    /// `(0, 0)` the center
    Canvas(DVec2),
}

impl Target {
    pub fn resolve(&self, runtime: &dyn Runtime) -> Result<DVec2, RuntimeErrorKind> {
        match *self {
            Target::Absolute(p) => Ok(p),
            Target::Point { form, point } => {
                let anchor = runtime
                    .get(form)
                    .ok_or(RuntimeErrorKind::UndeclaredForm(form))?
                    .point(point)
                    .ok_or(RuntimeErrorKind::UnknownAnchor { form, point })?;
                anchor
                    .position(runtime)
                    .ok_or(RuntimeErrorKind::UnresolvedPoint { form, point })
            }
            Target::Canvas(unit) => {
                let size = runtime.canvas().size();
                Ok(size / 2.0 + unit * size / 2.0)
            }
        }
    }
}

/// How far something moves: by a fixed offset, or onto a target
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Motion {
    By(DVec2),
    To(Target),
}

impl Motion {
    fn delta(&self, runtime: &dyn Runtime, from: DVec2) -> Result<DVec2, RuntimeErrorKind> {
        match self {
            Motion::By(delta) => Ok(*delta),
            Motion::To(target) => Ok(target.resolve(runtime)? - from),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    /// Declare a form and initialize it spanning `from` to `to`
    Create { form: Form, from: Target, to: Target },
    /// Drag one anchor of a form
    Morph { form: FormId, anchor: PointId, motion: Motion },
    /// Move a whole form; `Motion::To` moves its center onto the target
    Translate { form: FormId, motion: Motion },
    Rotate { form: FormId, angle: Angle, pivot: Target },
    /// Scale away from `pivot`; a zero `axis` scales uniformly
    Scale { form: FormId, factor: f64, axis: DVec2, pivot: Target },
}

/// A declared form whose parameters are all set
fn initialized(runtime: &dyn Runtime, id: FormId) -> Result<&Form, RuntimeErrorKind> {
    let form = runtime.get(id).ok_or(RuntimeErrorKind::UndeclaredForm(id))?;
    if form.outline(runtime).is_none() {
        return Err(RuntimeErrorKind::UninitializedForm(id));
    }
    Ok(form)
}

impl Instruction {
    pub fn evaluate(&self, runtime: &mut dyn Runtime) -> Result<(), RuntimeErrorKind> {
        match self {
            Instruction::Create { form, from, to } => {
                let from = from.resolve(runtime)?;
                let to = to.resolve(runtime)?;
                runtime.declare(form);
                form.init(runtime, from, to);
            }
            Instruction::Morph { form, anchor, motion } => {
                let handle = initialized(runtime, *form)?
                    .anchor_for(*anchor)
                    .ok_or(RuntimeErrorKind::UnknownAnchor { form: *form, point: *anchor })?;
                let current = handle
                    .position(runtime)
                    .ok_or(RuntimeErrorKind::UnresolvedPoint { form: *form, point: *anchor })?;
                let delta = motion.delta(runtime, current)?;
                handle.translate(runtime, delta);
            }
            Instruction::Translate { form, motion } => {
                let (translator, center) = {
                    let found = initialized(runtime, *form)?;
                    (found.translator(), found.point(PointId::Center))
                };
                let reference = center.and_then(|c| c.position(&*runtime)).ok_or(
                    RuntimeErrorKind::UnresolvedPoint { form: *form, point: PointId::Center },
                )?;
                let delta = motion.delta(runtime, reference)?;
                translator.translate(runtime, delta);
            }
            Instruction::Rotate { form, angle, pivot } => {
                let rotator = initialized(runtime, *form)?.rotator();
                let fix = pivot.resolve(runtime)?;
                rotator.rotate(runtime, *angle, fix);
            }
            Instruction::Scale { form, factor, axis, pivot } => {
                if !factor.is_finite() {
                    return Err(RuntimeErrorKind::InvalidScale(*factor));
                }
                let scaler = initialized(runtime, *form)?.scaler();
                let fix = pivot.resolve(runtime)?;
                scaler.scale(runtime, *factor, fix, *axis);
            }
        }
        Ok(())
    }
}

// ============================================================================
// Procedures
// ============================================================================

/// Iteration count of a repeat
#[derive(Debug, Clone, PartialEq)]
pub enum Count {
    Fixed(usize),
    /// Looked up in the frame's data set; negative values count as zero
    Data(String),
}

impl Count {
    /// Iterations to run, refusing anything above `limit`
    fn resolve(&self, runtime: &dyn Runtime, limit: usize) -> Result<usize, RuntimeErrorKind> {
        let requested = match self {
            Count::Fixed(n) => *n as f64,
            Count::Data(key) => runtime
                .data_set()
                .get(key)
                .ok_or_else(|| RuntimeErrorKind::UnknownDataKey(key.clone()))?
                .max(0.0),
        };
        if requested > limit as f64 {
            return Err(RuntimeErrorKind::RepeatLimit { requested, limit });
        }
        Ok(requested as usize)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Instruction { id: InstructionId, instruction: Instruction },
    Group { id: InstructionId, children: Vec<Node> },
    Repeat { id: InstructionId, count: Count, children: Vec<Node> },
}

impl Node {
    pub fn instruction(instruction: Instruction) -> Self {
        Node::Instruction { id: InstructionId::next(), instruction }
    }

    pub fn id(&self) -> InstructionId {
        match self {
            Node::Instruction { id, .. } | Node::Group { id, .. } | Node::Repeat { id, .. } => *id,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Procedure {
    pub nodes: Vec<Node>,
}

impl Procedure {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// Evaluate in the current scope and capture what that scope declared.
    /// The caller owns the scope (`run`, or `scoped` inside a sub-call).
    pub fn evaluate(&self, runtime: &mut DefaultRuntime) -> Picture {
        let mut picture = Picture::new(runtime.canvas());
        walk(runtime, &self.nodes, &mut picture);
        capture(runtime, &mut picture);
        picture
    }
}

fn walk(runtime: &mut DefaultRuntime, nodes: &[Node], picture: &mut Picture) {
    for node in nodes {
        if runtime.should_stop() {
            debug!("evaluation stopped");
            return;
        }
        match node {
            Node::Instruction { id, instruction } => runtime.eval(*id, |rt| {
                if let Err(kind) = instruction.evaluate(rt) {
                    rt.report_error(kind);
                }
            }),
            Node::Group { id, children } => runtime.eval(*id, |rt| {
                rt.scoped(|rt| {
                    walk(rt, children, picture);
                    capture(rt, picture);
                })
            }),
            Node::Repeat { id, count, children } => runtime.eval(*id, |rt| {
                let limit = rt.config().max_repeat;
                let times = match count.resolve(rt, limit) {
                    Ok(times) => times,
                    Err(kind) => return rt.report_error(kind),
                };
                for _ in 0..times {
                    if rt.should_stop() {
                        break;
                    }
                    rt.scoped(|rt| {
                        walk(rt, children, picture);
                        capture(rt, picture);
                    });
                }
            }),
        }
    }
}

/// Collect shapes of the forms declared in the innermost scope
fn capture(runtime: &mut DefaultRuntime, picture: &mut Picture) {
    for id in runtime.scope_forms() {
        let Some(form) = runtime.get(id).cloned() else {
            continue;
        };
        if form.drawing_mode() == DrawingMode::Guide {
            continue;
        }
        if let Some(shape) = form.get_shape(runtime) {
            picture.push(shape);
        }
        if let Form::Picture(embedded) = &form {
            let origin = runtime.origin(id);
            runtime.with_instruction(origin, |rt| embed(rt, embedded, picture));
        }
    }
}

fn embed(runtime: &mut DefaultRuntime, form: &PictureForm, picture: &mut Picture) {
    let Some(frame) = form.frame(runtime) else {
        return;
    };
    let content = runtime.sub_call(
        form.drawing,
        frame.width,
        frame.height,
        form.fit,
        form.data.clone(),
        |rt, drawing| rt.scoped(|rt| drawing.procedure.evaluate(rt)),
    );
    match content {
        Ok(content) => picture.embed(&content, &frame.placement(content.canvas, form.fit)),
        Err(error) => runtime.report_error(error.kind),
    }
}

// ============================================================================
// Drawings
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Drawing {
    pub id: DrawingId,
    pub name: String,
    /// Native size, used when the drawing is evaluated on its own or
    /// embedded with `fit`
    pub canvas: Canvas,
    pub procedure: Procedure,
}

/// Drawings addressable by id and by name
#[derive(Debug, Clone, Default)]
pub struct Library {
    drawings: Vec<Rc<Drawing>>,
    names: HashMap<String, DrawingId>,
}

impl Library {
    /// Add a drawing. Ids are handed out in insertion order starting at 0.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        canvas: Canvas,
        procedure: Procedure,
    ) -> DrawingId {
        let id = DrawingId(self.drawings.len() as u32);
        let name = name.into();
        self.names.insert(name.clone(), id);
        self.drawings.push(Rc::new(Drawing { id, name, canvas, procedure }));
        id
    }

    pub fn get(&self, id: DrawingId) -> Option<&Rc<Drawing>> {
        self.drawings.get(id.0 as usize)
    }

    pub fn find(&self, name: &str) -> Option<DrawingId> {
        self.names.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.drawings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drawings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Drawing> {
        self.drawings.iter().map(|d| d.as_ref())
    }
}

/// Evaluate drawing `id` on its native canvas
pub fn draw(runtime: &mut DefaultRuntime, id: DrawingId) -> Result<Picture, RuntimeError> {
    let Some(drawing) = runtime.library().get(id).map(Rc::clone) else {
        return Err(RuntimeError::new(None, RuntimeErrorKind::UnknownDrawing(id)));
    };
    debug!(drawing = %drawing.name, "draw");
    Ok(runtime.run(drawing.canvas.width, drawing.canvas.height, |rt| {
        drawing.procedure.evaluate(rt)
    }))
}
