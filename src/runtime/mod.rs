//! Evaluation runtime: scoped parameter memory, sub-calls and listeners.
//!
//! `Runtime` is the object-safe surface forms, views and instructions work
//! against. `DefaultRuntime` adds the structural operations (`run`,
//! `scoped`, `eval`, `sub_call`) as generic inherent methods so blocks can
//! return whatever they compute.
//!
//! Each call frame owns its memory, canvas and data set. A sub-call pushes a
//! fresh frame, so a nested drawing can neither see nor disturb the
//! parameters of the drawing that embeds it.

mod data;
mod listener;
mod memory;

pub use data::DataSet;
pub use listener::RuntimeListener;

use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use glam::DVec2;

use crate::errors::{RuntimeError, RuntimeErrorKind};
use crate::form::{Form, FormId};
use crate::log::{debug, warn};
use crate::procedure::{Drawing, DrawingId, InstructionId, Library};

use memory::Memory;

/// Deepest sub-call nesting allowed before `RecursionLimit`
pub const MAX_DEPTH: usize = 8;

/// Default upper bound on the iterations of a single repeat
pub const MAX_REPEAT: usize = 10_000;

/// Read and write access to the active call frame
pub trait Runtime {
    /// Declare `form` in the current scope. Returns false if it was already
    /// visible, in which case nothing changes.
    fn declare(&mut self, form: &Form) -> bool;

    fn get(&self, id: FormId) -> Option<&Form>;

    /// `None` for undeclared forms, offsets past the block and unset slots
    fn read(&self, id: FormId, offset: usize) -> Option<u64>;

    /// Ignored (and logged) when the form is not declared
    fn write(&mut self, id: FormId, offset: usize, word: u64);

    /// Visible forms of the current frame in declaration order
    fn get_forms(&self) -> Vec<FormId>;

    /// Record a recoverable error against the current instruction
    fn report_error(&mut self, kind: RuntimeErrorKind);

    fn should_stop(&self) -> bool;

    fn data_set(&self) -> &DataSet;

    /// Sub-call nesting of the current frame; the top-level drawing is 0
    fn depth(&self) -> usize;

    fn canvas(&self) -> Canvas;
}

/// Drawing area of one frame; the origin is the top left corner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Canvas {
    pub width: f64,
    pub height: f64,
}

impl Canvas {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn size(self) -> DVec2 {
        DVec2::new(self.width, self.height)
    }

    /// Uniform factor that fits this canvas into a `width` x `height` box
    pub fn fit_scale(self, width: f64, height: f64) -> f64 {
        if self.width <= 0.0 || self.height <= 0.0 {
            return 1.0;
        }
        (width / self.width).min(height / self.height)
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new(100.0, 100.0)
    }
}

/// Runtime configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuntimeConfig {
    pub max_depth: usize,
    /// Repeats asking for more iterations are reported and skipped
    pub max_repeat: usize,
    /// Canvas of the frame that exists before the first `run`
    pub canvas: Canvas,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_depth: MAX_DEPTH,
            max_repeat: MAX_REPEAT,
            canvas: Canvas::default(),
        }
    }
}

/// Cooperative cancellation flag, shareable across threads
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Debug)]
struct Frame {
    memory: Memory,
    canvas: Canvas,
    data: DataSet,
}

impl Frame {
    fn new(canvas: Canvas, data: DataSet) -> Self {
        Self {
            memory: Memory::default(),
            canvas,
            data,
        }
    }
}

pub struct DefaultRuntime {
    library: Library,
    config: RuntimeConfig,
    /// Never empty; the last frame is the active one
    frames: Vec<Frame>,
    listeners: Vec<Box<dyn RuntimeListener>>,
    current: Option<InstructionId>,
    errors: Vec<RuntimeError>,
    stop: StopHandle,
}

impl DefaultRuntime {
    pub fn new(library: Library) -> Self {
        Self::with_config(library, RuntimeConfig::default())
    }

    pub fn with_config(library: Library, config: RuntimeConfig) -> Self {
        Self {
            library,
            config,
            frames: vec![Frame::new(config.canvas, DataSet::default())],
            listeners: Vec::new(),
            current: None,
            errors: Vec::new(),
            stop: StopHandle::default(),
        }
    }

    pub fn library(&self) -> &Library {
        &self.library
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn add_listener(&mut self, listener: impl RuntimeListener + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Errors reported since the last `run`, in report order
    pub fn errors(&self) -> &[RuntimeError] {
        &self.errors
    }

    pub fn take_errors(&mut self) -> Vec<RuntimeError> {
        std::mem::take(&mut self.errors)
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn current_instruction(&self) -> Option<InstructionId> {
        self.current
    }

    /// Forms declared in the innermost scope of the current frame
    pub fn scope_forms(&self) -> Vec<FormId> {
        self.frame().memory.scope_forms().to_vec()
    }

    /// Instruction that was current when `id` was declared
    pub fn origin(&self, id: FormId) -> Option<InstructionId> {
        self.frame().memory.origin(id)
    }

    fn frame(&self) -> &Frame {
        // `frames` is never empty: construction pushes the root frame and
        // sub_call pops only what it pushed
        &self.frames[self.frames.len() - 1]
    }

    fn frame_mut(&mut self) -> &mut Frame {
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }

    fn notify(&mut self, mut event: impl FnMut(&mut dyn RuntimeListener, &dyn Runtime)) {
        let mut listeners = std::mem::take(&mut self.listeners);
        for listener in &mut listeners {
            event(listener.as_mut(), &*self);
        }
        self.listeners = listeners;
    }

    /// Top-level evaluation on a `width` x `height` canvas.
    ///
    /// Resets memory and errors. The block runs inside a root scope, so forms
    /// it declares are announced to listeners when it returns.
    pub fn run<T>(&mut self, width: f64, height: f64, block: impl FnOnce(&mut Self) -> T) -> T {
        let canvas = Canvas::new(width, height);
        self.frames = vec![Frame::new(canvas, DataSet::default())];
        self.errors.clear();
        self.current = None;

        debug!(width, height, "begin evaluation");
        self.notify(|listener, _| listener.begin_evaluation(canvas));

        let result = self.scoped(block);

        self.notify(|listener, runtime| listener.finish_evaluation(runtime));
        debug!(errors = self.errors.len(), "finish evaluation");
        result
    }

    /// Run `block` in a nested scope of the current frame
    pub fn scoped<T>(&mut self, block: impl FnOnce(&mut Self) -> T) -> T {
        self.frame_mut().memory.push_scope();
        let result = block(self);

        let departing = self.scope_forms();
        self.notify(|listener, runtime| listener.exit_scope(runtime, &departing));
        self.frame_mut().memory.pop_scope();
        result
    }

    /// Run `block` as the evaluation of `instruction`
    pub fn eval<T>(&mut self, instruction: InstructionId, block: impl FnOnce(&mut Self) -> T) -> T {
        let previous = self.current.replace(instruction);
        let result = block(self);
        self.notify(|listener, runtime| listener.did_eval(runtime, instruction));
        self.current = previous;
        result
    }

    /// Make `instruction` current for errors reported by `block`, without
    /// announcing an evaluation
    pub(crate) fn with_instruction<T>(
        &mut self,
        instruction: Option<InstructionId>,
        block: impl FnOnce(&mut Self) -> T,
    ) -> T {
        let previous = std::mem::replace(&mut self.current, instruction);
        let result = block(self);
        self.current = previous;
        result
    }

    /// Evaluate drawing `id` in a fresh frame.
    ///
    /// With `make_fit` the frame gets the drawing's native canvas and the
    /// caller is expected to scale the result into its `width` x `height`
    /// box; otherwise the frame's canvas is that box. The depth check
    /// happens before anything is allocated.
    pub fn sub_call<T>(
        &mut self,
        id: DrawingId,
        width: f64,
        height: f64,
        make_fit: bool,
        data_set: DataSet,
        callback: impl FnOnce(&mut Self, &Drawing) -> T,
    ) -> Result<T, RuntimeError> {
        if self.depth() >= self.config.max_depth {
            warn!(drawing = %id, depth = self.depth(), "sub-call nesting limit reached");
            return Err(RuntimeError::new(
                self.current,
                RuntimeErrorKind::RecursionLimit { depth: self.config.max_depth },
            ));
        }
        let Some(drawing) = self.library.get(id).map(Rc::clone) else {
            return Err(RuntimeError::new(self.current, RuntimeErrorKind::UnknownDrawing(id)));
        };

        let canvas = if make_fit {
            drawing.canvas
        } else {
            Canvas::new(width.abs(), height.abs())
        };
        debug!(drawing = %id, depth = self.depth() + 1, "sub-call");

        self.frames.push(Frame::new(canvas, data_set));
        let previous = self.current;
        let result = callback(self, &drawing);
        self.current = previous;
        self.frames.pop();
        Ok(result)
    }
}

impl Runtime for DefaultRuntime {
    fn declare(&mut self, form: &Form) -> bool {
        let origin = self.current;
        self.frame_mut().memory.declare(form, origin)
    }

    fn get(&self, id: FormId) -> Option<&Form> {
        self.frame().memory.get(id)
    }

    fn read(&self, id: FormId, offset: usize) -> Option<u64> {
        self.frame().memory.read(id, offset)
    }

    fn write(&mut self, id: FormId, offset: usize, word: u64) {
        if !self.frame_mut().memory.write(id, offset, word) {
            warn!(form = %id, offset, "write to undeclared parameter ignored");
        }
    }

    fn get_forms(&self) -> Vec<FormId> {
        self.frame().memory.forms().to_vec()
    }

    fn report_error(&mut self, kind: RuntimeErrorKind) {
        let error = RuntimeError::new(self.current, kind);
        warn!(error = %error, "runtime error");
        self.notify(|listener, runtime| listener.triggered_error(runtime, &error));
        self.errors.push(error);
    }

    fn should_stop(&self) -> bool {
        self.stop.is_stopped()
    }

    fn data_set(&self) -> &DataSet {
        &self.frame().data
    }

    fn depth(&self) -> usize {
        self.frames.len() - 1
    }

    fn canvas(&self) -> Canvas {
        self.frame().canvas
    }
}
