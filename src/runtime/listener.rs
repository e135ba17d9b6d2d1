//! Observers of an evaluation.

use crate::errors::RuntimeError;
use crate::form::FormId;
use crate::procedure::InstructionId;

use super::{Canvas, Runtime};

/// Receives evaluation events in registration order.
///
/// Notifications get a shared borrow of the runtime: a listener can inspect
/// forms and read parameters but cannot change anything. Every method has
/// an empty default so listeners implement only what they need.
pub trait RuntimeListener {
    fn begin_evaluation(&mut self, _canvas: Canvas) {}

    fn finish_evaluation(&mut self, _runtime: &dyn Runtime) {}

    fn did_eval(&mut self, _runtime: &dyn Runtime, _instruction: InstructionId) {}

    /// Called once per scope, while the departing forms can still be read
    fn exit_scope(&mut self, _runtime: &dyn Runtime, _departing: &[FormId]) {}

    fn triggered_error(&mut self, _runtime: &dyn Runtime, _error: &RuntimeError) {}
}
