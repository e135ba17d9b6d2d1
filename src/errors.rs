//! Error types with rich diagnostics using miette
//!
//! Script errors carry source spans; runtime errors carry the instruction
//! they were raised against.

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::form::{FormId, PointId};
use crate::procedure::{DrawingId, InstructionId};

/// Source context for error reporting
#[derive(Debug, Clone)]
pub struct SourceContext {
    /// Name of the source (filename or "<input>")
    pub name: String,
    /// The full source text
    pub source: String,
}

impl SourceContext {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
        }
    }

    /// Create a NamedSource for miette
    pub fn named_source(&self) -> NamedSource<String> {
        NamedSource::new(&self.name, self.source.clone())
    }
}

// ============================================================================
// Script Errors
// ============================================================================

/// Errors raised while parsing a drawing script and resolving its names
#[derive(Error, Diagnostic, Debug)]
pub enum ParseError {
    #[error("syntax error: {message}")]
    #[diagnostic(code(reform::parse::syntax))]
    Syntax {
        message: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("here")]
        span: SourceSpan,
    },

    #[error("invalid number: {message}")]
    #[diagnostic(code(reform::parse::invalid_number))]
    InvalidNumber {
        message: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("invalid number")]
        span: SourceSpan,
    },

    #[error("unknown form: {name}")]
    #[diagnostic(code(reform::parse::unknown_form))]
    UnknownForm {
        name: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("not defined in this drawing")]
        span: SourceSpan,
        #[help]
        suggestion: Option<String>,
    },

    #[error("form {name} is already defined")]
    #[diagnostic(code(reform::parse::duplicate_form))]
    DuplicateForm {
        name: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("defined again here")]
        span: SourceSpan,
    },

    #[error("{form} has no point named {name}")]
    #[diagnostic(code(reform::parse::unknown_point))]
    UnknownPoint {
        form: String,
        name: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("no such point")]
        span: SourceSpan,
        #[help]
        available: Option<String>,
    },

    #[error("unknown drawing: {name}")]
    #[diagnostic(code(reform::parse::unknown_drawing))]
    UnknownDrawing {
        name: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("no drawing with this name")]
        span: SourceSpan,
    },

    #[error("drawing {name} is already defined")]
    #[diagnostic(code(reform::parse::duplicate_drawing))]
    DuplicateDrawing {
        name: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("defined again here")]
        span: SourceSpan,
    },

    #[error("document has no drawings")]
    #[diagnostic(
        code(reform::parse::empty_document),
        help("declare at least one `drawing name W x H {{ ... }}` block")
    )]
    EmptyDocument,
}

// ============================================================================
// Runtime Errors
// ============================================================================

/// What went wrong while evaluating an instruction
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum RuntimeErrorKind {
    #[error("form {0} is not declared in this scope")]
    #[diagnostic(code(reform::runtime::undeclared_form))]
    UndeclaredForm(FormId),

    #[error("form {0} has parameters without a value")]
    #[diagnostic(code(reform::runtime::uninitialized_form))]
    UninitializedForm(FormId),

    #[error("point {point} of form {form} could not be resolved")]
    #[diagnostic(code(reform::runtime::unresolved_point))]
    UnresolvedPoint { form: FormId, point: PointId },

    #[error("form {form} has no anchor {point}")]
    #[diagnostic(code(reform::runtime::unknown_anchor))]
    UnknownAnchor { form: FormId, point: PointId },

    #[error("unknown drawing {0}")]
    #[diagnostic(code(reform::runtime::unknown_drawing))]
    UnknownDrawing(DrawingId),

    #[error("drawings nested deeper than {depth} levels")]
    #[diagnostic(
        code(reform::runtime::recursion_limit),
        help("a drawing embeds itself, directly or through other drawings")
    )]
    RecursionLimit { depth: usize },

    #[error("scale factor {0} is not finite")]
    #[diagnostic(code(reform::runtime::invalid_scale))]
    InvalidScale(f64),

    #[error("no value named `{0}` in the data set")]
    #[diagnostic(
        code(reform::runtime::unknown_data_key),
        help("pass it from the embedding picture with `with {{ {0} = ... }}`")
    )]
    UnknownDataKey(String),

    #[error("repeat of {requested} iterations exceeds the limit of {limit}")]
    #[diagnostic(code(reform::runtime::repeat_limit))]
    RepeatLimit { requested: f64, limit: usize },
}

/// A recoverable evaluation error, attached to the instruction being
/// evaluated when it was reported
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
#[error("{kind}")]
#[diagnostic(forward(kind))]
pub struct RuntimeError {
    pub instruction: Option<InstructionId>,
    pub kind: RuntimeErrorKind,
}

impl RuntimeError {
    pub fn new(instruction: Option<InstructionId>, kind: RuntimeErrorKind) -> Self {
        Self { instruction, kind }
    }
}
