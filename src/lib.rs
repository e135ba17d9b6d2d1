//! Parametric drawing runtime.
//!
//! Forms (rectangles, circles, lines, embedded pictures) keep their
//! parameters in runtime memory; anchors and transforms are views over those
//! parameters. Drawings are written as small scripts, lowered into
//! procedures and evaluated into pictures.

use pest_derive::Parser;

pub mod ast;
pub mod errors;
pub mod graphics;
pub mod log;
pub mod lower;
pub mod parse;
pub mod procedure;
pub mod runtime;
pub mod types;
// Capability traits come before the form enum that dispatches them
pub mod transform;
pub mod form;

pub use errors::{ParseError, RuntimeError, RuntimeErrorKind, SourceContext};
pub use form::{Form, FormId, PointId};
pub use graphics::{Path, Picture, Shape};
pub use procedure::{DrawingId, Library};
pub use runtime::{DefaultRuntime, Runtime, RuntimeListener};

#[derive(Parser)]
#[grammar = "reform.pest"]
pub struct ReformParser;

/// Output of evaluating a drawing
#[derive(Debug, Clone)]
pub struct Rendered {
    pub picture: Picture,
    /// Recoverable errors hit along the way; the picture holds whatever
    /// could still be drawn
    pub errors: Vec<RuntimeError>,
}

/// Parse a script and lower it into a library of drawings.
pub fn compile(source: &str) -> Result<Library, miette::Report> {
    compile_named("<input>", source)
}

/// Like [`compile`], naming the source in diagnostics.
pub fn compile_named(name: &str, source: &str) -> Result<Library, miette::Report> {
    let ctx = SourceContext::new(name, source);
    let document = parse::parse(&ctx)?;
    Ok(lower::lower(&document, &ctx)?)
}

/// Evaluate the first drawing of a script.
///
/// Script errors are returned as diagnostics. Evaluation errors do not stop
/// rendering; they come back alongside the picture.
pub fn render(source: &str) -> Result<Rendered, miette::Report> {
    let library = compile(source)?;
    let mut runtime = DefaultRuntime::new(library);
    let picture = procedure::draw(&mut runtime, DrawingId(0))?;
    Ok(Rendered {
        picture,
        errors: runtime.take_errors(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_simple_rectangle() {
        let rendered = render("drawing main 20 x 10 { A = rect from (0, 0) to (20, 10) }").unwrap();
        assert!(rendered.errors.is_empty());
        assert_eq!(rendered.picture.len(), 1);
        let path = rendered.picture.shapes[0].area.to_string();
        insta::assert_snapshot!(path, @"M 0 0 L 20 0 L 20 10 L 0 10 Z");
    }

    #[test]
    fn render_reports_script_errors() {
        let err = render("drawing main 20 x 10 { move A by (1, 1) }").unwrap_err();
        assert!(err.to_string().contains("unknown form: A"), "{err}");
    }

    #[test]
    fn runtime_errors_come_back_with_the_picture() {
        let rendered = render(
            "drawing main 20 x 10 {
                A = rect from (0, 0) to (20, 10)
                repeat n { }
            }",
        )
        .unwrap();
        assert_eq!(rendered.picture.len(), 1);
        assert_eq!(rendered.errors.len(), 1);
        assert_eq!(rendered.errors[0].kind, RuntimeErrorKind::UnknownDataKey("n".into()));
    }
}
