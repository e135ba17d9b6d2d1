//! Parse pest pairs into AST nodes

use glam::DVec2;
use miette::SourceSpan;
use pest::Parser;
use pest::iterators::{Pair, Pairs};

use crate::ast::*;
use crate::errors::{ParseError, SourceContext};
use crate::types::finite;
use crate::{ReformParser, Rule};

/// Parse a drawing script into its AST
pub fn parse(ctx: &SourceContext) -> Result<Document, ParseError> {
    let mut pairs = ReformParser::parse(Rule::document, &ctx.source).map_err(|e| {
        let (start, end) = match e.location {
            pest::error::InputLocation::Pos(p) => (p, p),
            pest::error::InputLocation::Span((start, end)) => (start, end),
        };
        ParseError::Syntax {
            message: e.variant.message().into_owned(),
            src: ctx.named_source(),
            span: (start, end - start).into(),
        }
    })?;

    let builder = Builder { ctx };
    let document = builder.next(&mut pairs, "document")?;

    let mut drawings = Vec::new();
    for inner in document.into_inner() {
        if inner.as_rule() == Rule::drawing {
            drawings.push(builder.drawing(inner)?);
        }
    }
    Ok(Document { drawings })
}

fn span_of(pair: &Pair<Rule>) -> SourceSpan {
    let span = pair.as_span();
    (span.start(), span.end() - span.start()).into()
}

struct Builder<'a> {
    ctx: &'a SourceContext,
}

impl<'a> Builder<'a> {
    /// Next child of a pair whose shape the grammar guarantees
    fn next<'i>(
        &self,
        pairs: &mut Pairs<'i, Rule>,
        what: &str,
    ) -> Result<Pair<'i, Rule>, ParseError> {
        pairs.next().ok_or_else(|| ParseError::Syntax {
            message: format!("expected {what}"),
            src: self.ctx.named_source(),
            span: (self.ctx.source.len(), 0).into(),
        })
    }

    fn unexpected(&self, pair: &Pair<Rule>) -> ParseError {
        ParseError::Syntax {
            message: format!("unexpected {:?}", pair.as_rule()),
            src: self.ctx.named_source(),
            span: span_of(pair),
        }
    }

    fn drawing(&self, pair: Pair<Rule>) -> Result<DrawingDef, ParseError> {
        let mut inner = pair.into_inner();
        let name = self.ident(self.next(&mut inner, "drawing name")?);

        let mut size = self.next(&mut inner, "drawing size")?.into_inner();
        let width = self.number(self.next(&mut size, "width")?)?;
        let height = self.number(self.next(&mut size, "height")?)?;

        let body = self.block(self.next(&mut inner, "drawing body")?)?;
        Ok(DrawingDef { name, width, height, body })
    }

    fn block(&self, pair: Pair<Rule>) -> Result<Vec<Statement>, ParseError> {
        pair.into_inner().map(|stmt| self.statement(stmt)).collect()
    }

    fn statement(&self, pair: Pair<Rule>) -> Result<Statement, ParseError> {
        match pair.as_rule() {
            Rule::create_stmt => self.create(pair).map(Statement::Create),
            Rule::picture_stmt => self.picture(pair).map(Statement::Picture),
            Rule::morph_stmt => {
                let mut inner = pair.into_inner();
                let point = self.point_ref(self.next(&mut inner, "point")?)?;
                let motion = self.motion(self.next(&mut inner, "motion")?)?;
                Ok(Statement::Morph { point, motion })
            }
            Rule::move_stmt => {
                let mut inner = pair.into_inner();
                let form = self.ident(self.next(&mut inner, "form name")?);
                let motion = self.motion(self.next(&mut inner, "motion")?)?;
                Ok(Statement::Move { form, motion })
            }
            Rule::rotate_stmt => {
                let mut inner = pair.into_inner();
                let form = self.ident(self.next(&mut inner, "form name")?);
                let angle = self.angle(self.next(&mut inner, "angle")?)?;
                let around = match inner.next() {
                    Some(around) => Some(self.around(around)?),
                    None => None,
                };
                Ok(Statement::Rotate { form, angle, around })
            }
            Rule::scale_stmt => {
                let mut inner = pair.into_inner();
                let form = self.ident(self.next(&mut inner, "form name")?);
                let factor = self.number(self.next(&mut inner, "scale factor")?)?;
                let mut along = None;
                let mut around = None;
                for clause in inner {
                    match clause.as_rule() {
                        Rule::along => {
                            along = Some(self.vector(self.next(&mut clause.into_inner(), "axis")?)?)
                        }
                        Rule::around => around = Some(self.around(clause)?),
                        _ => return Err(self.unexpected(&clause)),
                    }
                }
                Ok(Statement::Scale { form, factor, along, around })
            }
            Rule::repeat_stmt => {
                let mut inner = pair.into_inner();
                let count = self.count(self.next(&mut inner, "repeat count")?)?;
                let body = self.block(self.next(&mut inner, "repeat body")?)?;
                Ok(Statement::Repeat { count, body })
            }
            Rule::group_stmt => {
                let mut inner = pair.into_inner();
                let body = self.block(self.next(&mut inner, "group body")?)?;
                Ok(Statement::Group { body })
            }
            _ => Err(self.unexpected(&pair)),
        }
    }

    fn create(&self, pair: Pair<Rule>) -> Result<CreateStmt, ParseError> {
        let mut inner = pair.into_inner().peekable();
        let name = self.ident(self.next_peekable(&mut inner, "form name")?);
        let guide = inner.next_if(|p| p.as_rule() == Rule::guide).is_some();
        let kind = match self.next_peekable(&mut inner, "shape")?.as_str() {
            "rect" => ShapeKind::Rect,
            "circle" => ShapeKind::Circle,
            _ => ShapeKind::Line,
        };
        let from = self.target(self.next_peekable(&mut inner, "start point")?)?;
        let to = self.target(self.next_peekable(&mut inner, "end point")?)?;
        Ok(CreateStmt { name, guide, kind, from, to })
    }

    fn picture(&self, pair: Pair<Rule>) -> Result<PictureStmt, ParseError> {
        let mut inner = pair.into_inner().peekable();
        let name = self.ident(self.next_peekable(&mut inner, "form name")?);
        let guide = inner.next_if(|p| p.as_rule() == Rule::guide).is_some();
        let drawing = self.ident(self.next_peekable(&mut inner, "drawing name")?);
        let fit = inner.next_if(|p| p.as_rule() == Rule::fit).is_some();
        let from = self.target(self.next_peekable(&mut inner, "start point")?)?;
        let to = self.target(self.next_peekable(&mut inner, "end point")?)?;

        let mut data = Vec::new();
        if let Some(with) = inner.next() {
            for binding in with.into_inner() {
                let mut kv = binding.into_inner();
                let key = self.ident(self.next(&mut kv, "key")?);
                let value = self.number(self.next(&mut kv, "value")?)?;
                data.push((key, value));
            }
        }
        Ok(PictureStmt { name, guide, drawing, fit, from, to, data })
    }

    fn next_peekable<'i>(
        &self,
        pairs: &mut std::iter::Peekable<Pairs<'i, Rule>>,
        what: &str,
    ) -> Result<Pair<'i, Rule>, ParseError> {
        pairs.next().ok_or_else(|| ParseError::Syntax {
            message: format!("expected {what}"),
            src: self.ctx.named_source(),
            span: (self.ctx.source.len(), 0).into(),
        })
    }

    fn motion(&self, pair: Pair<Rule>) -> Result<MotionExpr, ParseError> {
        let rule = pair.as_rule();
        let mut inner = pair.into_inner();
        let value = self.next(&mut inner, "motion target")?;
        match rule {
            Rule::by_motion => Ok(MotionExpr::By(self.vector(value)?)),
            _ => Ok(MotionExpr::To(self.target(value)?)),
        }
    }

    fn around(&self, pair: Pair<Rule>) -> Result<TargetExpr, ParseError> {
        let mut inner = pair.into_inner();
        self.target(self.next(&mut inner, "pivot")?)
    }

    fn target(&self, pair: Pair<Rule>) -> Result<TargetExpr, ParseError> {
        match pair.as_rule() {
            Rule::vector => Ok(TargetExpr::Vector(self.vector(pair)?)),
            Rule::point_ref => Ok(TargetExpr::Point(self.point_ref(pair)?)),
            _ => Err(self.unexpected(&pair)),
        }
    }

    fn point_ref(&self, pair: Pair<Rule>) -> Result<PointRef, ParseError> {
        let mut inner = pair.into_inner();
        let owner = self.ident(self.next(&mut inner, "form name")?);
        let point = self.ident(self.next(&mut inner, "point name")?);
        Ok(PointRef { owner, point })
    }

    fn vector(&self, pair: Pair<Rule>) -> Result<DVec2, ParseError> {
        let mut inner = pair.into_inner();
        let x = self.number(self.next(&mut inner, "x")?)?;
        let y = self.number(self.next(&mut inner, "y")?)?;
        Ok(DVec2::new(x, y))
    }

    /// Angle in radians; degrees unless `rad` is given
    fn angle(&self, pair: Pair<Rule>) -> Result<f64, ParseError> {
        let mut inner = pair.into_inner();
        let value = self.number(self.next(&mut inner, "angle")?)?;
        match inner.next().map(|unit| unit.as_str()) {
            Some("rad") => Ok(value),
            _ => Ok(value.to_radians()),
        }
    }

    fn count(&self, pair: Pair<Rule>) -> Result<CountExpr, ParseError> {
        let mut inner = pair.into_inner();
        let value = self.next(&mut inner, "count")?;
        match value.as_rule() {
            Rule::integer => value
                .as_str()
                .parse()
                .map(CountExpr::Literal)
                .map_err(|e: std::num::ParseIntError| ParseError::InvalidNumber {
                    message: e.to_string(),
                    src: self.ctx.named_source(),
                    span: span_of(&value),
                }),
            _ => Ok(CountExpr::Data(self.ident(value))),
        }
    }

    fn ident(&self, pair: Pair<Rule>) -> Ident {
        Ident {
            name: pair.as_str().to_string(),
            span: span_of(&pair),
        }
    }

    fn number(&self, pair: Pair<Rule>) -> Result<f64, ParseError> {
        let invalid = |message: String| ParseError::InvalidNumber {
            message,
            src: self.ctx.named_source(),
            span: span_of(&pair),
        };
        let value: f64 = pair
            .as_str()
            .parse()
            .map_err(|e: std::num::ParseFloatError| invalid(e.to_string()))?;
        finite(value).map_err(|e| invalid(e.to_string()))
    }
}
