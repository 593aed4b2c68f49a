// Reference adapter between literals and the SQL host model

use crate::lift::lift_literal;
use crate::lower::lower_literal;
use crate::rex::{RelType, RexLiteral};
use strait_core::adapter::LiteralAdapter;
use strait_core::error::Result;
use strait_core::Literal;

/// Target type hints for lowering
///
/// Without a target the adapter picks `DOUBLE`, precision 6, `YEAR TO MONTH`,
/// `DAY TO SECOND(6)` and field names `f0, f1, ...`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LowerContext {
    pub target: Option<RelType>,
}

impl LowerContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_target(target: RelType) -> Self {
        LowerContext {
            target: Some(target),
        }
    }
}

/// Converts between [`Literal`] and [`RexLiteral`]
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlAdapter;

impl LiteralAdapter for SqlAdapter {
    type Host = RexLiteral;
    type Context = LowerContext;

    fn lift(&self, host: &RexLiteral) -> Result<Literal> {
        lift_literal(host)
    }

    fn lower(&self, literal: &Literal, context: &LowerContext) -> Result<RexLiteral> {
        lower_literal(literal, context.target.as_ref())
    }
}
