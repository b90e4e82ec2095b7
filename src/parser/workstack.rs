//! Parsed operand held while a `(op arg*)` form is being read.
//!
//! Reduced to just the two payloads a real operand can carry: a fully
//! built, sort-checked expression, or a real-literal string awaiting an
//! enclosing `(_ to_fp eb sb)` context. Recursion through [`super::Parser::parse_term`]
//! plays the role of the flat shift/reduce stack for everything above
//! operand granularity — see `DESIGN.md` for why.
use crate::backend::Backend;
use crate::lexer::Position;
use crate::sort::SortKey;

pub enum WorkItem<B: Backend> {
    Expr(B::Node, SortKey, Position),
    RealLit(String, Position),
}

impl<B: Backend> WorkItem<B> {
    pub fn position(&self) -> Position {
        match self {
            WorkItem::Expr(_, _, p) => *p,
            WorkItem::RealLit(_, p) => *p,
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            WorkItem::Expr(_, _, _) => "expression",
            WorkItem::RealLit(_, _) => "real literal",
        }
    }
}
