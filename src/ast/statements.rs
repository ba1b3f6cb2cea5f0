use crate::ast::{Expr, Span};

/// Statement inside a program or a function block.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub kind: StatementKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StatementKind {
    /// Variable declaration
    ///
    /// # Example
    /// ```text
    /// const pipeline = aggregate(function (this: Doc) { ... });
    /// ```
    Declaration { name: String, init: Option<Expr> },

    /// `return e;` or a bare `return;`
    Return(Option<Expr>),

    /// Expression evaluated for its effect
    Expression(Expr),
}

impl Statement {
    pub fn returned(&self) -> Option<&Expr> {
        match &self.kind {
            StatementKind::Return(expr) => expr.as_ref(),
            _ => None,
        }
    }
}

/// A whole source file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub statements: Vec<Statement>,
}
