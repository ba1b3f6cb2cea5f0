use std::fmt;

use crate::{
    ast::{Expr, Span},
    lexer::Position,
};

/// Convenience result type used by the compiler.
pub type CompileResult<T> = Result<T, CompileError>;

/// The offending node of a diagnostic: its syntactic kind and source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snippet {
    pub kind: &'static str,
    pub text: String,
    pub span: Span,
    pub position: Position,
}

impl Snippet {
    pub fn of(expr: &Expr, source: &str) -> Self {
        Snippet {
            kind: expr.kind_name(),
            text: expr.span.slice(source).to_string(),
            span: expr.span,
            position: Position::of(source, expr.span.start),
        }
    }
}

impl fmt::Display for Snippet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} `{}` at {}", self.kind, self.text, self.position)
    }
}

/// Everything that can stop a compilation.
///
/// All of these are raised synchronously while walking the tree and abort the
/// entry point being compiled; nothing partial is ever returned alongside.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    /// No rule matches the node's shape and operand classification.
    #[error("unsupported construct {snippet}: {reason}")]
    UnsupportedConstruct { snippet: Snippet, reason: String },

    /// An argument violates a fixed shape (wrong arity, non-literal object,
    /// non-function callback).
    #[error("invalid shape {snippet}: {reason}")]
    Shape { snippet: Snippet, reason: String },

    /// A stage was called with the wrong number of arguments.
    #[error("stage `{stage}` takes {expected} argument(s) but {found} were given: {snippet}")]
    Arity {
        stage: &'static str,
        expected: usize,
        found: usize,
        snippet: Snippet,
    },

    /// The stage name is not in the registry.
    #[error("unknown stage `{name}`: {snippet}")]
    UnknownStage { name: String, snippet: Snippet },

    /// The pipeline is not a chain of stage calls rooted at the placeholder.
    #[error("malformed pipeline chain {snippet}: {reason}")]
    MalformedChain { snippet: Snippet, reason: String },
}

impl CompileError {
    pub fn unsupported(snippet: Snippet, reason: impl Into<String>) -> Self {
        CompileError::UnsupportedConstruct {
            snippet,
            reason: reason.into(),
        }
    }

    pub fn shape(snippet: Snippet, reason: impl Into<String>) -> Self {
        CompileError::Shape {
            snippet,
            reason: reason.into(),
        }
    }

    pub fn malformed_chain(snippet: Snippet, reason: impl Into<String>) -> Self {
        CompileError::MalformedChain {
            snippet,
            reason: reason.into(),
        }
    }

    /// The node the diagnostic points at.
    pub fn snippet(&self) -> &Snippet {
        match self {
            CompileError::UnsupportedConstruct { snippet, .. }
            | CompileError::Shape { snippet, .. }
            | CompileError::Arity { snippet, .. }
            | CompileError::UnknownStage { snippet, .. }
            | CompileError::MalformedChain { snippet, .. } => snippet,
        }
    }

    /// Arity mismatches are a kind of shape violation.
    pub fn is_shape_error(&self) -> bool {
        matches!(self, CompileError::Shape { .. } | CompileError::Arity { .. })
    }
}
