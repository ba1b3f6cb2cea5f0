//! Reference and literal construction shared by the expression and stage
//! compilers.

use crate::{
    ast::{Expr, ExprKind, Literal},
    compiler::Scope,
    error::{CompileError, CompileResult, Snippet},
    value::{Scalar, Value},
};

/// Field name read directly off the placeholder, as in `this.foo` or
/// `this["foo"]`. `None` if `expr` is not such an access.
pub fn context_field<'e>(expr: &'e Expr, scope: &Scope<'_>) -> Option<ContextField<'e>> {
    match &expr.kind {
        ExprKind::PropertyAccess { object, name } if scope.is_context(object) => {
            Some(ContextField::Named(name))
        }
        ExprKind::ElementAccess { object, index } if scope.is_context(object) => {
            match &index.unparenthesized().kind {
                ExprKind::Literal(Literal::String(key)) => Some(ContextField::Named(key)),
                _ => Some(ContextField::Computed(index)),
            }
        }
        _ => None,
    }
}

pub enum ContextField<'e> {
    Named(&'e str),
    /// `this[expr]` with anything but a string literal key
    Computed(&'e Expr),
}

/// `$name` reference for a field of the current document.
pub fn field_ref(name: &str, node: &Expr, source: &str) -> CompileResult<Value> {
    if name.is_empty() {
        return Err(CompileError::unsupported(
            Snippet::of(node, source),
            "field name must not be empty",
        ));
    }
    Ok(Value::field(name))
}

/// `$$name` reference for an inline-function parameter.
pub fn local_ref(name: &str) -> Value {
    Value::local(name)
}

pub fn scalar(literal: &Literal) -> Scalar {
    match literal {
        Literal::Integer(n) => Scalar::Integer(*n),
        Literal::Float(n) => Scalar::Float(*n),
        Literal::String(s) => Scalar::String(s.clone()),
        Literal::Boolean(b) => Scalar::Boolean(*b),
        Literal::Null => Scalar::Null,
    }
}
