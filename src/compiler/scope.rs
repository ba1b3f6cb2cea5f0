use crate::ast::Expr;

/// What a name in scope compiles to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    /// The context placeholder, the current document
    Context,
    /// An inline-function parameter, a `$$` variable
    Local,
}

/// Binding environment threaded through every compile call.
///
/// Scopes form a chain from the innermost inline function out to the root,
/// which always binds the context placeholder. A child scope borrows its
/// parent and lives only as long as the body compiled under it, so a binding
/// can never be seen by a sibling expression.
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    name: &'a str,
    binding: Binding,
    parent: Option<&'a Scope<'a>>,
}

impl<'a> Scope<'a> {
    pub fn root(placeholder: &'a str) -> Self {
        Scope {
            name: placeholder,
            binding: Binding::Context,
            parent: None,
        }
    }

    /// Child scope with `name` bound as a local variable.
    pub fn bind_local(&'a self, name: &'a str) -> Scope<'a> {
        Scope {
            name,
            binding: Binding::Local,
            parent: Some(self),
        }
    }

    /// Innermost binding of `name`.
    pub fn resolve(&self, name: &str) -> Option<Binding> {
        let mut scope = Some(self);
        while let Some(current) = scope {
            if current.name == name {
                return Some(current.binding);
            }
            scope = current.parent;
        }
        None
    }

    /// Name of the context placeholder.
    pub fn placeholder(&self) -> &'a str {
        match self.parent {
            Some(parent) => parent.placeholder(),
            None => self.name,
        }
    }

    /// True if `expr`, ignoring grouping, is the unshadowed placeholder.
    pub fn is_context(&self, expr: &Expr) -> bool {
        expr.unparenthesized()
            .as_identifier()
            .is_some_and(|name| self.resolve(name) == Some(Binding::Context))
    }

    /// True if nothing in scope is called `name`.
    pub fn is_free(&self, name: &str) -> bool {
        self.resolve(name).is_none()
    }
}
