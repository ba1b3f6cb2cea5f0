//! Type classification seen by the compiler.
//!
//! Type-gated rules (arithmetic, logic, array methods) only fire when the
//! oracle vouches for their operands. Anything it cannot vouch for is
//! [`TypeClass::Unknown`], which turns those rules off rather than failing.

use std::{collections::HashMap, fmt};

use crate::ast::Expr;

mod declared;

pub use declared::{DeclaredTypes, Ty};

/// The only classifications that take part in dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeClass {
    Numeric,
    Boolean,
    ArrayLike,
    Unknown,
}

impl fmt::Display for TypeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TypeClass::Numeric => "numeric",
            TypeClass::Boolean => "boolean",
            TypeClass::ArrayLike => "array",
            TypeClass::Unknown => "unknown",
        })
    }
}

pub trait TypeOracle {
    fn classify(&self, node: &Expr) -> TypeClass;
}

impl<T: TypeOracle + ?Sized> TypeOracle for &T {
    fn classify(&self, node: &Expr) -> TypeClass {
        (**self).classify(node)
    }
}

/// Oracle that knows nothing; every rule gated on a type is disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnknownTypes;

impl TypeOracle for UnknownTypes {
    fn classify(&self, _node: &Expr) -> TypeClass {
        TypeClass::Unknown
    }
}

/// Fixed classifications keyed by the node's source text.
///
/// Meant for exercising the compiler in isolation:
///
/// ```
/// use aggregate_compiler::oracle::{StaticOracle, TypeClass};
///
/// let source = "this.na + this.nb";
/// let oracle = StaticOracle::new(source)
///     .with("this.na", TypeClass::Numeric)
///     .with("this.nb", TypeClass::Numeric);
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticOracle {
    source: String,
    classes: HashMap<String, TypeClass>,
}

impl StaticOracle {
    pub fn new(source: impl Into<String>) -> Self {
        StaticOracle {
            source: source.into(),
            classes: HashMap::new(),
        }
    }

    pub fn with(mut self, text: &str, class: TypeClass) -> Self {
        self.classes.insert(text.to_string(), class);
        self
    }
}

impl TypeOracle for StaticOracle {
    fn classify(&self, node: &Expr) -> TypeClass {
        self.classes
            .get(node.span.slice(&self.source))
            .copied()
            .unwrap_or(TypeClass::Unknown)
    }
}
