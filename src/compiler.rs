//! Tree rewrite from the syntax tree to aggregation IR.
//!
//! [`Compiler`] is split by concern:
//! - [`expressions`] - one expression subtree to one [`Value`]
//! - [`stages`] - the stage registry, one call argument to one [`Stage`]
//! - [`pipeline`] - a stage-call chain to an ordered [`Pipeline`]
//!
//! A compiler borrows the source text (for diagnostics) and a
//! [`TypeOracle`]. It holds no other state: compiling the same tree twice
//! gives the same result, and separate compilers never interact.

pub mod expressions;
pub mod pipeline;
pub mod reference;
pub mod scope;
pub mod stages;

pub use scope::{Binding, Scope};
pub use stages::{STAGES, StageDef, find_stage};

use crate::{
    ast::Expr,
    error::{CompileResult, Snippet},
    oracle::{TypeClass, TypeOracle},
    value::{Pipeline, Stage, Value},
};

/// Default name of the context placeholder.
pub const DEFAULT_PLACEHOLDER: &str = "this";

pub struct Compiler<'a> {
    source: &'a str,
    oracle: &'a dyn TypeOracle,
    placeholder: &'a str,
}

impl<'a> Compiler<'a> {
    pub fn new(source: &'a str, oracle: &'a dyn TypeOracle) -> Self {
        Compiler {
            source,
            oracle,
            placeholder: DEFAULT_PLACEHOLDER,
        }
    }

    pub fn with_placeholder(mut self, placeholder: &'a str) -> Self {
        self.placeholder = placeholder;
        self
    }

    pub fn placeholder(&self) -> &'a str {
        self.placeholder
    }

    /// Root scope, binding only the placeholder.
    pub fn root_scope(&self) -> Scope<'a> {
        Scope::root(self.placeholder)
    }

    /// Compile a standalone operator expression.
    pub fn compile(&self, expr: &Expr) -> CompileResult<Value> {
        self.compile_in(expr, &self.root_scope())
    }

    /// Assemble a stage-call chain rooted at the placeholder.
    pub fn assemble(&self, root: &Expr) -> CompileResult<Pipeline> {
        self.assemble_in(root, &self.root_scope())
    }

    /// Compile one stage call's arguments.
    pub fn compile_stage(&self, name: &str, call: &Expr, args: &[Expr]) -> CompileResult<Stage> {
        stages::compile_stage(self, name, call, args, &self.root_scope())
    }

    /// Grouping never changes a classification.
    fn classify(&self, node: &Expr) -> TypeClass {
        self.oracle.classify(node.unparenthesized())
    }

    fn snippet(&self, node: &Expr) -> Snippet {
        Snippet::of(node, self.source)
    }
}
