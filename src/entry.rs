//! Finding builder calls in a program and compiling each one.
//!
//! ```text
//! const pipeline = aggregate(function (this: { foo: string }) {
//!   return this.$addFields({ bar: this.foo });
//! });
//! ```
//!
//! `aggregate(f)` compiles `f`'s returned chain to a pipeline,
//! `aggregateOp(f)` compiles its returned expression to one operator. Each
//! call is compiled on its own; one failing does not affect the others.

use std::fmt;

use tracing::{debug, instrument};

use crate::{
    ast::{Expr, ExprKind, FunctionBody, Program, PropertyKey, Span, Statement, StatementKind},
    compiler::Compiler,
    config::CompilerConfig,
    error::{CompileError, CompileResult, Snippet},
    lexer::Position,
    oracle::DeclaredTypes,
    parser::{self, ParseError},
    value::{Pipeline, Value},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuilderKind {
    /// Body returns a stage chain
    Pipeline,
    /// Body returns one expression
    Operator,
}

impl fmt::Display for BuilderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuilderKind::Pipeline => f.write_str("pipeline"),
            BuilderKind::Operator => f.write_str("operator"),
        }
    }
}

/// A builder call found in a program.
#[derive(Debug, Clone, Copy)]
pub struct EntryPoint<'p> {
    pub kind: BuilderKind,
    pub name: &'p str,
    pub call: &'p Expr,
    pub args: &'p [Expr],
}

#[derive(Debug, Clone, PartialEq)]
pub enum Compiled {
    Pipeline(Pipeline),
    Expression(Value),
}

/// Outcome of one entry point.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledEntry {
    pub kind: BuilderKind,
    pub name: String,
    pub span: Span,
    pub position: Position,
    pub result: CompileResult<Compiled>,
}

/// Every builder call in `program`, in source order.
///
/// Arguments of a builder call are not searched further.
pub fn locate<'p>(program: &'p Program, config: &CompilerConfig) -> Vec<EntryPoint<'p>> {
    let mut locator = Locator {
        config,
        found: Vec::new(),
    };
    locator.visit_statements(&program.statements);
    locator.found
}

struct Locator<'p, 'c> {
    config: &'c CompilerConfig,
    found: Vec<EntryPoint<'p>>,
}

impl<'p> Locator<'p, '_> {
    fn visit_statements(&mut self, statements: &'p [Statement]) {
        for statement in statements {
            match &statement.kind {
                StatementKind::Declaration { init, .. } => {
                    if let Some(init) = init {
                        self.visit(init);
                    }
                }
                StatementKind::Return(Some(expr)) | StatementKind::Expression(expr) => {
                    self.visit(expr)
                }
                StatementKind::Return(None) => {}
            }
        }
    }

    fn visit(&mut self, expr: &'p Expr) {
        match &expr.kind {
            ExprKind::Call { callee, args } => {
                if let Some(name) = callee.as_identifier() {
                    let kind = if name == self.config.pipeline_builder {
                        Some(BuilderKind::Pipeline)
                    } else if name == self.config.operator_builder {
                        Some(BuilderKind::Operator)
                    } else {
                        None
                    };
                    if let Some(kind) = kind {
                        debug!(%kind, builder = name, "located entry point");
                        self.found.push(EntryPoint {
                            kind,
                            name,
                            call: expr,
                            args,
                        });
                        return;
                    }
                }
                self.visit(callee);
                args.iter().for_each(|arg| self.visit(arg));
            }
            ExprKind::Identifier(_) | ExprKind::Literal(_) => {}
            ExprKind::Paren(inner) => self.visit(inner),
            ExprKind::PropertyAccess { object, .. } => self.visit(object),
            ExprKind::ElementAccess { object, index } => {
                self.visit(object);
                self.visit(index);
            }
            ExprKind::BinaryOp { left, right, .. } => {
                self.visit(left);
                self.visit(right);
            }
            ExprKind::UnaryOp { operand, .. } => self.visit(operand),
            ExprKind::Conditional {
                condition,
                then,
                otherwise,
            } => {
                self.visit(condition);
                self.visit(then);
                self.visit(otherwise);
            }
            ExprKind::Function(function) => match &function.body {
                FunctionBody::Expr(body) => self.visit(body),
                FunctionBody::Block(statements) => self.visit_statements(statements),
            },
            ExprKind::Object(properties) => {
                for property in properties {
                    if let PropertyKey::Computed(key) = &property.key {
                        self.visit(key);
                    }
                    self.visit(&property.value);
                }
            }
        }
    }
}

/// Compiles one located builder call.
///
/// The builder's first parameter names the placeholder and its type
/// annotation feeds [`DeclaredTypes`].
#[instrument(skip_all, fields(builder = entry.name, kind = %entry.kind))]
pub fn compile_entry(
    source: &str,
    entry: &EntryPoint<'_>,
    config: &CompilerConfig,
) -> CompileResult<Compiled> {
    let builder = match entry.args {
        [builder] => builder.unparenthesized(),
        _ => {
            return Err(CompileError::shape(
                Snippet::of(entry.call, source),
                format!("`{}` takes exactly one builder function", entry.name),
            ));
        }
    };
    let ExprKind::Function(function) = &builder.kind else {
        return Err(CompileError::shape(
            Snippet::of(builder, source),
            format!("called `{}` without a function expression", entry.name),
        ));
    };
    let (placeholder, context) = match function.params.as_slice() {
        [] => (config.placeholder.as_str(), None),
        [param] => (param.name.as_str(), param.ty.as_ref()),
        _ => {
            return Err(CompileError::shape(
                Snippet::of(builder, source),
                "a builder function takes at most the placeholder parameter",
            ));
        }
    };
    let Some(body) = function.single_return() else {
        return Err(CompileError::shape(
            Snippet::of(builder, source),
            "the builder body must be exactly one `return` statement",
        ));
    };

    let oracle = DeclaredTypes::infer(body, placeholder, context);
    let compiler = Compiler::new(source, &oracle).with_placeholder(placeholder);
    match entry.kind {
        BuilderKind::Pipeline => compiler.assemble(body).map(Compiled::Pipeline),
        BuilderKind::Operator => compiler.compile(body).map(Compiled::Expression),
    }
}

/// Locates and compiles every entry point of `program`.
pub fn compile_program(
    source: &str,
    program: &Program,
    config: &CompilerConfig,
) -> Vec<CompiledEntry> {
    locate(program, config)
        .iter()
        .map(|entry| CompiledEntry {
            kind: entry.kind,
            name: entry.name.to_string(),
            span: entry.call.span,
            position: Position::of(source, entry.call.span.start),
            result: compile_entry(source, entry, config),
        })
        .collect()
}

/// Parses `source` and compiles every entry point in it.
pub fn compile_source(
    source: &str,
    config: &CompilerConfig,
) -> Result<Vec<CompiledEntry>, ParseError> {
    let program = parser::parse_program(source)?;
    Ok(compile_program(source, &program, config))
}
