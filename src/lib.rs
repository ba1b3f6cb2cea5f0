pub mod ast;
#[cfg(feature = "cli")]
pub mod cli;
pub mod compiler;
pub mod config;
pub mod entry;
pub mod error;
pub mod lexer;
pub mod oracle;
pub mod output;
pub mod parser;
pub mod value;

pub use ast::{BinOp, Expr, ExprKind, NodeId, Program, Span, Token, TypeExpr};
pub use compiler::{Compiler, DEFAULT_PLACEHOLDER, STAGES, Scope, StageDef};
pub use config::CompilerConfig;
pub use entry::{
    BuilderKind, Compiled, CompiledEntry, EntryPoint, compile_entry, compile_program,
    compile_source, locate,
};
pub use error::{CompileError, CompileResult, Snippet};
pub use lexer::{LexError, Lexer, Position};
pub use oracle::{DeclaredTypes, StaticOracle, Ty, TypeClass, TypeOracle, UnknownTypes};
pub use output::{ToDocument, to_json, to_json_pretty};
pub use parser::{ParseError, Parser};
pub use value::{Operands, Pipeline, Scalar, Stage, Value};
