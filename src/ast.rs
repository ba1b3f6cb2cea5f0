//! # Syntax Tree
//!
//! This module defines the syntax tree for the restricted TypeScript subset that
//! pipeline builders are written in. The parser produces it; the compiler only
//! ever reads it.
//!
//! ## Architecture Overview
//!
//! - **[tokens]** - Lexical tokens and source spans
//! - **[expressions]** - Expression nodes (references, operators, calls, functions)
//! - **[operators]** - Binary and unary operators
//! - **[statements]** - Statements and whole programs
//! - **[types]** - Parameter type annotations
//!
//! ## Quick Start
//!
//! ```text
//! const pipeline = aggregate(function (this: { foo: string }) {
//!   return this.$addFields({ bar: this.foo });
//! });
//! ```
//!
//! `aggregate` receives a builder function. Its placeholder parameter (`this`)
//! stands for the current document; its body is one `return` of a chain of
//! stage calls.
//!
//! ## Core Concepts
//!
//! ### Placeholder
//!
//! The first parameter of a builder names the current document. Property access
//! on it (`this.foo`) is a field reference.
//!
//! ### Inline Functions
//!
//! Arrow functions passed to `.filter` and `.map` introduce one local name that
//! is only visible inside their body.
//!
//! ### Node Identity
//!
//! Every [`Expr`] carries a [`NodeId`] unique within its parse and a [`Span`]
//! into the source, so diagnostics can quote the offending text.
pub mod expressions;
pub mod operators;
pub mod statements;
pub mod tokens;
pub mod types;

pub use expressions::{
    Expr, ExprKind, Function, FunctionBody, FunctionStyle, Literal, NodeId, Param, Property,
    PropertyKey,
};
pub use operators::{BinOp, UnaryOp};
pub use statements::{Program, Statement, StatementKind};
pub use tokens::{Span, SpannedToken, Token};
pub use types::TypeExpr;
