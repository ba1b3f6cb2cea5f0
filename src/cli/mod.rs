//! CLI support for aggregate-compiler
//!
//! Provides programmatic access to the `aggc` commands so other tools can
//! embed them without going through a subprocess.

mod compile;
mod docs;

pub use compile::{
    CompileOptions, CompileReport, SnippetOptions, execute_compile, execute_expr,
    execute_pipeline,
};
pub use docs::{Topic, get_operator_reference, get_reference_overview};

use std::io;

use thiserror::Error;

/// Errors that can occur during CLI operations
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Parse error: {0}")]
    Parse(#[from] crate::ParseError),

    #[error("Invalid --context type: {0}")]
    Context(crate::ParseError),

    #[error("Compile error: {0}")]
    Compile(#[from] crate::CompileError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("No input provided. Use --input or pipe a program to stdin.")]
    NoInput,

    #[error("{failed} of {total} entry points failed to compile")]
    EntryFailures { failed: usize, total: usize },

    #[error("Unknown topic: '{0}'\nRun 'aggc operators' to see available topics.")]
    UnknownTopic(String),
}
