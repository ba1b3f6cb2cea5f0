//! Compile programs, expressions and stage chains from the command line

use serde_json::{Value as Json, json};
use tracing::{info, warn};

use super::CliError;
use crate::{
    Compiler, CompilerConfig, DeclaredTypes, ToDocument, TypeExpr, compile_source,
    parser::{self, parse_type},
};

/// Options for the compile command
#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    /// Program text
    pub source: String,
    /// Placeholder for builder functions without a parameter
    pub placeholder: Option<String>,
}

/// Result of compiling a program
#[derive(Debug)]
pub struct CompileReport {
    /// One `{builder, line, output}` object per successful entry point
    pub document: Json,
    /// Rendered diagnostics for the entry points that failed
    pub diagnostics: Vec<String>,
    pub total: usize,
}

impl CompileReport {
    pub fn failed(&self) -> usize {
        self.diagnostics.len()
    }
}

/// Options for the expr and pipeline commands
#[derive(Debug, Clone)]
pub struct SnippetOptions {
    /// Expression or chain text
    pub source: String,
    /// Type of the placeholder, in annotation syntax
    pub context: Option<String>,
    pub placeholder: String,
}

impl Default for SnippetOptions {
    fn default() -> Self {
        SnippetOptions {
            source: String::new(),
            context: None,
            placeholder: crate::DEFAULT_PLACEHOLDER.to_string(),
        }
    }
}

/// Compile every entry point of a program
pub fn execute_compile(options: &CompileOptions) -> Result<CompileReport, CliError> {
    let mut config = CompilerConfig::default();
    if let Some(placeholder) = &options.placeholder {
        config = config.with_placeholder(placeholder.as_str());
    }

    let entries = compile_source(&options.source, &config)?;
    info!(entries = entries.len(), "compiled program");

    let mut outputs = Vec::with_capacity(entries.len());
    let mut diagnostics = Vec::new();
    for entry in &entries {
        match &entry.result {
            Ok(compiled) => outputs.push(json!({
                "builder": entry.name,
                "line": entry.position.line,
                "output": compiled.to_document(),
            })),
            Err(error) => {
                warn!(builder = %entry.name, line = entry.position.line, "entry point failed");
                diagnostics.push(format!("{} at {}: {}", entry.name, entry.position, error));
            }
        }
    }

    Ok(CompileReport {
        document: Json::Array(outputs),
        diagnostics,
        total: entries.len(),
    })
}

/// Compile one standalone expression
pub fn execute_expr(options: &SnippetOptions) -> Result<Json, CliError> {
    let expr = parser::parse_expression(&options.source)?;
    let context = context_type(options)?;
    let oracle = DeclaredTypes::infer(&expr, &options.placeholder, context.as_ref());
    let compiler = Compiler::new(&options.source, &oracle).with_placeholder(&options.placeholder);
    Ok(compiler.compile(&expr)?.to_document())
}

/// Assemble one stage chain into a pipeline
pub fn execute_pipeline(options: &SnippetOptions) -> Result<Json, CliError> {
    let root = parser::parse_expression(&options.source)?;
    let context = context_type(options)?;
    let oracle = DeclaredTypes::infer(&root, &options.placeholder, context.as_ref());
    let compiler = Compiler::new(&options.source, &oracle).with_placeholder(&options.placeholder);
    Ok(compiler.assemble(&root)?.to_document())
}

fn context_type(options: &SnippetOptions) -> Result<Option<TypeExpr>, CliError> {
    options
        .context
        .as_deref()
        .map(parse_type)
        .transpose()
        .map_err(CliError::Context)
}
