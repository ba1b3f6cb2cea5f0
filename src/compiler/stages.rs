use tracing::trace;

use crate::{
    ast::{Expr, ExprKind, PropertyKey},
    compiler::{Compiler, Scope},
    error::{CompileError, CompileResult},
    value::Stage,
};

pub type StageHandler =
    fn(&Compiler<'_>, &'static str, &Expr, &[Expr], &Scope<'_>) -> CompileResult<Stage>;

/// One entry of the stage registry.
pub struct StageDef {
    pub name: &'static str,
    pub arity: usize,
    pub description: &'static str,
    pub compile: StageHandler,
}

/// Every stage a pipeline builder may call. Lookup is by exact name.
pub static STAGES: &[StageDef] = &[StageDef {
    name: "$addFields",
    arity: 1,
    description: "Adds or replaces fields, one expression per key of an object literal",
    compile: compile_add_fields,
}];

pub fn find_stage(name: &str) -> Option<&'static StageDef> {
    STAGES.iter().find(|def| def.name == name)
}

/// Compiles one stage call. `call` is the whole call node, used for
/// diagnostics.
pub fn compile_stage(
    compiler: &Compiler<'_>,
    name: &str,
    call: &Expr,
    args: &[Expr],
    scope: &Scope<'_>,
) -> CompileResult<Stage> {
    let Some(def) = find_stage(name) else {
        return Err(CompileError::UnknownStage {
            name: name.to_string(),
            snippet: compiler.snippet(call),
        });
    };
    if args.len() != def.arity {
        return Err(CompileError::Arity {
            stage: def.name,
            expected: def.arity,
            found: args.len(),
            snippet: compiler.snippet(call),
        });
    }
    (def.compile)(compiler, def.name, call, args, scope)
}

fn compile_add_fields(
    compiler: &Compiler<'_>,
    name: &'static str,
    _call: &Expr,
    args: &[Expr],
    scope: &Scope<'_>,
) -> CompileResult<Stage> {
    let fields = args[0].unparenthesized();
    let ExprKind::Object(properties) = &fields.kind else {
        return Err(CompileError::shape(
            compiler.snippet(fields),
            format!("`{}` expects an object literal of field expressions", name),
        ));
    };

    let mut body: Vec<(String, _)> = Vec::with_capacity(properties.len());
    for property in properties {
        let key = match &property.key {
            _ if property.shorthand => {
                return Err(CompileError::shape(
                    compiler.snippet(&property.value),
                    "shorthand properties are not supported; write `key: expression`",
                ));
            }
            PropertyKey::Identifier(key) | PropertyKey::String(key) => key,
            PropertyKey::Computed(key) => {
                return Err(CompileError::shape(
                    compiler.snippet(key),
                    "computed keys are not supported",
                ));
            }
        };
        if key.is_empty() {
            return Err(CompileError::shape(
                compiler.snippet(&property.value),
                "field names must not be empty",
            ));
        }
        if body.iter().any(|(existing, _)| existing == key) {
            return Err(CompileError::shape(
                compiler.snippet(&property.value),
                format!("field `{}` is set more than once", key),
            ));
        }

        trace!(stage = name, field = %key, "stage field");
        let value = compiler.compile_in(&property.value, scope)?;
        body.push((key.clone(), value));
    }

    Ok(Stage { name, body })
}
