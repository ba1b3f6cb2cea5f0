// tests/cli_tests.rs

#![cfg(feature = "cli")]

use aggregate_compiler::cli::{
    CliError, CompileOptions, SnippetOptions, Topic, execute_compile, execute_expr,
    execute_pipeline, get_operator_reference, get_reference_overview,
};
use pretty_assertions::assert_eq;
use serde_json::json;

fn snippet(source: &str, context: Option<&str>) -> SnippetOptions {
    SnippetOptions {
        source: source.to_string(),
        context: context.map(str::to_string),
        ..SnippetOptions::default()
    }
}

#[test]
fn test_compile_program() {
    let options = CompileOptions {
        source: "\
const a = aggregate(function (this: { foo: string }) {
  return this.$addFields({ bar: this.foo });
});
const b = aggregateOp(function () { return this.x + 1; });
const c = aggregateOp(function (this: { n: number }) { return this.n * 2; });
"
        .to_string(),
        placeholder: None,
    };
    let report = execute_compile(&options).unwrap();

    assert_eq!(report.total, 3);
    assert_eq!(report.failed(), 1);
    assert!(report.diagnostics[0].starts_with("aggregateOp at 4:"));
    assert_eq!(
        report.document,
        json!([
            { "builder": "aggregate", "line": 1, "output": [{ "$addFields": { "bar": "$foo" } }] },
            { "builder": "aggregateOp", "line": 5, "output": { "$multiply": ["$n", { "$literal": 2 }] } },
        ])
    );
}

#[test]
fn test_compile_custom_placeholder() {
    let options = CompileOptions {
        source: "aggregateOp(() => doc.x)".to_string(),
        placeholder: Some("doc".to_string()),
    };
    let report = execute_compile(&options).unwrap();
    assert_eq!(report.failed(), 0);
    assert_eq!(report.document[0]["output"], json!("$x"));
}

#[test]
fn test_compile_parse_error() {
    let options = CompileOptions {
        source: "aggregate(".to_string(),
        placeholder: None,
    };
    assert!(matches!(execute_compile(&options), Err(CliError::Parse(_))));
}

#[test]
fn test_expr_with_context() {
    let json = execute_expr(&snippet(
        "this.na + this.nb",
        Some("{ na: number; nb: number }"),
    ))
    .unwrap();
    assert_eq!(json, json!({ "$add": ["$na", "$nb"] }));
}

#[test]
fn test_expr_without_context() {
    let err = execute_expr(&snippet("this.na + this.nb", None)).unwrap_err();
    assert!(matches!(err, CliError::Compile(_)));
    assert!(err.to_string().starts_with("Compile error: unsupported construct"));
}

#[test]
fn test_expr_bad_context() {
    let err = execute_expr(&snippet("this.a", Some("{ a: }"))).unwrap_err();
    assert!(matches!(err, CliError::Context(_)));
}

#[test]
fn test_pipeline() {
    let json = execute_pipeline(&snippet(
        "this.$addFields({ a: this.x }).$addFields({ b: this.arr.length })",
        Some("{ arr: string[] }"),
    ))
    .unwrap();
    assert_eq!(
        json,
        json!([
            { "$addFields": { "a": "$x" } },
            { "$addFields": { "b": { "$size": "$arr" } } },
        ])
    );
}

#[test]
fn test_operator_reference() {
    let overview = get_reference_overview();
    assert!(overview.contains("$addFields"));
    assert!(get_operator_reference("arrays").unwrap().contains("$filter"));
    assert_eq!(Topic::from_name("Array-Methods"), Some(Topic::Arrays));
    assert!(matches!(
        get_operator_reference("nope"),
        Err(CliError::UnknownTopic(_))
    ));
}
