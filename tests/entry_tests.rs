// tests/entry_tests.rs

use aggregate_compiler::{
    BuilderKind, CompileError, Compiled, CompiledEntry, CompilerConfig, Scalar, Stage, Value,
    compile_source, locate, parser::parse_program, to_json,
};
use pretty_assertions::assert_eq;

const CONTEXT: &str =
    "{ na: number; nb: number; ba: boolean; bb: boolean, arr: number[], arr2: number[] }";

fn entries(source: &str) -> Vec<CompiledEntry> {
    compile_source(source, &CompilerConfig::default()).expect("program should parse")
}

fn single(source: &str) -> Result<Compiled, CompileError> {
    let mut entries = entries(source);
    assert_eq!(entries.len(), 1, "expected exactly one entry point");
    entries.remove(0).result
}

/// Compiles `expr` as the body of an `aggregateOp` builder over [`CONTEXT`].
fn operator(expr: &str) -> Result<Compiled, CompileError> {
    single(&format!(
        "aggregateOp(function (this: {}) {{\n  return {};\n}});",
        CONTEXT, expr
    ))
}

fn operator_json(expr: &str) -> String {
    match operator(expr) {
        Ok(compiled) => to_json(&compiled),
        Err(error) => panic!("`{}` failed: {}", expr, error),
    }
}

// ============================================================================
// Operators against a declared context
// ============================================================================

#[test]
fn test_property_access() {
    assert_eq!(operator_json("this.foo"), r#""$foo""#);
}

#[test]
fn test_undeclared_fields_fail_arithmetic() {
    assert!(matches!(
        operator("this.doesntExist + this.b"),
        Err(CompileError::UnsupportedConstruct { .. })
    ));
}

#[test]
fn test_parenthesized_expression() {
    assert_eq!(operator_json("(this.na + this.nb)"), r#"{"$add":["$na","$nb"]}"#);
}

#[test]
fn test_arithmetic_operators() {
    let cases = vec![
        ("this.na + this.nb", r#"{"$add":["$na","$nb"]}"#),
        ("this.na - this.nb", r#"{"$subtract":["$na","$nb"]}"#),
        ("this.na * this.nb", r#"{"$multiply":["$na","$nb"]}"#),
        ("this.na / this.nb", r#"{"$divide":["$na","$nb"]}"#),
    ];
    for (expr, expected) in cases {
        assert_eq!(operator_json(expr), expected, "{}", expr);
    }
}

#[test]
fn test_boolean_operators() {
    let cases = vec![
        ("this.ba && this.bb", r#"{"$and":["$ba","$bb"]}"#),
        ("!this.ba", r#"{"$not":["$ba"]}"#),
        ("this.ba || this.bb", r#"{"$or":["$ba","$bb"]}"#),
        ("this.na > 1 && this.ba", r#"{"$and":[{"$gt":["$na",{"$literal":1}]},"$ba"]}"#),
    ];
    for (expr, expected) in cases {
        assert_eq!(operator_json(expr), expected, "{}", expr);
    }
}

#[test]
fn test_comparison_operators() {
    let cases = vec![
        ("this.na === this.nb", r#"{"$eq":["$na","$nb"]}"#),
        ("this.na !== this.nb", r#"{"$ne":["$na","$nb"]}"#),
        ("this.na > this.nb", r#"{"$gt":["$na","$nb"]}"#),
        ("this.na >= this.nb", r#"{"$gte":["$na","$nb"]}"#),
        ("this.na < this.nb", r#"{"$lt":["$na","$nb"]}"#),
        ("this.na <= this.nb", r#"{"$lte":["$na","$nb"]}"#),
    ];
    for (expr, expected) in cases {
        assert_eq!(operator_json(expr), expected, "{}", expr);
    }
}

#[test]
fn test_cond() {
    assert_eq!(
        operator_json("this.ba ? this.na : this.nb"),
        r#"{"$cond":{"if":"$ba","then":"$na","else":"$nb"}}"#
    );
}

#[test]
fn test_array_operators() {
    let cases = vec![
        ("this.arr[2]", r#"{"$arrayElemAt":["$arr",{"$literal":2}]}"#),
        (
            "this.arr[this.arr.length - 1]",
            r#"{"$arrayElemAt":["$arr",{"$subtract":[{"$size":"$arr"},{"$literal":1}]}]}"#,
        ),
        ("this.arr.concat(this.arr2)", r#"{"$concatArrays":["$arr","$arr2"]}"#),
        (
            "this.arr.filter((va) => va !== 0)",
            r#"{"$filter":{"input":"$arr","as":"va","cond":{"$ne":["$$va",{"$literal":0}]}}}"#,
        ),
        (
            "this.arr.map((va) => va + 1)",
            r#"{"$map":{"input":"$arr","as":"va","in":{"$add":["$$va",{"$literal":1}]}}}"#,
        ),
        ("this.arr.includes(3)", r#"{"$in":[{"$literal":3},"$arr"]}"#),
        ("this.arr.indexOf(3)", r#"{"$indexOfArray":["$arr",{"$literal":3}]}"#),
        ("Array.isArray(this.arr)", r#"{"$isArray":["$arr"]}"#),
        ("this.arr.reverse()", r#"{"$reverseArray":"$arr"}"#),
        ("this.arr.length", r#"{"$size":"$arr"}"#),
    ];
    for (expr, expected) in cases {
        assert_eq!(operator_json(expr), expected, "{}", expr);
    }
}

#[test]
fn test_chained_array_methods() {
    assert_eq!(
        operator_json("this.arr.filter(v => v > 0).map(v => v * 2).length"),
        concat!(
            r#"{"$size":{"$map":{"input":{"$filter":{"input":"$arr","as":"v","#,
            r#""cond":{"$gt":["$$v",{"$literal":0}]}}},"as":"v","#,
            r#""in":{"$multiply":["$$v",{"$literal":2}]}}}}"#
        )
    );
}

#[test]
fn test_literals() {
    assert_eq!(operator_json("3"), r#"{"$literal":3}"#);
    assert_eq!(operator_json(r#""foo""#), r#"{"$literal":"foo"}"#);
}

// ============================================================================
// Pipelines
// ============================================================================

#[test]
fn test_pipeline_entry() {
    let result = single(
        "const pipeline = aggregate(function (this: { foo: string }) {\n\
         \x20 return this.$addFields({ bar: this.foo });\n\
         });",
    );
    assert_eq!(
        result.as_ref().map(to_json).unwrap(),
        r#"[{"$addFields":{"bar":"$foo"}}]"#
    );
    let Ok(Compiled::Pipeline(pipeline)) = result else {
        panic!("expected a pipeline");
    };
    assert_eq!(
        pipeline.stages,
        vec![Stage {
            name: "$addFields",
            body: vec![("bar".to_string(), Value::field("foo"))],
        }]
    );
}

#[test]
fn test_pipeline_with_typed_fields() {
    let source = format!(
        "aggregate(function (this: {}) {{\n\
         \x20 return this\n\
         \x20   .$addFields({{ total: this.na + this.nb }})\n\
         \x20   .$addFields({{ positive: this.arr.filter(v => v > 0) }});\n\
         }});",
        CONTEXT
    );
    assert_eq!(
        single(&source).as_ref().map(to_json).unwrap(),
        concat!(
            r#"[{"$addFields":{"total":{"$add":["$na","$nb"]}}},"#,
            r#"{"$addFields":{"positive":{"$filter":{"input":"$arr","as":"v","#,
            r#""cond":{"$gt":["$$v",{"$literal":0}]}}}}}]"#
        )
    );
}

#[test]
fn test_generic_wrapper_type() {
    let result = single(
        "aggregateOp(function (this: Aggregate<{ arr: number[] }>) { return this.arr.length; })",
    );
    assert_eq!(result.as_ref().map(to_json).unwrap(), r#"{"$size":"$arr"}"#);
}

// ============================================================================
// Named placeholder
// ============================================================================

#[test]
fn test_named_placeholder_pipeline() {
    let result = single("aggregate((ctx) => ctx.$addFields({ bar: ctx.foo }))");
    assert_eq!(
        result.as_ref().map(to_json).unwrap(),
        r#"[{"$addFields":{"bar":"$foo"}}]"#
    );
}

#[test]
fn test_named_placeholder_operator() {
    let result = single(
        "aggregateOp((ctx: { na: number; nb: number }) => { return (ctx.na + ctx.nb); })",
    );
    assert_eq!(
        result.unwrap(),
        Compiled::Expression(Value::list(
            "$add",
            vec![Value::field("na"), Value::field("nb")]
        ))
    );
}

#[test]
fn test_named_placeholder_filter() {
    let result = single("aggregateOp((ctx: { arr: number[] }) => ctx.arr.filter(v => v !== 0))");
    assert_eq!(
        result.unwrap(),
        Compiled::Expression(Value::named(
            "$filter",
            vec![
                ("input", Value::field("arr")),
                ("as", Value::Name("v".to_string())),
                (
                    "cond",
                    Value::list(
                        "$ne",
                        vec![Value::local("v"), Value::literal(Scalar::Integer(0))]
                    )
                ),
            ]
        ))
    );
}

#[test]
fn test_this_is_not_special_under_named_placeholder() {
    let result = single("aggregateOp((ctx) => this.foo)");
    assert!(matches!(result, Err(CompileError::UnsupportedConstruct { .. })));
}

#[test]
fn test_default_placeholder_without_parameter() {
    let result = single("aggregateOp(function () { return this.foo; })");
    assert_eq!(result.unwrap(), Compiled::Expression(Value::field("foo")));

    let config = CompilerConfig::default().with_placeholder("doc");
    let entries = compile_source("aggregateOp(() => doc.foo)", &config).unwrap();
    assert_eq!(
        entries[0].result,
        Ok(Compiled::Expression(Value::field("foo")))
    );
}

// ============================================================================
// Builder shape
// ============================================================================

#[test]
fn test_builder_shape_errors() {
    for source in [
        "aggregate(this.pipeline)",
        "aggregate()",
        "aggregate(function () { return this.$addFields({}); }, 1)",
        "aggregate(function () { const x = 1; return this.$addFields({}); })",
        "aggregate(function () { this.$addFields({}); })",
        "aggregate((a, b) => a.$addFields({}))",
    ] {
        let result = single(source);
        assert!(
            matches!(result, Err(CompileError::Shape { .. })),
            "{}: {:?}",
            source,
            result
        );
    }
}

#[test]
fn test_pipeline_builder_returning_placeholder() {
    let result = single("aggregate(function () { return this; })");
    assert!(matches!(result, Err(CompileError::MalformedChain { .. })));
}

#[test]
fn test_pipeline_builder_with_unknown_stage() {
    let result = single("aggregate(function () { return this.$lookup({}); })");
    assert!(matches!(result, Err(CompileError::UnknownStage { .. })));
}

// ============================================================================
// Locating entry points
// ============================================================================

#[test]
fn test_program_without_entry_points() {
    assert!(entries("const a = 3;").is_empty());
    assert!(entries("").is_empty());
}

#[test]
fn test_entries_in_source_order() {
    let source = "\
const first = aggregate(function () { return this.$addFields({ a: this.x }); });
const second = aggregateOp(function () { return this.y; });
function build() {
  return aggregate(() => this.$addFields({ c: this.z }));
}
";
    let entries = entries(source);
    let kinds: Vec<_> = entries.iter().map(|entry| entry.kind).collect();
    assert_eq!(
        kinds,
        vec![
            BuilderKind::Pipeline,
            BuilderKind::Operator,
            BuilderKind::Pipeline
        ]
    );
    let lines: Vec<_> = entries.iter().map(|entry| entry.position.line).collect();
    assert_eq!(lines, vec![1, 2, 4]);
    assert!(entries.iter().all(|entry| entry.result.is_ok()));
}

#[test]
fn test_failing_entry_does_not_affect_others() {
    let source = "\
aggregateOp(function (this: { na: number }) { return this.na + 1; });
aggregateOp(function () { return this.na + 1; });
aggregateOp(function () { return this.ok; });
";
    let entries = entries(source);
    assert_eq!(entries.len(), 3);
    assert!(entries[0].result.is_ok());
    assert!(matches!(
        entries[1].result,
        Err(CompileError::UnsupportedConstruct { .. })
    ));
    assert_eq!(
        entries[2].result,
        Ok(Compiled::Expression(Value::field("ok")))
    );
}

#[test]
fn test_nested_builder_call_is_not_a_separate_entry() {
    let source = "aggregateOp(function () { return aggregateOp(() => this.x); })";
    let program = parse_program(source).unwrap();
    assert_eq!(locate(&program, &CompilerConfig::default()).len(), 1);
}

#[test]
fn test_builder_found_inside_other_calls() {
    let source = "run(aggregate(() => this.$addFields({ a: 1 })), { op: aggregateOp(() => this.b) });";
    let program = parse_program(source).unwrap();
    let found = locate(&program, &CompilerConfig::default());
    let names: Vec<_> = found.iter().map(|entry| entry.name).collect();
    assert_eq!(names, vec!["aggregate", "aggregateOp"]);
}

#[test]
fn test_custom_builder_names() {
    let config = CompilerConfig::default()
        .with_pipeline_builder("pipeline")
        .with_operator_builder("expr");
    let source = "pipeline(() => this.$addFields({ a: this.b }));\nexpr(() => this.c);\naggregate(() => this.d);";
    let entries = compile_source(source, &config).unwrap();
    let names: Vec<_> = entries.iter().map(|entry| entry.name.as_str()).collect();
    assert_eq!(names, vec!["pipeline", "expr"]);
}

#[test]
fn test_parse_error_is_reported() {
    let source = "aggregate(function () { return this.$addFields({ a: }); })";
    assert!(compile_source(source, &CompilerConfig::default()).is_err());
}
