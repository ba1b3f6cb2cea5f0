//! Operator reference for the aggc CLI

use super::CliError;

/// Reference topics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topic {
    References,
    Arithmetic,
    Comparison,
    Logic,
    Arrays,
    Stages,
}

impl Topic {
    /// Parse topic name from string
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "references" | "refs" | "fields" => Some(Self::References),
            "arithmetic" | "math" => Some(Self::Arithmetic),
            "comparison" | "compare" => Some(Self::Comparison),
            "logic" | "logical" | "conditional" => Some(Self::Logic),
            "arrays" | "array" | "array_methods" => Some(Self::Arrays),
            "stages" | "stage" | "pipeline" => Some(Self::Stages),
            _ => None,
        }
    }
}

/// Get the reference overview (topic listing)
pub fn get_reference_overview() -> String {
    let mut out = String::from(
        r#"AGGREGATE COMPILER REFERENCE

aggc compiles TypeScript builder functions into aggregation pipelines.
Inside a builder the placeholder (`this` by default) stands for the current
document; fields, operators and array methods on it become aggregation
expressions.

    aggregate(function (this: { foo: string }) {
      return this.$addFields({ bar: this.foo });
    });

    => [{"$addFields": {"bar": "$foo"}}]

TOPICS

  references        Field references, locals and literals
  arithmetic        + - * / on numeric operands
  comparison        === !== > >= < <=
  logic             && || ! and the conditional operator
  arrays            length, indexing and array methods
  stages            Pipeline stages

STAGES
"#,
    );
    for stage in crate::STAGES {
        out.push_str(&format!(
            "  {:<18}{} (arguments: {})\n",
            stage.name, stage.description, stage.arity
        ));
    }
    out.push_str("\nRun 'aggc operators <topic>' for detailed documentation.\n");
    out
}

/// Get documentation for a specific topic
pub fn get_operator_reference(name: &str) -> Result<&'static str, CliError> {
    match Topic::from_name(name) {
        Some(Topic::References) => Ok(REFERENCES_DOC),
        Some(Topic::Arithmetic) => Ok(ARITHMETIC_DOC),
        Some(Topic::Comparison) => Ok(COMPARISON_DOC),
        Some(Topic::Logic) => Ok(LOGIC_DOC),
        Some(Topic::Arrays) => Ok(ARRAYS_DOC),
        Some(Topic::Stages) => Ok(STAGES_DOC),
        None => Err(CliError::UnknownTopic(name.to_string())),
    }
}

const REFERENCES_DOC: &str = r#"REFERENCES - Fields, Locals, and Literals

FIELD ACCESS
  this.field
  this["field"]
    A field of the current document.

    Example:
      Source: this.foo
      Output: "$foo"

    Constraints:
      - Only direct fields of the placeholder; `this.a.b` is rejected
      - Bracket keys must be non-empty string literals

LOCAL VARIABLES
  v
    The parameter of a `filter` or `map` callback, inside that callback.

    Example:
      Source: this.arr.map(v => v)
      Output: {"$map": {"input": "$arr", "as": "v", "in": "$$v"}}

    Constraints:
      - Only visible inside the callback that binds it
      - Unbound identifiers are rejected

LITERALS
  0   1.5   -3   "text"   true   false   null
    Every constant is wrapped, so a string can never be read as a field path.

    Example:
      Source: "$foo"
      Output: {"$literal": "$foo"}
"#;

const ARITHMETIC_DOC: &str = r#"ARITHMETIC - Numeric Operators

  +     $add
  -     $subtract
  *     $multiply
  /     $divide

  Examples:
    this.na + this.nb       {"$add": ["$na", "$nb"]}
    this.na - 1             {"$subtract": ["$na", {"$literal": 1}]}

  Constraints:
    - Both operands must be known to be numbers
    - Operand order is kept: a - b and b - a differ
    - % and unary - on expressions are not supported
"#;

const COMPARISON_DOC: &str = r#"COMPARISON - Equality and Ordering

  ===   $eq
  !==   $ne
  >     $gt
  >=    $gte
  <     $lt
  <=    $lte

  Examples:
    this.na === this.nb     {"$eq": ["$na", "$nb"]}
    this.na >= 18           {"$gte": ["$na", {"$literal": 18}]}

  Constraints:
    - Operands may have any type
    - Loose == and != are rejected; use === or !==
"#;

const LOGIC_DOC: &str = r#"LOGIC - Boolean Operators and Conditionals

  &&    $and
  ||    $or
  !     $not

  Examples:
    this.ba && this.bb      {"$and": ["$ba", "$bb"]}
    !this.ba                {"$not": ["$ba"]}

  Constraints:
    - Operands must be known to be booleans

CONDITIONAL
  c ? a : b
    $cond with named branches.

    Example:
      Source: this.ba ? this.na : this.nb
      Output: {"$cond": {"if": "$ba", "then": "$na", "else": "$nb"}}
"#;

const ARRAYS_DOC: &str = r#"ARRAYS - Length, Indexing, and Methods

  arr.length              $size
  arr[i]                  $arrayElemAt
  Array.isArray(x)        $isArray
  arr.concat(other)       $concatArrays
  arr.filter(v => c)      $filter
  arr.map(v => e)         $map
  arr.includes(x)         $in
  arr.indexOf(x)          $indexOfArray
  arr.reverse()           $reverseArray

  Examples:
    this.arr.length
      {"$size": "$arr"}

    this.arr[this.arr.length - 1]
      {"$arrayElemAt": ["$arr", {"$subtract": [{"$size": "$arr"}, {"$literal": 1}]}]}

    this.arr.filter(v => v !== 0)
      {"$filter": {"input": "$arr", "as": "v", "cond": {"$ne": ["$$v", {"$literal": 0}]}}}

    this.arr.includes(this.na)
      {"$in": ["$na", "$arr"]}

  Constraints:
    - The receiver must be known to be an array
    - filter and map take one callback with exactly one parameter
    - The callback body is an expression or a single return statement
    - includes puts the needle first, as $in expects
"#;

const STAGES_DOC: &str = r#"STAGES - Pipeline Steps

CHAINS
  this.$stage(..).$stage(..)
    Stages run in the order they are called.

    Example:
      Source: this.$addFields({ a: this.x }).$addFields({ b: this.y })
      Output: [{"$addFields": {"a": "$x"}}, {"$addFields": {"b": "$y"}}]

    Constraints:
      - The chain must start at the placeholder
      - A pipeline needs at least one stage

$addFields
  this.$addFields({ key: expression, ... })
    Adds or replaces fields; key order is kept.

    Constraints:
      - Exactly one object literal argument
      - Keys are identifiers or string literals
      - Shorthand, computed and repeated keys are rejected
"#;
