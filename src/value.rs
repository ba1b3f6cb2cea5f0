/// A compiled aggregation expression.
///
/// This is the intermediate representation the compiler produces: a tree that
/// mirrors an aggregation expression document one-to-one. Serializing it is a
/// separate, purely mechanical step (see [`crate::output`]).
///
/// # Reference Kinds
///
/// The IR distinguishes what a bare string would conflate:
/// - [`Value::FieldRef`] is a document field, `$`-prefixed
/// - [`Value::LocalVarRef`] is a variable bound by `$filter`/`$map`, `$$`-prefixed
/// - [`Value::Literal`] is always emitted under `$literal`, so a string constant
///   can never be mistaken for a field path
///
/// # Examples
///
/// ```
/// use aggregate_compiler::{Scalar, Value};
///
/// // this.na + 1
/// let sum = Value::list(
///     "$add",
///     vec![Value::field("na"), Value::literal(Scalar::Integer(1))],
/// );
/// assert_eq!(sum.operator_name(), Some("$add"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Document field path, always `$name`
    FieldRef(String),

    /// Variable bound inside a `$filter`/`$map` body, always `$$name`
    LocalVarRef(String),

    /// Constant, wrapped in `$literal` on output
    Literal(Scalar),

    /// Plain variable name, the `as` entry of `$filter`/`$map`
    Name(String),

    /// Operator document `{ name: operands }`
    Operator {
        name: &'static str,
        operands: Operands,
    },
}

/// Operand shape of an operator. Each operator has exactly one.
#[derive(Debug, Clone, PartialEq)]
pub enum Operands {
    /// `{ $size: "$arr" }`
    Single(Box<Value>),

    /// `{ $add: ["$a", "$b"] }`
    List(Vec<Value>),

    /// `{ $cond: { if: .., then: .., else: .. } }`, order preserved
    Named(Vec<(&'static str, Value)>),
}

/// Scalar constants.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl Value {
    /// Field reference to `name`; the sigil is added here.
    pub fn field(name: &str) -> Self {
        Value::FieldRef(format!("${}", name))
    }

    /// Local variable reference to `name`; the sigil is added here.
    pub fn local(name: &str) -> Self {
        Value::LocalVarRef(format!("$${}", name))
    }

    pub fn literal(scalar: Scalar) -> Self {
        Value::Literal(scalar)
    }

    pub fn single(name: &'static str, operand: Value) -> Self {
        Value::Operator {
            name,
            operands: Operands::Single(Box::new(operand)),
        }
    }

    pub fn list(name: &'static str, operands: Vec<Value>) -> Self {
        Value::Operator {
            name,
            operands: Operands::List(operands),
        }
    }

    pub fn named(name: &'static str, operands: Vec<(&'static str, Value)>) -> Self {
        Value::Operator {
            name,
            operands: Operands::Named(operands),
        }
    }

    pub fn operator_name(&self) -> Option<&'static str> {
        match self {
            Value::Operator { name, .. } => Some(*name),
            _ => None,
        }
    }

    /// Reference string of a field or local reference, sigil included.
    pub fn reference(&self) -> Option<&str> {
        match self {
            Value::FieldRef(path) | Value::LocalVarRef(path) => Some(path),
            _ => None,
        }
    }
}

/// One pipeline stage, `{ name: { key: value, ... } }`.
#[derive(Debug, Clone, PartialEq)]
pub struct Stage {
    pub name: &'static str,
    pub body: Vec<(String, Value)>,
}

impl Stage {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.body.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }
}

/// Stages in the order they were called.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Pipeline {
    pub stages: Vec<Stage>,
}

impl Pipeline {
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Stage> {
        self.stages.iter()
    }
}

impl From<Vec<Stage>> for Pipeline {
    fn from(stages: Vec<Stage>) -> Self {
        Pipeline { stages }
    }
}
