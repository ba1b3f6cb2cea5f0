//! JSON output for compiled aggregation IR.
//!
//! Conversion is purely structural: the IR already distinguishes field
//! references, locals and literals, so nothing here needs to know what an
//! operator means.
//!
//! | IR                           | JSON                         |
//! |------------------------------|------------------------------|
//! | `FieldRef` / `LocalVarRef`   | `"$name"` / `"$$name"`       |
//! | `Literal(v)`                 | `{"$literal": v}`            |
//! | `Operator` with one operand  | `{"$size": operand}`         |
//! | `Operator` with a list       | `{"$add": [a, b]}`           |
//! | `Operator` with named fields | `{"$cond": {"if": ..}}`      |
//! | `Stage`                      | `{"$addFields": {..}}`       |
//! | `Pipeline`                   | `[stage, ..]`                |
//!
//! Object keys keep their IR order.
//!
//! # Examples
//!
//! ```
//! use aggregate_compiler::{Scalar, Value};
//! use aggregate_compiler::output::to_json;
//!
//! let value = Value::list("$ne", vec![Value::local("v"), Value::literal(Scalar::Integer(0))]);
//! assert_eq!(to_json(&value), r#"{"$ne":["$$v",{"$literal":0}]}"#);
//! ```

use serde_json::{Map, Number, Value as Json};

use crate::{
    entry::Compiled,
    value::{Operands, Pipeline, Scalar, Stage, Value},
};

/// Conversion into a JSON document.
pub trait ToDocument {
    fn to_document(&self) -> Json;
}

impl ToDocument for Scalar {
    fn to_document(&self) -> Json {
        match self {
            Scalar::Null => Json::Null,
            Scalar::Boolean(b) => Json::Bool(*b),
            Scalar::Integer(i) => Json::Number((*i).into()),
            Scalar::Float(f) => Number::from_f64(*f).map(Json::Number).unwrap_or(Json::Null),
            Scalar::String(s) => Json::String(s.clone()),
        }
    }
}

impl ToDocument for Value {
    fn to_document(&self) -> Json {
        match self {
            Value::FieldRef(path) | Value::LocalVarRef(path) | Value::Name(path) => {
                Json::String(path.clone())
            }
            Value::Literal(scalar) => single_key("$literal", scalar.to_document()),
            Value::Operator { name, operands } => single_key(name, operands.to_document()),
        }
    }
}

impl ToDocument for Operands {
    fn to_document(&self) -> Json {
        match self {
            Operands::Single(operand) => operand.to_document(),
            Operands::List(operands) => {
                Json::Array(operands.iter().map(ToDocument::to_document).collect())
            }
            Operands::Named(fields) => Json::Object(
                fields
                    .iter()
                    .map(|(key, value)| (key.to_string(), value.to_document()))
                    .collect(),
            ),
        }
    }
}

impl ToDocument for Stage {
    fn to_document(&self) -> Json {
        let body: Map<String, Json> = self
            .body
            .iter()
            .map(|(key, value)| (key.clone(), value.to_document()))
            .collect();
        single_key(self.name, Json::Object(body))
    }
}

impl ToDocument for Pipeline {
    fn to_document(&self) -> Json {
        Json::Array(self.iter().map(ToDocument::to_document).collect())
    }
}

impl ToDocument for Compiled {
    fn to_document(&self) -> Json {
        match self {
            Compiled::Pipeline(pipeline) => pipeline.to_document(),
            Compiled::Expression(value) => value.to_document(),
        }
    }
}

fn single_key(key: &str, value: Json) -> Json {
    let mut map = Map::with_capacity(1);
    map.insert(key.to_string(), value);
    Json::Object(map)
}

/// Compact JSON text.
pub fn to_json<T: ToDocument + ?Sized>(value: &T) -> String {
    value.to_document().to_string()
}

/// JSON text with two-space indentation.
pub fn to_json_pretty<T: ToDocument + ?Sized>(value: &T) -> String {
    format!("{:#}", value.to_document())
}
