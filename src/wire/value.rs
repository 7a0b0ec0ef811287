//! Dynamically typed wire values
//!
//! Inbound payloads are loosely typed lists; every element is one of a small
//! closed set of shapes. The dispatcher decodes them into typed structs at
//! the boundary, so [`Value`] only needs shape checks and coercing accessors.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single dynamically typed wire value.
///
/// Numbers on the wire may arrive as either integers or floats depending on
/// what the target serialized; the `as_i64`/`as_f64` accessors coerce between
/// the two the way the original loosely typed payloads did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
    /// Opaque reference to an object living in the target process
    Object(u64),
    /// Scene-tree node path
    NodePath(String),
}

impl Value {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Float(f) => Some(*f as i64),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Int(i) if *i >= 0 => Some(*i as u64),
            Value::Object(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        self.as_f64().map(|f| f as f32)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            Value::NodePath(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Value::Float(f64::from(f))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(l: Vec<Value>) -> Self {
        Value::List(l)
    }
}

/// Bridge from JSON, so hosts and tests can build payloads with
/// `serde_json::json!`. Integral JSON numbers become `Int`, everything else
/// numeric becomes `Float`.
impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Nil,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else {
                    Value::Float(n.as_f64().unwrap_or(0.0))
                }
            }
            serde_json::Value::String(s) => Value::Str(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Map(
                map.into_iter().map(|(k, v)| (k, Value::from(v))).collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numeric_coercion() {
        assert_eq!(Value::Int(3).as_f64(), Some(3.0));
        assert_eq!(Value::Float(3.7).as_i64(), Some(3));
        assert_eq!(Value::Str("3".into()).as_i64(), None);
    }

    #[test]
    fn from_json() {
        let v = Value::from(json!(["tag", [1, 2.5, {"k": true}]]));
        let list = v.as_list().unwrap();
        assert_eq!(list[0].as_str(), Some("tag"));
        let inner = list[1].as_list().unwrap();
        assert_eq!(inner[0], Value::Int(1));
        assert_eq!(inner[1], Value::Float(2.5));
        assert_eq!(inner[2].as_map().unwrap()["k"], Value::Bool(true));
    }

    #[test]
    fn node_path_reads_as_str() {
        assert_eq!(Value::NodePath("/root/Main".into()).as_str(), Some("/root/Main"));
    }
}
