//! An arena backed JSON document object model.
//!
//! A [Document] owns a tree of JSON values. Text (or raw bytes) is parsed into the tree, which
//! can then be navigated through [ValueRef] views, modified in place through [ValueMut] views,
//! and serialized back into compact JSON text.
//!
//! ```
//! use chisel_dom::Document;
//!
//! let mut doc: Document = r#"{"member1":12345,"member2":[1,2,3]}"#.parse().unwrap();
//! doc.value_mut().get_member_mut("member1").unwrap().set_int(54321);
//! doc.value_mut().get_member_mut("member2").unwrap().append(4).unwrap();
//! assert_eq!(doc.to_json_string(), r#"{"member1":54321,"member2":[1,2,3,4]}"#);
//! ```
use std::fmt::{Display, Formatter};

use crate::value::{equal, Shape, Shaped};

pub mod arena;
pub mod coords;
pub mod decoders;
pub mod document;
pub mod errors;
pub mod lexer;
mod parser;
pub mod paths;
pub mod value;
mod writer;

pub use arena::{ArenaStats, NodeId};
pub use decoders::Encoding;
pub use document::Document;
pub use errors::{DomError, DomResult, ParserError, ParserErrorDetails, ParserResult};
pub use parser::ParserConfig;
pub use value::{IntoNode, Kind, ValueMut, ValueRef};
pub use writer::write_string;

/// Basic enumeration of different Json values, independent of any [Document]
#[derive(Debug, Clone)]
pub enum JsonValue {
    /// Map of values, in insertion order
    Object(Vec<(String, JsonValue)>),
    /// Array of values
    Array(Vec<JsonValue>),
    /// Canonical string value
    String(String),

    /// Floating point numeric value
    Float(f64),

    /// 64 bit integer numeric value
    Integer64(i64),
    /// 32 bit integer numeric value
    Integer(i32),
    /// Canonical boolean value
    Boolean(bool),
    /// Canonical null value
    Null,
}

impl<'v> Shaped<'v> for &'v JsonValue {
    fn shape(self) -> Shape<'v, Self> {
        match self {
            JsonValue::Null => Shape::Null,
            JsonValue::Boolean(value) => Shape::Bool(*value),
            JsonValue::Integer(value) => Shape::Integer(i64::from(*value)),
            JsonValue::Integer64(value) => Shape::Integer(*value),
            JsonValue::Float(value) => Shape::Double(*value),
            JsonValue::String(s) => Shape::String(s),
            JsonValue::Array(elements) => Shape::Array(elements.iter().collect()),
            JsonValue::Object(pairs) => Shape::Object(
                pairs
                    .iter()
                    .map(|(key, value)| (key.as_str(), value))
                    .collect(),
            ),
        }
    }
}

impl PartialEq for JsonValue {
    fn eq(&self, other: &Self) -> bool {
        equal(self, other)
    }
}

impl Display for JsonValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writer::write_value(self, f)
    }
}

/// Nested values are released from an explicit stack, so dropping a deep tree can't exhaust
/// the call stack
impl Drop for JsonValue {
    fn drop(&mut self) {
        let mut children = match self {
            JsonValue::Array(elements) if !elements.is_empty() => std::mem::take(elements),
            JsonValue::Object(pairs) if !pairs.is_empty() => {
                std::mem::take(pairs).into_iter().map(|(_, v)| v).collect()
            }
            _ => return,
        };
        while let Some(mut child) = children.pop() {
            match &mut child {
                JsonValue::Array(elements) => children.append(elements),
                JsonValue::Object(pairs) => {
                    children.extend(std::mem::take(pairs).into_iter().map(|(_, v)| v))
                }
                _ => (),
            }
        }
    }
}

impl From<bool> for JsonValue {
    fn from(value: bool) -> Self {
        JsonValue::Boolean(value)
    }
}

impl From<i32> for JsonValue {
    fn from(value: i32) -> Self {
        JsonValue::Integer(value)
    }
}

impl From<i64> for JsonValue {
    fn from(value: i64) -> Self {
        JsonValue::Integer64(value)
    }
}

impl From<f64> for JsonValue {
    fn from(value: f64) -> Self {
        JsonValue::Float(value)
    }
}

impl From<&str> for JsonValue {
    fn from(value: &str) -> Self {
        JsonValue::String(value.to_string())
    }
}

impl From<String> for JsonValue {
    fn from(value: String) -> Self {
        JsonValue::String(value)
    }
}
