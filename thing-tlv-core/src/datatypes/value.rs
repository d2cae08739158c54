//! Structured-domain values of function points

use crate::datatypes::function::{DataType, FunctionId, FunctionType, ResourceType};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Transcoder selector for encoding. Mirrors the wire data types plus
/// `json`, which shares the string wire shape but carries parsed JSON in
/// the structured domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Boolean,
    Enum,
    Integer,
    Float,
    Buffer,
    Exception,
    String,
    Json,
}

impl ValueType {
    /// The wire data type this transcoder produces.
    pub fn data_type(self) -> DataType {
        match self {
            ValueType::Boolean => DataType::Boolean,
            ValueType::Enum => DataType::Enum,
            ValueType::Integer => DataType::Integer,
            ValueType::Float => DataType::Float,
            ValueType::Buffer => DataType::Buffer,
            ValueType::Exception => DataType::Exception,
            ValueType::String | ValueType::Json => DataType::String,
        }
    }
}

/// A function-point value in the structured domain.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Enum(u8),
    Integer(i32),
    Float(f32),
    /// Hex-encoded octets.
    Buffer(String),
    /// Indices of the set bits in the 32-bit exception bitmap, index 0
    /// being the least significant bit.
    Exception(Vec<u8>),
    String(String),
    Json(serde_json::Value),
    /// Nested function points of a combine group, in wire order.
    Group(Vec<FunctionPoint>),
}

impl Value {
    /// Buffer value from raw bytes (stored as a hex string).
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Value::Buffer(hex::encode(bytes))
    }

    /// Name used in type-mismatch error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Enum(_) => "enum",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::Buffer(_) => "buffer",
            Value::Exception(_) => "exception",
            Value::String(_) => "string",
            Value::Json(_) => "json",
            Value::Group(_) => "group",
        }
    }

    pub fn as_group(&self) -> Option<&[FunctionPoint]> {
        match self {
            Value::Group(points) => Some(points),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::Buffer(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Enum(e) => write!(f, "{}", e),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(v) => write!(f, "{}", v),
            Value::Buffer(hex) => write!(f, "0x{}", hex),
            Value::Exception(bits) => {
                let joined: Vec<String> = bits.iter().map(|b| b.to_string()).collect();
                write!(f, "[{}]", joined.join(","))
            }
            Value::String(s) => write!(f, "{}", s),
            Value::Json(v) => write!(f, "{}", v),
            Value::Group(points) => write!(f, "group of {} point(s)", points.len()),
        }
    }
}

/// One decoded function point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionPoint {
    pub function_id: u16,
    pub data_type: DataType,
    pub function_type: FunctionType,
    pub resource_id: u16,
    pub resource_type: ResourceType,
    /// Absent for bare READ-request entries.
    pub value: Option<Value>,
    /// Unix-millis timestamp stamped at decode time; sub-device time
    /// markers overwrite it.
    pub time: u64,
}

impl FunctionPoint {
    pub fn new(id: FunctionId, value: Option<Value>, time: u64) -> Self {
        Self {
            function_id: id.encode(),
            data_type: id.data_type,
            function_type: id.function_type,
            resource_id: id.resource_id,
            resource_type: id.resource_type,
            value,
            time,
        }
    }
}
