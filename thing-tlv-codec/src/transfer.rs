//! Value transcoders
//!
//! One encode/decode pair per wire data type, dispatched over the
//! [`ValueType`]/[`DataType`] tags. Variable-length values (buffer,
//! string, json) carry the four-size-class prefix of [`crate::length`];
//! fixed-length values are written bare.

use crate::length;
use bytes::{BufMut, BytesMut};
use thing_tlv_core::datatypes::{DataType, FunctionType, Value, ValueType};
use thing_tlv_core::{TlvError, TlvResult};

/// Protocol-level bound on integer values. Narrower than the 32-bit
/// wire field on purpose.
pub const INTEGER_MIN: i32 = -65536;
pub const INTEGER_MAX: i32 = 65535;

fn mismatch(expected: &str, value: &Value) -> TlvError {
    TlvError::TypeMismatch(format!(
        "expected a {} value, got {}",
        expected,
        value.kind_name()
    ))
}

/// Encode `value` with the transcoder selected by `value_type`,
/// appending the wire bytes (including any length prefix) to `buf`.
pub fn encode(value_type: ValueType, value: &Value, buf: &mut BytesMut) -> TlvResult<()> {
    match value_type {
        ValueType::Boolean => match value {
            Value::Bool(b) => {
                buf.put_u8(*b as u8);
                Ok(())
            }
            other => Err(mismatch("boolean", other)),
        },
        ValueType::Enum => match value {
            Value::Enum(e) => {
                buf.put_u8(*e);
                Ok(())
            }
            Value::Integer(n) if (0..=255).contains(n) => {
                buf.put_u8(*n as u8);
                Ok(())
            }
            Value::Integer(n) => Err(TlvError::ValueOutOfRange(format!(
                "enum value must be 0..=255, got {}",
                n
            ))),
            other => Err(mismatch("enum", other)),
        },
        ValueType::Integer => match value {
            Value::Integer(n) => {
                if !(INTEGER_MIN..=INTEGER_MAX).contains(n) {
                    return Err(TlvError::ValueOutOfRange(format!(
                        "integer value must be {}..={}, got {}",
                        INTEGER_MIN, INTEGER_MAX, n
                    )));
                }
                buf.put_i32(*n);
                Ok(())
            }
            other => Err(mismatch("integer", other)),
        },
        ValueType::Float => match value {
            Value::Float(f) => {
                buf.put_f32(*f);
                Ok(())
            }
            Value::Integer(n) => {
                buf.put_f32(*n as f32);
                Ok(())
            }
            other => Err(mismatch("float", other)),
        },
        ValueType::Exception => {
            let bitmap = match value {
                Value::Integer(n) if *n >= 0 => *n as u32,
                Value::Integer(n) => {
                    return Err(TlvError::ValueOutOfRange(format!(
                        "exception bitmap must be non-negative, got {}",
                        n
                    )));
                }
                Value::Exception(indices) => {
                    let mut bitmap = 0u32;
                    for &index in indices {
                        if index > 31 {
                            return Err(TlvError::ValueOutOfRange(format!(
                                "exception bit index must be 0..=31, got {}",
                                index
                            )));
                        }
                        bitmap |= 1 << index;
                    }
                    bitmap
                }
                other => return Err(mismatch("exception", other)),
            };
            buf.put_u32(bitmap);
            Ok(())
        }
        ValueType::Buffer => {
            let octets = match value {
                Value::Buffer(hex_str) | Value::String(hex_str) => hex::decode(hex_str)
                    .map_err(|e| TlvError::TypeMismatch(format!("invalid hex string: {}", e)))?,
                other => return Err(mismatch("buffer", other)),
            };
            write_prefixed(buf, &octets)
        }
        ValueType::String => match value {
            Value::String(s) => write_prefixed(buf, s.as_bytes()),
            other => Err(mismatch("string", other)),
        },
        ValueType::Json => {
            let text = match value {
                Value::Json(v) => serde_json::to_string(v)?,
                Value::String(s) => s.clone(),
                other => return Err(mismatch("json", other)),
            };
            write_prefixed(buf, text.as_bytes())
        }
    }
}

fn write_prefixed(buf: &mut BytesMut, octets: &[u8]) -> TlvResult<()> {
    length::write_length(buf, octets.len())?;
    buf.put_slice(octets);
    Ok(())
}

/// Decode the exact value slice `bytes` as `data_type`.
///
/// A string value under an event function type is reinterpreted as JSON
/// text; failing to parse it is an error.
pub fn decode(data_type: DataType, function_type: FunctionType, bytes: &[u8]) -> TlvResult<Value> {
    if let Some(expected) = data_type.fixed_len() {
        if bytes.len() != expected {
            return Err(TlvError::MalformedFrame(format!(
                "{:?} value must be {} byte(s), got {}",
                data_type,
                expected,
                bytes.len()
            )));
        }
    }
    match data_type {
        DataType::Boolean => match bytes[0] {
            0 => Ok(Value::Bool(false)),
            1 => Ok(Value::Bool(true)),
            other => Err(TlvError::ValueOutOfRange(format!(
                "boolean byte must be 0 or 1, got {}",
                other
            ))),
        },
        DataType::Enum => Ok(Value::Enum(bytes[0])),
        DataType::Integer => Ok(Value::Integer(i32::from_be_bytes([
            bytes[0], bytes[1], bytes[2], bytes[3],
        ]))),
        DataType::Float => Ok(Value::Float(f32::from_be_bytes([
            bytes[0], bytes[1], bytes[2], bytes[3],
        ]))),
        DataType::Exception => {
            let bitmap = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
            Ok(Value::Exception(set_bit_indices(bitmap)))
        }
        DataType::Buffer => Ok(Value::Buffer(hex::encode(bytes))),
        DataType::String => {
            let text = std::str::from_utf8(bytes)
                .map_err(|e| TlvError::TypeMismatch(format!("invalid UTF-8 string: {}", e)))?;
            if function_type == FunctionType::Event {
                // Event payloads are JSON text on the wire.
                Ok(Value::Json(serde_json::from_str(text)?))
            } else {
                Ok(Value::String(text.to_string()))
            }
        }
    }
}

/// Indices of the set bits, LSB first.
fn set_bit_indices(bitmap: u32) -> Vec<u8> {
    (0..32).filter(|i| bitmap & (1 << i) != 0).collect()
}
