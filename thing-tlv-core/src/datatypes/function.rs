//! Function identifier bitfields for the thing-model TLV protocol
//!
//! A function id packs three fields into 16 bits (big-endian on the wire):
//!
//! ```text
//! ┌─────────────┬───────────────┬────────────────┐
//! │ 15 ── 13    │ 12 ── 11      │ 10 ──────── 0  │
//! │ data type   │ function type │ resource id    │
//! └─────────────┴───────────────┴────────────────┘
//! ```

use crate::error::{TlvError, TlvResult};
use serde::{Deserialize, Serialize};

const DATA_TYPE_SHIFT: u16 = 13;
const FUNCTION_TYPE_SHIFT: u16 = 11;
const FUNCTION_TYPE_MASK: u16 = 0x0003;
const RESOURCE_ID_MASK: u16 = 0x07FF;

/// Resource id range of combine (group) function points.
pub const COMBINE_RESOURCE_RANGE: std::ops::RangeInclusive<u16> = 0x500..=0x6FF;
/// Resource id range of static function points.
pub const STATIC_RESOURCE_RANGE: std::ops::RangeInclusive<u16> = 0x700..=0x7FF;

/// Wire data type carried in bits 15-13 of a function id.
///
/// The all-zero bit pattern is reserved; decoding it fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Boolean = 1,
    Enum = 2,
    Integer = 3,
    Float = 4,
    Buffer = 5,
    Exception = 6,
    String = 7,
}

impl DataType {
    /// Decode the three data-type bits. 0 is reserved and fails.
    pub fn from_bits(bits: u8) -> TlvResult<Self> {
        match bits {
            1 => Ok(DataType::Boolean),
            2 => Ok(DataType::Enum),
            3 => Ok(DataType::Integer),
            4 => Ok(DataType::Float),
            5 => Ok(DataType::Buffer),
            6 => Ok(DataType::Exception),
            7 => Ok(DataType::String),
            other => Err(TlvError::UnknownDataType(other)),
        }
    }

    pub fn to_bits(self) -> u8 {
        self as u8
    }

    /// Wire length of a value of this type, `None` for the
    /// length-prefixed variable types (buffer, string).
    pub fn fixed_len(self) -> Option<usize> {
        match self {
            DataType::Boolean | DataType::Enum => Some(1),
            DataType::Integer | DataType::Float | DataType::Exception => Some(4),
            DataType::Buffer | DataType::String => None,
        }
    }
}

/// Function type carried in bits 12-11 of a function id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FunctionType {
    Reserve = 0,
    Custom = 1,
    Property = 2,
    Event = 3,
}

impl FunctionType {
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0x03 {
            0 => FunctionType::Reserve,
            1 => FunctionType::Custom,
            2 => FunctionType::Property,
            _ => FunctionType::Event,
        }
    }

    pub fn to_bits(self) -> u8 {
        self as u8
    }
}

/// Resource class derived from the resource id range. Not stored on the
/// wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Common,
    /// The value is a nested sequence of function points.
    Combine,
    Static,
}

impl ResourceType {
    /// Classify a resource id. Applies to property/event/reserve function
    /// types; custom ids are always common.
    pub fn classify(resource_id: u16) -> Self {
        if COMBINE_RESOURCE_RANGE.contains(&resource_id) {
            ResourceType::Combine
        } else if STATIC_RESOURCE_RANGE.contains(&resource_id) {
            ResourceType::Static
        } else {
            ResourceType::Common
        }
    }
}

/// The unpacked 16-bit function identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionId {
    pub data_type: DataType,
    pub function_type: FunctionType,
    pub resource_id: u16,
    pub resource_type: ResourceType,
}

impl FunctionId {
    /// Build a function id from its fields.
    pub fn new(data_type: DataType, function_type: FunctionType, resource_id: u16) -> TlvResult<Self> {
        if resource_id > RESOURCE_ID_MASK {
            return Err(TlvError::ValueOutOfRange(format!(
                "resource id must fit in 11 bits, got {}",
                resource_id
            )));
        }
        Ok(Self {
            data_type,
            function_type,
            resource_id,
            resource_type: Self::derive_resource_type(function_type, resource_id),
        })
    }

    /// Unpack a raw 16-bit function id.
    pub fn decode(raw: u16) -> TlvResult<Self> {
        let data_type = DataType::from_bits((raw >> DATA_TYPE_SHIFT) as u8)?;
        let function_type = FunctionType::from_bits(((raw >> FUNCTION_TYPE_SHIFT) & FUNCTION_TYPE_MASK) as u8);
        let resource_id = raw & RESOURCE_ID_MASK;
        Ok(Self {
            data_type,
            function_type,
            resource_id,
            resource_type: Self::derive_resource_type(function_type, resource_id),
        })
    }

    /// Pack the fields back into the raw 16-bit form.
    pub fn encode(&self) -> u16 {
        ((self.data_type.to_bits() as u16) << DATA_TYPE_SHIFT)
            | ((self.function_type.to_bits() as u16) << FUNCTION_TYPE_SHIFT)
            | (self.resource_id & RESOURCE_ID_MASK)
    }

    fn derive_resource_type(function_type: FunctionType, resource_id: u16) -> ResourceType {
        match function_type {
            FunctionType::Custom => ResourceType::Common,
            _ => ResourceType::classify(resource_id),
        }
    }
}
