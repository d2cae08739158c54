//! Structured request description consumed by the packager

use crate::datatypes::operation::Operation;
use crate::datatypes::value::{Value, ValueType};
use serde::Serialize;

/// A frame to encode.
#[derive(Debug, Clone, Serialize)]
pub struct Request {
    /// Protocol version, `"major.minor.patch"`. Only the major part is
    /// carried on the wire.
    pub version: String,
    /// Optional message id.
    pub id: Option<u32>,
    pub operations: Operations,
    /// Response code; required when the operation is a response.
    pub code: Option<u8>,
    pub data: Option<RequestData>,
}

impl Request {
    pub fn new(version: impl Into<String>, operations: Operations) -> Self {
        Self {
            version: version.into(),
            id: None,
            operations,
            code: None,
            data: None,
        }
    }

    pub fn with_id(mut self, id: u32) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_code(mut self, code: u8) -> Self {
        self.code = Some(code);
        self
    }

    pub fn with_data(mut self, data: RequestData) -> Self {
        self.data = Some(data);
        self
    }
}

/// Either a structured operation descriptor or a precomputed code byte.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(untagged)]
pub enum Operations {
    Code(u8),
    Fields(Operation),
}

/// The request payload: an ordered list of function entries, optionally
/// wrapped in a top-level combine group.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RequestData {
    /// Combine group id wrapping the whole payload.
    pub group_id: Option<u16>,
    pub params: Vec<RequestParam>,
}

impl RequestData {
    pub fn new(params: Vec<RequestParam>) -> Self {
        Self {
            group_id: None,
            params,
        }
    }

    pub fn grouped(group_id: u16, params: Vec<RequestParam>) -> Self {
        Self {
            group_id: Some(group_id),
            params,
        }
    }
}

/// One payload entry: a plain function point or a grouped set of points
/// (a combine group, or one sub-device's points).
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum RequestParam {
    Function(FunctionParam),
    Group(GroupParam),
}

/// A plain function point. `value_type`/`value` are absent for bare
/// READ entries.
#[derive(Debug, Clone, Serialize)]
pub struct FunctionParam {
    pub function_id: u16,
    pub value_type: Option<ValueType>,
    pub value: Option<Value>,
}

impl FunctionParam {
    pub fn new(function_id: u16, value_type: ValueType, value: Value) -> Self {
        Self {
            function_id,
            value_type: Some(value_type),
            value: Some(value),
        }
    }

    /// Function id without a value, as used by READ requests.
    pub fn bare(function_id: u16) -> Self {
        Self {
            function_id,
            value_type: None,
            value: None,
        }
    }
}

impl From<FunctionParam> for RequestParam {
    fn from(param: FunctionParam) -> Self {
        RequestParam::Function(param)
    }
}

/// A grouped set of function points encoded as a combine group keyed by
/// `group_id`.
#[derive(Debug, Clone, Serialize)]
pub struct GroupParam {
    pub group_id: u16,
    pub params: Vec<FunctionParam>,
}

impl From<GroupParam> for RequestParam {
    fn from(param: GroupParam) -> Self {
        RequestParam::Group(param)
    }
}
