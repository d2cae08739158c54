//! Data types used in the thing-model TLV protocol

pub mod function;
pub mod operation;
pub mod request;
pub mod response;
pub mod value;

// Re-export types
pub use function::{
    COMBINE_RESOURCE_RANGE, DataType, FunctionId, FunctionType, ResourceType,
    STATIC_RESOURCE_RANGE,
};
pub use operation::{DecodedOperation, DeviceKind, Direction, Method, Operation, TargetKind};
pub use request::{FunctionParam, GroupParam, Operations, Request, RequestData, RequestParam};
pub use response::{Params, Response, ResponseData, SubDevicePoints, SubDeviceStrings};
pub use value::{FunctionPoint, Value, ValueType};
