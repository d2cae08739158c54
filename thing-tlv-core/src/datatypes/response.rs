//! Normalized response produced by the parser

use crate::datatypes::operation::DecodedOperation;
use crate::datatypes::value::{FunctionPoint, Value};
use serde::Serialize;
use std::collections::BTreeMap;

/// One sub-device's entries under fixed-count framing. Values are raw
/// strings; the trailing entry of a READ group has none.
pub type SubDeviceStrings = BTreeMap<u16, Option<String>>;

/// One sub-device's entries under marker-delimited framing.
pub type SubDevicePoints = BTreeMap<u16, FunctionPoint>;

/// Decoded frame in its normalized shape.
#[derive(Debug, Clone, Serialize)]
pub struct Response {
    /// Reconstructed as `"{major}.0.0"`; the wire only carries the major.
    pub version: String,
    pub id: Option<u32>,
    pub operations: DecodedOperation,
    /// Response code byte, present only on responses.
    pub code: Option<u8>,
    /// Unix-millis timestamp stamped at decode time.
    pub time: u64,
    pub data: ResponseData,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResponseData {
    pub params: Params,
}

/// Decoded payload. Device-level frames yield a map keyed by function
/// id; sub-device frames yield one map per sub-device. The asymmetry is
/// part of the protocol contract.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Params {
    /// Device-level payload keyed by function id.
    Device(BTreeMap<u16, FunctionPoint>),
    /// Sub-device payload, marker-delimited framing.
    SubDevicePoints(Vec<SubDevicePoints>),
    /// Sub-device payload, fixed-count framing.
    SubDeviceStrings(Vec<SubDeviceStrings>),
}

impl Params {
    pub fn is_empty(&self) -> bool {
        match self {
            Params::Device(map) => map.is_empty(),
            Params::SubDevicePoints(groups) => groups.is_empty(),
            Params::SubDeviceStrings(groups) => groups.is_empty(),
        }
    }

    pub fn as_device(&self) -> Option<&BTreeMap<u16, FunctionPoint>> {
        match self {
            Params::Device(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_sub_device_points(&self) -> Option<&[SubDevicePoints]> {
        match self {
            Params::SubDevicePoints(groups) => Some(groups),
            _ => None,
        }
    }

    pub fn as_sub_device_strings(&self) -> Option<&[SubDeviceStrings]> {
        match self {
            Params::SubDeviceStrings(groups) => Some(groups),
            _ => None,
        }
    }

    /// Convenience lookup of a device-level value.
    pub fn device_value(&self, function_id: u16) -> Option<&Value> {
        self.as_device()?
            .get(&function_id)
            .and_then(|point| point.value.as_ref())
    }
}
