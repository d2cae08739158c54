//! Operation code bitfields for the thing-model TLV protocol
//!
//! The 8-bit operation code packs four fields:
//!
//! ```text
//! ┌──────────────┬────────────────┬───────────────┬─────────────┐
//! │ bit 7        │ bit 6          │ bit 5         │ bits 4 ── 0 │
//! │ 0 = request  │ 0 = device     │ 0 = resource  │ method      │
//! │ 1 = response │ 1 = sub-device │ 1 = system    │             │
//! └──────────────┴────────────────┴───────────────┴─────────────┘
//! ```

use crate::error::{TlvError, TlvResult};
use serde::{Deserialize, Serialize};

const OPERATION_RESPONSE: u8 = 0x80;
const TYPE_SUB_DEVICE: u8 = 0x40;
const TARGET_SYSTEM: u8 = 0x20;
const METHOD_MASK: u8 = 0x1F;

/// Direction of the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Request,
    Response,
}

/// Whether the frame concerns the device itself or a proxied sub-device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeviceKind {
    Device,
    SubDevice,
}

/// Whether the operation addresses a resource or the system lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Resource,
    System,
}

/// Operation method. Resource targets use read/write/notify; system
/// targets use the lifecycle commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Method {
    Read,
    Write,
    Notify,
    Reset,
    Recovery,
    Register,
    Deregister,
    Enable,
    Disable,
    Label,
    Upgrade,
    DeleteTopology,
    Offline,
    Online,
}

/// Structured operation descriptor used when encoding a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Operation {
    pub operation: Direction,
    #[serde(rename = "type")]
    pub device: DeviceKind,
    pub target: TargetKind,
    pub method: Method,
}

impl Operation {
    /// Pack the descriptor into the 8-bit operation code.
    pub fn encode(&self) -> TlvResult<u8> {
        let mut code = self.method_code()?;
        if self.operation == Direction::Response {
            code |= OPERATION_RESPONSE;
        }
        if self.device == DeviceKind::SubDevice {
            code |= TYPE_SUB_DEVICE;
        }
        if self.target == TargetKind::System {
            code |= TARGET_SYSTEM;
        }
        Ok(code)
    }

    fn method_code(&self) -> TlvResult<u8> {
        let code = match self.target {
            TargetKind::Resource => match self.method {
                Method::Read => 0x01,
                Method::Write => 0x02,
                Method::Notify => 0x03,
                other => {
                    return Err(TlvError::TypeMismatch(format!(
                        "method {:?} is not a resource operation",
                        other
                    )));
                }
            },
            TargetKind::System => match self.method {
                Method::Reset => 0x00,
                Method::Recovery => 0x01,
                Method::Register => 0x02,
                Method::Deregister => 0x03,
                Method::Enable => 0x04,
                Method::Disable => 0x05,
                Method::Label => 0x06,
                Method::Upgrade => 0x07,
                Method::DeleteTopology => 0x1D,
                Method::Offline => 0x1E,
                Method::Online => 0x1F,
                other => {
                    return Err(TlvError::TypeMismatch(format!(
                        "method {:?} is not a system operation",
                        other
                    )));
                }
            },
        };
        Ok(code)
    }
}

/// Operation descriptor decoded from a frame, with the raw code byte
/// preserved for correlation and for the opcode-keyed sub-device rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DecodedOperation {
    pub operation: Direction,
    #[serde(rename = "type")]
    pub device: DeviceKind,
    pub target: TargetKind,
    pub method: Method,
    pub code: u8,
}

impl DecodedOperation {
    /// Unpack an 8-bit operation code. Never fails: unknown method bits
    /// fall back to the per-target default (notify / register).
    pub fn decode(code: u8) -> Self {
        let operation = if code & OPERATION_RESPONSE != 0 {
            Direction::Response
        } else {
            Direction::Request
        };
        let device = if code & TYPE_SUB_DEVICE != 0 {
            DeviceKind::SubDevice
        } else {
            DeviceKind::Device
        };
        let target = if code & TARGET_SYSTEM != 0 {
            TargetKind::System
        } else {
            TargetKind::Resource
        };
        let method = match target {
            TargetKind::Resource => match code & METHOD_MASK {
                0x01 => Method::Read,
                0x02 => Method::Write,
                _ => Method::Notify,
            },
            TargetKind::System => match code & METHOD_MASK {
                0x00 => Method::Reset,
                0x01 => Method::Recovery,
                0x03 => Method::Deregister,
                0x04 => Method::Enable,
                0x05 => Method::Disable,
                0x06 => Method::Label,
                0x07 => Method::Upgrade,
                0x1D => Method::DeleteTopology,
                0x1E => Method::Offline,
                0x1F => Method::Online,
                _ => Method::Register,
            },
        };
        Self {
            operation,
            device,
            target,
            method,
            code,
        }
    }

    pub fn is_response(&self) -> bool {
        self.operation == Direction::Response
    }

    pub fn is_sub_device(&self) -> bool {
        self.device == DeviceKind::SubDevice
    }

    pub fn is_system(&self) -> bool {
        self.target == TargetKind::System
    }

    /// True for a device-level resource READ request, which carries bare
    /// function ids without values.
    pub fn is_bare_read(&self) -> bool {
        self.operation == Direction::Request
            && self.device == DeviceKind::Device
            && self.target == TargetKind::Resource
            && self.method == Method::Read
    }

    /// The descriptor without the raw code, for comparing against an
    /// encode-side [`Operation`].
    pub fn descriptor(&self) -> Operation {
        Operation {
            operation: self.operation,
            device: self.device,
            target: self.target,
            method: self.method,
        }
    }
}
