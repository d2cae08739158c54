//! Frame packager
//!
//! Assembles a [`Request`] into its wire frame:
//!
//! ```text
//! version ‖ [msg id] ‖ operation ‖ [response code] ‖ payload ‖ crc16
//! ```
//!
//! The message id is present when the request carries one (flagged in the
//! version byte); the response code byte is present exactly when the
//! operation is a response.

use crate::crc::crc16;
use crate::length;
use crate::transfer;
use crate::validator::{NoopValidator, Validate};
use bytes::{BufMut, Bytes, BytesMut};
use thing_tlv_core::datatypes::{
    DecodedOperation, FunctionParam, GroupParam, Operations, Request, RequestData, RequestParam,
};
use thing_tlv_core::version::encode_version;
use thing_tlv_core::{TlvError, TlvResult};

/// Encodes requests into wire frames.
pub struct Packager {
    validator: Box<dyn Validate>,
}

impl Default for Packager {
    fn default() -> Self {
        Self::new()
    }
}

impl Packager {
    pub fn new() -> Self {
        Self {
            validator: Box::new(NoopValidator),
        }
    }

    pub fn with_validator(validator: Box<dyn Validate>) -> Self {
        Self { validator }
    }

    /// Encode `request` into a complete frame, CRC trailer included.
    pub fn package(&self, request: &Request) -> TlvResult<Bytes> {
        self.validator.validate(request)?;

        let mut frame = BytesMut::new();
        frame.put_u8(encode_version(&request.version, request.id.is_some())?);
        if let Some(id) = request.id {
            frame.put_u32(id);
        }

        let code = match request.operations {
            Operations::Code(code) => code,
            Operations::Fields(ref op) => op.encode()?,
        };
        frame.put_u8(code);
        let operation = DecodedOperation::decode(code);

        if operation.is_response() {
            let response_code = request.code.ok_or(TlvError::MissingField("code"))?;
            frame.put_u8(response_code);
        }

        if let Some(ref data) = request.data {
            check_read_arity(&operation, data)?;
            let payload = encode_payload(data)?;
            frame.put_slice(&payload);
        } else {
            check_read_arity(&operation, &RequestData::default())?;
        }

        let checksum = crc16(&frame);
        frame.put_u16(checksum);
        log::trace!(
            "packaged frame: {} bytes, operation 0x{:02X}, crc 0x{:04X}",
            frame.len(),
            code,
            checksum
        );
        Ok(frame.freeze())
    }
}

/// Device-level READ requests carry exactly one bare function id;
/// sub-device READ requests carry at least one.
fn check_read_arity(operation: &DecodedOperation, data: &RequestData) -> TlvResult<()> {
    if operation.is_bare_read() {
        if data.params.len() != 1 {
            return Err(TlvError::Arity(format!(
                "device read request requires exactly one function id, got {}",
                data.params.len()
            )));
        }
        // Read requests carry the function id alone; a value here would
        // produce a frame the other side cannot decode.
        match &data.params[0] {
            RequestParam::Function(param)
                if param.value.is_none() && param.value_type.is_none() => {}
            _ => {
                return Err(TlvError::TypeMismatch(
                    "device read request carries a bare function id, not a value"
                        .to_string(),
                ));
            }
        }
    }
    if operation.is_sub_device()
        && !operation.is_system()
        && !operation.is_response()
        && operation.descriptor().method == thing_tlv_core::datatypes::Method::Read
        && data.params.is_empty()
    {
        return Err(TlvError::Arity(
            "sub-device read request requires at least one function id".to_string(),
        ));
    }
    Ok(())
}

fn encode_payload(data: &RequestData) -> TlvResult<BytesMut> {
    let mut payload = BytesMut::new();
    for param in &data.params {
        match param {
            RequestParam::Function(function) => encode_function(function, &mut payload)?,
            RequestParam::Group(group) => encode_group(group, &mut payload)?,
        }
    }
    if let Some(group_id) = data.group_id {
        // Wrap the whole payload in a top-level combine group.
        let inner = payload;
        payload = BytesMut::new();
        payload.put_u16(group_id);
        length::write_length(&mut payload, inner.len())?;
        payload.put_slice(&inner);
    }
    Ok(payload)
}

fn encode_function(param: &FunctionParam, buf: &mut BytesMut) -> TlvResult<()> {
    buf.put_u16(param.function_id);
    match (param.value_type, &param.value) {
        (Some(value_type), Some(value)) => transfer::encode(value_type, value, buf),
        // Bare function id, as in READ requests.
        (None, None) => Ok(()),
        (Some(_), None) => Err(TlvError::MissingField("value")),
        (None, Some(_)) => Err(TlvError::MissingField("value_type")),
    }
}

fn encode_group(group: &GroupParam, buf: &mut BytesMut) -> TlvResult<()> {
    let mut inner = BytesMut::new();
    for param in &group.params {
        encode_function(param, &mut inner)?;
    }
    buf.put_u16(group.group_id);
    length::write_length(buf, inner.len())?;
    buf.put_slice(&inner);
    Ok(())
}
