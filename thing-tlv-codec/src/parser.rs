//! Frame parser
//!
//! Decodes a wire frame into the normalized [`Response`] shape. Device
//! payloads become a map keyed by function id; sub-device payloads become
//! one map per sub-device, framed either by product-id markers or by a
//! fixed field count keyed off the operation code.

use crate::crc::crc16;
use crate::length;
use crate::transfer;
use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};
use thing_tlv_core::datatypes::{
    DecodedOperation, FunctionId, FunctionPoint, Params, Response, ResponseData, ResourceType,
    SubDevicePoints, SubDeviceStrings, Value,
};
use thing_tlv_core::error::DecodeError;
use thing_tlv_core::version::decode_version;
use thing_tlv_core::{TlvError, TlvResult};

/// Nesting sanity limit for combine groups.
const MAX_GROUP_DEPTH: u8 = 8;

/// Sub-device product-id marker (string/custom/1). Opens a new
/// sub-device section in marker-delimited payloads.
const SUB_DEVICE_PRODUCT_MARKER: u16 = 0xE801;
/// Sub-device timestamp marker (string/custom/3). Overwrites the time of
/// the entry before it and is then dropped.
const SUB_DEVICE_TIME_MARKER: u16 = 0xE803;

/// Sub-device operations whose payload is fixed groups of two entries
/// (enable, disable, offline, online requests).
const TWO_FIELD_SUB_DEVICE_OPS: [u8; 4] = [0x64, 0x65, 0x7E, 0x7F];
/// Sub-device operations whose payload is fixed groups of three entries
/// (read request, register and deregister requests, write response).
const THREE_FIELD_SUB_DEVICE_OPS: [u8; 4] = [0x41, 0x62, 0x63, 0xC2];
/// Fixed-count operations whose final entry per group is a bare function
/// id without a value.
const BARE_TAIL_SUB_DEVICE_OPS: [u8; 2] = [0x41, 0xC2];
/// Marker-delimited operations whose combine groups are flattened into
/// the enclosing sub-device map (notify request, read response).
const FLATTEN_SUB_DEVICE_OPS: [u8; 2] = [0x43, 0xC1];

/// Decodes wire frames into normalized responses.
#[derive(Debug, Default, Clone, Copy)]
pub struct Parser;

impl Parser {
    pub fn new() -> Self {
        Self
    }

    /// Decode a complete frame. Errors carry the message id and operation
    /// code once the header has been read.
    pub fn parse(&self, frame: &[u8]) -> Result<Response, DecodeError> {
        if frame.is_empty() {
            return Err(TlvError::MalformedFrame("empty frame".to_string()).into());
        }
        let (version, has_msg_id) = decode_version(frame[0])?;

        let header_len = if has_msg_id { 5 } else { 1 };
        if frame.len() < header_len + 3 {
            return Err(TlvError::MalformedFrame(format!(
                "frame too short: {} bytes",
                frame.len()
            ))
            .into());
        }

        let msg_id = has_msg_id
            .then(|| u32::from_be_bytes([frame[1], frame[2], frame[3], frame[4]]));
        let code = frame[header_len];
        let operation = DecodedOperation::decode(code);
        let context =
            |kind: TlvError| DecodeError::with_context(kind, msg_id, Some(code));

        // Resource operations and sub-device operations always carry a
        // payload; only a device-level system command may be bodyless.
        let mut min_len = header_len + 3;
        if !operation.is_response() && !(operation.is_system() && !operation.is_sub_device()) {
            min_len += 2;
        }
        if frame.len() < min_len {
            return Err(context(TlvError::MalformedFrame(format!(
                "frame too short for operation 0x{:02X}: {} bytes",
                code,
                frame.len()
            ))));
        }

        let body = &frame[..frame.len() - 2];
        let trailer = u16::from_be_bytes([frame[frame.len() - 2], frame[frame.len() - 1]]);
        let calculated = crc16(body);
        if calculated != trailer {
            return Err(context(TlvError::Integrity {
                calculated,
                expected: trailer,
            }));
        }

        let mut payload_start = header_len + 1;
        let response_code = if operation.is_response() {
            let byte = *body.get(payload_start).ok_or_else(|| {
                context(TlvError::MalformedFrame(
                    "response frame missing code byte".to_string(),
                ))
            })?;
            payload_start += 1;
            Some(byte)
        } else {
            None
        };

        let payload = &body[payload_start.min(body.len())..];
        let time = now_millis();
        let params = decode_params(&operation, payload, time).map_err(context)?;

        log::trace!(
            "parsed frame: operation 0x{:02X}, msg_id {:?}, {} payload byte(s)",
            code,
            msg_id,
            payload.len()
        );
        Ok(Response {
            version,
            id: msg_id,
            operations: operation,
            code: response_code,
            time,
            data: ResponseData { params },
        })
    }
}

fn decode_params(
    operation: &DecodedOperation,
    payload: &[u8],
    time: u64,
) -> TlvResult<Params> {
    if !operation.is_sub_device() {
        let points = PayloadDecoder::new(payload).decode_points(
            operation.is_bare_read(),
            0,
            time,
        )?;
        let mut map = BTreeMap::new();
        for point in points {
            map.insert(point.function_id, point);
        }
        return Ok(Params::Device(map));
    }

    let code = operation.code;
    let field_count = if TWO_FIELD_SUB_DEVICE_OPS.contains(&code) {
        Some(2)
    } else if THREE_FIELD_SUB_DEVICE_OPS.contains(&code) {
        Some(3)
    } else {
        None
    };
    match field_count {
        Some(count) => {
            let bare_tail = BARE_TAIL_SUB_DEVICE_OPS.contains(&code);
            let groups = decode_fixed_count(payload, count, bare_tail)?;
            Ok(Params::SubDeviceStrings(groups))
        }
        None => {
            let flatten = FLATTEN_SUB_DEVICE_OPS.contains(&code);
            let groups = decode_marker_delimited(payload, flatten, time)?;
            Ok(Params::SubDevicePoints(groups))
        }
    }
}

/// Fixed-count framing: every `field_count` entries form one sub-device.
/// Values are raw strings; with `bare_tail` the last entry of each group
/// is a bare function id.
fn decode_fixed_count(
    payload: &[u8],
    field_count: usize,
    bare_tail: bool,
) -> TlvResult<Vec<SubDeviceStrings>> {
    let mut decoder = PayloadDecoder::new(payload);
    let mut groups = Vec::new();
    while !decoder.is_empty() {
        let mut group = SubDeviceStrings::new();
        for index in 0..field_count {
            let function_id = decoder.read_u16()?;
            let value = if bare_tail && index == field_count - 1 {
                None
            } else {
                let len = decoder.read_length()?;
                let bytes = decoder.take(len)?;
                let text = std::str::from_utf8(bytes).map_err(|e| {
                    TlvError::TypeMismatch(format!("invalid UTF-8 string: {}", e))
                })?;
                Some(text.to_string())
            };
            group.insert(function_id, value);
        }
        groups.push(group);
    }
    Ok(groups)
}

/// Marker-delimited framing: a product-id marker opens a new sub-device
/// section, a time marker rewrites the preceding entry's timestamp.
fn decode_marker_delimited(
    payload: &[u8],
    flatten: bool,
    time: u64,
) -> TlvResult<Vec<SubDevicePoints>> {
    let mut decoder = PayloadDecoder::new(payload);
    let mut groups: Vec<SubDevicePoints> = Vec::new();
    let mut current = SubDevicePoints::new();
    let mut last_key: Option<u16> = None;

    while !decoder.is_empty() {
        let point = decoder.read_point(false, 0, time)?;
        match point.function_id {
            SUB_DEVICE_PRODUCT_MARKER if !current.is_empty() => {
                groups.push(current);
                current = SubDevicePoints::new();
                last_key = Some(point.function_id);
                current.insert(point.function_id, point);
            }
            SUB_DEVICE_TIME_MARKER => {
                let millis = point
                    .value
                    .as_ref()
                    .and_then(Value::as_str)
                    .and_then(|s| s.parse::<u64>().ok())
                    .ok_or_else(|| {
                        TlvError::TypeMismatch(
                            "sub-device time marker must carry a millisecond string"
                                .to_string(),
                        )
                    })?;
                if let Some(key) = last_key {
                    if let Some(previous) = current.get_mut(&key) {
                        previous.time = millis;
                    }
                }
            }
            key => {
                last_key = Some(key);
                current.insert(key, point);
            }
        }
    }
    if !current.is_empty() {
        groups.push(current);
    }

    if flatten {
        for group in &mut groups {
            flatten_combine_members(group);
        }
    }
    Ok(groups)
}

/// Hoist the members of combine-group values into the enclosing map,
/// replacing the group entry itself.
fn flatten_combine_members(group: &mut SubDevicePoints) {
    let combine_keys: Vec<u16> = group
        .iter()
        .filter(|(_, point)| matches!(point.value, Some(Value::Group(_))))
        .map(|(key, _)| *key)
        .collect();
    for key in combine_keys {
        if let Some(point) = group.remove(&key) {
            if let Some(Value::Group(members)) = point.value {
                for member in members {
                    group.insert(member.function_id, member);
                }
            }
        }
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

/// Cursor over a payload slice.
struct PayloadDecoder<'a> {
    buffer: &'a [u8],
    position: usize,
}

impl<'a> PayloadDecoder<'a> {
    fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer,
            position: 0,
        }
    }

    fn is_empty(&self) -> bool {
        self.position >= self.buffer.len()
    }

    fn take(&mut self, len: usize) -> TlvResult<&'a [u8]> {
        let end = self.position.checked_add(len).filter(|&e| e <= self.buffer.len());
        match end {
            Some(end) => {
                let slice = &self.buffer[self.position..end];
                self.position = end;
                Ok(slice)
            }
            None => Err(TlvError::MalformedFrame(format!(
                "truncated payload: need {} byte(s) at offset {}",
                len, self.position
            ))),
        }
    }

    fn read_u16(&mut self) -> TlvResult<u16> {
        let bytes = self.take(2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    fn read_length(&mut self) -> TlvResult<usize> {
        let (len, prefix_size) = length::read_length(&self.buffer[self.position..])?;
        self.position += prefix_size;
        Ok(len)
    }

    /// Decode one function point. With `bare` set only the function id is
    /// consumed, as in READ-request payloads.
    fn read_point(&mut self, bare: bool, depth: u8, time: u64) -> TlvResult<FunctionPoint> {
        let raw = self.read_u16()?;
        let id = FunctionId::decode(raw)?;
        if bare {
            return Ok(FunctionPoint::new(id, None, time));
        }
        let value = if id.resource_type == ResourceType::Combine {
            if depth >= MAX_GROUP_DEPTH {
                return Err(TlvError::MalformedFrame(format!(
                    "combine group nesting deeper than {}",
                    MAX_GROUP_DEPTH
                )));
            }
            let len = self.read_length()?;
            let inner = self.take(len)?;
            let members = PayloadDecoder::new(inner).decode_points(false, depth + 1, time)?;
            Value::Group(members)
        } else {
            let slice = match id.data_type.fixed_len() {
                Some(len) => self.take(len)?,
                None => {
                    let len = self.read_length()?;
                    self.take(len)?
                }
            };
            transfer::decode(id.data_type, id.function_type, slice)?
        };
        Ok(FunctionPoint::new(id, Some(value), time))
    }

    /// Decode function points until the payload is exhausted, in wire
    /// order.
    fn decode_points(
        mut self,
        bare: bool,
        depth: u8,
        time: u64,
    ) -> TlvResult<Vec<FunctionPoint>> {
        let mut points = Vec::new();
        while !self.is_empty() {
            points.push(self.read_point(bare, depth, time)?);
        }
        Ok(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packager::Packager;
    use bytes::{BufMut, BytesMut};
    use thing_tlv_core::datatypes::{
        DataType, DeviceKind, Direction, FunctionParam, FunctionType, Method, Operation,
        Operations, Request, RequestData, TargetKind, ValueType,
    };

    fn framed(payload_after_version: &[u8], version_byte: u8) -> Vec<u8> {
        let mut frame = BytesMut::new();
        frame.put_u8(version_byte);
        frame.put_slice(payload_after_version);
        let crc = crc16(&frame);
        frame.put_u16(crc);
        frame.to_vec()
    }

    #[test]
    fn test_parse_system_reset() {
        let response = Parser::new().parse(&[0x01, 0x20, 0x0A, 0x5C]).unwrap();
        assert_eq!(response.version, "1.0.0");
        assert_eq!(response.id, None);
        assert_eq!(response.operations.method, Method::Reset);
        assert_eq!(response.code, None);
        assert!(response.data.params.is_empty());
    }

    #[test]
    fn test_parse_notify_with_msg_id() {
        let frame = hex::decode("8201020304033001017c18").unwrap();
        let response = Parser::new().parse(&frame).unwrap();
        assert_eq!(response.version, "2.0.0");
        assert_eq!(response.id, Some(0x01020304));
        assert_eq!(response.operations.method, Method::Notify);
        assert_eq!(
            response.data.params.device_value(0x3001),
            Some(&Value::Bool(true))
        );
    }

    #[test]
    fn test_parse_bare_read_request() {
        let frame = hex::decode("0101f0058620").unwrap();
        let response = Parser::new().parse(&frame).unwrap();
        let device = response.data.params.as_device().unwrap();
        let point = &device[&0xF005];
        assert_eq!(point.data_type, DataType::String);
        assert_eq!(point.function_type, FunctionType::Property);
        assert_eq!(point.resource_id, 5);
        assert_eq!(point.value, None);
    }

    #[test]
    fn test_crc_corruption_carries_context() {
        let mut frame = hex::decode("8201020304033001017c18").unwrap();
        let last = frame.len() - 1;
        frame[last] ^= 0x01;
        let err = Parser::new().parse(&frame).unwrap_err();
        assert!(matches!(err.kind, TlvError::Integrity { .. }));
        assert_eq!(err.msg_id, Some(0x01020304));
        assert_eq!(err.operation, Some(0x03));
    }

    #[test]
    fn test_illegal_first_byte() {
        assert!(Parser::new().parse(&[]).is_err());
        assert!(Parser::new().parse(&[0x00, 0x01, 0x00, 0x00]).is_err());
        assert!(Parser::new().parse(&[0x80, 0x01, 0x00, 0x00]).is_err());
    }

    #[test]
    fn test_resource_request_needs_payload() {
        // op 0x01 (read request) with no payload at all
        let frame = framed(&[0x01], 0x01);
        assert!(Parser::new().parse(&frame).is_err());
    }

    #[test]
    fn test_reserved_data_type_in_payload() {
        // fid 0x0001 has data-type bits 000
        let frame = framed(&[0x03, 0x00, 0x01, 0x00], 0x01);
        let err = Parser::new().parse(&frame).unwrap_err();
        assert!(matches!(err.kind, TlvError::UnknownDataType(0)));
        assert_eq!(err.operation, Some(0x03));
    }

    #[test]
    fn test_package_parse_roundtrip() {
        let request = Request::new(
            "3.0.0",
            Operations::Fields(Operation {
                operation: Direction::Request,
                device: DeviceKind::Device,
                target: TargetKind::Resource,
                method: Method::Notify,
            }),
        )
        .with_id(99)
        .with_data(RequestData::new(vec![
            FunctionParam::new(0x3001, ValueType::Boolean, Value::Bool(true)).into(),
            FunctionParam::new(0x7002, ValueType::Integer, Value::Integer(-300)).into(),
            FunctionParam::new(0xF005, ValueType::String, Value::String("room-1".into()))
                .into(),
        ]));

        let frame = Packager::new().package(&request).unwrap();
        let response = Parser::new().parse(&frame).unwrap();
        assert_eq!(response.version, "3.0.0");
        assert_eq!(response.id, Some(99));
        let params = &response.data.params;
        assert_eq!(params.device_value(0x3001), Some(&Value::Bool(true)));
        assert_eq!(params.device_value(0x7002), Some(&Value::Integer(-300)));
        assert_eq!(
            params.device_value(0xF005),
            Some(&Value::String("room-1".into()))
        );
    }

    #[test]
    fn test_combine_group_decodes_nested() {
        // group fid 0xA500 (buffer/property/0x500 => combine) holding a
        // boolean and an integer member
        let mut payload = BytesMut::new();
        payload.put_u8(0x03); // notify request
        payload.put_u16(0xA500);
        payload.put_u8(9);
        payload.put_u16(0x3001);
        payload.put_u8(0x01);
        payload.put_u16(0x7002);
        payload.put_i32(7);
        let frame = framed(&payload, 0x01);

        let response = Parser::new().parse(&frame).unwrap();
        let device = response.data.params.as_device().unwrap();
        let group = device[&0xA500].value.as_ref().unwrap().as_group().unwrap();
        assert_eq!(group.len(), 2);
        assert_eq!(group[0].function_id, 0x3001);
        assert_eq!(group[0].value, Some(Value::Bool(true)));
        assert_eq!(group[1].value, Some(Value::Integer(7)));
    }

    #[test]
    fn test_combine_nesting_limit() {
        // 9 levels of single-member combine groups
        let mut inner = BytesMut::new();
        inner.put_u16(0x3001);
        inner.put_u8(0x01);
        for _ in 0..9 {
            let mut outer = BytesMut::new();
            outer.put_u16(0xA500);
            outer.put_u8(inner.len() as u8);
            outer.put_slice(&inner);
            inner = outer;
        }
        let mut payload = BytesMut::new();
        payload.put_u8(0x03);
        payload.put_slice(&inner);
        let frame = framed(&payload, 0x01);

        let err = Parser::new().parse(&frame).unwrap_err();
        assert!(matches!(err.kind, TlvError::MalformedFrame(_)));
    }

    fn put_string_entry(buf: &mut BytesMut, function_id: u16, text: &str) {
        buf.put_u16(function_id);
        buf.put_u8(text.len() as u8);
        buf.put_slice(text.as_bytes());
    }

    #[test]
    fn test_sub_device_marker_framing() {
        // op 0x43: sub-device notify request, two sub-devices, the second
        // entry's time rewritten by a time marker
        let mut payload = BytesMut::new();
        payload.put_u8(0x43);
        put_string_entry(&mut payload, 0xE801, "product-a");
        payload.put_u16(0x3001);
        payload.put_u8(0x01);
        put_string_entry(&mut payload, 0xE803, "1690000000000");
        put_string_entry(&mut payload, 0xE801, "product-b");
        payload.put_u16(0x7002);
        payload.put_i32(42);
        let frame = framed(&payload, 0x01);

        let response = Parser::new().parse(&frame).unwrap();
        let groups = response.data.params.as_sub_device_points().unwrap();
        assert_eq!(groups.len(), 2);

        let first = &groups[0];
        assert_eq!(
            first[&0xE801].value,
            Some(Value::String("product-a".into()))
        );
        assert_eq!(first[&0x3001].value, Some(Value::Bool(true)));
        assert_eq!(first[&0x3001].time, 1_690_000_000_000);
        assert!(!first.contains_key(&0xE803));

        let second = &groups[1];
        assert_eq!(
            second[&0xE801].value,
            Some(Value::String("product-b".into()))
        );
        assert_eq!(second[&0x7002].value, Some(Value::Integer(42)));
        assert_ne!(second[&0x7002].time, 1_690_000_000_000);
    }

    #[test]
    fn test_sub_device_combine_flattening() {
        // op 0x43 flattens combine members into the sub-device map
        let mut payload = BytesMut::new();
        payload.put_u8(0x43);
        put_string_entry(&mut payload, 0xE801, "product-a");
        payload.put_u16(0xA500);
        payload.put_u8(9);
        payload.put_u16(0x3001);
        payload.put_u8(0x00);
        payload.put_u16(0x7002);
        payload.put_i32(-1);
        let frame = framed(&payload, 0x01);

        let response = Parser::new().parse(&frame).unwrap();
        let groups = response.data.params.as_sub_device_points().unwrap();
        let group = &groups[0];
        assert!(!group.contains_key(&0xA500));
        assert_eq!(group[&0x3001].value, Some(Value::Bool(false)));
        assert_eq!(group[&0x7002].value, Some(Value::Integer(-1)));
    }

    #[test]
    fn test_sub_device_fixed_pairs() {
        // op 0x7F: sub-device online request, two string entries per
        // sub-device
        let mut payload = BytesMut::new();
        payload.put_u8(0x7F);
        put_string_entry(&mut payload, 0xE801, "product-a");
        put_string_entry(&mut payload, 0xE802, "device-1");
        put_string_entry(&mut payload, 0xE801, "product-b");
        put_string_entry(&mut payload, 0xE802, "device-2");
        let frame = framed(&payload, 0x01);

        let response = Parser::new().parse(&frame).unwrap();
        let groups = response.data.params.as_sub_device_strings().unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0][&0xE801], Some("product-a".to_string()));
        assert_eq!(groups[0][&0xE802], Some("device-1".to_string()));
        assert_eq!(groups[1][&0xE802], Some("device-2".to_string()));
    }

    #[test]
    fn test_sub_device_fixed_triples_with_bare_tail() {
        // op 0x41: sub-device read request, the third entry of each group
        // is a bare function id
        let mut payload = BytesMut::new();
        payload.put_u8(0x41);
        put_string_entry(&mut payload, 0xE801, "product-a");
        put_string_entry(&mut payload, 0xE802, "device-1");
        payload.put_u16(0x3001);
        let frame = framed(&payload, 0x01);

        let response = Parser::new().parse(&frame).unwrap();
        let groups = response.data.params.as_sub_device_strings().unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0][&0xE801], Some("product-a".to_string()));
        assert_eq!(groups[0][&0x3001], None);
    }

    fn sub_device_frame(code: u8, payload: &[u8]) -> Vec<u8> {
        let mut body = BytesMut::new();
        body.put_u8(code);
        // responses carry a code byte before the payload
        if code & 0x80 != 0 {
            body.put_u8(0x00);
        }
        body.put_slice(payload);
        framed(&body, 0x01)
    }

    #[test]
    fn test_every_fixed_pair_opcode() {
        // enable, disable, offline, online requests
        for code in [0x64u8, 0x65, 0x7E, 0x7F] {
            let mut payload = BytesMut::new();
            put_string_entry(&mut payload, 0xE801, "product-a");
            put_string_entry(&mut payload, 0xE802, "device-1");
            let frame = sub_device_frame(code, &payload);

            let response = Parser::new().parse(&frame).unwrap();
            let groups = response
                .data
                .params
                .as_sub_device_strings()
                .unwrap_or_else(|| panic!("opcode 0x{:02X} not fixed-count framed", code));
            assert_eq!(groups.len(), 1, "opcode 0x{:02X}", code);
            assert_eq!(groups[0][&0xE801], Some("product-a".to_string()));
            assert_eq!(groups[0][&0xE802], Some("device-1".to_string()));
        }
    }

    #[test]
    fn test_every_fixed_triple_opcode() {
        // read request and write response end on a bare function id;
        // register and deregister requests value all three entries
        for (code, bare_tail) in [(0x41u8, true), (0x62, false), (0x63, false), (0xC2, true)] {
            let mut payload = BytesMut::new();
            put_string_entry(&mut payload, 0xE801, "product-a");
            put_string_entry(&mut payload, 0xE802, "device-1");
            if bare_tail {
                payload.put_u16(0x3001);
            } else {
                put_string_entry(&mut payload, 0xE804, "secret");
            }
            let frame = sub_device_frame(code, &payload);

            let response = Parser::new().parse(&frame).unwrap();
            let groups = response
                .data
                .params
                .as_sub_device_strings()
                .unwrap_or_else(|| panic!("opcode 0x{:02X} not fixed-count framed", code));
            assert_eq!(groups.len(), 1, "opcode 0x{:02X}", code);
            assert_eq!(groups[0][&0xE802], Some("device-1".to_string()));
            if bare_tail {
                assert_eq!(groups[0][&0x3001], None, "opcode 0x{:02X}", code);
            } else {
                assert_eq!(groups[0][&0xE804], Some("secret".to_string()));
            }
        }
    }

    #[test]
    fn test_every_flattening_opcode() {
        // notify request and read response hoist combine members
        for code in [0x43u8, 0xC1] {
            let mut payload = BytesMut::new();
            put_string_entry(&mut payload, 0xE801, "product-a");
            payload.put_u16(0xA500);
            payload.put_u8(3);
            payload.put_u16(0x3001);
            payload.put_u8(0x01);
            let frame = sub_device_frame(code, &payload);

            let response = Parser::new().parse(&frame).unwrap();
            let groups = response
                .data
                .params
                .as_sub_device_points()
                .unwrap_or_else(|| panic!("opcode 0x{:02X} not marker framed", code));
            let group = &groups[0];
            assert!(!group.contains_key(&0xA500), "opcode 0x{:02X}", code);
            assert_eq!(group[&0x3001].value, Some(Value::Bool(true)));
        }
    }

    #[test]
    fn test_response_code_extracted() {
        // op 0x81: read response with code 0x00 and one boolean point
        let mut payload = BytesMut::new();
        payload.put_u8(0x81);
        payload.put_u8(0x00);
        payload.put_u16(0x3001);
        payload.put_u8(0x01);
        let frame = framed(&payload, 0x01);

        let response = Parser::new().parse(&frame).unwrap();
        assert!(response.operations.is_response());
        assert_eq!(response.code, Some(0x00));
        assert_eq!(
            response.data.params.device_value(0x3001),
            Some(&Value::Bool(true))
        );
    }

    #[test]
    fn test_truncated_value_rejected() {
        // integer fid followed by only two of four value bytes
        let frame = framed(&[0x03, 0x70, 0x02, 0x00, 0x01], 0x01);
        assert!(Parser::new().parse(&frame).is_err());
    }

    #[test]
    fn test_event_string_decodes_as_json() {
        // fid 0xF801: string/event/1
        let text = r#"{"alarm":"over-heat"}"#;
        let mut payload = BytesMut::new();
        payload.put_u8(0x03);
        payload.put_u16(0xF801);
        payload.put_u8(text.len() as u8);
        payload.put_slice(text.as_bytes());
        let frame = framed(&payload, 0x01);

        let response = Parser::new().parse(&frame).unwrap();
        assert_eq!(
            response.data.params.device_value(0xF801),
            Some(&Value::Json(serde_json::json!({"alarm": "over-heat"})))
        );
    }
}
