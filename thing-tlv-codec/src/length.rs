//! Variable-length prefix codec
//!
//! Lengths are encoded in one of four size classes, recoverable from the
//! two high bits of the first prefix byte:
//!
//! ```text
//! 00xxxxxx                            1 byte,  0 ..= 63
//! 01xxxxxx xxxxxxxx                   2 bytes, 64 ..= 16383        (BE16 + 0x4000)
//! 10xxxxxx xxxxxxxx xxxxxxxx          3 bytes, 16384 ..= 4194303   (BE24 + 0x800000)
//! 11xxxxxx ... (4 bytes total)        4 bytes, up to 0x3FFFFFFF    (BE32 + 0xC0000000)
//! ```

use bytes::{BufMut, BytesMut};
use thing_tlv_core::{TlvError, TlvResult};

/// Largest encodable length.
pub const MAX_LENGTH: usize = 0x3FFF_FFFF;

const ONE_BYTE_MAX: usize = 63;
const TWO_BYTE_MAX: usize = 16383;
const THREE_BYTE_MAX: usize = 4_194_303;

const TWO_BYTE_OFFSET: u16 = 0x4000;
const THREE_BYTE_OFFSET: u32 = 0x80_0000;
const FOUR_BYTE_OFFSET: u32 = 0xC000_0000;

/// Append the length prefix for `len` to `buf`.
pub fn write_length(buf: &mut BytesMut, len: usize) -> TlvResult<()> {
    if len <= ONE_BYTE_MAX {
        buf.put_u8(len as u8);
    } else if len <= TWO_BYTE_MAX {
        buf.put_u16(len as u16 + TWO_BYTE_OFFSET);
    } else if len <= THREE_BYTE_MAX {
        let tagged = len as u32 + THREE_BYTE_OFFSET;
        buf.put_u8((tagged >> 16) as u8);
        buf.put_u16((tagged & 0xFFFF) as u16);
    } else if len <= MAX_LENGTH {
        buf.put_u32(len as u32 + FOUR_BYTE_OFFSET);
    } else {
        return Err(TlvError::ValueOutOfRange(format!(
            "length {} exceeds the 0x3FFFFFFF prefix limit",
            len
        )));
    }
    Ok(())
}

/// Decode a length prefix from the head of `bytes`.
///
/// Returns `(length, prefix_size)`.
pub fn read_length(bytes: &[u8]) -> TlvResult<(usize, usize)> {
    let first = *bytes
        .first()
        .ok_or_else(|| TlvError::MalformedFrame("missing length prefix".to_string()))?;
    let prefix_size = match first {
        0..=63 => 1,
        64..=127 => 2,
        128..=191 => 3,
        _ => 4,
    };
    if bytes.len() < prefix_size {
        return Err(TlvError::MalformedFrame(format!(
            "truncated length prefix: need {} bytes, have {}",
            prefix_size,
            bytes.len()
        )));
    }
    let length = match prefix_size {
        1 => first as usize,
        2 => u16::from_be_bytes([bytes[0], bytes[1]]) as usize - TWO_BYTE_OFFSET as usize,
        3 => {
            let raw = ((bytes[0] as u32) << 16) | ((bytes[1] as u32) << 8) | bytes[2] as u32;
            (raw - THREE_BYTE_OFFSET) as usize
        }
        _ => {
            let raw = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
            (raw - FOUR_BYTE_OFFSET) as usize
        }
    };
    Ok((length, prefix_size))
}
