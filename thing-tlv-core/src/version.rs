//! Protocol version byte handling
//!
//! The first frame byte carries the major version, with the high bit set
//! when a 4-byte message id follows. 0 and 128 are therefore illegal
//! first bytes.

use crate::error::{TlvError, TlvResult};

/// High bit of the version byte flags the presence of a message id.
pub const MSG_ID_FLAG: u8 = 0x80;

/// Highest major version the single version byte can carry.
pub const MAX_MAJOR_VERSION: u8 = 99;

/// Build the version byte from a `"major.minor.patch"` string.
pub fn encode_version(version: &str, has_msg_id: bool) -> TlvResult<u8> {
    let major_part = version.split('.').next().unwrap_or("");
    let major: u8 = major_part.parse().map_err(|_| {
        TlvError::ValueOutOfRange(format!("invalid version string: {:?}", version))
    })?;
    if major == 0 || major > MAX_MAJOR_VERSION {
        return Err(TlvError::ValueOutOfRange(format!(
            "major version must be 1..={}, got {}",
            MAX_MAJOR_VERSION, major
        )));
    }
    Ok(if has_msg_id { major + MSG_ID_FLAG } else { major })
}

/// Split the first frame byte into the version string and msg-id flag.
pub fn decode_version(byte: u8) -> TlvResult<(String, bool)> {
    if byte == 0 || byte == MSG_ID_FLAG {
        return Err(TlvError::MalformedFrame(format!(
            "illegal version byte 0x{:02X}",
            byte
        )));
    }
    let has_msg_id = byte > MSG_ID_FLAG;
    let major = byte & !MSG_ID_FLAG;
    Ok((format!("{}.0.0", major), has_msg_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_with_and_without_msg_id() {
        assert_eq!(encode_version("1.0.0", false).unwrap(), 0x01);
        assert_eq!(encode_version("1.0.0", true).unwrap(), 0x81);
        assert_eq!(encode_version("99.2.1", false).unwrap(), 99);
    }

    #[test]
    fn test_zero_major_rejected() {
        assert!(encode_version("0.1.0", false).is_err());
        assert!(encode_version("100.0.0", true).is_err());
        assert!(encode_version("abc", false).is_err());
    }

    #[test]
    fn test_decode_roundtrip() {
        let (version, has_msg_id) = decode_version(0x81).unwrap();
        assert_eq!(version, "1.0.0");
        assert!(has_msg_id);

        let (version, has_msg_id) = decode_version(42).unwrap();
        assert_eq!(version, "42.0.0");
        assert!(!has_msg_id);
    }

    #[test]
    fn test_illegal_first_bytes() {
        assert!(decode_version(0).is_err());
        assert!(decode_version(128).is_err());
    }
}
