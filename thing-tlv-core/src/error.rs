use thiserror::Error;

/// Main error type for thing-model TLV codec operations
#[derive(Error, Debug)]
pub enum TlvError {
    #[error("Malformed frame: {0}")]
    MalformedFrame(String),

    #[error("CRC mismatch: calculated 0x{calculated:04X}, frame carries 0x{expected:04X}")]
    Integrity { calculated: u16, expected: u16 },

    #[error("Unknown data type: {0}")]
    UnknownDataType(u8),

    #[error("Value out of range: {0}")]
    ValueOutOfRange(String),

    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    #[error("Read arity violation: {0}")]
    Arity(String),

    #[error("Invalid JSON value: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing field: {0}")]
    MissingField(&'static str),

    #[error("Request validation failed: {0}")]
    Validation(String),
}

/// Result type alias for thing-model TLV codec operations
pub type TlvResult<T> = Result<T, TlvError>;

/// Decode failure with frame context attached.
///
/// The message id and raw operation code are filled in as soon as the
/// parser knows them, so a caller can correlate a failed decode with the
/// offending message.
#[derive(Error, Debug)]
#[error("Frame decode failed (msg_id: {msg_id:?}, operation: {operation:?}): {kind}")]
pub struct DecodeError {
    pub kind: TlvError,
    pub msg_id: Option<u32>,
    pub operation: Option<u8>,
}

impl DecodeError {
    /// Wrap an error before any frame context is known.
    pub fn bare(kind: TlvError) -> Self {
        Self {
            kind,
            msg_id: None,
            operation: None,
        }
    }

    /// Wrap an error with the already-decoded frame context.
    pub fn with_context(kind: TlvError, msg_id: Option<u32>, operation: Option<u8>) -> Self {
        Self {
            kind,
            msg_id,
            operation,
        }
    }
}

impl From<TlvError> for DecodeError {
    fn from(kind: TlvError) -> Self {
        Self::bare(kind)
    }
}
