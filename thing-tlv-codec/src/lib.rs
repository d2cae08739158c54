//! Codec for the thing-model TLV protocol
//!
//! This crate implements the wire layer: CRC16 integrity, variable-length
//! prefixes, value transcoders, the frame packager and the frame parser.
//!
//! A frame is laid out as:
//!
//! ```text
//! version ‖ [msg id] ‖ operation ‖ [response code] ‖ payload ‖ crc16
//! ```

pub mod crc;
pub mod length;
pub mod packager;
pub mod parser;
pub mod transfer;
pub mod validator;

pub use crc::crc16;
pub use packager::Packager;
pub use parser::Parser;
pub use validator::{NoopValidator, SchemaValidator, Validate};
