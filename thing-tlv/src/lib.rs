//! thing-tlv - Rust implementation of the thing-model TLV protocol
//!
//! A compact binary telemetry codec for IoT devices built around a
//! thing-model: typed function points packed into 16-bit identifiers,
//! 8-bit operation codes, variable-length values and a CRC16 trailer.
//!
//! # Architecture
//!
//! This library is organized as a workspace with multiple crates:
//!
//! - `thing-tlv-core`: Core types, error handling, and version handling
//! - `thing-tlv-codec`: CRC, length prefixes, transcoders, packager and
//!   parser
//!
//! # Usage
//!
//! ```no_run
//! use thing_tlv::codec::{Packager, Parser};
//! use thing_tlv::core::datatypes::{Operations, Request};
//!
//! let packager = Packager::new();
//! let request = Request::new("1.0.0", Operations::Code(0x20));
//! let frame = packager.package(&request).unwrap();
//!
//! let parser = Parser::new();
//! let response = parser.parse(&frame).unwrap();
//! assert_eq!(response.version, "1.0.0");
//! ```

pub use thing_tlv_codec as codec;
pub use thing_tlv_core as core;

pub use thing_tlv_codec::{Packager, Parser};
pub use thing_tlv_core::{DecodeError, TlvError, TlvResult};
