//! Core types and utilities for the thing-model TLV protocol
//!
//! This crate provides the data model, error handling, and version
//! handling used throughout the codec implementation.

pub mod datatypes;
pub mod error;
pub mod version;

pub use error::{DecodeError, TlvError, TlvResult};
