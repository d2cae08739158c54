//! Request validation hooks for the packager
//!
//! The packager runs every request through a [`Validate`] implementation
//! before encoding. The default is a no-op; callers with a JSON Schema
//! for their request shape can plug in [`SchemaValidator`].

use serde_json::Value as JsonValue;
use thing_tlv_core::datatypes::Request;
use thing_tlv_core::{TlvError, TlvResult};

/// Structural validation applied before a request is encoded.
pub trait Validate: Send + Sync {
    fn validate(&self, request: &Request) -> TlvResult<()>;
}

/// Accepts every request.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopValidator;

impl Validate for NoopValidator {
    fn validate(&self, _request: &Request) -> TlvResult<()> {
        Ok(())
    }
}

/// Validates the serialized request against a compiled JSON Schema.
pub struct SchemaValidator {
    schema: jsonschema::Validator,
}

impl SchemaValidator {
    /// Compile a schema. Fails on an invalid schema document.
    pub fn new(schema: &JsonValue) -> TlvResult<Self> {
        let schema = jsonschema::validator_for(schema)
            .map_err(|e| TlvError::Validation(format!("invalid schema: {}", e)))?;
        Ok(Self { schema })
    }

    pub fn from_str(schema: &str) -> TlvResult<Self> {
        let value: JsonValue = serde_json::from_str(schema)?;
        Self::new(&value)
    }
}

impl Validate for SchemaValidator {
    fn validate(&self, request: &Request) -> TlvResult<()> {
        let value = serde_json::to_value(request)?;
        let mut errors = self.schema.iter_errors(&value);
        if let Some(first) = errors.next() {
            // Report at most four violations per request.
            let mut message = format!("{} (at {})", first, first.instance_path());
            for error in errors.take(3) {
                message.push_str(&format!("; {} (at {})", error, error.instance_path()));
            }
            return Err(TlvError::Validation(message));
        }
        Ok(())
    }
}
