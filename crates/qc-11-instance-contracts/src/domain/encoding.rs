//! # Stable Encoding
//!
//! Deterministic serialization of opaque payloads. Equal logical values
//! produce identical bytes on every replica, whatever the order in which the
//! producer inserted map entries.

use crate::domain::value_objects::Payload;
use crate::errors::EncodingError;
use serde_json::{Map, Value};
use std::io::Write;

/// Serializer whose output is a pure function of the logical value.
pub trait StableEncoder: Send + Sync {
    /// Writes the canonical bytes of the payload.
    fn marshal_stable(&self, w: &mut dyn Write, payload: &Payload) -> Result<(), EncodingError>;

    /// Returns the canonical bytes of the payload.
    fn to_stable_bytes(&self, payload: &Payload) -> Result<Vec<u8>, EncodingError> {
        let mut buf = Vec::new();
        self.marshal_stable(&mut buf, payload)?;
        Ok(buf)
    }
}

/// Compact JSON with recursively sorted object keys and integer-only numbers.
#[derive(Clone, Copy, Debug, Default)]
pub struct CanonicalJsonEncoder;

impl CanonicalJsonEncoder {
    /// Creates the encoder.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn canonicalize(value: &Value) -> Result<Value, EncodingError> {
        match value {
            Value::Number(n) if n.is_f64() => Err(EncodingError::NonCanonicalNumber(n.to_string())),
            Value::Array(items) => items
                .iter()
                .map(Self::canonicalize)
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            Value::Object(obj) => {
                // Insertion order is the output order when serde_json keeps
                // insertion order, so entries go in sorted.
                let mut pairs: Vec<(&String, &Value)> = obj.iter().collect();
                pairs.sort_by(|a, b| a.0.cmp(b.0));

                let mut out = Map::new();
                for (k, v) in pairs {
                    out.insert(k.clone(), Self::canonicalize(v)?);
                }
                Ok(Value::Object(out))
            }
            other => Ok(other.clone()),
        }
    }
}

impl StableEncoder for CanonicalJsonEncoder {
    fn marshal_stable(&self, w: &mut dyn Write, payload: &Payload) -> Result<(), EncodingError> {
        let canonical = Self::canonicalize(payload.as_value())?;
        serde_json::to_writer(w, &canonical).map_err(|e| {
            if e.is_io() {
                EncodingError::Io(e.to_string())
            } else {
                EncodingError::Serialization(e.to_string())
            }
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
