//! # Task Fingerprints
//!
//! Deterministic byte encoding of client tasks, used by signing and hashing
//! code without executing the task.
//!
//! | Task | Bytes |
//! |------|-------|
//! | Spawn | `contract_id` ++ stable(`argument`) |
//! | Invoke | `key` ++ stable(`argument`) |
//! | Delete | `key` |

use crate::domain::encoding::StableEncoder;
use crate::domain::entities::{ClientTask, DeleteTask, InvokeTask, SpawnTask};
use crate::domain::value_objects::Hash;
use crate::errors::FingerprintError;
use sha3::{Digest, Sha3_256};
use std::io::Write;

/// Types with a deterministic byte encoding.
pub trait Fingerprint {
    /// Serializes `self` into the writer in a deterministic way.
    fn fingerprint(
        &self,
        w: &mut dyn Write,
        encoder: &dyn StableEncoder,
    ) -> Result<(), FingerprintError>;
}

fn write_field(
    w: &mut dyn Write,
    field: &'static str,
    bytes: &[u8],
) -> Result<(), FingerprintError> {
    w.write_all(bytes).map_err(|e| FingerprintError::Write {
        field,
        reason: e.to_string(),
    })
}

impl Fingerprint for SpawnTask {
    fn fingerprint(
        &self,
        w: &mut dyn Write,
        encoder: &dyn StableEncoder,
    ) -> Result<(), FingerprintError> {
        write_field(w, "contract", self.contract_id().as_bytes())?;
        encoder
            .marshal_stable(w, self.argument())
            .map_err(FingerprintError::Argument)
    }
}

impl Fingerprint for InvokeTask {
    fn fingerprint(
        &self,
        w: &mut dyn Write,
        encoder: &dyn StableEncoder,
    ) -> Result<(), FingerprintError> {
        write_field(w, "key", self.key().as_bytes())?;
        encoder
            .marshal_stable(w, self.argument())
            .map_err(FingerprintError::Argument)
    }
}

impl Fingerprint for DeleteTask {
    fn fingerprint(
        &self,
        w: &mut dyn Write,
        _encoder: &dyn StableEncoder,
    ) -> Result<(), FingerprintError> {
        write_field(w, "key", self.key().as_bytes())
    }
}

impl Fingerprint for ClientTask {
    fn fingerprint(
        &self,
        w: &mut dyn Write,
        encoder: &dyn StableEncoder,
    ) -> Result<(), FingerprintError> {
        match self {
            Self::Spawn(task) => task.fingerprint(w, encoder),
            Self::Invoke(task) => task.fingerprint(w, encoder),
            Self::Delete(task) => task.fingerprint(w, encoder),
        }
    }
}

impl ClientTask {
    /// Returns the fingerprint bytes.
    pub fn fingerprint_bytes(
        &self,
        encoder: &dyn StableEncoder,
    ) -> Result<Vec<u8>, FingerprintError> {
        let mut buf = Vec::new();
        self.fingerprint(&mut buf, encoder)?;
        Ok(buf)
    }

    /// SHA3-256 of the fingerprint, as consumed by transaction hashing.
    ///
    /// Nothing is hashed if the fingerprint fails.
    pub fn digest(&self, encoder: &dyn StableEncoder) -> Result<Hash, FingerprintError> {
        let bytes = self.fingerprint_bytes(encoder)?;
        Ok(Hash::new(Sha3_256::digest(&bytes).into()))
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::encoding::CanonicalJsonEncoder;
    use crate::domain::value_objects::{InstanceKey, Payload};
    use serde_json::json;

    const ENC: CanonicalJsonEncoder = CanonicalJsonEncoder::new();

    #[test]
    fn test_spawn_layout() {
        let task = ClientTask::spawn("coin", Payload::new(json!({"b": 1, "a": 2})));
        let bytes = task.fingerprint_bytes(&ENC).unwrap();
        assert_eq!(bytes, br#"coin{"a":2,"b":1}"#.to_vec());
    }

    #[test]
    fn test_invoke_layout() {
        let task = ClientTask::invoke(
            InstanceKey::new(b"k1".to_vec()),
            Payload::new(json!({"delta": -30})),
        );
        let bytes = task.fingerprint_bytes(&ENC).unwrap();
        assert_eq!(bytes, br#"k1{"delta":-30}"#.to_vec());
    }

    #[test]
    fn test_delete_layout() {
        let task = ClientTask::delete(InstanceKey::new(vec![0xDE, 0xAD]));
        assert_eq!(task.fingerprint_bytes(&ENC).unwrap(), vec![0xDE, 0xAD]);
    }

    #[test]
    fn test_different_keys_differ() {
        let a = ClientTask::invoke(InstanceKey::new(vec![1]), Payload::null());
        let b = ClientTask::invoke(InstanceKey::new(vec![2]), Payload::null());
        assert_ne!(a.digest(&ENC).unwrap(), b.digest(&ENC).unwrap());
    }

    #[test]
    fn test_argument_failure_aborts() {
        let task = ClientTask::spawn("coin", Payload::new(json!({"amount": 0.5})));
        let err = task.digest(&ENC).unwrap_err();
        assert!(matches!(err, FingerprintError::Argument(_)));
    }

    #[test]
    fn test_writer_failure_names_field() {
        struct Broken;

        impl Write for Broken {
            fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::other("closed"))
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let task = ClientTask::delete(InstanceKey::new(vec![1]));
        let err = task.fingerprint(&mut Broken, &ENC).unwrap_err();
        assert!(matches!(err, FingerprintError::Write { field: "key", .. }));
    }

    #[test]
    fn test_digest_is_stable() {
        let task = ClientTask::spawn("coin", Payload::new(json!({"x": [1, 2, 3]})));
        assert_eq!(task.digest(&ENC).unwrap(), task.clone().digest(&ENC).unwrap());
        assert_ne!(task.digest(&ENC).unwrap(), Hash::ZERO);
    }
}
