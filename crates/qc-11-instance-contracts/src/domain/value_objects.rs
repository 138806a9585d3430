//! # Value Objects
//!
//! Immutable domain primitives for instance contract execution.
//! These types represent concepts that are defined by their value, not identity.

use crate::errors::EncodingError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Serde helper writing byte identifiers as lower-case hex strings.
mod hex_serde {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        hex::decode(text).map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// INSTANCE KEY
// =============================================================================

/// Opaque identifier of an instance, unique within the ledger state space.
///
/// The key of a spawned instance is derived from the enclosing transaction
/// and never changes afterwards.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct InstanceKey(#[serde(with = "hex_serde")] Vec<u8>);

impl InstanceKey {
    /// Creates a key from raw bytes.
    #[must_use]
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Parses a key from its hex representation.
    pub fn from_hex(text: &str) -> Result<Self, hex::FromHexError> {
        hex::decode(text).map(Self)
    }

    /// Returns the underlying bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the hex representation.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// Returns the key length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the key has no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for InstanceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InstanceKey(0x{})", self.to_hex())
    }
}

impl fmt::Display for InstanceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

impl From<&[u8]> for InstanceKey {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl From<Vec<u8>> for InstanceKey {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

// =============================================================================
// ACCESS CONTROL ID
// =============================================================================

/// Opaque reference to the access-control policy governing an instance.
///
/// Policies are themselves stored in the page, so the id doubles as the key
/// under which the policy can be read.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct AccessControlId(#[serde(with = "hex_serde")] Vec<u8>);

impl AccessControlId {
    /// Creates an access-control id from raw bytes.
    #[must_use]
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Returns the underlying bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the page key at which the policy is stored.
    #[must_use]
    pub fn as_key(&self) -> InstanceKey {
        InstanceKey::new(self.0.clone())
    }
}

impl fmt::Debug for AccessControlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccessControlId(0x{})", hex::encode(&self.0))
    }
}

impl fmt::Display for AccessControlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(&self.0))
    }
}

impl From<InstanceKey> for AccessControlId {
    fn from(key: InstanceKey) -> Self {
        Self(key.0)
    }
}

// =============================================================================
// IDENTITY
// =============================================================================

/// The principal credited with submitting a transaction.
///
/// Signature verification happens upstream; here the identity is only
/// compared and printed.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Identity(#[serde(with = "hex_serde")] Vec<u8>);

impl Identity {
    /// Creates an identity from its public bytes.
    #[must_use]
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Returns the underlying bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the hex representation used in access-control rules.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identity({})", self.to_hex())
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

// =============================================================================
// HASH (32 bytes)
// =============================================================================

/// A 32-byte SHA3-256 digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Hash(pub [u8; 32]);

impl Hash {
    /// The zero hash.
    pub const ZERO: Self = Self([0u8; 32]);

    /// Creates a hash from a 32-byte array.
    #[must_use]
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Creates a hash from a slice. Returns None if wrong length.
    #[must_use]
    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        <[u8; 32]>::try_from(slice).ok().map(Self)
    }

    /// Returns the underlying bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}...{}", hex::encode(&self.0[..4]), hex::encode(&self.0[30..]))
    }
}

// =============================================================================
// PAYLOAD
// =============================================================================

/// Opaque, contract-defined document.
///
/// Used both for task arguments and for instance values. The dispatcher never
/// looks inside; contracts shape it with their own serde types.
#[derive(Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Payload(Value);

impl Payload {
    /// Wraps a JSON document.
    #[must_use]
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// The empty payload.
    #[must_use]
    pub fn null() -> Self {
        Self(Value::Null)
    }

    /// Builds a payload from any serializable contract type.
    pub fn from_serializable<T: Serialize>(value: &T) -> Result<Self, EncodingError> {
        serde_json::to_value(value)
            .map(Self)
            .map_err(|e| EncodingError::Serialization(e.to_string()))
    }

    /// Decodes the payload into a contract type.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, EncodingError> {
        T::deserialize(&self.0).map_err(|e| EncodingError::Serialization(e.to_string()))
    }

    /// Returns the underlying document.
    #[must_use]
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Consumes the payload and returns the underlying document.
    #[must_use]
    pub fn into_value(self) -> Value {
        self.0
    }

    /// Returns true if the payload carries nothing.
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.0.is_null()
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Payload({})", self.0)
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

// =============================================================================
// ACTION & RULE
// =============================================================================

/// Contract entry point an access-control rule refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Creation of a new instance.
    Spawn,
    /// Update of an existing instance.
    Invoke,
}

impl Action {
    /// Returns the name used when compiling rules.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Spawn => "spawn",
            Self::Invoke => "invoke",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Permission name looked up inside an access-control policy.
///
/// Computed at dispatch time as `<contract_id>:<action>`; never persisted.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rule(String);

impl Rule {
    /// Separator between the rule components.
    pub const SEPARATOR: char = ':';

    /// Compiles the rule for a contract entry point.
    #[must_use]
    pub fn compile(contract_id: &str, action: Action) -> Self {
        Self(format!("{contract_id}{}{}", Self::SEPARATOR, action.as_str()))
    }

    /// Returns the rule string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Rule {
    fn from(rule: &str) -> Self {
        Self(rule.to_string())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rule_compile() {
        assert_eq!(Rule::compile("coin", Action::Spawn).as_str(), "coin:spawn");
        assert_eq!(Rule::compile("coin", Action::Invoke).as_str(), "coin:invoke");
    }

    #[test]
    fn test_instance_key_hex() {
        let key = InstanceKey::new(vec![0xAB, 0x01]);
        assert_eq!(key.to_hex(), "ab01");
        assert_eq!(key.to_string(), "0xab01");
        assert_eq!(InstanceKey::from_hex("ab01").unwrap(), key);
        assert!(InstanceKey::from_hex("zz").is_err());
    }

    #[test]
    fn test_key_serializes_as_hex_string() {
        let key = InstanceKey::new(vec![1, 2, 3]);
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"010203\"");

        let back: InstanceKey = serde_json::from_str("\"010203\"").unwrap();
        assert_eq!(back, key);
    }

    #[test]
    fn test_access_control_id_as_key() {
        let id = AccessControlId::new(b"A0".to_vec());
        assert_eq!(id.as_key().as_bytes(), b"A0");
    }

    #[test]
    fn test_payload_typed_access() {
        #[derive(Serialize, Deserialize, PartialEq, Debug)]
        struct Balance {
            balance: u64,
        }

        let payload = Payload::from_serializable(&Balance { balance: 100 }).unwrap();
        assert_eq!(payload.as_value(), &json!({"balance": 100}));
        assert_eq!(payload.decode::<Balance>().unwrap(), Balance { balance: 100 });
        assert!(payload.decode::<Vec<u8>>().is_err());
    }

    #[test]
    fn test_hash_from_slice() {
        assert!(Hash::from_slice(&[0u8; 31]).is_none());
        assert_eq!(Hash::from_slice(&[0u8; 32]), Some(Hash::ZERO));
    }
}
