//! # Error Types
//!
//! All error types for instance contract execution.
//!
//! `TaskError` is the taxonomy of the dispatcher itself. The other enums are
//! the failures of the collaborators it consumes (page, access control,
//! contract logic, stable encoder) and are preserved as sources.

use crate::domain::value_objects::{Action, InstanceKey, Rule};
use thiserror::Error;

// =============================================================================
// TASK ERRORS
// =============================================================================

/// Errors that abort the consumption of a client task.
///
/// A task failing with any of these never mutates the page.
#[derive(Debug, Error, Clone)]
pub enum TaskError {
    /// Spawn targets a key that already holds an instance.
    #[error("instance already exists at {key}")]
    AlreadyExists { key: InstanceKey },

    /// Invoke or delete targets a key with no instance.
    #[error("instance not found at {key}")]
    NotFound { key: InstanceKey },

    /// No contract logic is registered under the identifier.
    #[error("contract '{contract_id}' not found")]
    UnknownContract { contract_id: String },

    /// Access-control resolution or matching failed.
    #[error("no access: {identity} is refused to '{rule}' by {policy}: {reason}")]
    AccessDenied {
        identity: String,
        rule: Rule,
        policy: String,
        reason: String,
    },

    /// The contract's own spawn/invoke logic failed.
    #[error("couldn't execute {action} of contract '{contract_id}': {source}")]
    ContractExecutionFailed {
        contract_id: String,
        action: Action,
        #[source]
        source: ContractError,
    },

    /// Malformed task message at the factory boundary.
    #[error("couldn't decode task: {0}")]
    DecodingFailed(#[from] DecodeError),

    /// Read or write against the page failed.
    #[error("storage failure at {key}: {source}")]
    StorageFailed {
        key: InstanceKey,
        #[source]
        source: StorageError,
    },

    /// The instance is retired and the configured policy refuses to touch it.
    #[error("instance at {key} is deleted")]
    InstanceDeleted { key: InstanceKey },
}

impl TaskError {
    /// Returns true if the failure is an access-control refusal.
    #[must_use]
    pub fn is_access_denied(&self) -> bool {
        matches!(self, Self::AccessDenied { .. })
    }

    /// Returns true if the failure comes from a missing instance.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns true if the failure originates in the page collaborator rather
    /// than in the task itself.
    #[must_use]
    pub fn is_storage_failure(&self) -> bool {
        matches!(self, Self::StorageFailed { .. })
    }
}

// =============================================================================
// STORAGE ERRORS
// =============================================================================

/// Errors from the page collaborator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Nothing is stored at the key.
    #[error("key not found: {0}")]
    NotFound(InstanceKey),

    /// The stored bytes could not be turned back into an instance.
    #[error("stored instance is corrupted: {0}")]
    Corrupted(String),

    /// The backend refused the operation.
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StorageError {
    /// Returns true if the error only means "absent".
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

// =============================================================================
// ACCESS ERRORS
// =============================================================================

/// Errors from access-control resolution and matching.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccessError {
    /// No policy is stored under the access-control id.
    #[error("access control not found")]
    NotFound,

    /// The stored policy could not be decoded.
    #[error("malformed access control: {0}")]
    Malformed(String),

    /// The policy has no entry for the rule.
    #[error("rule '{0}' not found")]
    RuleNotFound(Rule),

    /// The policy has the rule but the identity is not authorized.
    #[error("identity {identity} not authorized")]
    Refused { identity: String },

    /// The page could not be read while resolving the policy.
    #[error("couldn't read access control: {0}")]
    Storage(StorageError),
}

// =============================================================================
// CONTRACT ERRORS
// =============================================================================

/// Errors raised by contract logic.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContractError {
    /// The task argument does not match the contract schema.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The contract refused the state change.
    #[error("rejected: {0}")]
    Rejected(String),

    /// The contract couldn't read from the page.
    #[error("storage: {0}")]
    Storage(#[from] StorageError),

    /// The contract couldn't shape its payload.
    #[error("encoding: {0}")]
    Encoding(#[from] EncodingError),
}

// =============================================================================
// ENCODING & FINGERPRINT ERRORS
// =============================================================================

/// Errors from the stable encoder.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodingError {
    /// Floating point numbers have no canonical encoding.
    #[error("non-canonical number: {0}")]
    NonCanonicalNumber(String),

    /// Serde failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The writer failed.
    #[error("i/o error: {0}")]
    Io(String),
}

/// Errors while fingerprinting a task.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FingerprintError {
    /// Writing a raw field failed.
    #[error("couldn't write {field}: {reason}")]
    Write { field: &'static str, reason: String },

    /// Stable serialization of the argument failed.
    #[error("couldn't write argument: {0}")]
    Argument(EncodingError),
}

// =============================================================================
// DECODE ERRORS
// =============================================================================

/// Errors at the wire boundary, before any state transition runs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The bytes are not a task message.
    #[error("malformed message: {0}")]
    Malformed(String),

    /// The message tag names no task variant.
    #[error("unknown task type '{0}'")]
    UnknownTaskType(String),

    /// A key is not valid hex.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// Spawn without a contract identifier.
    #[error("empty contract identifier")]
    EmptyContractId,

    /// Invoke or delete without a key.
    #[error("empty instance key")]
    EmptyKey,

    /// A size limit from the configuration was exceeded.
    #[error("{what} too large: {size} > {max} bytes")]
    TooLarge {
        what: &'static str,
        size: usize,
        max: usize,
    },
}

// =============================================================================
// TESTS
// =============================================================================
