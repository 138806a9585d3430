//! # Driven Ports (SPI - Outbound)
//!
//! These are the interfaces that the execution layer depends on.
//! External adapters implement these traits to provide:
//! - The storage page of the ledger state
//! - Access-control policies and their resolution
//! - Contract logic
//!
//! All ports are synchronous: a transition never suspends.

use crate::context::{InvokeContext, SpawnContext};
use crate::domain::entities::Instance;
use crate::domain::value_objects::{AccessControlId, Identity, InstanceKey, Payload, Rule};
use crate::errors::{AccessError, ContractError, StorageError};
use std::fmt;

// =============================================================================
// STORAGE PAGE
// =============================================================================

/// Key-value view of the current ledger state.
///
/// Contracts only ever receive a shared reference, so they can read but
/// never write.
pub trait Page: Send + Sync {
    /// Reads the instance stored at the key.
    ///
    /// # Errors
    ///
    /// * `StorageError::NotFound` - nothing is stored at the key
    fn read(&self, key: &InstanceKey) -> Result<Instance, StorageError>;

    /// Stores the instance at the key, replacing any previous one.
    fn write(&mut self, key: &InstanceKey, instance: Instance) -> Result<(), StorageError>;
}

// =============================================================================
// ACCESS CONTROL
// =============================================================================

/// Policy deciding whether an identity may perform a rule.
///
/// The `Display` implementation is the description used in audit messages.
pub trait AccessControl: fmt::Display + Send + Sync {
    /// Returns `Ok(())` if the identity is authorized for the rule.
    fn match_rule(&self, rule: &Rule, identity: &Identity) -> Result<(), AccessError>;
}

/// Decodes policies stored as instance values.
pub trait AccessControlFactory: Send + Sync {
    /// Decodes a policy from its stored payload.
    fn decode(&self, payload: &Payload) -> Result<Box<dyn AccessControl>, AccessError>;
}

/// Resolves an access-control id to a policy reachable through the page.
pub trait AccessControlResolver: Send + Sync {
    /// Resolves the policy.
    ///
    /// # Errors
    ///
    /// Fails if the id does not name a valid policy.
    fn resolve(
        &self,
        page: &dyn Page,
        id: &AccessControlId,
    ) -> Result<Box<dyn AccessControl>, AccessError>;
}

// =============================================================================
// CONTRACT
// =============================================================================

/// Pluggable logic that knows how to spawn and invoke instances of its kind.
///
/// Implementations MUST be deterministic: no clock, no randomness, no I/O
/// beyond the page reads offered by the context.
pub trait Contract: Send + Sync {
    /// Produces the initial value and the access-control id of a new instance.
    fn spawn(&self, ctx: &SpawnContext<'_>) -> Result<(Payload, AccessControlId), ContractError>;

    /// Produces the next value of an existing instance.
    fn invoke(&self, ctx: &InvokeContext<'_>) -> Result<Payload, ContractError>;
}
