//! # Domain Entities
//!
//! The persisted unit of ledger state and the client tasks that mutate it.

use crate::domain::value_objects::{AccessControlId, InstanceKey, Payload};
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// INSTANCE
// =============================================================================

/// The persisted, keyed unit of ledger state owned by exactly one contract.
///
/// Instances are written to the page as a whole. Deletion only raises the
/// `deleted` flag; the instance stays in storage.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    /// Identifier assigned at spawn time.
    pub key: InstanceKey,
    /// Contract owning the instance.
    pub contract_id: String,
    /// Policy governing mutations of the instance.
    pub access_control_id: AccessControlId,
    /// Contract-defined current state.
    pub value: Payload,
    /// Retired by convention.
    pub deleted: bool,
}

impl Instance {
    /// Creates a live instance.
    #[must_use]
    pub fn new(
        key: InstanceKey,
        contract_id: impl Into<String>,
        access_control_id: AccessControlId,
        value: Payload,
    ) -> Self {
        Self {
            key,
            contract_id: contract_id.into(),
            access_control_id,
            value,
            deleted: false,
        }
    }
}

// =============================================================================
// CLIENT TASKS
// =============================================================================

/// Request to create a new instance under a contract.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpawnTask {
    contract_id: String,
    argument: Payload,
}

impl SpawnTask {
    /// Creates a spawn task.
    #[must_use]
    pub fn new(contract_id: impl Into<String>, argument: Payload) -> Self {
        Self {
            contract_id: contract_id.into(),
            argument,
        }
    }

    /// Contract that will own the new instance.
    #[must_use]
    pub fn contract_id(&self) -> &str {
        &self.contract_id
    }

    /// Contract-interpreted argument.
    #[must_use]
    pub fn argument(&self) -> &Payload {
        &self.argument
    }
}

/// Request to mutate an existing instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InvokeTask {
    key: InstanceKey,
    argument: Payload,
}

impl InvokeTask {
    /// Creates an invoke task.
    #[must_use]
    pub fn new(key: InstanceKey, argument: Payload) -> Self {
        Self { key, argument }
    }

    /// Key of the targeted instance.
    #[must_use]
    pub fn key(&self) -> &InstanceKey {
        &self.key
    }

    /// Contract-interpreted argument.
    #[must_use]
    pub fn argument(&self) -> &Payload {
        &self.argument
    }
}

/// Request to mark an existing instance as retired.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeleteTask {
    key: InstanceKey,
}

impl DeleteTask {
    /// Creates a delete task.
    #[must_use]
    pub fn new(key: InstanceKey) -> Self {
        Self { key }
    }

    /// Key of the targeted instance.
    #[must_use]
    pub fn key(&self) -> &InstanceKey {
        &self.key
    }
}

/// A submitted, unexecuted request describing an intended state change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClientTask {
    /// Create a new instance.
    Spawn(SpawnTask),
    /// Update an existing instance.
    Invoke(InvokeTask),
    /// Retire an existing instance.
    Delete(DeleteTask),
}

impl ClientTask {
    /// Shorthand for a spawn task.
    #[must_use]
    pub fn spawn(contract_id: impl Into<String>, argument: Payload) -> Self {
        Self::Spawn(SpawnTask::new(contract_id, argument))
    }

    /// Shorthand for an invoke task.
    #[must_use]
    pub fn invoke(key: InstanceKey, argument: Payload) -> Self {
        Self::Invoke(InvokeTask::new(key, argument))
    }

    /// Shorthand for a delete task.
    #[must_use]
    pub fn delete(key: InstanceKey) -> Self {
        Self::Delete(DeleteTask::new(key))
    }

    /// Variant name, used in logs and on the wire.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Spawn(_) => "spawn",
            Self::Invoke(_) => "invoke",
            Self::Delete(_) => "delete",
        }
    }
}

impl fmt::Display for ClientTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spawn(task) => write!(f, "spawn({})", task.contract_id),
            Self::Invoke(task) => write!(f, "invoke({})", task.key),
            Self::Delete(task) => write!(f, "delete({})", task.key),
        }
    }
}

impl From<SpawnTask> for ClientTask {
    fn from(task: SpawnTask) -> Self {
        Self::Spawn(task)
    }
}

impl From<InvokeTask> for ClientTask {
    fn from(task: InvokeTask) -> Self {
        Self::Invoke(task)
    }
}

impl From<DeleteTask> for ClientTask {
    fn from(task: DeleteTask) -> Self {
        Self::Delete(task)
    }
}

// =============================================================================
// TESTS
// =============================================================================
