//! # Domain Invariants
//!
//! Lifecycle invariants that every state transition MUST preserve. The
//! dispatcher builds its outputs so that they hold and asserts them in debug
//! builds.
//!
//! - INVARIANT-1: Key stability (a transition never moves an instance)
//! - INVARIANT-2: Contract ownership (the owning contract never changes)
//! - INVARIANT-3: Invoke only replaces the value
//! - INVARIANT-4: Delete only raises the flag
//! - INVARIANT-5: Spawn lands on the derived key, live

use crate::domain::entities::Instance;
use crate::domain::value_objects::InstanceKey;
use std::fmt;

/// Kind of transition being checked.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    /// A new instance.
    Spawn,
    /// A value replacement.
    Invoke,
    /// A retirement.
    Delete,
}

/// INVARIANT-1: the instance keeps its key.
#[must_use]
pub fn check_key_stability_invariant(before: &Instance, after: &Instance) -> bool {
    before.key == after.key
}

/// INVARIANT-2: the instance keeps its contract.
#[must_use]
pub fn check_contract_ownership_invariant(before: &Instance, after: &Instance) -> bool {
    before.contract_id == after.contract_id
}

/// INVARIANT-3: invoke leaves the access control and the flag untouched.
#[must_use]
pub fn check_invoke_invariant(before: &Instance, after: &Instance) -> bool {
    before.access_control_id == after.access_control_id && before.deleted == after.deleted
}

/// INVARIANT-4: delete leaves everything but the flag untouched.
#[must_use]
pub fn check_delete_invariant(before: &Instance, after: &Instance) -> bool {
    after.deleted
        && before.access_control_id == after.access_control_id
        && before.value == after.value
}

/// INVARIANT-5: a spawned instance is live and stored at the derived key.
#[must_use]
pub fn check_spawn_invariant(derived_key: &InstanceKey, after: &Instance) -> bool {
    &after.key == derived_key && !after.deleted
}

/// Checks an update transition (invoke or delete) against the instance it
/// started from.
#[must_use]
pub fn check_update_invariants(
    transition: Transition,
    before: &Instance,
    after: &Instance,
) -> InvariantCheckResult {
    let mut violations = Vec::new();

    if !check_key_stability_invariant(before, after) {
        violations.push(InvariantViolation::KeyChanged {
            before: before.key.clone(),
            after: after.key.clone(),
        });
    }

    if !check_contract_ownership_invariant(before, after) {
        violations.push(InvariantViolation::ContractChanged {
            before: before.contract_id.clone(),
            after: after.contract_id.clone(),
        });
    }

    match transition {
        Transition::Invoke if !check_invoke_invariant(before, after) => {
            violations.push(InvariantViolation::MetadataChanged {
                key: after.key.clone(),
            });
        }
        Transition::Delete if !check_delete_invariant(before, after) => {
            violations.push(InvariantViolation::DeleteAlteredInstance {
                key: after.key.clone(),
            });
        }
        _ => {}
    }

    InvariantCheckResult::from(violations)
}

/// Checks a spawn transition.
#[must_use]
pub fn check_spawn_invariants(derived_key: &InstanceKey, after: &Instance) -> InvariantCheckResult {
    if check_spawn_invariant(derived_key, after) {
        InvariantCheckResult::Valid
    } else {
        InvariantCheckResult::Invalid(vec![InvariantViolation::MalformedSpawn {
            key: after.key.clone(),
        }])
    }
}

// =============================================================================
// INVARIANT TYPES
// =============================================================================

/// Result of checking invariants.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvariantCheckResult {
    /// All invariants hold.
    Valid,
    /// One or more invariants violated.
    Invalid(Vec<InvariantViolation>),
}

impl InvariantCheckResult {
    /// Returns true if all invariants hold.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// Returns the first violation, if any.
    #[must_use]
    pub fn into_first_violation(self) -> Option<InvariantViolation> {
        match self {
            Self::Valid => None,
            Self::Invalid(violations) => violations.into_iter().next(),
        }
    }
}

impl From<Vec<InvariantViolation>> for InvariantCheckResult {
    fn from(violations: Vec<InvariantViolation>) -> Self {
        if violations.is_empty() {
            Self::Valid
        } else {
            Self::Invalid(violations)
        }
    }
}

/// Specific invariant violation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvariantViolation {
    /// INVARIANT-1 violated.
    KeyChanged {
        /// Key read from the page.
        before: InstanceKey,
        /// Key about to be written.
        after: InstanceKey,
    },
    /// INVARIANT-2 violated.
    ContractChanged {
        /// Owning contract before the transition.
        before: String,
        /// Owning contract after the transition.
        after: String,
    },
    /// INVARIANT-3 violated.
    MetadataChanged {
        /// Instance key.
        key: InstanceKey,
    },
    /// INVARIANT-4 violated.
    DeleteAlteredInstance {
        /// Instance key.
        key: InstanceKey,
    },
    /// INVARIANT-5 violated.
    MalformedSpawn {
        /// Key about to be written.
        key: InstanceKey,
    },
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KeyChanged { before, after } => {
                write!(f, "instance key changed from {before} to {after}")
            }
            Self::ContractChanged { before, after } => {
                write!(f, "owning contract changed from '{before}' to '{after}'")
            }
            Self::MetadataChanged { key } => {
                write!(f, "invoke altered metadata of {key}")
            }
            Self::DeleteAlteredInstance { key } => {
                write!(f, "delete altered more than the flag of {key}")
            }
            Self::MalformedSpawn { key } => {
                write!(f, "spawned instance {key} is not live at the derived key")
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
