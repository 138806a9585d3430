//! # QC-11 Instance Contracts - Task Execution Subsystem
//!
//! **Subsystem ID:** 11
//! **Status:** Production-Ready
//!
//! ## Purpose
//!
//! Executes client tasks against a page of ledger state. A task either spawns a
//! new contract instance, invokes an existing one, or marks one deleted. Every
//! transition is deterministic, authorized against the instance's own
//! access-control policy, and all-or-nothing with respect to the page.
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Enforcement Location |
//! |----|-----------|---------------------|
//! | INVARIANT-1 | Key stability | `check_key_stability_invariant()` |
//! | INVARIANT-2 | Contract ownership | `check_contract_ownership_invariant()` |
//! | INVARIANT-3 | Invoke only replaces the value | `check_invoke_invariant()` |
//! | INVARIANT-4 | Delete only raises the flag | `check_delete_invariant()` |
//! | INVARIANT-5 | Spawn lands on the derived key | `check_spawn_invariant()` |
//!
//! All checks live in `domain/invariants.rs` and are asserted by the
//! dispatcher in debug builds.
//!
//! ## Authorization
//!
//! | Task | Rule | Checked against | Order |
//! |------|------|-----------------|-------|
//! | Spawn | `<contract_id>:spawn` | policy chosen by the contract | after execution |
//! | Invoke | `<owning contract>:invoke` | policy of the stored instance | before execution |
//! | Delete | - | - | - |
//!
//! ## Determinism
//!
//! Task fingerprints are computed with the stable encoder
//! (`domain/encoding.rs`): object keys sorted, no floating point numbers.
//! Two replicas holding equal tasks always produce identical bytes and
//! identical SHA3-256 digests.
//!
//! ## Outbound Dependencies
//!
//! | Collaborator | Trait | Purpose |
//! |--------------|-------|---------|
//! | Storage engine | `Page` | Read/write instances |
//! | Policy store | `AccessControlResolver` | Resolve access-control ids |
//! | Contract logic | `Contract` | Spawn/invoke behavior |
//!
//! ## Components
//!
//! | Component | Location | Purpose |
//! |-----------|----------|---------|
//! | Task factory | `factory.rs` | Decode, consume, fingerprint |
//! | Server task | `dispatcher.rs` | State transitions |
//! | Registry | `registry.rs` | Contract lookup |
//! | Wire schema | `events.rs` | Task messages |
//! | Adapters | `adapters/` | In-memory page, rule policies |
//!
//! ## Usage Example
//!
//! ```ignore
//! use qc_11_instance_contracts::prelude::*;
//!
//! let mut factory = TaskFactory::new(TaskConfig::from_env());
//! factory.register("coin", Arc::new(Coin));
//!
//! let task = factory.decode(&bytes)?;
//! factory.consume(&task, &TransactionContext::new(tx_key, sender), &mut page)?;
//! ```

// Crate-level lints
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]

// =============================================================================
// MODULES
// =============================================================================

pub mod adapters;
pub mod config;
pub mod context;
pub mod dispatcher;
pub mod domain;
pub mod errors;
pub mod events;
pub mod factory;
pub mod ports;
pub mod registry;

// =============================================================================
// PRELUDE
// =============================================================================

/// Convenient re-exports for common usage.
pub mod prelude {
    // Domain entities
    pub use crate::domain::entities::{ClientTask, DeleteTask, Instance, InvokeTask, SpawnTask};

    // Value objects
    pub use crate::domain::value_objects::{
        AccessControlId, Action, Hash, Identity, InstanceKey, Payload, Rule,
    };

    // Determinism
    pub use crate::domain::encoding::{CanonicalJsonEncoder, StableEncoder};
    pub use crate::domain::fingerprint::Fingerprint;

    // Invariants
    pub use crate::domain::invariants::{InvariantCheckResult, InvariantViolation, Transition};

    // Ports
    pub use crate::ports::inbound::InstanceContractApi;
    pub use crate::ports::outbound::{
        AccessControl, AccessControlFactory, AccessControlResolver, Contract, Page,
    };

    // Contexts
    pub use crate::context::{InvokeContext, SpawnContext, TaskContext, TransactionContext};

    // Events
    pub use crate::events::{task_types, TaskMessage};

    // Errors
    pub use crate::errors::{
        AccessError, ContractError, DecodeError, EncodingError, FingerprintError, StorageError,
        TaskError,
    };

    // Adapters
    pub use crate::adapters::{
        InMemoryPage, PageAccessResolver, RuleAccessControl, RuleAccessControlFactory,
    };

    // Service
    pub use crate::config::{DeletedInstancePolicy, TaskConfig};
    pub use crate::dispatcher::ServerTask;
    pub use crate::factory::{TaskFactory, TaskStats};
    pub use crate::registry::ContractRegistry;
}

// =============================================================================
// CRATE INFO
// =============================================================================

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Subsystem ID.
pub const SUBSYSTEM_ID: u8 = 11;

/// Subsystem name.
pub const SUBSYSTEM_NAME: &str = "Instance Contracts";

// =============================================================================
// TESTS
// =============================================================================
