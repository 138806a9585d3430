//! # Contract Registry
//!
//! Maps contract identifiers to contract logic. Populated at node startup and
//! read by every server task afterwards.

use crate::ports::outbound::Contract;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Registry of static contracts.
#[derive(Clone, Default)]
pub struct ContractRegistry {
    contracts: BTreeMap<String, Arc<dyn Contract>>,
}

impl ContractRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the contract under the name. An existing registration for
    /// the same name is replaced.
    pub fn register(&mut self, name: impl Into<String>, contract: Arc<dyn Contract>) {
        let name = name.into();
        if self.contracts.insert(name.clone(), contract).is_some() {
            debug!(contract = %name, "Contract registration replaced");
        } else {
            debug!(contract = %name, "Contract registered");
        }
    }

    /// Looks up the contract bound to the name.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<Arc<dyn Contract>> {
        self.contracts.get(name).cloned()
    }

    /// Returns true if a contract is bound to the name.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.contracts.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.contracts.keys().map(String::as_str)
    }

    /// Number of registered contracts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }
}

impl fmt::Debug for ContractRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.contracts.keys()).finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================
