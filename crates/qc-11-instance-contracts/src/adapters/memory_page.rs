//! # In-Memory Page
//!
//! Page implementation backed by an ordered map, for testing and for
//! staging state before it is handed to the storage engine.

use crate::domain::entities::Instance;
use crate::domain::value_objects::InstanceKey;
use crate::errors::StorageError;
use crate::ports::outbound::Page;
use std::collections::BTreeMap;

/// In-memory page of instances.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InMemoryPage {
    instances: BTreeMap<InstanceKey, Instance>,
}

impl InMemoryPage {
    /// Create a new empty page.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds an instance at its own key.
    pub fn insert(&mut self, instance: Instance) {
        self.instances.insert(instance.key.clone(), instance);
    }

    /// Returns the instance stored at the key, if any.
    #[must_use]
    pub fn get(&self, key: &InstanceKey) -> Option<&Instance> {
        self.instances.get(key)
    }

    /// Iterates over the stored instances in key order.
    pub fn instances(&self) -> impl Iterator<Item = &Instance> {
        self.instances.values()
    }

    /// Number of stored instances.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Returns true if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

impl Page for InMemoryPage {
    fn read(&self, key: &InstanceKey) -> Result<Instance, StorageError> {
        self.instances
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(key.clone()))
    }

    fn write(&mut self, key: &InstanceKey, instance: Instance) -> Result<(), StorageError> {
        self.instances.insert(key.clone(), instance);
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
