//! # Server Task (State Transition)
//!
//! A client task bound to the shared collaborators it needs to be consumed.
//!
//! | Task | Order | Access check against |
//! |------|-------|----------------------|
//! | Spawn | execute, then authorize | id chosen by the contract |
//! | Invoke | authorize, then execute | id of the existing instance |
//! | Delete | no contract, no check | - |
//!
//! A transition either returns a complete instance which is then written, or
//! fails and nothing is written. The instance invariants are asserted in debug
//! builds only; the transitions build their output so that they always hold.

use crate::config::DeletedInstancePolicy;
use crate::context::{InvokeContext, SpawnContext, TaskContext, TransactionContext};
use crate::domain::entities::{ClientTask, DeleteTask, Instance, InvokeTask, SpawnTask};
use crate::domain::invariants::{check_spawn_invariants, check_update_invariants, Transition};
use crate::domain::value_objects::{AccessControlId, Action, InstanceKey, Rule};
use crate::errors::{StorageError, TaskError};
use crate::ports::outbound::{AccessControlResolver, Page};
use crate::registry::ContractRegistry;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// A client task that can be consumed to update a page.
#[derive(Clone)]
pub struct ServerTask {
    task: ClientTask,
    contracts: Arc<ContractRegistry>,
    access: Arc<dyn AccessControlResolver>,
    deleted_policy: DeletedInstancePolicy,
}

impl ServerTask {
    /// Binds the task to its collaborators.
    #[must_use]
    pub fn new(
        task: ClientTask,
        contracts: Arc<ContractRegistry>,
        access: Arc<dyn AccessControlResolver>,
        deleted_policy: DeletedInstancePolicy,
    ) -> Self {
        Self {
            task,
            contracts,
            access,
            deleted_policy,
        }
    }

    /// The client task.
    #[must_use]
    pub fn task(&self) -> &ClientTask {
        &self.task
    }

    /// Updates the page according to the task definition and returns the
    /// instance that was written.
    pub fn consume(
        &self,
        ctx: &TransactionContext,
        page: &mut dyn Page,
    ) -> Result<Instance, TaskError> {
        // No wrapping: transitions already carry their context.
        let instance = self.execute(ctx, &*page)?;

        if let Err(source) = page.write(&instance.key, instance.clone()) {
            error!(key = %instance.key, error = %source, "Couldn't write instance to page");
            return Err(TaskError::StorageFailed {
                key: instance.key,
                source,
            });
        }

        Ok(instance)
    }

    /// Computes the instance the task would write, without writing it.
    pub fn execute(
        &self,
        ctx: &TransactionContext,
        page: &dyn Page,
    ) -> Result<Instance, TaskError> {
        let view = TaskContext::new(ctx, page);

        match &self.task {
            ClientTask::Spawn(task) => self.consume_spawn(&SpawnContext::new(view, task), task),
            ClientTask::Invoke(task) => self.consume_invoke(view, task),
            ClientTask::Delete(task) => self.consume_delete(view, task),
        }
    }

    fn consume_spawn(
        &self,
        ctx: &SpawnContext<'_>,
        task: &SpawnTask,
    ) -> Result<Instance, TaskError> {
        let key = ctx.instance_key();

        match ctx.read(key) {
            Ok(_) => return Err(TaskError::AlreadyExists { key: key.clone() }),
            Err(e) if e.is_not_found() => {}
            Err(source) => {
                return Err(TaskError::StorageFailed {
                    key: key.clone(),
                    source,
                })
            }
        }

        let contract_id = task.contract_id();
        let exec = self
            .contracts
            .resolve(contract_id)
            .ok_or_else(|| TaskError::UnknownContract {
                contract_id: contract_id.to_string(),
            })?;

        let (value, access_control_id) = exec
            .spawn(ctx)
            .map_err(|source| TaskError::ContractExecutionFailed {
                contract_id: contract_id.to_string(),
                action: Action::Spawn,
                source,
            })?;

        // The contract picks the policy of the new instance; that policy must
        // already authorize this spawn.
        let rule = Rule::compile(contract_id, Action::Spawn);
        self.has_access(&ctx.task_context(), &access_control_id, &rule)?;

        let instance = Instance::new(key.clone(), contract_id, access_control_id, value);
        debug_assert!(
            check_spawn_invariants(key, &instance).is_valid(),
            "spawn must produce a live instance at the derived key"
        );

        debug!(key = %key, contract = %contract_id, "Spawn transition computed");
        Ok(instance)
    }

    fn consume_invoke(
        &self,
        ctx: TaskContext<'_>,
        task: &InvokeTask,
    ) -> Result<Instance, TaskError> {
        let current = read_existing(&ctx, task.key())?;

        if current.deleted {
            match self.deleted_policy {
                DeletedInstancePolicy::Reject => {
                    return Err(TaskError::InstanceDeleted {
                        key: current.key.clone(),
                    })
                }
                DeletedInstancePolicy::Permissive => {
                    warn!(key = %current.key, "Invoking a deleted instance");
                }
            }
        }

        // Authorize before any contract code runs.
        let rule = Rule::compile(&current.contract_id, Action::Invoke);
        self.has_access(&ctx, &current.access_control_id, &rule)?;

        // The owning contract, never one named by the caller.
        let exec = self
            .contracts
            .resolve(&current.contract_id)
            .ok_or_else(|| TaskError::UnknownContract {
                contract_id: current.contract_id.clone(),
            })?;

        let value = exec
            .invoke(&InvokeContext::new(ctx, task, &current))
            .map_err(|source| TaskError::ContractExecutionFailed {
                contract_id: current.contract_id.clone(),
                action: Action::Invoke,
                source,
            })?;

        let mut instance = current.clone();
        instance.value = value;
        debug_assert!(
            check_update_invariants(Transition::Invoke, &current, &instance).is_valid(),
            "invoke must only replace the value"
        );

        debug!(
            key = %instance.key,
            contract = %instance.contract_id,
            "Invoke transition computed"
        );
        Ok(instance)
    }

    fn consume_delete(
        &self,
        ctx: TaskContext<'_>,
        task: &DeleteTask,
    ) -> Result<Instance, TaskError> {
        let current = read_existing(&ctx, task.key())?;

        if current.deleted && self.deleted_policy == DeletedInstancePolicy::Reject {
            return Err(TaskError::InstanceDeleted { key: current.key });
        }

        let mut instance = current.clone();
        instance.deleted = true;
        debug_assert!(
            check_update_invariants(Transition::Delete, &current, &instance).is_valid(),
            "delete must only raise the flag"
        );

        debug!(key = %instance.key, "Delete transition computed");
        Ok(instance)
    }

    /// Resolves the policy and matches the rule for the submitter.
    fn has_access(
        &self,
        ctx: &TaskContext<'_>,
        id: &AccessControlId,
        rule: &Rule,
    ) -> Result<(), TaskError> {
        let identity = ctx.identity();

        let access = self.access.resolve(ctx.page(), id).map_err(|e| {
            warn!(%identity, %rule, access_control = %id, error = %e, "Couldn't read access");
            TaskError::AccessDenied {
                identity: identity.to_string(),
                rule: rule.clone(),
                policy: format!("unresolved access control {id}"),
                reason: e.to_string(),
            }
        })?;

        access.match_rule(rule, identity).map_err(|e| {
            warn!(%identity, %rule, policy = %access, error = %e, "Access refused");
            TaskError::AccessDenied {
                identity: identity.to_string(),
                rule: rule.clone(),
                policy: access.to_string(),
                reason: e.to_string(),
            }
        })
    }
}

fn read_existing(ctx: &TaskContext<'_>, key: &InstanceKey) -> Result<Instance, TaskError> {
    ctx.read(key).map_err(|source| match source {
        StorageError::NotFound(_) => TaskError::NotFound { key: key.clone() },
        source => TaskError::StorageFailed {
            key: key.clone(),
            source,
        },
    })
}

// =============================================================================
// TESTS
// =============================================================================
