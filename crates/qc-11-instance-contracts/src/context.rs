//! # Execution Contexts
//!
//! What a transition and the contract logic it calls can see: the submitter,
//! the key derived from the enclosing transaction, the task and a read-only
//! view of the page.

use crate::domain::entities::{Instance, InvokeTask, SpawnTask};
use crate::domain::value_objects::{Identity, InstanceKey, Payload};
use crate::errors::StorageError;
use crate::ports::outbound::Page;

/// Context of the transaction enclosing a task.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionContext {
    id: InstanceKey,
    identity: Identity,
}

impl TransactionContext {
    /// Creates the context.
    ///
    /// `id` is derived by the transaction layer (typically the transaction
    /// hash) and is the key at which a spawned instance is stored.
    #[must_use]
    pub fn new(id: InstanceKey, identity: Identity) -> Self {
        Self { id, identity }
    }

    /// Key derived from the transaction.
    #[must_use]
    pub fn id(&self) -> &InstanceKey {
        &self.id
    }

    /// Submitter of the transaction.
    #[must_use]
    pub fn identity(&self) -> &Identity {
        &self.identity
    }
}

/// Transaction context bound to a read-only page.
#[derive(Clone, Copy)]
pub struct TaskContext<'a> {
    tx: &'a TransactionContext,
    page: &'a dyn Page,
}

impl<'a> TaskContext<'a> {
    /// Binds the transaction to the page.
    #[must_use]
    pub fn new(tx: &'a TransactionContext, page: &'a dyn Page) -> Self {
        Self { tx, page }
    }

    /// Key derived from the transaction.
    #[must_use]
    pub fn id(&self) -> &'a InstanceKey {
        self.tx.id()
    }

    /// Submitter of the transaction.
    #[must_use]
    pub fn identity(&self) -> &'a Identity {
        self.tx.identity()
    }

    /// Reads an instance from the page.
    pub fn read(&self, key: &InstanceKey) -> Result<Instance, StorageError> {
        self.page.read(key)
    }

    /// The underlying page.
    #[must_use]
    pub fn page(&self) -> &'a dyn Page {
        self.page
    }
}

/// Context handed to `Contract::spawn`.
#[derive(Clone, Copy)]
pub struct SpawnContext<'a> {
    ctx: TaskContext<'a>,
    task: &'a SpawnTask,
}

impl<'a> SpawnContext<'a> {
    pub(crate) fn new(ctx: TaskContext<'a>, task: &'a SpawnTask) -> Self {
        Self { ctx, task }
    }

    /// Contract being spawned.
    #[must_use]
    pub fn contract_id(&self) -> &'a str {
        self.task.contract_id()
    }

    /// Task argument.
    #[must_use]
    pub fn argument(&self) -> &'a Payload {
        self.task.argument()
    }

    /// Key the new instance will be stored at.
    #[must_use]
    pub fn instance_key(&self) -> &'a InstanceKey {
        self.ctx.id()
    }

    /// Submitter of the transaction.
    #[must_use]
    pub fn identity(&self) -> &'a Identity {
        self.ctx.identity()
    }

    /// Reads an instance from the page.
    pub fn read(&self, key: &InstanceKey) -> Result<Instance, StorageError> {
        self.ctx.read(key)
    }

    /// The underlying task context.
    #[must_use]
    pub fn task_context(&self) -> TaskContext<'a> {
        self.ctx
    }
}

/// Context handed to `Contract::invoke`.
#[derive(Clone, Copy)]
pub struct InvokeContext<'a> {
    ctx: TaskContext<'a>,
    task: &'a InvokeTask,
    current: &'a Instance,
}

impl<'a> InvokeContext<'a> {
    pub(crate) fn new(ctx: TaskContext<'a>, task: &'a InvokeTask, current: &'a Instance) -> Self {
        Self { ctx, task, current }
    }

    /// Key of the invoked instance.
    #[must_use]
    pub fn key(&self) -> &'a InstanceKey {
        self.task.key()
    }

    /// Task argument.
    #[must_use]
    pub fn argument(&self) -> &'a Payload {
        self.task.argument()
    }

    /// The instance as stored before this invoke.
    #[must_use]
    pub fn current(&self) -> &'a Instance {
        self.current
    }

    /// Submitter of the transaction.
    #[must_use]
    pub fn identity(&self) -> &'a Identity {
        self.ctx.identity()
    }

    /// Reads an instance from the page.
    pub fn read(&self, key: &InstanceKey) -> Result<Instance, StorageError> {
        self.ctx.read(key)
    }

    /// The underlying task context.
    #[must_use]
    pub fn task_context(&self) -> TaskContext<'a> {
        self.ctx
    }
}
