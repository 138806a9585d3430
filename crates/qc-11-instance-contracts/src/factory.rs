//! # Task Factory
//!
//! Entry point of the execution layer. Owns the contract registry, the
//! access-control decoding factory and the stable encoder; decodes wire
//! messages into client tasks and consumes them against a page.
//!
//! ## Usage
//!
//! ```ignore
//! let mut factory = TaskFactory::new(TaskConfig::from_env());
//! factory.register("coin", Arc::new(CoinContract));
//!
//! let task = factory.decode(&bytes)?;
//! factory.consume(&task, &TransactionContext::new(tx_id, sender), &mut page)?;
//! ```

use crate::adapters::PageAccessResolver;
use crate::config::TaskConfig;
use crate::context::TransactionContext;
use crate::dispatcher::ServerTask;
use crate::domain::encoding::{CanonicalJsonEncoder, StableEncoder};
use crate::domain::entities::ClientTask;
use crate::domain::fingerprint::Fingerprint;
use crate::domain::value_objects::{Hash, Payload};
use crate::errors::{DecodeError, FingerprintError, TaskError};
use crate::events::TaskMessage;
use crate::ports::inbound::InstanceContractApi;
use crate::ports::outbound::{AccessControlFactory, AccessControlResolver, Contract, Page};
use crate::registry::ContractRegistry;
use parking_lot::RwLock;
use std::io::Write;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Statistics of the task factory.
///
/// Counters only; they never influence ledger state.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TaskStats {
    /// Tasks handed to `consume`.
    pub tasks_consumed: u64,
    /// Instances spawned.
    pub spawned: u64,
    /// Instances invoked.
    pub invoked: u64,
    /// Instances marked deleted.
    pub deleted: u64,
    /// Tasks that failed for any reason.
    pub failed: u64,
    /// Failures due to access control.
    pub access_denied: u64,
    /// Messages refused by `decode`.
    pub rejected_messages: u64,
}

/// Factory decoding and consuming instance contract tasks.
pub struct TaskFactory {
    config: TaskConfig,
    contracts: Arc<ContractRegistry>,
    access: Arc<dyn AccessControlResolver>,
    encoder: Arc<dyn StableEncoder>,
    stats: RwLock<TaskStats>,
}

impl TaskFactory {
    /// Creates an empty factory with the canonical JSON encoder and
    /// rule-based access-control objects.
    #[must_use]
    pub fn new(config: TaskConfig) -> Self {
        Self {
            config,
            contracts: Arc::new(ContractRegistry::new()),
            access: Arc::new(PageAccessResolver::default()),
            encoder: Arc::new(CanonicalJsonEncoder::new()),
            stats: RwLock::new(TaskStats::default()),
        }
    }

    /// Replaces the access-control decoding factory.
    #[must_use]
    pub fn with_access_control_factory(mut self, factory: Box<dyn AccessControlFactory>) -> Self {
        self.access = Arc::new(PageAccessResolver::new(factory));
        self
    }

    /// Replaces the access-control resolver altogether.
    #[must_use]
    pub fn with_access_resolver(mut self, resolver: Arc<dyn AccessControlResolver>) -> Self {
        self.access = resolver;
        self
    }

    /// Replaces the stable encoder.
    #[must_use]
    pub fn with_encoder(mut self, encoder: Arc<dyn StableEncoder>) -> Self {
        self.encoder = encoder;
        self
    }

    /// Registers the contract using the name as the identifier. If an
    /// identifier already exists, it is overwritten.
    pub fn register(&mut self, name: impl Into<String>, contract: Arc<dyn Contract>) {
        // Copy-on-write: server tasks built earlier keep their snapshot.
        Arc::make_mut(&mut self.contracts).register(name, contract);
    }

    /// The contract registry.
    #[must_use]
    pub fn contracts(&self) -> &ContractRegistry {
        &self.contracts
    }

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> &TaskConfig {
        &self.config
    }

    /// Current statistics.
    #[must_use]
    pub fn stats(&self) -> TaskStats {
        self.stats.read().clone()
    }

    /// Binds a client task to the factory collaborators.
    #[must_use]
    pub fn server_task(&self, task: ClientTask) -> ServerTask {
        ServerTask::new(
            task,
            Arc::clone(&self.contracts),
            Arc::clone(&self.access),
            self.config.deleted_policy,
        )
    }

    /// Encodes a client task into its wire message.
    pub fn encode(&self, task: &ClientTask) -> Result<Vec<u8>, DecodeError> {
        TaskMessage::from(task).to_vec()
    }

    fn decode_message(&self, bytes: &[u8]) -> Result<ClientTask, DecodeError> {
        if bytes.len() > self.config.max_message_bytes {
            return Err(DecodeError::TooLarge {
                what: "message",
                size: bytes.len(),
                max: self.config.max_message_bytes,
            });
        }

        let task = TaskMessage::from_slice(bytes)?.into_task()?;

        match &task {
            ClientTask::Spawn(t) => self.check_argument(t.argument())?,
            ClientTask::Invoke(t) => {
                self.check_key_len(t.key().len())?;
                self.check_argument(t.argument())?;
            }
            ClientTask::Delete(t) => self.check_key_len(t.key().len())?,
        }

        Ok(task)
    }

    fn check_key_len(&self, size: usize) -> Result<(), DecodeError> {
        if size > self.config.max_key_bytes {
            return Err(DecodeError::TooLarge {
                what: "key",
                size,
                max: self.config.max_key_bytes,
            });
        }
        Ok(())
    }

    /// The argument must have a canonical form, otherwise the task could
    /// never be fingerprinted.
    fn check_argument(&self, argument: &Payload) -> Result<(), DecodeError> {
        let size = self
            .encoder
            .to_stable_bytes(argument)
            .map_err(|e| DecodeError::Malformed(format!("argument: {e}")))?
            .len();

        if size > self.config.max_argument_bytes {
            return Err(DecodeError::TooLarge {
                what: "argument",
                size,
                max: self.config.max_argument_bytes,
            });
        }
        Ok(())
    }

    fn record(&self, task: &ClientTask, result: &Result<(), TaskError>) {
        let mut stats = self.stats.write();
        stats.tasks_consumed += 1;
        match result {
            Ok(()) => match task {
                ClientTask::Spawn(_) => stats.spawned += 1,
                ClientTask::Invoke(_) => stats.invoked += 1,
                ClientTask::Delete(_) => stats.deleted += 1,
            },
            Err(e) => {
                stats.failed += 1;
                if e.is_access_denied() {
                    stats.access_denied += 1;
                }
            }
        }
    }
}

impl Default for TaskFactory {
    fn default() -> Self {
        Self::new(TaskConfig::default())
    }
}

impl InstanceContractApi for TaskFactory {
    fn decode(&self, bytes: &[u8]) -> Result<ClientTask, TaskError> {
        self.decode_message(bytes).map_err(|e| {
            warn!(error = %e, size = bytes.len(), "Rejected task message");
            self.stats.write().rejected_messages += 1;
            TaskError::DecodingFailed(e)
        })
    }

    #[instrument(
        skip(self, task, ctx, page),
        fields(task = task.kind(), identity = %ctx.identity())
    )]
    fn consume(
        &self,
        task: &ClientTask,
        ctx: &TransactionContext,
        page: &mut dyn Page,
    ) -> Result<(), TaskError> {
        debug!(%task, "Consuming task");

        let result = self
            .server_task(task.clone())
            .consume(ctx, page)
            .map(|instance| {
                info!(
                    key = %instance.key,
                    contract = %instance.contract_id,
                    deleted = instance.deleted,
                    "Instance written"
                );
            });

        if let Err(e) = &result {
            debug!(error = %e, "Task failed");
        }

        self.record(task, &result);
        result
    }

    fn fingerprint(&self, task: &ClientTask, w: &mut dyn Write) -> Result<(), FingerprintError> {
        task.fingerprint(w, self.encoder.as_ref())
    }

    fn digest(&self, task: &ClientTask) -> Result<Hash, FingerprintError> {
        task.digest(self.encoder.as_ref())
    }
}

// =============================================================================
// TESTS
// =============================================================================
