//! # Driving Ports (API - Inbound)
//!
//! The interface exposed to the transaction-processing layer. It is called
//! once per task, in the order consensus delivered the tasks.

use crate::context::TransactionContext;
use crate::domain::entities::ClientTask;
use crate::domain::value_objects::Hash;
use crate::errors::{FingerprintError, TaskError};
use crate::ports::outbound::Page;
use std::io::Write;

/// Primary API of the execution layer.
///
/// ## Usage
///
/// ```ignore
/// let task = api.decode(&bytes)?;
/// let digest = api.digest(&task)?;
/// api.consume(&task, &tx_ctx, &mut page)?;
/// ```
pub trait InstanceContractApi: Send + Sync {
    /// Decodes a wire-level task message.
    ///
    /// Fails with `TaskError::DecodingFailed` before any transition runs.
    fn decode(&self, bytes: &[u8]) -> Result<ClientTask, TaskError>;

    /// Applies the task to the page.
    ///
    /// On failure, the page is left untouched.
    fn consume(
        &self,
        task: &ClientTask,
        ctx: &TransactionContext,
        page: &mut dyn Page,
    ) -> Result<(), TaskError>;

    /// Writes the deterministic fingerprint of the task without executing it.
    fn fingerprint(&self, task: &ClientTask, w: &mut dyn Write) -> Result<(), FingerprintError>;

    /// Hash of the task fingerprint.
    fn digest(&self, task: &ClientTask) -> Result<Hash, FingerprintError>;
}
