//! # Wire Schema
//!
//! Task messages as submitted by clients, before decoding into `ClientTask`.
//! JSON objects internally tagged by `"type"`; keys are hex strings.
//!
//! ```text
//! {"type":"spawn","contract_id":"coin","argument":{...}}
//! {"type":"invoke","key":"6b31","argument":{...}}
//! {"type":"delete","key":"6b31"}
//! ```

use crate::domain::entities::ClientTask;
use crate::domain::value_objects::{InstanceKey, Payload};
use crate::errors::DecodeError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Wire tags of the task variants.
pub mod task_types {
    /// Spawn task tag.
    pub const SPAWN: &str = "spawn";
    /// Invoke task tag.
    pub const INVOKE: &str = "invoke";
    /// Delete task tag.
    pub const DELETE: &str = "delete";

    /// Returns true if the tag names a task variant.
    #[must_use]
    pub fn is_known(tag: &str) -> bool {
        matches!(tag, SPAWN | INVOKE | DELETE)
    }
}

/// A task message as carried in a transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TaskMessage {
    /// Spawn request.
    Spawn {
        /// Contract to spawn.
        contract_id: String,
        /// Contract-interpreted argument.
        #[serde(default)]
        argument: Payload,
    },
    /// Invoke request.
    Invoke {
        /// Hex key of the instance.
        key: String,
        /// Contract-interpreted argument.
        #[serde(default)]
        argument: Payload,
    },
    /// Delete request.
    Delete {
        /// Hex key of the instance.
        key: String,
    },
}

impl TaskMessage {
    /// Parses a message, telling unknown tags apart from malformed bodies.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, DecodeError> {
        let raw: Value =
            serde_json::from_slice(bytes).map_err(|e| DecodeError::Malformed(e.to_string()))?;

        let tag = raw
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| DecodeError::Malformed("missing task type".to_string()))?;

        if !task_types::is_known(tag) {
            return Err(DecodeError::UnknownTaskType(tag.to_string()));
        }

        serde_json::from_value(raw).map_err(|e| DecodeError::Malformed(e.to_string()))
    }

    /// Serializes the message.
    pub fn to_vec(&self) -> Result<Vec<u8>, DecodeError> {
        serde_json::to_vec(self).map_err(|e| DecodeError::Malformed(e.to_string()))
    }

    /// Converts into a typed task. Only structural checks happen here; size
    /// limits are enforced by the factory.
    pub fn into_task(self) -> Result<ClientTask, DecodeError> {
        match self {
            Self::Spawn {
                contract_id,
                argument,
            } => {
                if contract_id.is_empty() {
                    return Err(DecodeError::EmptyContractId);
                }
                Ok(ClientTask::spawn(contract_id, argument))
            }
            Self::Invoke { key, argument } => Ok(ClientTask::invoke(parse_key(&key)?, argument)),
            Self::Delete { key } => Ok(ClientTask::delete(parse_key(&key)?)),
        }
    }
}

impl From<&ClientTask> for TaskMessage {
    fn from(task: &ClientTask) -> Self {
        match task {
            ClientTask::Spawn(t) => Self::Spawn {
                contract_id: t.contract_id().to_string(),
                argument: t.argument().clone(),
            },
            ClientTask::Invoke(t) => Self::Invoke {
                key: t.key().to_hex(),
                argument: t.argument().clone(),
            },
            ClientTask::Delete(t) => Self::Delete {
                key: t.key().to_hex(),
            },
        }
    }
}

fn parse_key(text: &str) -> Result<InstanceKey, DecodeError> {
    if text.is_empty() {
        return Err(DecodeError::EmptyKey);
    }
    InstanceKey::from_hex(text).map_err(|e| DecodeError::InvalidKey(e.to_string()))
}

// =============================================================================
// TESTS
// =============================================================================
