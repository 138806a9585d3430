//! Task execution configuration from environment variables.

use std::env;
use std::str::FromStr;

/// What happens to invoke and delete tasks targeting a deleted instance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DeletedInstancePolicy {
    /// Deleted instances can still be invoked and deleted again.
    #[default]
    Permissive,
    /// Invoke and delete fail with `TaskError::InstanceDeleted`.
    Reject,
}

impl FromStr for DeletedInstancePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "permissive" => Ok(Self::Permissive),
            "reject" => Ok(Self::Reject),
            other => Err(format!("unknown deleted instance policy '{other}'")),
        }
    }
}

/// Configuration of the task factory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskConfig {
    /// Largest wire message accepted by `decode`.
    pub max_message_bytes: usize,

    /// Largest instance key accepted by `decode`.
    pub max_key_bytes: usize,

    /// Largest canonical argument accepted by `decode`.
    pub max_argument_bytes: usize,

    /// Handling of tasks targeting deleted instances.
    pub deleted_policy: DeletedInstancePolicy,
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            max_message_bytes: 1024 * 1024,
            max_key_bytes: 256,
            max_argument_bytes: 64 * 1024,
            deleted_policy: DeletedInstancePolicy::Permissive,
        }
    }
}

impl TaskConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `QC_CONTRACTS_MAX_MESSAGE_BYTES`: Wire message limit (default: 1048576)
    /// - `QC_CONTRACTS_MAX_KEY_BYTES`: Key limit (default: 256)
    /// - `QC_CONTRACTS_MAX_ARGUMENT_BYTES`: Argument limit (default: 65536)
    /// - `QC_CONTRACTS_DELETED_POLICY`: `permissive` or `reject` (default: permissive)
    ///
    /// Unparsable values fall back to the default.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            max_message_bytes: parse_env("QC_CONTRACTS_MAX_MESSAGE_BYTES")
                .unwrap_or(defaults.max_message_bytes),

            max_key_bytes: parse_env("QC_CONTRACTS_MAX_KEY_BYTES")
                .unwrap_or(defaults.max_key_bytes),

            max_argument_bytes: parse_env("QC_CONTRACTS_MAX_ARGUMENT_BYTES")
                .unwrap_or(defaults.max_argument_bytes),

            deleted_policy: parse_env("QC_CONTRACTS_DELETED_POLICY")
                .unwrap_or(defaults.deleted_policy),
        }
    }

    /// Default limits, refusing to touch deleted instances.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            deleted_policy: DeletedInstancePolicy::Reject,
            ..Self::default()
        }
    }
}

fn parse_env<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}
