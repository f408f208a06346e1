//! # Durable Registries
//!
//! File-backed registries for function deployments and their schedules,
//! persisted as tab-indented JSON with atomic replace-on-write.

pub mod errors;
pub mod fileutil;
pub mod function;
pub mod task;

pub use errors::{StoreError, StoreResult};
pub use function::{Deployment, DeploymentOptions, FunctionRegistry};
pub use task::{Task, TaskRegistry};

use std::path::PathBuf;

/// Default location of the function registry file.
pub fn default_function_path() -> PathBuf {
    config_dir().join("functions.json")
}

/// Default location of the task registry file.
pub fn default_task_path() -> PathBuf {
    config_dir().join("tasks.json")
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".polycron")
}

/// Serde adapter storing a `Duration` as integer nanoseconds, the wire format
/// used by the registry files.
pub(crate) mod duration_nanos {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_nanos() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let nanos = u64::deserialize(deserializer)?;
        Ok(Duration::from_nanos(nanos))
    }
}
