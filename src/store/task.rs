//! # Task Registry
//!
//! Maps a function name to its invocation schedule. At most one task exists
//! per function name.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::duration_nanos;
use super::errors::{StoreError, StoreResult};
use super::fileutil;
use super::function::read_registry_file;

/// The schedule for invoking a function by name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub function_name: String,

    /// Invocation period; integer nanoseconds on the wire
    #[serde(rename = "duration", with = "duration_nanos")]
    pub period: Duration,

    pub enabled: bool,
}

/// On-disk document shape: `{"tasks": {<name>: Task}}`.
#[derive(Debug, Default, Serialize, Deserialize)]
struct TasksFile {
    #[serde(default)]
    tasks: HashMap<String, Task>,
}

/// Durable registry of invocation schedules.
#[derive(Debug, Default)]
pub struct TaskRegistry {
    path: Option<PathBuf>,
    tasks: RwLock<HashMap<String, Task>>,
}

impl TaskRegistry {
    /// Create a registry backed by `path` and load its current content.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let registry = Self::at_path(path);
        registry.load()?;
        Ok(registry)
    }

    /// Create a registry backed by `path` without reading it.
    pub fn at_path(path: impl AsRef<Path>) -> Self {
        Self {
            path: Some(path.as_ref().to_path_buf()),
            tasks: RwLock::new(HashMap::new()),
        }
    }

    /// Create a registry with no backing file; `save` fails on it.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Reload from the backing file, replacing in-memory state. Missing or
    /// empty files count as an empty registry.
    pub fn load(&self) -> StoreResult<()> {
        let path = self.path.as_ref().ok_or(StoreError::NoBackingPath)?;
        let loaded = read_registry_file::<TasksFile>(path)?;

        let mut tasks = self
            .tasks
            .write()
            .map_err(|_| StoreError::Internal("lock poisoned".into()))?;
        *tasks = loaded.tasks;
        Ok(())
    }

    /// Persist the registry to its backing file atomically.
    pub fn save(&self) -> StoreResult<()> {
        let path = self.path.as_ref().ok_or(StoreError::NoBackingPath)?;
        let snapshot = {
            let tasks = self
                .tasks
                .read()
                .map_err(|_| StoreError::Internal("lock poisoned".into()))?;
            tasks.clone()
        };
        let data = fileutil::to_tab_json(&TasksFile { tasks: snapshot })?;
        fileutil::replace_atomic(path, &data)
    }

    /// Get the task registered under `function_name`.
    pub fn get(&self, function_name: &str) -> StoreResult<Task> {
        let tasks = self
            .tasks
            .read()
            .map_err(|_| StoreError::Internal("lock poisoned".into()))?;
        tasks
            .get(function_name)
            .cloned()
            .ok_or_else(|| StoreError::TaskNotFound(function_name.to_string()))
    }

    /// Check whether a task is registered under `function_name`.
    pub fn contains(&self, function_name: &str) -> bool {
        self.tasks
            .read()
            .map(|t| t.contains_key(function_name))
            .unwrap_or(false)
    }

    /// Create or replace the task for `function_name`, enabled, and persist.
    pub fn upsert(&self, function_name: &str, period: Duration) -> StoreResult<()> {
        {
            let mut tasks = self
                .tasks
                .write()
                .map_err(|_| StoreError::Internal("lock poisoned".into()))?;
            tasks.insert(
                function_name.to_string(),
                Task {
                    function_name: function_name.to_string(),
                    period,
                    enabled: true,
                },
            );
        }
        self.save()
    }

    /// Delete the task for `function_name` and persist. Deleting an unknown
    /// name is a no-op.
    pub fn delete(&self, function_name: &str) -> StoreResult<()> {
        let removed = {
            let mut tasks = self
                .tasks
                .write()
                .map_err(|_| StoreError::Internal("lock poisoned".into()))?;
            tasks.remove(function_name)
        };
        match removed {
            Some(_) => self.save(),
            None => Ok(()),
        }
    }

    /// Flip the enabled flag of a task and persist.
    ///
    /// All-or-nothing: if the write to disk fails the in-memory flag is
    /// rolled back, so schedule state never desynchronizes from the file.
    pub fn set_enabled(&self, function_name: &str, enabled: bool) -> StoreResult<()> {
        let previous = {
            let mut tasks = self
                .tasks
                .write()
                .map_err(|_| StoreError::Internal("lock poisoned".into()))?;
            let task = tasks
                .get_mut(function_name)
                .ok_or_else(|| StoreError::TaskNotFound(function_name.to_string()))?;
            let previous = task.enabled;
            task.enabled = enabled;
            previous
        };

        if let Err(err) = self.save() {
            if let Ok(mut tasks) = self.tasks.write() {
                if let Some(task) = tasks.get_mut(function_name) {
                    task.enabled = previous;
                }
            }
            return Err(err);
        }
        Ok(())
    }

    /// Snapshot of all enabled tasks, used at scheduler start.
    pub fn enabled_tasks(&self) -> Vec<Task> {
        self.tasks
            .read()
            .map(|tasks| tasks.values().filter(|t| t.enabled).cloned().collect())
            .unwrap_or_default()
    }

    /// Snapshot of every task, used by the CLI listing.
    pub fn list(&self) -> Vec<Task> {
        self.tasks
            .read()
            .map(|tasks| tasks.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Get registered task count
    pub fn len(&self) -> usize {
        self.tasks.read().map(|t| t.len()).unwrap_or(0)
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_registry() -> (tempfile::TempDir, TaskRegistry) {
        let dir = tempfile::tempdir().unwrap();
        let registry = TaskRegistry::at_path(dir.path().join("tasks.json"));
        (dir, registry)
    }

    #[test]
    fn test_upsert_and_get() {
        let (_dir, registry) = scratch_registry();

        registry
            .upsert("send-report", Duration::from_secs(60))
            .unwrap();

        let task = registry.get("send-report").unwrap();
        assert_eq!(task.period, Duration::from_secs(60));
        assert!(task.enabled);
    }

    #[test]
    fn test_upsert_replaces_existing() {
        let (_dir, registry) = scratch_registry();

        registry
            .upsert("send-report", Duration::from_secs(60))
            .unwrap();
        registry.set_enabled("send-report", false).unwrap();
        registry
            .upsert("send-report", Duration::from_secs(30))
            .unwrap();

        let task = registry.get("send-report").unwrap();
        assert_eq!(task.period, Duration::from_secs(30));
        assert!(task.enabled, "upsert always re-enables");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_delete_unknown_is_noop() {
        let registry = TaskRegistry::in_memory();
        registry.delete("missing").unwrap();
    }

    #[test]
    fn test_set_enabled_unknown_task() {
        let (_dir, registry) = scratch_registry();
        assert!(matches!(
            registry.set_enabled("missing", false),
            Err(StoreError::TaskNotFound(_))
        ));
    }

    #[test]
    fn test_enabled_tasks_filters_disabled() {
        let (_dir, registry) = scratch_registry();

        registry.upsert("a", Duration::from_secs(10)).unwrap();
        registry.upsert("b", Duration::from_secs(10)).unwrap();
        registry.set_enabled("b", false).unwrap();

        let enabled = registry.enabled_tasks();
        assert_eq!(enabled.len(), 1);
        assert_eq!(enabled[0].function_name, "a");
    }
}
