//! # Scheduler
//!
//! One tokio timer task per active schedule entry, with a handle map keyed
//! by function name so entries can be added and removed at runtime. Timer
//! firings call the dispatcher and log the outcome; they never propagate an
//! error into the scheduler's own control flow.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::errors::{SchedulerError, SchedulerResult};
use crate::dispatch::Dispatcher;
use crate::store::TaskRegistry;

/// Drives periodic invocation of scheduled tasks.
pub struct Scheduler {
    tasks: Arc<TaskRegistry>,
    dispatcher: Arc<Dispatcher>,

    /// Live schedule entries by function name. Guarded because timer tasks
    /// are added and removed concurrently by control API handlers.
    entries: Mutex<HashMap<String, JoinHandle<()>>>,
}

impl Scheduler {
    /// Create a scheduler over the task registry and dispatcher.
    pub fn new(tasks: Arc<TaskRegistry>, dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            tasks,
            dispatcher,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Register a schedule entry for every enabled task.
    ///
    /// A task that fails to register (invalid period) is logged and skipped;
    /// startup continues with the remaining tasks.
    pub fn start(&self) {
        for task in self.tasks.enabled_tasks() {
            match self.add_task(&task.function_name, task.period) {
                Ok(()) => {}
                Err(err) => {
                    tracing::warn!(
                        function = %task.function_name,
                        error = %err,
                        "skipping task with unschedulable period"
                    );
                }
            }
        }
    }

    /// Spawn a periodic trigger for `function_name` and record its handle.
    ///
    /// The first firing happens one full period after registration. An
    /// existing handle under the same name is overwritten WITHOUT cancelling
    /// its trigger; callers replacing a schedule must `remove_task` first or
    /// both triggers keep firing.
    pub fn add_task(&self, function_name: &str, period: Duration) -> SchedulerResult<()> {
        if period.as_secs() == 0 || period.subsec_nanos() != 0 {
            return Err(SchedulerError::InvalidPeriod(period));
        }

        let dispatcher = self.dispatcher.clone();
        let name = function_name.to_string();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick of an interval completes immediately; consume it
            // so the schedule starts one period from now.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                match dispatcher.invoke(&name).await {
                    Ok(response) => {
                        tracing::info!(
                            function = %name,
                            status = %response.status(),
                            "scheduled invocation completed"
                        );
                    }
                    Err(err) => {
                        tracing::error!(
                            function = %name,
                            error = %err,
                            "scheduled invocation failed"
                        );
                    }
                }
            }
        });

        let mut entries = self
            .entries
            .lock()
            .map_err(|_| SchedulerError::Internal("lock poisoned".into()))?;
        entries.insert(function_name.to_string(), handle);
        tracing::info!(function = function_name, period_secs = period.as_secs(), "task scheduled");
        Ok(())
    }

    /// Cancel the trigger for `function_name` and forget its handle. Unknown
    /// names are a no-op. An invocation already in flight when the trigger
    /// is cancelled runs to completion.
    pub fn remove_task(&self, function_name: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            if let Some(handle) = entries.remove(function_name) {
                handle.abort();
                tracing::info!(function = function_name, "task unscheduled");
            }
        }
    }

    /// Check whether a schedule entry exists for `function_name`.
    pub fn is_scheduled(&self, function_name: &str) -> bool {
        self.entries
            .lock()
            .map(|e| e.contains_key(function_name))
            .unwrap_or(false)
    }

    /// Names of all active schedule entries.
    pub fn active_tasks(&self) -> Vec<String> {
        self.entries
            .lock()
            .map(|e| e.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Get active entry count
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    /// Check if no entries are active
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        if let Ok(entries) = self.entries.lock() {
            for handle in entries.values() {
                handle.abort();
            }
        }
    }
}
