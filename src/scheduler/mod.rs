//! # Task Scheduler
//!
//! Periodic triggers for enabled tasks, one timer task per schedule entry.

pub mod errors;
pub mod timer;

pub use errors::{SchedulerError, SchedulerResult};
pub use timer::Scheduler;
