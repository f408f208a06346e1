//! # Control-Plane Daemon
//!
//! The loopback control API plus the wiring that connects it to the
//! scheduler, dispatcher and registries.

pub mod config;
pub mod errors;
pub mod response;
pub mod routes;
pub mod server;

pub use config::DaemonConfig;
pub use errors::{DaemonError, DaemonResult};
pub use response::Envelope;
pub use server::{Daemon, DaemonState};
