//! polycron - local control-plane daemon for functions deployed redundantly
//! across several external execution platforms
//!
//! One place to schedule recurring invocations and fail over between
//! deployments: durable registries map a function name to its deployments
//! and to its schedule, a scheduler fires periodic invocations, a dispatcher
//! picks one replica at random per invocation, and a loopback control API
//! manages the running daemon.

pub mod cli;
pub mod client;
pub mod daemon;
pub mod dispatch;
pub mod scheduler;
pub mod store;
