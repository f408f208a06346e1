//! # Invocation Dispatch
//!
//! Replica selection and the remote call itself.

pub mod dispatcher;
pub mod errors;

pub use dispatcher::Dispatcher;
pub use errors::{DispatchError, DispatchResult};
