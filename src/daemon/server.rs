//! # Daemon
//!
//! Wires the registries, dispatcher, scheduler and control API together and
//! drives the server lifecycle: Stopped until the listener is bound and the
//! scheduler has started, Running until `/stop` or a fatal listener error,
//! then Stopped again.

use std::net::SocketAddr;
use std::sync::{Arc, RwLock};

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::Notify;

use super::config::DaemonConfig;
use super::errors::DaemonResult;
use super::routes::router;
use crate::dispatch::Dispatcher;
use crate::scheduler::Scheduler;
use crate::store::{FunctionRegistry, TaskRegistry};

/// Server lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaemonState {
    Stopped,
    Running,
}

/// Shared state behind the control API handlers.
pub(crate) struct ApiState {
    pub functions: Arc<FunctionRegistry>,
    pub tasks: Arc<TaskRegistry>,
    pub scheduler: Arc<Scheduler>,
    pub dispatcher: Arc<Dispatcher>,
    pub shutdown: Arc<Notify>,
}

/// The control-plane daemon.
pub struct Daemon {
    config: DaemonConfig,
    functions: Arc<FunctionRegistry>,
    tasks: Arc<TaskRegistry>,
    dispatcher: Arc<Dispatcher>,
    scheduler: Arc<Scheduler>,
    shutdown: Arc<Notify>,
    state: RwLock<DaemonState>,
    local_addr: RwLock<Option<SocketAddr>>,
}

impl Daemon {
    /// Assemble a daemon over already-loaded registries.
    pub fn new(
        config: DaemonConfig,
        functions: Arc<FunctionRegistry>,
        tasks: Arc<TaskRegistry>,
    ) -> Self {
        let dispatcher = Arc::new(Dispatcher::new(functions.clone(), tasks.clone()));
        let scheduler = Arc::new(Scheduler::new(tasks.clone(), dispatcher.clone()));
        Self {
            config,
            functions,
            tasks,
            dispatcher,
            scheduler,
            shutdown: Arc::new(Notify::new()),
            state: RwLock::new(DaemonState::Stopped),
            local_addr: RwLock::new(None),
        }
    }

    /// The scheduler driving this daemon's schedule entries.
    pub fn scheduler(&self) -> Arc<Scheduler> {
        self.scheduler.clone()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> DaemonState {
        self.state
            .read()
            .map(|s| *s)
            .unwrap_or(DaemonState::Stopped)
    }

    /// Address the control API is bound to, once Running. Useful when the
    /// configured port is 0.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr.read().ok().and_then(|a| *a)
    }

    /// Build the control API router (exposed for testing).
    pub fn router(&self) -> Router {
        router(Arc::new(ApiState {
            functions: self.functions.clone(),
            tasks: self.tasks.clone(),
            scheduler: self.scheduler.clone(),
            dispatcher: self.dispatcher.clone(),
            shutdown: self.shutdown.clone(),
        }))
    }

    /// Start the scheduler, bind the loopback listener and serve the control
    /// API until `/stop` is called or the listener fails.
    pub async fn run(&self) -> DaemonResult<()> {
        self.scheduler.start();
        tracing::info!(
            scheduled = self.scheduler.len(),
            "scheduler started"
        );

        let app = self.router();
        let listener = TcpListener::bind(self.config.socket_addr()).await?;
        let addr = listener.local_addr()?;
        if let Ok(mut local_addr) = self.local_addr.write() {
            *local_addr = Some(addr);
        }
        if let Ok(mut state) = self.state.write() {
            *state = DaemonState::Running;
        }
        tracing::info!(%addr, "control api listening");

        let shutdown = self.shutdown.clone();
        let result = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown.notified().await;
            })
            .await;

        if let Ok(mut state) = self.state.write() {
            *state = DaemonState::Stopped;
        }
        tracing::info!("daemon stopped");
        result?;
        Ok(())
    }
}
