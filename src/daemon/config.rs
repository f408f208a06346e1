//! Daemon Configuration
//!
//! The control API is loopback-only; only the port and the registry file
//! locations vary.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::store;

/// Daemon configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Control API port (default: 3000)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Function registry file path
    #[serde(default = "store::default_function_path")]
    pub function_path: PathBuf,

    /// Task registry file path
    #[serde(default = "store::default_task_path")]
    pub task_path: PathBuf,
}

fn default_port() -> u16 {
    3000
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            function_path: store::default_function_path(),
            task_path: store::default_task_path(),
        }
    }
}

impl DaemonConfig {
    /// Create a config with the specified port
    pub fn with_port(port: u16) -> Self {
        Self {
            port,
            ..Default::default()
        }
    }

    /// Loopback socket address the control API binds to.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), self.port)
    }
}
