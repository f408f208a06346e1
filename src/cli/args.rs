//! CLI argument definitions using clap
//!
//! Commands:
//! - polycron daemon run|stop|reload
//! - polycron cron list|create|delete|run

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// polycron - schedule functions deployed redundantly across cloud platforms
#[derive(Parser, Debug)]
#[command(name = "polycron")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Function registry file path
    #[arg(long, global = true)]
    pub function_file: Option<PathBuf>,

    /// Task registry file path
    #[arg(long, global = true)]
    pub task_file: Option<PathBuf>,

    /// Control API port
    #[arg(long, global = true, default_value_t = 3000)]
    pub port: u16,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Control the polycron daemon
    Daemon {
        #[command(subcommand)]
        command: DaemonCommand,
    },

    /// Manage cron tasks
    Cron {
        #[command(subcommand)]
        command: CronCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum DaemonCommand {
    /// Run the daemon in the foreground
    Run,

    /// Stop the running daemon
    Stop,

    /// Ask the running daemon to reload its registries
    Reload,
}

#[derive(Subcommand, Debug)]
pub enum CronCommand {
    /// List all cron tasks
    List,

    /// Create or replace a cron task
    Create {
        /// Function name
        #[arg(long)]
        name: String,

        /// Invocation period in seconds
        #[arg(long)]
        duration: u64,
    },

    /// Delete a cron task
    Delete {
        /// Function name
        #[arg(long)]
        name: String,
    },

    /// Run a cron task immediately
    Run {
        /// Function name
        #[arg(long)]
        name: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
