//! CLI command dispatch
//!
//! Opens both registries before dispatching, mirroring the daemon's view of
//! the world. Commands other than `daemon run` act as clients of a running
//! daemon through its loopback control API.

use std::sync::Arc;
use std::time::Duration;

use super::args::{Cli, Command, CronCommand, DaemonCommand};
use super::errors::CliResult;
use crate::client::ControlClient;
use crate::daemon::{Daemon, DaemonConfig};
use crate::store::{self, FunctionRegistry, TaskRegistry};

/// Parse arguments and execute the selected command.
pub async fn run() -> CliResult<()> {
    let cli = Cli::parse_args();

    let function_path = cli
        .function_file
        .clone()
        .unwrap_or_else(store::default_function_path);
    let task_path = cli
        .task_file
        .clone()
        .unwrap_or_else(store::default_task_path);

    let functions = Arc::new(FunctionRegistry::open(&function_path)?);
    let tasks = Arc::new(TaskRegistry::open(&task_path)?);
    let client = ControlClient::new(cli.port);

    match cli.command {
        Command::Daemon { command } => match command {
            DaemonCommand::Run => {
                init_tracing();
                let config = DaemonConfig {
                    port: cli.port,
                    function_path,
                    task_path,
                };
                let daemon = Daemon::new(config, functions, tasks);
                daemon.run().await?;
            }
            DaemonCommand::Stop => client.stop().await?,
            DaemonCommand::Reload => client.reload().await?,
        },

        Command::Cron { command } => match command {
            CronCommand::List => {
                for task in tasks.list() {
                    let status = if task.enabled { "ENABLED" } else { "DISABLED" };
                    println!(
                        "[{}] {}s ({status})",
                        task.function_name,
                        task.period.as_secs()
                    );
                }
            }
            CronCommand::Create { name, duration } => {
                // The function must already be deployed somewhere.
                functions.get(&name)?;
                tasks.upsert(&name, Duration::from_secs(duration))?;
                // The daemon keeps its own registry copy; tell it to re-read.
                client.reload().await?;
            }
            CronCommand::Delete { name } => {
                tasks.delete(&name)?;
            }
            CronCommand::Run { name } => {
                let body = client.run_task(&name).await?;
                println!("{body}");
            }
        },
    }

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}
