//! # Invocation Dispatcher
//!
//! Picks one deployment of a function at random and performs the remote
//! call. Random selection spreads load across replicas and fails over
//! between platforms without health checks; an unhealthy replica surfaces
//! as an error to the caller rather than triggering a retry elsewhere.

use std::sync::Arc;

use rand::seq::SliceRandom;

use super::errors::{DispatchError, DispatchResult};
use crate::store::{FunctionRegistry, StoreError, TaskRegistry};

/// Dispatches a single invocation of a named function to one of its
/// deployed replicas.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    functions: Arc<FunctionRegistry>,
    tasks: Arc<TaskRegistry>,
    client: reqwest::Client,
}

impl Dispatcher {
    /// Create a dispatcher over the given registries.
    pub fn new(functions: Arc<FunctionRegistry>, tasks: Arc<TaskRegistry>) -> Self {
        Self {
            functions,
            tasks,
            client: reqwest::Client::new(),
        }
    }

    /// Invoke one replica of `function_name`.
    ///
    /// The response, success or not, is returned unmodified; transport
    /// errors come back as [`DispatchError::Request`]. No timeout is applied
    /// beyond transport defaults.
    pub async fn invoke(&self, function_name: &str) -> DispatchResult<reqwest::Response> {
        if !self.tasks.contains(function_name) {
            return Err(DispatchError::TaskNotFound(function_name.to_string()));
        }

        // An absent registry entry and a present-but-empty replica list are
        // the same failure: nothing to invoke. Any other registry error is
        // its own thing and must not masquerade as a missing function.
        let deployments = match self.functions.get(function_name) {
            Ok(deployments) => deployments,
            Err(StoreError::FunctionNotFound(_)) => Vec::new(),
            Err(err) => return Err(err.into()),
        };
        let deployment = deployments
            .as_slice()
            .choose(&mut rand::thread_rng())
            .ok_or_else(|| DispatchError::FunctionNotExists(function_name.to_string()))?;

        tracing::debug!(
            function = function_name,
            platform = %deployment.platform_id,
            url = %deployment.url,
            "dispatching invocation"
        );
        Ok(self.client.get(&deployment.url).send().await?)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::time::Duration;

    use axum::routing::get;
    use axum::Router;

    use super::*;
    use crate::store::DeploymentOptions;

    async fn spawn_replica(body: &'static str) -> String {
        let app = Router::new().route("/", get(move || async move { body }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/")
    }

    fn registries_with_task(name: &str) -> (Arc<FunctionRegistry>, Arc<TaskRegistry>) {
        let dir = Box::leak(Box::new(tempfile::tempdir().unwrap()));
        let functions = Arc::new(FunctionRegistry::at_path(dir.path().join("functions.json")));
        let tasks = Arc::new(TaskRegistry::at_path(dir.path().join("tasks.json")));
        tasks.upsert(name, Duration::from_secs(60)).unwrap();
        (functions, tasks)
    }

    #[tokio::test]
    async fn test_unregistered_task_is_rejected() {
        let functions = Arc::new(FunctionRegistry::in_memory());
        let tasks = Arc::new(TaskRegistry::in_memory());
        let dispatcher = Dispatcher::new(functions, tasks);

        let err = dispatcher.invoke("send-report").await.unwrap_err();
        assert!(matches!(err, DispatchError::TaskNotFound(_)));
    }

    #[tokio::test]
    async fn test_no_deployments_fails() {
        let (functions, tasks) = registries_with_task("send-report");
        let dispatcher = Dispatcher::new(functions, tasks);

        let err = dispatcher.invoke("send-report").await.unwrap_err();
        assert!(matches!(err, DispatchError::FunctionNotExists(_)));
    }

    #[tokio::test]
    async fn test_empty_deployment_list_fails_like_absent_entry() {
        // A registry file can legitimately carry a function whose replica
        // list has been emptied; it must fail the same way as no entry.
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("functions.json"),
            r#"{"functions": {"send-report": []}}"#,
        )
        .unwrap();
        let functions =
            Arc::new(FunctionRegistry::open(dir.path().join("functions.json")).unwrap());
        let tasks = Arc::new(TaskRegistry::at_path(dir.path().join("tasks.json")));
        tasks.upsert("send-report", Duration::from_secs(60)).unwrap();
        let dispatcher = Dispatcher::new(functions, tasks);

        let err = dispatcher.invoke("send-report").await.unwrap_err();
        assert!(matches!(err, DispatchError::FunctionNotExists(_)));
    }

    #[tokio::test]
    async fn test_single_deployment_always_selected() {
        let (functions, tasks) = registries_with_task("send-report");
        let url = spawn_replica("only").await;
        functions
            .upsert("send-report", "aliyun-1", &url, DeploymentOptions::default())
            .unwrap();
        let dispatcher = Dispatcher::new(functions, tasks);

        for _ in 0..5 {
            let resp = dispatcher.invoke("send-report").await.unwrap();
            assert_eq!(resp.text().await.unwrap(), "only");
        }
    }

    #[tokio::test]
    async fn test_selection_spreads_across_replicas() {
        let (functions, tasks) = registries_with_task("send-report");
        let url_a = spawn_replica("replica-a").await;
        let url_b = spawn_replica("replica-b").await;
        functions
            .upsert("send-report", "aliyun-1", &url_a, DeploymentOptions::default())
            .unwrap();
        functions
            .upsert("send-report", "tencent-1", &url_b, DeploymentOptions::default())
            .unwrap();
        let dispatcher = Dispatcher::new(functions, tasks);

        let mut seen = HashSet::new();
        for _ in 0..64 {
            let resp = dispatcher.invoke("send-report").await.unwrap();
            seen.insert(resp.text().await.unwrap());
            if seen.len() == 2 {
                break;
            }
        }
        assert_eq!(seen.len(), 2, "both replicas should be selected");
    }

    #[tokio::test]
    async fn test_transport_error_surfaces() {
        let (functions, tasks) = registries_with_task("send-report");
        // Nothing listens here.
        functions
            .upsert(
                "send-report",
                "aliyun-1",
                "http://127.0.0.1:1/",
                DeploymentOptions::default(),
            )
            .unwrap();
        let dispatcher = Dispatcher::new(functions, tasks);

        let err = dispatcher.invoke("send-report").await.unwrap_err();
        assert!(matches!(err, DispatchError::Request(_)));
    }
}
