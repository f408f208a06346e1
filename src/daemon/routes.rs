//! Control API Routes
//!
//! Loopback endpoints managing the running daemon:
//! - `POST /task/run?functionName=` — invoke one replica now
//! - `POST /task/enable?functionName=` — add a schedule entry
//! - `POST /task/disable?functionName=` — remove the entry, persist disabled
//! - `POST /reload` — reload both registries from disk
//! - `POST /stop` — graceful shutdown

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;

use super::response::{error_response, Envelope};
use super::server::ApiState;

#[derive(Debug, Deserialize)]
pub(crate) struct FunctionQuery {
    #[serde(rename = "functionName")]
    function_name: String,
}

/// Build the control API router.
pub(crate) fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/task/run", post(run_task_handler))
        .route("/task/enable", post(enable_task_handler))
        .route("/task/disable", post(disable_task_handler))
        .route("/reload", post(reload_handler))
        .route("/stop", post(stop_handler))
        .with_state(state)
}

/// Dispatch one invocation synchronously and return the remote response body
/// verbatim, as a JSON string.
///
/// Errors come back as a bare JSON string too, not the envelope: this
/// endpoint's payload is always a JSON-encoded string, 200 or 500.
async fn run_task_handler(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<FunctionQuery>,
) -> (StatusCode, Json<String>) {
    let response = match state.dispatcher.invoke(&query.function_name).await {
        Ok(response) => response,
        Err(err) => return (StatusCode::INTERNAL_SERVER_ERROR, Json(err.to_string())),
    };

    match response.text().await {
        Ok(body) => (StatusCode::OK, Json(body)),
        Err(err) => (StatusCode::INTERNAL_SERVER_ERROR, Json(err.to_string())),
    }
}

/// Add a schedule entry for an existing task, using its stored period.
///
/// The on-disk enabled flag is deliberately left untouched: only disable
/// persists. A daemon restart reschedules tasks from the file, so a task
/// enabled here but marked disabled on disk stays unscheduled after restart.
async fn enable_task_handler(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<FunctionQuery>,
) -> Result<StatusCode, (StatusCode, Json<Envelope>)> {
    let task = state.tasks.get(&query.function_name).map_err(|e| {
        let status = StatusCode::from_u16(e.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        error_response(status, e.to_string())
    })?;

    state
        .scheduler
        .add_task(&task.function_name, task.period)
        .map_err(|e| error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok(StatusCode::NO_CONTENT)
}

/// Remove the schedule entry for a task and persist `enabled=false`.
///
/// No entry means nothing to do; still 204. The flag is persisted before the
/// entry is removed so a failed write changes neither schedule nor file.
async fn disable_task_handler(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<FunctionQuery>,
) -> Result<StatusCode, (StatusCode, Json<Envelope>)> {
    if state.scheduler.is_scheduled(&query.function_name) {
        state
            .tasks
            .set_enabled(&query.function_name, false)
            .map_err(|e| error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
        state.scheduler.remove_task(&query.function_name);
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Reload both registries from disk.
///
/// Schedule entries are NOT recomputed: a task added to the file externally
/// stays unscheduled until the daemon restarts or the task is enabled.
async fn reload_handler(
    State(state): State<Arc<ApiState>>,
) -> Result<StatusCode, (StatusCode, Json<Envelope>)> {
    state
        .functions
        .load()
        .map_err(|e| error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    state
        .tasks
        .load()
        .map_err(|e| error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    tracing::info!("registries reloaded");
    Ok(StatusCode::NO_CONTENT)
}

/// Stop accepting connections and let in-flight handlers finish.
async fn stop_handler(State(state): State<Arc<ApiState>>) -> StatusCode {
    tracing::info!("shutdown requested");
    state.shutdown.notify_one();
    StatusCode::NO_CONTENT
}
