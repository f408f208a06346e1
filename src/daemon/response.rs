//! Control API response envelope.
//!
//! Errors and enveloped successes share one shape:
//! `{"error": bool, "msg": string, "data"?: any}`.

use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Response envelope for the control API.
#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope {
    pub error: bool,
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl Envelope {
    /// Success envelope carrying `data`.
    pub fn success(data: Value) -> Self {
        Self {
            error: false,
            msg: "success".to_string(),
            data: Some(data),
        }
    }

    /// Error envelope carrying only a message. Messages are surfaced to the
    /// operator; they carry no internal paths or backtraces.
    pub fn failure(msg: impl Into<String>) -> Self {
        Self {
            error: true,
            msg: msg.into(),
            data: None,
        }
    }
}

/// Shorthand for the handler error arm.
pub(crate) fn error_response(
    status: StatusCode,
    msg: impl Into<String>,
) -> (StatusCode, Json<Envelope>) {
    (status, Json(Envelope::failure(msg)))
}
