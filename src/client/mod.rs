//! # Control API Client
//!
//! Thin loopback client used by the CLI to talk to a running daemon.

use thiserror::Error;

/// Result type for control API calls
pub type ClientResult<T> = Result<T, ClientError>;

/// Control API client errors
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("unexpected status code {status}: {body}")]
    UnexpectedStatus {
        status: reqwest::StatusCode,
        body: String,
    },
}

/// Client for the daemon's loopback control API.
#[derive(Debug, Clone)]
pub struct ControlClient {
    base: String,
    client: reqwest::Client,
}

impl ControlClient {
    /// Client for a daemon listening on the given loopback port.
    pub fn new(port: u16) -> Self {
        Self::with_base(format!("http://127.0.0.1:{port}"))
    }

    /// Client for an explicit base URL (tests bind to ephemeral ports).
    pub fn with_base(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            client: reqwest::Client::new(),
        }
    }

    /// `POST /task/run`; returns the remote function's response body.
    pub async fn run_task(&self, function_name: &str) -> ClientResult<String> {
        let response = self
            .client
            .post(format!(
                "{}/task/run?functionName={function_name}",
                self.base
            ))
            .send()
            .await?;
        let response = expect_status(response, reqwest::StatusCode::OK).await?;
        Ok(response.json().await?)
    }

    /// `POST /task/enable`
    pub async fn enable_task(&self, function_name: &str) -> ClientResult<()> {
        self.post_no_content(&format!("/task/enable?functionName={function_name}"))
            .await
    }

    /// `POST /task/disable`
    pub async fn disable_task(&self, function_name: &str) -> ClientResult<()> {
        self.post_no_content(&format!("/task/disable?functionName={function_name}"))
            .await
    }

    /// `POST /reload`
    pub async fn reload(&self) -> ClientResult<()> {
        self.post_no_content("/reload").await
    }

    /// `POST /stop`
    pub async fn stop(&self) -> ClientResult<()> {
        self.post_no_content("/stop").await
    }

    async fn post_no_content(&self, path: &str) -> ClientResult<()> {
        let response = self
            .client
            .post(format!("{}{path}", self.base))
            .send()
            .await?;
        expect_status(response, reqwest::StatusCode::NO_CONTENT).await?;
        Ok(())
    }
}

async fn expect_status(
    response: reqwest::Response,
    expected: reqwest::StatusCode,
) -> ClientResult<reqwest::Response> {
    let status = response.status();
    if status != expected {
        let body = response.text().await.unwrap_or_default();
        return Err(ClientError::UnexpectedStatus { status, body });
    }
    Ok(response)
}
