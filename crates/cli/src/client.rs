//! API client for communicating with the prediction server

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use risk_lib::{FormData, PredictionResult};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Path of the prediction route, relative to the API base URL
const PREDICT_PATH: &str = "api/predict";

/// Why a form submission did not produce a prediction.
///
/// The `Display` text is what the form shows to the user.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    /// The predictor reported an error message in a successful response
    #[error("{0}")]
    Rejected(String),

    /// Any non-success status; the body is not read
    #[error("HTTP error! status: {0}")]
    Status(u16),

    #[error("Error making prediction")]
    Transport(#[source] reqwest::Error),

    #[error("Error making prediction")]
    Decode(#[source] serde_json::Error),
}

/// Anything that can turn a submitted form into a prediction
#[async_trait]
pub trait PredictionApi: Send + Sync {
    async fn predict(&self, form: &FormData) -> Result<PredictionResult, SubmitError>;
}

/// API client for the prediction server
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a new API client that waits as long as the server takes
    #[cfg(test)]
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, None)
    }

    /// Create a new API client with an optional per-request deadline
    pub fn with_timeout(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("Failed to create HTTP client")?;

        let base_url = Url::parse(base_url).context("Invalid API URL")?;

        Ok(Self { client, base_url })
    }

    /// Make a GET request, accepting non-success statuses whose body still
    /// decodes (health probes answer 503 with a JSON report)
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<(u16, T)> {
        let url = self.base_url.join(path).context("Invalid path")?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to send request")?;

        let status = response.status().as_u16();
        let body = response.json().await.context("Failed to parse response")?;
        Ok((status, body))
    }
}

/// Message carried by a truthy `error` field, if any
fn error_message(body: &Value) -> Option<String> {
    match body.get("error")? {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[async_trait]
impl PredictionApi for ApiClient {
    async fn predict(&self, form: &FormData) -> Result<PredictionResult, SubmitError> {
        let url = self
            .base_url
            .join(PREDICT_PATH)
            .map_err(|_| SubmitError::Rejected(format!("Invalid API URL: {}", self.base_url)))?;

        let response = self
            .client
            .post(url)
            .json(form)
            .send()
            .await
            .map_err(SubmitError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(SubmitError::Status(status.as_u16()));
        }

        let bytes = response.bytes().await.map_err(SubmitError::Transport)?;
        let body: Value = serde_json::from_slice(&bytes).map_err(SubmitError::Decode)?;
        if let Some(message) = error_message(&body) {
            return Err(SubmitError::Rejected(message));
        }

        serde_json::from_value(body).map_err(SubmitError::Decode)
    }
}
