//! REST client for the Replicate predictions API.
//!
//! Wraps prediction creation and status polling using [`reqwest`]. A model
//! is addressed either as `owner/name` (official model endpoint) or as
//! `owner/name:version` (version-pinned prediction).

use std::time::Duration;

use serde_json::{json, Value};

use crate::config::ReplicateConfig;
use crate::prediction::{Prediction, PredictionStatus};

/// HTTP client for the Replicate API.
pub struct ReplicateApi {
    client: reqwest::Client,
    api_base: String,
    poll_interval: Duration,
}

/// Errors from the Replicate REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum ReplicateError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Replicate returned a non-2xx status code.
    #[error("Replicate API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The model id is neither `owner/name` nor `owner/name:version`.
    #[error("Invalid model reference '{0}'")]
    InvalidModel(String),

    /// No token on the request and none configured.
    #[error("No Replicate API token provided")]
    MissingToken,

    /// The prediction finished without succeeding.
    #[error("Prediction {id} {status}: {message}")]
    PredictionFailed {
        id: String,
        status: String,
        message: String,
    },
}

/// How a model id addresses the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelRef<'a> {
    /// `owner/name`, run via the model's predictions endpoint.
    Official { owner: &'a str, name: &'a str },
    /// `owner/name:version`, run via `POST /predictions` with a version id.
    Version { version: &'a str },
}

impl<'a> ModelRef<'a> {
    pub fn parse(model: &'a str) -> Result<Self, ReplicateError> {
        let invalid = || ReplicateError::InvalidModel(model.to_string());

        if let Some((_, version)) = model.split_once(':') {
            if version.is_empty() {
                return Err(invalid());
            }
            return Ok(ModelRef::Version { version });
        }

        match model.split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
                Ok(ModelRef::Official { owner, name })
            }
            _ => Err(invalid()),
        }
    }
}

impl ReplicateApi {
    pub fn new(config: &ReplicateConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    /// Create an API client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, config: &ReplicateConfig) -> Self {
        Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            poll_interval: config.poll_interval,
        }
    }

    /// Create a prediction.
    ///
    /// Sends `Prefer: wait` so fast models usually come back already
    /// finished.
    pub async fn create_prediction(
        &self,
        token: &str,
        model: &str,
        input: &Value,
    ) -> Result<Prediction, ReplicateError> {
        let (url, body) = match ModelRef::parse(model)? {
            ModelRef::Official { owner, name } => (
                format!("{}/models/{owner}/{name}/predictions", self.api_base),
                json!({ "input": input }),
            ),
            ModelRef::Version { version } => (
                format!("{}/predictions", self.api_base),
                json!({ "version": version, "input": input }),
            ),
        };

        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .header("Prefer", "wait")
            .json(&body)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Fetch the current state of a prediction.
    pub async fn get_prediction(
        &self,
        token: &str,
        prediction_id: &str,
    ) -> Result<Prediction, ReplicateError> {
        let response = self
            .client
            .get(format!("{}/predictions/{prediction_id}", self.api_base))
            .bearer_auth(token)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Run a model to completion and return its raw output.
    ///
    /// Polls every `poll_interval` until the prediction reaches a terminal
    /// status. There is no overall deadline.
    pub async fn run(
        &self,
        token: &str,
        model: &str,
        input: &Value,
    ) -> Result<Value, ReplicateError> {
        let mut prediction = self.create_prediction(token, model, input).await?;
        tracing::debug!(
            prediction_id = %prediction.id,
            model,
            status = %prediction.status,
            "Prediction created",
        );

        while !prediction.status().is_terminal() {
            tokio::time::sleep(self.poll_interval).await;
            prediction = self.get_prediction(token, &prediction.id).await?;
        }

        match prediction.status() {
            PredictionStatus::Succeeded => Ok(prediction.output.unwrap_or(Value::Null)),
            _ => Err(ReplicateError::PredictionFailed {
                message: prediction
                    .error_message()
                    .unwrap_or_else(|| "no error reported".to_string()),
                id: prediction.id,
                status: prediction.status,
            }),
        }
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code, or return an
    /// [`ReplicateError::ApiError`] with the status and body text.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, ReplicateError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ReplicateError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ReplicateError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}
