//! Prediction payloads returned by the Replicate API.

use serde::Deserialize;
use serde_json::Value;

/// Lifecycle of a prediction as reported by Replicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictionStatus {
    Starting,
    Processing,
    Succeeded,
    Failed,
    Canceled,
    Unknown,
}

impl PredictionStatus {
    pub fn parse(status: &str) -> Self {
        match status {
            "starting" => PredictionStatus::Starting,
            "processing" => PredictionStatus::Processing,
            "succeeded" => PredictionStatus::Succeeded,
            "failed" => PredictionStatus::Failed,
            "canceled" | "aborted" => PredictionStatus::Canceled,
            _ => PredictionStatus::Unknown,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            PredictionStatus::Succeeded | PredictionStatus::Failed | PredictionStatus::Canceled
        )
    }
}

/// A prediction resource (`POST /predictions`, `GET /predictions/{id}`).
#[derive(Debug, Clone, Deserialize)]
pub struct Prediction {
    pub id: String,
    pub status: String,
    /// Model output; shape depends on the model.
    #[serde(default)]
    pub output: Option<Value>,
    /// Failure reason, usually a string.
    #[serde(default)]
    pub error: Option<Value>,
}

impl Prediction {
    pub fn status(&self) -> PredictionStatus {
        PredictionStatus::parse(&self.status)
    }

    /// Human-readable failure reason, if Replicate reported one.
    pub fn error_message(&self) -> Option<String> {
        match self.error.as_ref()? {
            Value::Null => None,
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}
