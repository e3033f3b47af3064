//! The [`GenerationProvider`] seam to the external generative-content service.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::GenerationError;

/// Runs one model invocation and returns its raw, unnormalized output.
///
/// The shape of the returned value is model-dependent; feed it to
/// [`crate::output::extract_candidates`].
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    async fn run(&self, token: &str, model: &str, input: &Value) -> Result<Value, GenerationError>;
}
