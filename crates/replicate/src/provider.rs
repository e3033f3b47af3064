use async_trait::async_trait;
use serde_json::Value;
use swipegen_core::error::GenerationError;
use swipegen_core::provider::GenerationProvider;

use crate::api::{ReplicateApi, ReplicateError};
use crate::config::ReplicateConfig;

/// [`GenerationProvider`] backed by the Replicate predictions API.
///
/// Each call authenticates with the request's own token, falling back to the
/// configured `REPLICATE_API_TOKEN` when the request carries none.
pub struct ReplicateProvider {
    api: ReplicateApi,
    default_token: Option<String>,
}

impl ReplicateProvider {
    pub fn new(config: &ReplicateConfig) -> Self {
        Self {
            api: ReplicateApi::new(config),
            default_token: config.api_token.clone(),
        }
    }

    fn resolve_token<'a>(&'a self, token: &'a str) -> Result<&'a str, ReplicateError> {
        let token = token.trim();
        if !token.is_empty() {
            return Ok(token);
        }
        self.default_token
            .as_deref()
            .ok_or(ReplicateError::MissingToken)
    }
}

#[async_trait]
impl GenerationProvider for ReplicateProvider {
    async fn run(&self, token: &str, model: &str, input: &Value) -> Result<Value, GenerationError> {
        let token = self
            .resolve_token(token)
            .map_err(|e| GenerationError::Provider(e.to_string()))?;

        self.api
            .run(token, model, input)
            .await
            .map_err(|e| GenerationError::Provider(e.to_string()))
    }
}
