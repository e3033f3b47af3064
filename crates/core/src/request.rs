//! The generation request accepted by `enqueue` and the content type enum.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Hard ceiling on provider invocations per request.
pub const MAX_UNITS_PER_REQUEST: i64 = 20;

/// Unit count used when a request omits `count`.
pub const DEFAULT_UNIT_COUNT: i64 = 1;

/// Maximum prompt length accepted at submission.
const MAX_PROMPT_LEN: usize = 4000;

/// Kind of asset a request asks the provider to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    #[default]
    Image,
    Video,
    Audio,
}

impl ContentType {
    pub fn as_str(self) -> &'static str {
        match self {
            ContentType::Image => "image",
            ContentType::Video => "video",
            ContentType::Audio => "audio",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A client's request to generate `count` assets from one prompt.
///
/// Field aliases accept both the snake_case names the web client sends
/// (`duration_seconds`, `replicate_token`) and their camelCase forms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub prompt: String,

    #[serde(default = "default_count")]
    pub count: i64,

    #[serde(rename = "type", default)]
    pub content_type: ContentType,

    /// Provider model id (`owner/name` or `owner/name:version`). When absent
    /// or blank a per-type default is used.
    #[serde(default)]
    pub model: Option<String>,

    /// Provider credential.
    #[serde(default, alias = "replicate_token")]
    pub token: String,

    #[serde(default, alias = "durationSeconds")]
    pub duration_seconds: Option<u32>,
}

fn default_count() -> i64 {
    DEFAULT_UNIT_COUNT
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, content_type: ContentType, count: i64) -> Self {
        Self {
            prompt: prompt.into(),
            count,
            content_type,
            model: None,
            token: String::new(),
            duration_seconds: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = token.into();
        self
    }

    pub fn with_duration(mut self, seconds: u32) -> Self {
        self.duration_seconds = Some(seconds);
        self
    }

    /// Number of units the worker will run: `count` clamped to
    /// `0..=MAX_UNITS_PER_REQUEST`.
    pub fn unit_count(&self) -> usize {
        self.count.clamp(0, MAX_UNITS_PER_REQUEST) as usize
    }

    /// The caller-chosen model, if any. Blank strings count as absent.
    pub fn model_override(&self) -> Option<&str> {
        self.model
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
    }
}

/// Validate a request before it is accepted onto a queue.
///
/// Rules:
/// - `prompt` must contain non-whitespace text.
/// - `prompt` must not exceed `MAX_PROMPT_LEN` characters.
///
/// `count` is deliberately not rejected; the worker clamps it.
pub fn validate_request(request: &GenerationRequest) -> Result<(), CoreError> {
    if request.prompt.trim().is_empty() {
        return Err(CoreError::Validation("prompt must not be empty".to_string()));
    }
    if request.prompt.chars().count() > MAX_PROMPT_LEN {
        return Err(CoreError::Validation(format!(
            "prompt must not exceed {MAX_PROMPT_LEN} characters"
        )));
    }
    Ok(())
}
