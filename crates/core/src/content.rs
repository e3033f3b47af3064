//! Content store records and the [`ContentRecorder`] seam.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::GenerationError;
use crate::request::ContentType;
use crate::types::{DbId, Timestamp};

/// Prefix of every generated batch id.
pub const BATCH_ID_PREFIX: &str = "bat-";

/// A record of one request's intent, written before the unit loop starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBatch {
    pub id: String,
    pub prompt: String,
    pub model: Option<String>,
    pub count: i64,
    pub created_at: Timestamp,
}

impl NewBatch {
    /// Start a batch for a request with a time-based, human-readable id.
    ///
    /// Ids only group items for display; two batches created in the same
    /// millisecond share one.
    pub fn start(prompt: &str, model: Option<&str>, count: i64) -> Self {
        let created_at = chrono::Utc::now();
        Self {
            id: format!("{BATCH_ID_PREFIX}{}", created_at.timestamp_millis()),
            prompt: prompt.to_string(),
            model: model.map(str::to_string),
            count,
            created_at,
        }
    }
}

/// One generated file attached to a content item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub url: String,
    pub mime: String,
}

/// Traceability metadata linking an item back to its batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentMetadata {
    pub model: String,
    pub batch_id: String,
    pub prompt: String,
    pub duration_seconds: Option<u32>,
}

/// A content item to persist, one per produced asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewContentItem {
    #[serde(rename = "type")]
    pub content_type: ContentType,
    pub title: String,
    pub description: Option<String>,
    pub prompt: String,
    pub model: String,
    pub metadata: ContentMetadata,
    pub assets: Vec<Asset>,
}

/// Adapter to the external content store.
#[async_trait]
pub trait ContentRecorder: Send + Sync {
    /// Persist the batch record. Callers treat failures as best-effort.
    async fn record_batch(&self, batch: &NewBatch) -> Result<(), GenerationError>;

    /// Persist one content item and return its id.
    async fn create_content(&self, item: &NewContentItem) -> Result<DbId, GenerationError>;
}
