//! Postgres-backed [`ContentRecorder`].

use async_trait::async_trait;
use swipegen_core::content::{ContentRecorder, NewBatch, NewContentItem};
use swipegen_core::error::GenerationError;
use swipegen_core::types::DbId;

use crate::repositories::{BatchRepo, ContentRepo};
use crate::DbPool;

/// Content store adapter writing batches and items to Postgres.
#[derive(Clone)]
pub struct PgContentRecorder {
    pool: DbPool,
}

impl PgContentRecorder {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContentRecorder for PgContentRecorder {
    async fn record_batch(&self, batch: &NewBatch) -> Result<(), GenerationError> {
        BatchRepo::create(&self.pool, batch)
            .await
            .map_err(|e| GenerationError::ContentStore(e.to_string()))
    }

    async fn create_content(&self, item: &NewContentItem) -> Result<DbId, GenerationError> {
        ContentRepo::create(&self.pool, item)
            .await
            .map_err(|e| GenerationError::ContentStore(e.to_string()))
    }
}
