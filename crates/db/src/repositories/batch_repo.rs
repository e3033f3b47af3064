//! Repository for the `batches` table.

use sqlx::PgPool;
use swipegen_core::content::NewBatch;

pub struct BatchRepo;

impl BatchRepo {
    /// Insert a batch record. Re-recording an existing id is a no-op.
    pub async fn create(pool: &PgPool, batch: &NewBatch) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO batches (id, prompt, model, count, created_at) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (id) DO NOTHING",
        )
        .bind(&batch.id)
        .bind(&batch.prompt)
        .bind(&batch.model)
        .bind(batch.count)
        .bind(batch.created_at)
        .execute(pool)
        .await?;
        Ok(())
    }
}
