//! Repository for `content_items` and their `content_assets`.

use sqlx::PgPool;
use swipegen_core::content::NewContentItem;
use swipegen_core::types::DbId;

pub struct ContentRepo;

impl ContentRepo {
    /// Insert a content item and its assets in one transaction.
    ///
    /// Assets keep their list order in the `position` column.
    pub async fn create(pool: &PgPool, item: &NewContentItem) -> Result<DbId, sqlx::Error> {
        let metadata = serde_json::to_value(&item.metadata)
            .map_err(|e| sqlx::Error::Encode(Box::new(e)))?;

        let mut tx = pool.begin().await?;

        let content_id: DbId = sqlx::query_scalar(
            "INSERT INTO content_items \
                 (content_type, title, description, prompt, model, metadata) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING id",
        )
        .bind(item.content_type.as_str())
        .bind(&item.title)
        .bind(&item.description)
        .bind(&item.prompt)
        .bind(&item.model)
        .bind(&metadata)
        .fetch_one(&mut *tx)
        .await?;

        for (position, asset) in item.assets.iter().enumerate() {
            sqlx::query(
                "INSERT INTO content_assets (content_id, position, url, mime) \
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(content_id)
            .bind(position as i32)
            .bind(&asset.url)
            .bind(&asset.mime)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(content_id)
    }
}
