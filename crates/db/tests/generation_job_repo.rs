//! Repository-level tests for the durable generation queue and the
//! content store tables.
//!
//! Each test gets a fresh database with the crate's migrations applied.

use std::time::Duration;

use serde_json::json;
use sqlx::PgPool;
use swipegen_core::content::{Asset, ContentMetadata, NewBatch, NewContentItem};
use swipegen_core::job::{GenerationOutput, JobSnapshot, JobState};
use swipegen_core::request::ContentType;
use swipegen_db::models::status::QueueJobStatus;
use swipegen_db::repositories::{BatchRepo, ContentRepo, GenerationJobRepo};

const QUEUE: &str = "generate";
const STALL: Duration = Duration::from_secs(60);

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn submit(pool: &PgPool, prompt: &str) -> i64 {
    GenerationJobRepo::submit(pool, QUEUE, &json!({ "prompt": prompt }))
        .await
        .unwrap()
        .id
}

/// Push a job's lease an hour into the past.
async fn expire_lease(pool: &PgPool, job_id: i64) {
    sqlx::query("UPDATE generation_jobs SET heartbeat_at = NOW() - INTERVAL '1 hour' WHERE id = $1")
        .bind(job_id)
        .execute(pool)
        .await
        .unwrap();
}

async fn status_of(pool: &PgPool, job_id: i64) -> Option<QueueJobStatus> {
    GenerationJobRepo::find_by_id(pool, job_id)
        .await
        .unwrap()
        .and_then(|job| QueueJobStatus::from_id(job.status_id))
}

/// Submit, claim and complete one job.
async fn finish_one(pool: &PgPool, prompt: &str) -> i64 {
    let id = submit(pool, prompt).await;
    let job = GenerationJobRepo::claim_next(pool, QUEUE).await.unwrap().unwrap();
    assert_eq!(job.id, id);
    assert!(GenerationJobRepo::complete(pool, id, job.attempts, &json!({})).await.unwrap());
    id
}

// ---------------------------------------------------------------------------
// Test: submit and claim
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn submitted_job_is_waiting(pool: PgPool) {
    let job = GenerationJobRepo::submit(&pool, QUEUE, &json!({ "prompt": "cat" }))
        .await
        .unwrap();

    assert_eq!(job.status_id, QueueJobStatus::Waiting.id());
    assert_eq!(job.attempts, 0);
    assert_eq!(job.snapshot(), JobSnapshot::pending(JobState::Waiting));
}

#[sqlx::test(migrations = "./migrations")]
async fn claim_takes_oldest_waiting_job(pool: PgPool) {
    let first = submit(&pool, "first").await;
    let second = submit(&pool, "second").await;

    let job = GenerationJobRepo::claim_next(&pool, QUEUE).await.unwrap().unwrap();
    assert_eq!(job.id, first);
    assert_eq!(job.status_id, QueueJobStatus::Active.id());
    assert_eq!(job.attempts, 1);
    assert!(job.claimed_at.is_some());
    assert!(job.heartbeat_at.is_some());

    let next = GenerationJobRepo::claim_next(&pool, QUEUE).await.unwrap().unwrap();
    assert_eq!(next.id, second);

    assert!(GenerationJobRepo::claim_next(&pool, QUEUE).await.unwrap().is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn claim_ignores_other_queues(pool: PgPool) {
    GenerationJobRepo::submit(&pool, "other", &json!({})).await.unwrap();
    assert!(GenerationJobRepo::claim_next(&pool, QUEUE).await.unwrap().is_none());
}

// ---------------------------------------------------------------------------
// Test: terminal writes
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn completed_job_reports_outputs(pool: PgPool) {
    let id = submit(&pool, "cat").await;
    let job = GenerationJobRepo::claim_next(&pool, QUEUE).await.unwrap().unwrap();

    let result = json!({ "outputs": ["https://cdn.test/0.png"], "batchId": "bat-1" });
    assert!(GenerationJobRepo::complete(&pool, id, job.attempts, &result).await.unwrap());

    let stored = GenerationJobRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert!(stored.completed_at.is_some());
    assert_eq!(
        stored.snapshot(),
        JobSnapshot::completed(GenerationOutput {
            outputs: vec!["https://cdn.test/0.png".into()],
            batch_id: "bat-1".into(),
        })
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn failed_job_reports_error(pool: PgPool) {
    let id = submit(&pool, "cat").await;
    let job = GenerationJobRepo::claim_next(&pool, QUEUE).await.unwrap().unwrap();

    assert!(GenerationJobRepo::fail(&pool, id, job.attempts, "Provider error: 422").await.unwrap());

    let stored = GenerationJobRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(stored.snapshot(), JobSnapshot::failed("Provider error: 422"));
}

#[sqlx::test(migrations = "./migrations")]
async fn write_from_superseded_claim_is_ignored(pool: PgPool) {
    let id = submit(&pool, "cat").await;
    let stale = GenerationJobRepo::claim_next(&pool, QUEUE).await.unwrap().unwrap();

    expire_lease(&pool, id).await;
    assert_eq!(GenerationJobRepo::requeue_stalled(&pool, QUEUE, STALL).await.unwrap(), 1);
    let fresh = GenerationJobRepo::claim_next(&pool, QUEUE).await.unwrap().unwrap();
    assert_eq!(fresh.attempts, stale.attempts + 1);

    // The first consumer finally finishes; its write must not land.
    assert!(!GenerationJobRepo::complete(&pool, id, stale.attempts, &json!({})).await.unwrap());
    assert!(!GenerationJobRepo::fail(&pool, id, stale.attempts, "late").await.unwrap());
    assert!(!GenerationJobRepo::heartbeat(&pool, id, stale.attempts).await.unwrap());
    assert_eq!(status_of(&pool, id).await, Some(QueueJobStatus::Active));

    assert!(GenerationJobRepo::heartbeat(&pool, id, fresh.attempts).await.unwrap());
    assert!(GenerationJobRepo::fail(&pool, id, fresh.attempts, "boom").await.unwrap());
    assert_eq!(status_of(&pool, id).await, Some(QueueJobStatus::Failed));
}

#[sqlx::test(migrations = "./migrations")]
async fn finished_job_cannot_be_finished_again(pool: PgPool) {
    let id = finish_one(&pool, "cat").await;
    assert!(!GenerationJobRepo::fail(&pool, id, 1, "late").await.unwrap());
    assert_eq!(status_of(&pool, id).await, Some(QueueJobStatus::Completed));
}

// ---------------------------------------------------------------------------
// Test: stall recovery
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn job_with_live_lease_is_not_requeued(pool: PgPool) {
    let id = submit(&pool, "cat").await;
    GenerationJobRepo::claim_next(&pool, QUEUE).await.unwrap().unwrap();

    assert_eq!(GenerationJobRepo::requeue_stalled(&pool, QUEUE, STALL).await.unwrap(), 0);
    assert_eq!(status_of(&pool, id).await, Some(QueueJobStatus::Active));
}

#[sqlx::test(migrations = "./migrations")]
async fn job_with_lapsed_lease_is_requeued(pool: PgPool) {
    let id = submit(&pool, "cat").await;
    GenerationJobRepo::claim_next(&pool, QUEUE).await.unwrap().unwrap();
    expire_lease(&pool, id).await;

    assert_eq!(GenerationJobRepo::requeue_stalled(&pool, QUEUE, STALL).await.unwrap(), 1);

    let stored = GenerationJobRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(stored.status_id, QueueJobStatus::Waiting.id());
    assert!(stored.claimed_at.is_none());
    assert!(stored.heartbeat_at.is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn requeue_leaves_waiting_and_finished_jobs_alone(pool: PgPool) {
    let done = finish_one(&pool, "done").await;
    let waiting = submit(&pool, "waiting").await;
    sqlx::query("UPDATE generation_jobs SET submitted_at = NOW() - INTERVAL '1 day'")
        .execute(&pool)
        .await
        .unwrap();

    assert_eq!(GenerationJobRepo::requeue_stalled(&pool, QUEUE, STALL).await.unwrap(), 0);
    assert_eq!(status_of(&pool, waiting).await, Some(QueueJobStatus::Waiting));
    assert_eq!(status_of(&pool, done).await, Some(QueueJobStatus::Completed));
}

// ---------------------------------------------------------------------------
// Test: retention
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn prune_keeps_newest_finished_jobs(pool: PgPool) {
    let mut completed = Vec::new();
    for n in 0..4 {
        completed.push(finish_one(&pool, &format!("job {n}")).await);
    }

    let failed = submit(&pool, "broken").await;
    let job = GenerationJobRepo::claim_next(&pool, QUEUE).await.unwrap().unwrap();
    GenerationJobRepo::fail(&pool, failed, job.attempts, "boom").await.unwrap();

    let removed = GenerationJobRepo::prune_finished(&pool, QUEUE, QueueJobStatus::Completed, 2)
        .await
        .unwrap();
    assert_eq!(removed, 2);

    // Oldest two completed rows go; the failed row is counted separately.
    assert_eq!(status_of(&pool, completed[0]).await, None);
    assert_eq!(status_of(&pool, completed[1]).await, None);
    assert_eq!(status_of(&pool, completed[2]).await, Some(QueueJobStatus::Completed));
    assert_eq!(status_of(&pool, completed[3]).await, Some(QueueJobStatus::Completed));
    assert_eq!(status_of(&pool, failed).await, Some(QueueJobStatus::Failed));
}

#[sqlx::test(migrations = "./migrations")]
async fn prune_with_zero_retention_removes_all_of_that_status(pool: PgPool) {
    let id = finish_one(&pool, "cat").await;
    let waiting = submit(&pool, "queued").await;

    let removed = GenerationJobRepo::prune_finished(&pool, QUEUE, QueueJobStatus::Completed, 0)
        .await
        .unwrap();

    assert_eq!(removed, 1);
    assert_eq!(status_of(&pool, id).await, None);
    assert_eq!(status_of(&pool, waiting).await, Some(QueueJobStatus::Waiting));
}

// ---------------------------------------------------------------------------
// Test: content store
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn batch_insert_is_idempotent(pool: PgPool) {
    let batch = NewBatch::start("cat", Some("owner/model"), 2);
    BatchRepo::create(&pool, &batch).await.unwrap();
    BatchRepo::create(&pool, &batch).await.unwrap();

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM batches WHERE id = $1")
        .bind(&batch.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn content_item_is_stored_with_ordered_assets(pool: PgPool) {
    let item = NewContentItem {
        content_type: ContentType::Image,
        title: "cat".into(),
        description: None,
        prompt: "cat".into(),
        model: "owner/model".into(),
        metadata: ContentMetadata {
            model: "owner/model".into(),
            batch_id: "bat-1".into(),
            prompt: "cat".into(),
            duration_seconds: None,
        },
        assets: vec![
            Asset { url: "https://cdn.test/a.png".into(), mime: "image/png".into() },
            Asset { url: "https://cdn.test/b.png".into(), mime: "image/png".into() },
        ],
    };

    let id = ContentRepo::create(&pool, &item).await.unwrap();

    let urls: Vec<String> =
        sqlx::query_scalar("SELECT url FROM content_assets WHERE content_id = $1 ORDER BY position")
            .bind(id)
            .fetch_all(&pool)
            .await
            .unwrap();
    assert_eq!(urls, vec!["https://cdn.test/a.png", "https://cdn.test/b.png"]);

    let batch_id: String =
        sqlx::query_scalar("SELECT metadata ->> 'batchId' FROM content_items WHERE id = $1")
            .bind(id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(batch_id, "bat-1");
}
