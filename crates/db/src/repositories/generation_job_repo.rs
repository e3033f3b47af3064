//! Repository for the durable `generation_jobs` queue.
//!
//! Jobs move `waiting -> active -> completed | failed`. Claiming uses
//! `SELECT FOR UPDATE SKIP LOCKED` so concurrent consumers never take the
//! same row.

use std::time::Duration;

use sqlx::PgPool;
use swipegen_core::types::DbId;

use crate::models::generation_job::GenerationJob;
use crate::models::status::QueueJobStatus;

/// Column list for `generation_jobs` queries.
const COLUMNS: &str = "\
    id, queue_name, status_id, parameters, result, error_message, attempts, \
    submitted_at, claimed_at, heartbeat_at, completed_at";

pub struct GenerationJobRepo;

impl GenerationJobRepo {
    /// Enqueue a new waiting job. Returns immediately with the job row.
    pub async fn submit(
        pool: &PgPool,
        queue_name: &str,
        parameters: &serde_json::Value,
    ) -> Result<GenerationJob, sqlx::Error> {
        let query = format!(
            "INSERT INTO generation_jobs (queue_name, status_id, parameters) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, GenerationJob>(&query)
            .bind(queue_name)
            .bind(QueueJobStatus::Waiting.id())
            .bind(parameters)
            .fetch_one(pool)
            .await
    }

    /// Atomically claim the oldest waiting job on a queue and mark it active.
    pub async fn claim_next(
        pool: &PgPool,
        queue_name: &str,
    ) -> Result<Option<GenerationJob>, sqlx::Error> {
        let query = format!(
            "UPDATE generation_jobs \
             SET status_id = $2, claimed_at = NOW(), heartbeat_at = NOW(), attempts = attempts + 1 \
             WHERE id = ( \
                 SELECT id FROM generation_jobs \
                 WHERE queue_name = $1 AND status_id = $3 \
                 ORDER BY submitted_at ASC, id ASC \
                 LIMIT 1 \
                 FOR UPDATE SKIP LOCKED \
             ) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, GenerationJob>(&query)
            .bind(queue_name)
            .bind(QueueJobStatus::Active.id())
            .bind(QueueJobStatus::Waiting.id())
            .fetch_optional(pool)
            .await
    }

    /// Mark a claimed job completed with its result payload.
    ///
    /// `attempt` is the `attempts` value returned by [`Self::claim_next`].
    /// Returns `false` when the row is no longer that claim (it was requeued
    /// and claimed again, or already finished), in which case nothing changes.
    pub async fn complete(
        pool: &PgPool,
        job_id: DbId,
        attempt: i32,
        result: &serde_json::Value,
    ) -> Result<bool, sqlx::Error> {
        let done = sqlx::query(
            "UPDATE generation_jobs \
             SET status_id = $2, result = $3, completed_at = NOW() \
             WHERE id = $1 AND status_id = $4 AND attempts = $5",
        )
        .bind(job_id)
        .bind(QueueJobStatus::Completed.id())
        .bind(result)
        .bind(QueueJobStatus::Active.id())
        .bind(attempt)
        .execute(pool)
        .await?;
        Ok(done.rows_affected() == 1)
    }

    /// Mark a claimed job failed with a human-readable message. No retry is
    /// scheduled. Same claim check as [`Self::complete`].
    pub async fn fail(
        pool: &PgPool,
        job_id: DbId,
        attempt: i32,
        error: &str,
    ) -> Result<bool, sqlx::Error> {
        let done = sqlx::query(
            "UPDATE generation_jobs \
             SET status_id = $2, error_message = $3, completed_at = NOW() \
             WHERE id = $1 AND status_id = $4 AND attempts = $5",
        )
        .bind(job_id)
        .bind(QueueJobStatus::Failed.id())
        .bind(error)
        .bind(QueueJobStatus::Active.id())
        .bind(attempt)
        .execute(pool)
        .await?;
        Ok(done.rows_affected() == 1)
    }

    /// Refresh the lease on a claimed job. Returns `false` once the claim is
    /// no longer held.
    pub async fn heartbeat(pool: &PgPool, job_id: DbId, attempt: i32) -> Result<bool, sqlx::Error> {
        let done = sqlx::query(
            "UPDATE generation_jobs \
             SET heartbeat_at = NOW() \
             WHERE id = $1 AND status_id = $2 AND attempts = $3",
        )
        .bind(job_id)
        .bind(QueueJobStatus::Active.id())
        .bind(attempt)
        .execute(pool)
        .await?;
        Ok(done.rows_affected() == 1)
    }

    /// Find a job by its ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<GenerationJob>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM generation_jobs WHERE id = $1");
        sqlx::query_as::<_, GenerationJob>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Return `active` jobs whose lease lapsed more than `stale_after` ago to
    /// `waiting`.
    ///
    /// Live consumers refresh their lease well inside `stale_after`, so only
    /// jobs abandoned by a dead consumer are requeued.
    pub async fn requeue_stalled(
        pool: &PgPool,
        queue_name: &str,
        stale_after: Duration,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE generation_jobs \
             SET status_id = $2, claimed_at = NULL, heartbeat_at = NULL \
             WHERE queue_name = $1 AND status_id = $3 \
               AND COALESCE(heartbeat_at, claimed_at, submitted_at) \
                   < NOW() - ($4 * INTERVAL '1 second')",
        )
        .bind(queue_name)
        .bind(QueueJobStatus::Waiting.id())
        .bind(QueueJobStatus::Active.id())
        .bind(stale_after.as_secs_f64())
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Delete all but the newest `keep` finished jobs with `status` on a queue.
    pub async fn prune_finished(
        pool: &PgPool,
        queue_name: &str,
        status: QueueJobStatus,
        keep: i64,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM generation_jobs \
             WHERE id IN ( \
                 SELECT id FROM generation_jobs \
                 WHERE queue_name = $1 AND status_id = $2 \
                 ORDER BY completed_at DESC, id DESC \
                 OFFSET $3 \
             )",
        )
        .bind(queue_name)
        .bind(status.id())
        .bind(keep)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
