//! Durable queue backed by the `generation_jobs` table.
//!
//! Producers insert `waiting` rows. A single [`GenerationConsumer`] task
//! polls every `poll_interval`, claims jobs with `SELECT FOR UPDATE SKIP
//! LOCKED` via [`GenerationJobRepo::claim_next`], and runs them one at a
//! time, so jobs from this process never overlap.
//!
//! A claim is a lease. While a job runs, its consumer refreshes
//! `heartbeat_at` every `stall_timeout / 4`; any consumer returns `active`
//! jobs whose lease lapsed past `stall_timeout` to `waiting`. Terminal writes
//! only apply to the claim that produced them (matched on `attempts`).

use std::future::Future;
use std::time::Duration;

use serde_json::Value;
use sqlx::PgPool;
use swipegen_core::error::GenerationError;
use swipegen_core::job::JobSnapshot;
use swipegen_core::request::GenerationRequest;
use swipegen_core::types::{DbId, JobId};
use swipegen_db::models::generation_job::GenerationJob;
use swipegen_db::models::status::QueueJobStatus;
use swipegen_db::repositories::GenerationJobRepo;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::QueueConfig;
use crate::generator::GenerationWorker;

/// Name of the queue generation jobs are submitted to.
pub const GENERATE_QUEUE: &str = "generate";

/// Tries at recording a job's terminal status before giving up.
const TERMINAL_WRITE_ATTEMPTS: u32 = 5;

/// Base delay between terminal write tries; grows linearly per try.
const TERMINAL_WRITE_BACKOFF: Duration = Duration::from_millis(500);

fn queue_error(e: impl std::fmt::Display) -> GenerationError {
    GenerationError::Queue(e.to_string())
}

/// Producer side of the durable queue plus the handle of its consumer task.
pub struct DurableQueue {
    pool: PgPool,
    cancel: CancellationToken,
    consumer: Mutex<Option<JoinHandle<()>>>,
}

impl DurableQueue {
    /// Spawn the consumer. Panics on a config that would break it.
    pub fn start(pool: PgPool, worker: GenerationWorker, config: &QueueConfig) -> Self {
        config.assert_valid();
        let consumer = GenerationConsumer::new(pool.clone(), worker, config);

        let cancel = CancellationToken::new();
        let handle = tokio::spawn({
            let cancel = cancel.clone();
            async move { consumer.run(cancel).await }
        });

        Self {
            pool,
            cancel,
            consumer: Mutex::new(Some(handle)),
        }
    }

    /// Insert a waiting job carrying the full request.
    pub async fn enqueue(&self, request: &GenerationRequest) -> Result<JobId, GenerationError> {
        let parameters = serde_json::to_value(request).map_err(queue_error)?;
        let job = GenerationJobRepo::submit(&self.pool, GENERATE_QUEUE, &parameters)
            .await
            .map_err(queue_error)?;

        tracing::debug!(job_id = job.id, "Job submitted to durable queue");
        Ok(job.id.to_string())
    }

    /// Look up a job. Ids that are not ours report `notfound`.
    pub async fn status(&self, job_id: &str) -> Result<JobSnapshot, GenerationError> {
        let Ok(id) = job_id.parse::<DbId>() else {
            return Ok(JobSnapshot::not_found());
        };

        let job = GenerationJobRepo::find_by_id(&self.pool, id)
            .await
            .map_err(queue_error)?;
        Ok(job
            .map(|job| job.snapshot())
            .unwrap_or_else(JobSnapshot::not_found))
    }

    /// Stop the consumer once its current job finishes.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        if let Some(handle) = self.consumer.lock().await.take() {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "Generation consumer task panicked");
            }
        }
    }
}

/// The single long-lived task draining the durable queue.
pub struct GenerationConsumer {
    pool: PgPool,
    worker: GenerationWorker,
    poll_interval: Duration,
    retain_finished: i64,
    stall_timeout: Duration,
    heartbeat_interval: Duration,
}

impl GenerationConsumer {
    pub fn new(pool: PgPool, worker: GenerationWorker, config: &QueueConfig) -> Self {
        Self {
            pool,
            worker,
            poll_interval: config.poll_interval,
            retain_finished: config.retain_finished,
            stall_timeout: config.stall_timeout,
            heartbeat_interval: config.heartbeat_interval(),
        }
    }

    /// Run the consumer loop until the cancellation token is triggered.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.poll_interval);
        tracing::info!(
            queue = GENERATE_QUEUE,
            poll_interval_ms = self.poll_interval.as_millis() as u64,
            stall_timeout_secs = self.stall_timeout.as_secs(),
            "Generation consumer started",
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Generation consumer shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    self.recover_stalled().await;
                    if let Err(e) = self.drain(&cancel).await {
                        tracing::error!(error = %e, "Consume cycle failed");
                    }
                }
            }
        }
    }

    /// Return jobs whose lease lapsed to the queue.
    async fn recover_stalled(&self) {
        let stalled =
            GenerationJobRepo::requeue_stalled(&self.pool, GENERATE_QUEUE, self.stall_timeout).await;
        match stalled {
            Ok(0) => {}
            Ok(requeued) => tracing::warn!(requeued, "Returned stalled jobs to the queue"),
            Err(e) => tracing::warn!(error = %e, "Failed to check for stalled jobs"),
        }
    }

    /// Claim and run waiting jobs until none are left or shutdown begins.
    async fn drain(&self, cancel: &CancellationToken) -> Result<(), sqlx::Error> {
        while !cancel.is_cancelled() {
            let Some(job) = GenerationJobRepo::claim_next(&self.pool, GENERATE_QUEUE).await? else {
                break;
            };
            tracing::info!(job_id = job.id, attempt = job.attempts, "Job claimed");
            self.process(job).await;
        }
        Ok(())
    }

    /// Run one claimed job and record its terminal status.
    async fn process(&self, job: GenerationJob) {
        let outcome = self.execute_with_heartbeat(&job).await;

        let (status, recorded) = match &outcome {
            Ok(result) => (
                QueueJobStatus::Completed,
                retry_write(job.id, TERMINAL_WRITE_ATTEMPTS, TERMINAL_WRITE_BACKOFF, || {
                    GenerationJobRepo::complete(&self.pool, job.id, job.attempts, result)
                })
                .await,
            ),
            Err(message) => {
                tracing::error!(job_id = job.id, error = %message, "Job failed");
                (
                    QueueJobStatus::Failed,
                    retry_write(job.id, TERMINAL_WRITE_ATTEMPTS, TERMINAL_WRITE_BACKOFF, || {
                        GenerationJobRepo::fail(&self.pool, job.id, job.attempts, message)
                    })
                    .await,
                )
            }
        };

        match recorded {
            Ok(true) => {
                tracing::info!(job_id = job.id, status = ?status, "Job finished");
                self.prune(status).await;
            }
            Ok(false) => tracing::warn!(
                job_id = job.id,
                attempt = job.attempts,
                "Job claim was lost before its result was recorded, result discarded",
            ),
            Err(e) => tracing::error!(
                job_id = job.id,
                error = %e,
                "Gave up recording job result, it will be requeued once its lease lapses",
            ),
        }
    }

    /// Run the job while refreshing its lease.
    async fn execute_with_heartbeat(&self, job: &GenerationJob) -> Result<Value, String> {
        let work = self.execute(job);
        tokio::pin!(work);

        let mut beat = tokio::time::interval(self.heartbeat_interval);
        // The first tick is immediate; claiming already set the lease.
        beat.tick().await;

        loop {
            tokio::select! {
                outcome = &mut work => return outcome,
                _ = beat.tick() => {
                    match GenerationJobRepo::heartbeat(&self.pool, job.id, job.attempts).await {
                        Ok(true) => {}
                        Ok(false) => tracing::warn!(job_id = job.id, "Job claim lost while running"),
                        Err(e) => tracing::warn!(job_id = job.id, error = %e, "Heartbeat failed"),
                    }
                }
            }
        }
    }

    /// Decode the parameters and run the worker in its own task, so a panic
    /// fails the job instead of the consumer.
    async fn execute(&self, job: &GenerationJob) -> Result<Value, String> {
        let request: GenerationRequest = serde_json::from_value(job.parameters.clone())
            .map_err(|e| format!("Invalid job parameters: {e}"))?;

        let worker = self.worker.clone();
        match tokio::spawn(async move { worker.run(&request).await }).await {
            Ok(Ok(output)) => serde_json::to_value(&output).map_err(|e| e.to_string()),
            Ok(Err(e)) => Err(e.to_string()),
            Err(e) => Err(format!("Worker panicked: {e}")),
        }
    }

    /// Keep only the newest `retain_finished` jobs with `status`. Failures
    /// are logged; the next terminal transition prunes again.
    async fn prune(&self, status: QueueJobStatus) {
        match GenerationJobRepo::prune_finished(
            &self.pool,
            GENERATE_QUEUE,
            status,
            self.retain_finished,
        )
        .await
        {
            Ok(0) => {}
            Ok(removed) => tracing::debug!(removed, status = ?status, "Pruned finished jobs"),
            Err(e) => tracing::warn!(error = %e, status = ?status, "Failed to prune finished jobs"),
        }
    }
}

/// Retry a status write with linear backoff, logging each failed try.
async fn retry_write<T, F, Fut>(
    job_id: DbId,
    attempts: u32,
    backoff: Duration,
    mut write: F,
) -> Result<T, sqlx::Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, sqlx::Error>>,
{
    let mut attempt = 1;
    loop {
        match write().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < attempts => {
                tracing::warn!(job_id, attempt, error = %e, "Job status write failed, retrying");
                tokio::time::sleep(backoff * attempt).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
