//! In-memory queue used when no durable queue database is configured.
//!
//! Every submission gets its own tracked task, so jobs run concurrently with
//! each other. Job records live only as long as the process.

use std::collections::HashMap;
use std::sync::Arc;

use swipegen_core::job::{JobSnapshot, JobState};
use swipegen_core::request::GenerationRequest;
use swipegen_core::types::JobId;
use tokio::sync::RwLock;
use tokio_util::task::TaskTracker;

use crate::generator::GenerationWorker;

/// Job id to last known status and result.
#[derive(Default)]
pub struct InMemoryJobStore {
    jobs: RwLock<HashMap<JobId, JobSnapshot>>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Status of `job_id`, or `notfound` when it was never recorded.
    pub async fn get(&self, job_id: &str) -> JobSnapshot {
        self.jobs
            .read()
            .await
            .get(job_id)
            .cloned()
            .unwrap_or_else(JobSnapshot::not_found)
    }

    /// Replace the record for `job_id`.
    pub async fn set(&self, job_id: &str, snapshot: JobSnapshot) {
        self.jobs.write().await.insert(job_id.to_string(), snapshot);
    }

    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.jobs.read().await.is_empty()
    }
}

/// Fallback queue: spawns one worker task per submission.
pub struct InMemoryQueue {
    worker: GenerationWorker,
    jobs: Arc<InMemoryJobStore>,
    tracker: TaskTracker,
}

impl InMemoryQueue {
    pub fn new(worker: GenerationWorker) -> Self {
        Self {
            worker,
            jobs: Arc::new(InMemoryJobStore::new()),
            tracker: TaskTracker::new(),
        }
    }

    /// Record the job as `active` and start it in the background.
    ///
    /// Returns once the job is recorded; the work itself runs detached.
    pub async fn enqueue(&self, request: GenerationRequest) -> JobId {
        let job_id = uuid::Uuid::new_v4().to_string();
        self.jobs
            .set(&job_id, JobSnapshot::pending(JobState::Active))
            .await;

        let worker = self.worker.clone();
        let jobs = Arc::clone(&self.jobs);
        let id = job_id.clone();
        self.tracker.spawn(async move {
            // Run in a nested task so a panic still records `failed`.
            let run = tokio::spawn(async move { worker.run(&request).await });
            let snapshot = match run.await {
                Ok(Ok(output)) => {
                    tracing::info!(job_id = %id, outputs = output.outputs.len(), "Job completed");
                    JobSnapshot::completed(output)
                }
                Ok(Err(e)) => {
                    tracing::error!(job_id = %id, error = %e, "Job failed");
                    JobSnapshot::failed(e.to_string())
                }
                Err(e) => {
                    tracing::error!(job_id = %id, error = %e, "Job worker panicked");
                    JobSnapshot::failed(format!("Worker panicked: {e}"))
                }
            };
            jobs.set(&id, snapshot).await;
        });

        tracing::debug!(job_id = %job_id, "Job accepted by in-memory queue");
        job_id
    }

    pub async fn status(&self, job_id: &str) -> JobSnapshot {
        self.jobs.get(job_id).await
    }

    /// Number of jobs still running.
    pub fn outstanding(&self) -> usize {
        self.tracker.len()
    }

    /// Stop accepting work and wait for running jobs to finish.
    pub async fn shutdown(&self) {
        self.tracker.close();
        self.tracker.wait().await;
    }
}
