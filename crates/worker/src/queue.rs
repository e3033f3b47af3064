use swipegen_core::error::GenerationError;
use swipegen_core::job::{EnqueuedJob, JobSnapshot};
use swipegen_core::request::GenerationRequest;

use crate::config::QueueConfig;
use crate::durable::DurableQueue;
use crate::generator::GenerationWorker;
use crate::memory::InMemoryQueue;

/// The queue backend selected at startup.
pub enum GenerationQueue {
    Durable(DurableQueue),
    InMemory(InMemoryQueue),
}

impl GenerationQueue {
    /// Connect to the durable queue when configured, otherwise fall back to
    /// in-memory execution.
    ///
    /// A configured but unreachable queue database is an error, not a
    /// silent fallback.
    pub async fn start(config: &QueueConfig, worker: GenerationWorker) -> Result<Self, GenerationError> {
        let Some(url) = config.database_url.as_deref() else {
            tracing::info!("QUEUE_DATABASE_URL not set, using in-memory queue");
            return Ok(Self::InMemory(InMemoryQueue::new(worker)));
        };

        let pool = swipegen_db::create_pool(url)
            .await
            .map_err(|e| GenerationError::Queue(format!("Failed to connect to queue database: {e}")))?;
        swipegen_db::run_migrations(&pool)
            .await
            .map_err(|e| GenerationError::Queue(format!("Failed to migrate queue database: {e}")))?;

        tracing::info!("Using durable queue");
        Ok(Self::Durable(DurableQueue::start(pool, worker, config)))
    }

    /// Short backend name for logs and the health endpoint.
    pub fn backend(&self) -> &'static str {
        match self {
            Self::Durable(_) => "durable",
            Self::InMemory(_) => "memory",
        }
    }

    pub async fn enqueue(&self, request: GenerationRequest) -> Result<EnqueuedJob, GenerationError> {
        let job_id = match self {
            Self::Durable(queue) => queue.enqueue(&request).await?,
            Self::InMemory(queue) => queue.enqueue(request).await,
        };
        Ok(EnqueuedJob { job_id })
    }

    pub async fn status(&self, job_id: &str) -> Result<JobSnapshot, GenerationError> {
        match self {
            Self::Durable(queue) => queue.status(job_id).await,
            Self::InMemory(queue) => Ok(queue.status(job_id).await),
        }
    }

    /// Let in-flight work finish and stop consuming.
    pub async fn shutdown(&self) {
        match self {
            Self::Durable(queue) => queue.shutdown().await,
            Self::InMemory(queue) => queue.shutdown().await,
        }
    }
}
