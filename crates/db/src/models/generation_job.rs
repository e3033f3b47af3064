//! Row model for the durable `generation_jobs` queue.

use serde::Serialize;
use sqlx::FromRow;
use swipegen_core::job::{GenerationOutput, JobSnapshot, JobState};
use swipegen_core::types::{DbId, Timestamp};

use super::status::{QueueJobStatus, StatusId};

/// Fallback failure text when a failed row carries no message.
const UNKNOWN_FAILURE: &str = "failed";

/// A row from the `generation_jobs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct GenerationJob {
    pub id: DbId,
    pub queue_name: String,
    pub status_id: StatusId,
    pub parameters: serde_json::Value,
    pub result: Option<serde_json::Value>,
    pub error_message: Option<String>,
    pub attempts: i32,
    pub submitted_at: Timestamp,
    pub claimed_at: Option<Timestamp>,
    /// Last lease refresh by the consumer running this job.
    pub heartbeat_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
}

impl GenerationJob {
    /// Translate the stored row into the snapshot polling clients see.
    ///
    /// Terminal rows carry their result or error; every other status is
    /// reported by name with no result.
    pub fn snapshot(&self) -> JobSnapshot {
        let Some(status) = QueueJobStatus::from_id(self.status_id) else {
            tracing::warn!(
                job_id = self.id,
                status_id = self.status_id,
                "Generation job has an unknown status id",
            );
            return JobSnapshot::pending(JobState::Waiting);
        };

        match status {
            QueueJobStatus::Completed => {
                let output = self
                    .result
                    .clone()
                    .and_then(|value| serde_json::from_value::<GenerationOutput>(value).ok());
                match output {
                    Some(output) => JobSnapshot::completed(output),
                    None => JobSnapshot::pending(JobState::Completed),
                }
            }
            QueueJobStatus::Failed => JobSnapshot::failed(
                self.error_message
                    .clone()
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| UNKNOWN_FAILURE.to_string()),
            ),
            other => JobSnapshot::pending(other.job_state()),
        }
    }
}
