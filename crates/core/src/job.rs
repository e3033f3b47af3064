//! Job status and result types shared by both queue backends.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::JobId;

/// Lifecycle state of a generation job as reported to polling clients.
///
/// `Waiting` only ever comes from the durable queue (accepted, not yet
/// claimed by the consumer). In-memory jobs start at `Active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Waiting,
    Active,
    Completed,
    Failed,
    NotFound,
}

impl JobState {
    pub fn as_str(self) -> &'static str {
        match self {
            JobState::Waiting => "waiting",
            JobState::Active => "active",
            JobState::Completed => "completed",
            JobState::Failed => "failed",
            JobState::NotFound => "notfound",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed)
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a successful job produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationOutput {
    /// Every accepted asset URL, in generation order.
    pub outputs: Vec<String>,
    pub batch_id: String,
}

/// Terminal payload of a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JobResult {
    Completed(GenerationOutput),
    Failed { error: String },
}

/// Point-in-time view of a job, the body of `getJobStatus`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSnapshot {
    pub status: JobState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<JobResult>,
}

impl JobSnapshot {
    pub fn pending(status: JobState) -> Self {
        Self {
            status,
            result: None,
        }
    }

    pub fn not_found() -> Self {
        Self::pending(JobState::NotFound)
    }

    pub fn completed(output: GenerationOutput) -> Self {
        Self {
            status: JobState::Completed,
            result: Some(JobResult::Completed(output)),
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            status: JobState::Failed,
            result: Some(JobResult::Failed {
                error: error.into(),
            }),
        }
    }
}

/// Response body of `enqueueGenerate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnqueuedJob {
    pub job_id: JobId,
}
