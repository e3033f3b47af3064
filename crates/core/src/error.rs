#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),
}

/// Failures raised while a generation job is running.
///
/// The `Display` text of these variants is what a polling client sees as
/// `result.error` on a failed job.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// The external provider rejected or failed the invocation.
    #[error("Provider error: {0}")]
    Provider(String),

    /// The content store could not persist a batch or an item.
    #[error("Content store error: {0}")]
    ContentStore(String),

    /// The durable queue could not accept or report a job.
    #[error("Queue error: {0}")]
    Queue(String),
}
