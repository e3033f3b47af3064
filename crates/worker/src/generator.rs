//! The generation loop for a single request.

use std::sync::Arc;

use swipegen_core::content::{Asset, ContentMetadata, ContentRecorder, NewBatch, NewContentItem};
use swipegen_core::error::GenerationError;
use swipegen_core::job::GenerationOutput;
use swipegen_core::mime::classify_mime;
use swipegen_core::models::plan_invocation;
use swipegen_core::output::{check_candidate, extract_candidates};
use swipegen_core::provider::GenerationProvider;
use swipegen_core::request::GenerationRequest;

/// Runs generation requests against a provider and records every asset.
///
/// Cheap to clone; both collaborators are shared.
#[derive(Clone)]
pub struct GenerationWorker {
    provider: Arc<dyn GenerationProvider>,
    recorder: Arc<dyn ContentRecorder>,
}

impl GenerationWorker {
    pub fn new(provider: Arc<dyn GenerationProvider>, recorder: Arc<dyn ContentRecorder>) -> Self {
        Self { provider, recorder }
    }

    /// Execute one request end to end.
    ///
    /// Units run strictly one after another. A provider or content store
    /// error aborts the remaining units and is returned; items persisted by
    /// earlier units stay persisted. Batch bookkeeping failures are logged
    /// and ignored.
    pub async fn run(&self, request: &GenerationRequest) -> Result<GenerationOutput, GenerationError> {
        let batch = NewBatch::start(&request.prompt, request.model_override(), request.count);
        if let Err(e) = self.recorder.record_batch(&batch).await {
            tracing::warn!(batch_id = %batch.id, error = %e, "Failed to record batch, continuing");
        }

        let units = request.unit_count();
        let invocation = plan_invocation(request);
        tracing::info!(
            batch_id = %batch.id,
            model = %invocation.model,
            content_type = %request.content_type,
            requested = request.count,
            units,
            "Generation started",
        );

        let mut outputs = Vec::new();
        for unit in 0..units {
            let raw = self
                .provider
                .run(&request.token, &invocation.model, &invocation.input)
                .await?;

            for candidate in extract_candidates(&raw) {
                if let Err(reason) = check_candidate(&candidate) {
                    tracing::warn!(
                        batch_id = %batch.id,
                        unit,
                        url = %candidate,
                        reason = reason.as_str(),
                        "Discarding invalid output URL",
                    );
                    continue;
                }

                let url = candidate.trim().to_string();
                let mime = classify_mime(request.content_type, &url);
                let item = NewContentItem {
                    content_type: request.content_type,
                    title: request.prompt.clone(),
                    description: None,
                    prompt: request.prompt.clone(),
                    model: invocation.model.clone(),
                    metadata: ContentMetadata {
                        model: invocation.model.clone(),
                        batch_id: batch.id.clone(),
                        prompt: request.prompt.clone(),
                        duration_seconds: request.duration_seconds,
                    },
                    assets: vec![Asset {
                        url: url.clone(),
                        mime: mime.to_string(),
                    }],
                };

                outputs.push(url);
                let content_id = self.recorder.create_content(&item).await?;
                tracing::debug!(batch_id = %batch.id, unit, content_id, mime, "Content item recorded");
            }
        }

        tracing::info!(batch_id = %batch.id, outputs = outputs.len(), "Generation finished");
        Ok(GenerationOutput {
            outputs,
            batch_id: batch.id,
        })
    }
}
