//! Handlers for generation jobs.
//!
//! Routes:
//! - `POST /api/generate`       enqueue a request, returns `202 {jobId}`
//! - `GET  /api/generate/{id}`  poll a job's status and result

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use swipegen_core::request::{validate_request, GenerationRequest};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /api/generate
///
/// Validates the request and hands it to the queue. Returns as soon as the
/// job is recorded; generation runs in the background.
pub async fn enqueue_generate(
    State(state): State<AppState>,
    payload: Result<Json<GenerationRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(request) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    validate_request(&request)?;

    let content_type = request.content_type;
    let count = request.count;
    let job = state.queue.enqueue(request).await?;
    tracing::info!(
        job_id = %job.job_id,
        content_type = %content_type,
        count,
        queue = state.queue.backend(),
        "Generation job enqueued",
    );

    Ok((StatusCode::ACCEPTED, Json(job)))
}

/// GET /api/generate/{id}
///
/// Unknown ids are not an error: they report `{"status": "notfound"}`.
pub async fn get_job_status(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let snapshot = state.queue.status(&job_id).await?;
    Ok(Json(snapshot))
}
