use axum::routing::{get, post};
use axum::Router;

use crate::handlers::generate;
use crate::state::AppState;

/// Generation job routes, merged into the `/api` nest.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/generate", post(generate::enqueue_generate))
        .route("/generate/{id}", get(generate::get_job_status))
}
