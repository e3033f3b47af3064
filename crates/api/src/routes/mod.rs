pub mod generate;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// ```text
/// POST /generate          enqueue_generate
/// GET  /generate/{id}     get_job_status
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().merge(generate::router())
}
