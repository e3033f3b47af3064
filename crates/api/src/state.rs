use std::sync::Arc;

use swipegen_worker::GenerationQueue;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything inside is behind `Arc` or already `Clone`.
#[derive(Clone)]
pub struct AppState {
    /// Content store connection pool.
    pub pool: swipegen_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Generation queue, durable or in-memory.
    pub queue: Arc<GenerationQueue>,
}
