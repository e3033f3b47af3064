use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use swipegen_api::config::ServerConfig;
use swipegen_api::router::build_app_router;
use swipegen_api::state::AppState;
use swipegen_db::PgContentRecorder;
use swipegen_replicate::{ReplicateConfig, ReplicateProvider};
use swipegen_worker::{GenerationQueue, GenerationWorker, QueueConfig};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "swipegen_api=debug,swipegen_worker=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    let queue_config = QueueConfig::from_env();
    let replicate_config = ReplicateConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");
    if replicate_config.api_token.is_none() {
        tracing::warn!("REPLICATE_API_TOKEN not set, requests must carry their own token");
    }

    // --- Content store ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = swipegen_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    swipegen_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    swipegen_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Generation queue ---
    let worker = GenerationWorker::new(
        Arc::new(ReplicateProvider::new(&replicate_config)),
        Arc::new(PgContentRecorder::new(pool.clone())),
    );
    let queue = Arc::new(
        GenerationQueue::start(&queue_config, worker)
            .await
            .expect("Failed to start generation queue"),
    );
    tracing::info!(backend = queue.backend(), "Generation queue started");

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        queue: Arc::clone(&queue),
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, draining generation queue");
    queue.shutdown().await;
    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT (Ctrl-C) or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
