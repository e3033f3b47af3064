//! Generation job orchestration.
//!
//! - [`GenerationWorker`] runs one request end to end.
//! - [`GenerationQueue`] is chosen once at startup: a durable Postgres queue
//!   drained by a single consumer when `QUEUE_DATABASE_URL` is set, otherwise
//!   an in-memory fallback that spawns one tracked task per submission.

pub mod config;
pub mod durable;
pub mod generator;
pub mod memory;
pub mod queue;

pub use config::QueueConfig;
pub use generator::GenerationWorker;
pub use queue::GenerationQueue;
