//! Replicate HTTP client and the [`GenerationProvider`] adapter built on it.
//!
//! [`GenerationProvider`]: swipegen_core::provider::GenerationProvider

pub mod api;
pub mod config;
pub mod prediction;
pub mod provider;

pub use api::{ReplicateApi, ReplicateError};
pub use config::ReplicateConfig;
pub use provider::ReplicateProvider;
