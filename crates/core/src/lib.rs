//! Domain types and pure logic for the swipegen generation orchestrator.
//!
//! Everything here is free of I/O: request and job types, the provider
//! output normalizer, MIME classification, the model-family registry, and
//! the two collaborator seams ([`content::ContentRecorder`] and
//! [`provider::GenerationProvider`]) that the worker is written against.

pub mod content;
pub mod error;
pub mod job;
pub mod mime;
pub mod models;
pub mod output;
pub mod provider;
pub mod request;
pub mod types;
