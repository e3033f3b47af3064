//! Repository layer: one unit struct per table family.

pub mod batch_repo;
pub mod content_repo;
pub mod generation_job_repo;

pub use batch_repo::BatchRepo;
pub use content_repo::ContentRepo;
pub use generation_job_repo::GenerationJobRepo;
