pub mod generation_job;
pub mod status;
