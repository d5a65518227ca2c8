//! Application-level configuration.
//!
//! - [`PipelineParams`]: batch sizes, waits and bubble durations of the pipeline

pub mod pipeline_params;

pub use pipeline_params::PipelineParams;
