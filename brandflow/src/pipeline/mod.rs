//! Pipeline orchestration.
//!
//! This module provides:
//! - The `PipelineRun` value holding one run's outputs
//! - The stage orchestrator and its builder
//! - Image-prompt extraction from stage 3 text

mod extract;
mod integration_tests;
mod orchestrator;
mod run;

pub use extract::extract_image_prompt;
pub use orchestrator::{Pipeline, PipelineBuilder};
pub use run::PipelineRun;
