//! Structured user input for a pipeline run.
//!
//! This module provides:
//! - The business context captured before stage 1
//! - The closed tone and deliverable vocabularies
//! - Pipeline variants and run identity

mod business;
mod identity;
mod tone;
mod variant;

pub use business::{BusinessContext, Deliverable, REQUIRED_DELIVERABLES};
pub use identity::RunIdentity;
pub use tone::ToneSelection;
pub use variant::{PipelineVariant, StageBudgets};
