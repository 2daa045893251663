//! Core domain model types for brandflow.
//!
//! This module contains the fundamental types used throughout the crate:
//! - Stage identity and run state enums
//! - Stage output type tagged with the producing stage
//! - The generated image artifact and stage events

mod artifact;
mod event;
mod output;
mod status;

pub use artifact::{ImageArtifact, IMAGE_MIME_TYPE};
pub use event::{iso_timestamp, StageEvent, StageEventKind};
pub use output::StageOutput;
pub use status::{RunState, StageId};
