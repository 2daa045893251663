//! # Brandflow
//!
//! A four-stage, prompt-chained pipeline that turns a small business
//! description into a marketing briefing, a location-aware enhancement, a
//! detailed image prompt and finally a generated PNG visual.
//!
//! Each stage consumes the text produced by the stage before it:
//!
//! - **Briefing**: a structured creative brief (campaign variant) or an
//!   expanded business description (idea variant)
//! - **Enhancement**: the brief refined with a user-selected visual tone and
//!   five local landmarks
//! - **Image prompt**: a long-form prompt for a text-to-image model
//! - **Image**: the visual itself, fetched from an inference endpoint
//!
//! Regenerating a stage discards everything downstream of it, so a run never
//! mixes outputs from different upstream versions.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use brandflow::prelude::*;
//!
//! let config = BrandflowConfig::from_env();
//! let pipeline = Pipeline::from_config(config)?;
//!
//! let context = BusinessContext::new("Austin, TX")
//!     .with_name("Brew & Code Coffee")
//!     .with_category("Cafe")
//!     .with_deliverables(vec![Deliverable::StaticSocialAds, Deliverable::EmailNewsletter]);
//!
//! let mut run = pipeline.start(context, PipelineVariant::CampaignBriefing).await?;
//! pipeline.enhance(&mut run, ToneSelection::WatercolorArt).await?;
//! pipeline.generate_image_prompt(&mut run).await?;
//! let visual = pipeline.generate_image(&mut run).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod clients;
pub mod config;
pub mod context;
pub mod core;
pub mod errors;
pub mod events;
pub mod observability;
pub mod pipeline;
pub mod prompts;
pub mod session;
pub mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::clients::{CompletionClient, CompletionRequest, ImageClient};
    pub use crate::config::{BrandflowConfig, Capabilities};
    pub use crate::context::{
        BusinessContext, Deliverable, PipelineVariant, RunIdentity, StageBudgets,
        ToneSelection,
    };
    pub use crate::core::{ImageArtifact, RunState, StageEvent, StageId, StageOutput};
    pub use crate::errors::{
        BrandflowError, CompletionError, ConfigError, ErrorKind, ImageError,
        ValidationError,
    };
    pub use crate::events::{EventSink, LoggingEventSink, NoOpEventSink};
    pub use crate::observability::{init_tracing, LogFormat};
    pub use crate::pipeline::{Pipeline, PipelineBuilder, PipelineRun};
    pub use crate::session::{SessionHandle, SessionStore};
}
