//! Testing utilities for brandflow pipelines.
//!
//! This module provides:
//! - Scripted clients recording a shared call log
//! - Scenario fixtures and a scripted pipeline harness
//! - Assertions for runs and stage text

mod assertions;
mod fixtures;
mod mocks;

pub use assertions::{
    assert_briefing_sections, assert_call_sequence, assert_cleared_after, assert_has_marker,
    assert_landmark_count, assert_run_state,
};
pub use fixtures::{
    coffee_shop_context, idea_context, TestHarness, BRIEFING_TEXT, ENHANCEMENT_TEXT,
    IMAGE_PROMPT_BODY, IMAGE_PROMPT_TEXT, PNG_BYTES, SCENARIO_TONE,
};
pub use mocks::{CallLog, RecordedCall, ScriptedCompletionClient, ScriptedImageClient};
