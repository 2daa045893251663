//! Prompt templates and response parsing.
//!
//! Templates are pure functions from structured input to instruction text.
//! Later stages locate sections of earlier output by their literal labels, so
//! the labels below are shared by the templates and the parsers and must not
//! drift apart.

mod briefing;
mod enhancement;
mod image_prompt;
mod parse;

pub use briefing::{briefing_prompt, expansion_prompt};
pub use enhancement::{enhancement_prompt, idea_enhancement_prompt};
pub use image_prompt::{basic_image_prompt_prompt, image_prompt_prompt};
pub use parse::{extract_landmarks, missing_briefing_sections, recommended_tone};

/// Marker line that introduces the image prompt proper in stage 3 output.
pub const IMAGE_PROMPT_MARKER: &str = "DETAILED IMAGE GENERATION PROMPT";

/// Number of local landmarks the enhancement and image-prompt stages list.
pub const LANDMARK_COUNT: usize = 5;

/// Briefing section labels, in the order the briefing must present them.
pub const BRIEFING_SECTIONS: [&str; 6] = [
    "THE PROBLEM:",
    "THE FACTS:",
    "THE BIG PICTURE:",
    "THE OBJECTIVE:",
    "THE TARGET AUDIENCE:",
    AI_TONE_SECTION,
];

/// Briefing section that names the AI-recommended tone.
pub const AI_TONE_SECTION: &str = "AI-RECOMMENDED TONE:";

/// Stage 2 strategic-analysis section label.
pub const ANALYSIS_SECTION: &str = "ENHANCED STRATEGIC ANALYSIS:";

/// Stage 2 tone-blend section label.
pub const TONE_SYNTHESIS_SECTION: &str = "TONE SYNTHESIS:";

/// Prefix of the stage 2 landmark header; the location follows in uppercase.
pub const LANDMARKS_HEADER: &str = "LOCAL HOTSPOTS/LANDMARKS FOR";

/// Stage 3 landmark read-back label.
pub const LANDMARKS_IDENTIFIED_SECTION: &str = "LANDMARKS IDENTIFIED:";

/// Stage 3 tone-blend label.
pub const TONE_BLEND_SECTION: &str = "TONE BLEND STRATEGY:";

/// Stage 3 per-deliverable adjustments label.
pub const DELIVERABLE_SECTION: &str = "DELIVERABLE OPTIMIZATION:";

/// The landmark header for a location, e.g. `LOCAL HOTSPOTS/LANDMARKS FOR AUSTIN, TX:`.
#[must_use]
pub fn landmarks_header(location: &str) -> String {
    format!("{LANDMARKS_HEADER} {}:", location.trim().to_uppercase())
}

/// The numbered placeholder list the model is asked to fill in.
fn landmark_placeholders() -> String {
    (1..=LANDMARK_COUNT)
        .map(|i| format!("{i}. [Landmark {i}]"))
        .collect::<Vec<_>>()
        .join("\n")
}
