//! Stage 3 templates.
//!
//! Both templates end in a block introduced by [`IMAGE_PROMPT_MARKER`]; the
//! image stage sends only what follows that line.

use super::{
    DELIVERABLE_SECTION, IMAGE_PROMPT_MARKER, LANDMARKS_IDENTIFIED_SECTION, LANDMARK_COUNT,
    TONE_BLEND_SECTION,
};
use crate::context::{Deliverable, ToneSelection};

/// Builds the deliverable-aware image-prompt prompt.
#[must_use]
pub fn image_prompt_prompt(
    enhancement: &str,
    tone: ToneSelection,
    location: &str,
    deliverables: &[Deliverable],
) -> String {
    let location = location.trim();
    let labels = deliverables
        .iter()
        .map(|d| d.label())
        .collect::<Vec<_>>()
        .join(", ");
    let guidance = deliverables
        .iter()
        .map(|d| format!("- {}", d.visual_guidance()))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r"Create a detailed image generation prompt for a marketing visual, based on this enhanced analysis.

Enhanced Analysis:
{enhancement}

Primary Tone: {tone}
Location: {location}
Target Deliverables: {labels}

Structure your response as follows:

{LANDMARKS_IDENTIFIED_SECTION}
[List the same {LANDMARK_COUNT} landmarks from the analysis]

{TONE_BLEND_SECTION}
[How the {tone} style combines with the AI-recommended tone in the visual]

{DELIVERABLE_SECTION}
[Adjust the visual for each selected deliverable:]
{guidance}

{IMAGE_PROMPT_MARKER} (600 words):
[Write one comprehensive prompt that:
- Features multiple landmarks from {location} together
- Applies the blended {tone} aesthetic throughout
- Is suitable for {labels}
- Describes composition, lighting, colors, perspective and artistic details
- Makes the business the focal point within the local landscape]

Focus on a cohesive visual that works across the selected deliverables.",
        enhancement = enhancement.trim(),
    )
}

/// Builds the image-prompt prompt without deliverable guidance.
#[must_use]
pub fn basic_image_prompt_prompt(enhancement: &str, tone: ToneSelection, location: &str) -> String {
    let location = location.trim();

    format!(
        r"Create a detailed image generation prompt for a marketing visual, based on this enhanced analysis.

Enhanced Analysis:
{enhancement}

Primary Tone: {tone}
Location: {location}

Structure your response as follows:

{LANDMARKS_IDENTIFIED_SECTION}
[List the same {LANDMARK_COUNT} landmarks from the analysis]

{TONE_BLEND_SECTION}
[How the {tone} style combines with the recommended tone in the visual]

{IMAGE_PROMPT_MARKER} (500 words):
[Write one comprehensive prompt that:
- Features multiple landmarks from {location} together
- Applies the blended {tone} aesthetic throughout
- Describes composition, lighting, colors, perspective and artistic details
- Makes the business the focal point within the local landscape]",
        enhancement = enhancement.trim(),
    )
}
