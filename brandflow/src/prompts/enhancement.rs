//! Stage 2 templates.

use super::{
    landmark_placeholders, landmarks_header, AI_TONE_SECTION, ANALYSIS_SECTION, LANDMARK_COUNT,
    TONE_SYNTHESIS_SECTION,
};
use crate::context::ToneSelection;

/// Builds the strategic-enhancement prompt for a campaign briefing.
///
/// The model blends the user's tone with the tone the briefing recommended
/// and lists exactly [`LANDMARK_COUNT`] local landmarks under a header the
/// image-prompt stage can find again.
#[must_use]
pub fn enhancement_prompt(briefing: &str, tone: ToneSelection, location: &str) -> String {
    let location = location.trim();
    let header = landmarks_header(location);
    let placeholders = landmark_placeholders();

    format!(
        r"Enhance this marketing briefing with strategic analysis, combining the user-selected tone with the AI-recommended tone from the briefing.

Original Briefing:
{briefing}

User-Selected Tone: {tone} ({description})
Target Location: {location}

Create an enhanced analysis with these sections:

{ANALYSIS_SECTION}
[Deeper insight into market positioning, competitive advantages and growth opportunities]

{TONE_SYNTHESIS_SECTION}
[Explain how to blend the user tone ({tone}) with the tone named under {AI_TONE_SECTION} in the briefing. Describe the combined visual approach]

{header}
[Identify exactly {LANDMARK_COUNT} famous, recognizable landmarks or hotspots in {location} that would resonate with the target audience and could appear in the marketing visuals]
{placeholders}

Keep the analysis strategic and specific to {location} (500-700 words in total).",
        briefing = briefing.trim(),
        description = tone.description(),
    )
}

/// Builds the stage 2 prompt for the idea-expansion variant.
#[must_use]
pub fn idea_enhancement_prompt(expanded: &str, tone: ToneSelection, location: &str) -> String {
    let location = location.trim();
    let header = landmarks_header(location);
    let placeholders = landmark_placeholders();

    format!(
        r"Enhance and refine this business description using a {style} approach.
Make it more engaging, add specific details and strengthen its appeal to the local market in {location}.

Business Description:
{expanded}

Style: {tone} ({description})

Provide a strategic analysis written in the {tone} style, then list exactly {LANDMARK_COUNT} key landmarks or hotspots in {location} that fit the business:

{header}
{placeholders}

Enhanced description:",
        style = tone.label().to_lowercase(),
        expanded = expanded.trim(),
        description = tone.description(),
    )
}
