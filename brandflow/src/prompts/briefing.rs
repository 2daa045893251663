//! Stage 1 templates.

use super::{AI_TONE_SECTION, BRIEFING_SECTIONS};
use crate::context::{BusinessContext, ToneSelection};

/// Builds the six-section marketing briefing prompt.
#[must_use]
pub fn briefing_prompt(ctx: &BusinessContext) -> String {
    let deliverables = ctx.deliverables_text();
    let name = ctx.name.as_deref().unwrap_or_default();
    let location = &ctx.location;

    let tones = ToneSelection::ALL
        .iter()
        .map(|tone| format!("- {tone}"))
        .collect::<Vec<_>>()
        .join("\n");

    let idea = if ctx.idea.trim().is_empty() {
        String::new()
    } else {
        format!("- Business Idea: {}\n", ctx.idea.trim())
    };

    let [problem, facts, big_picture, objective, audience, _] = BRIEFING_SECTIONS;

    format!(
        r"Create a comprehensive marketing briefing for this business. Structure your response with these sections, in this order, using the labels exactly as written.

Business Details:
- Business Name: {name}
- Business Type: {category}
- Location: {location}
{idea}- Selected Marketing Deliverables: {deliverables}

{problem}
[The core market problem this business solves]

{facts}
[Key market data, demographics and business facts for {location}]

{big_picture}
[The broader market opportunity and business vision]

{objective}
[Clear, measurable marketing goals for the selected deliverables: {deliverables}]

{audience}
[The ideal customers: demographics, psychographics and behaviours]

{AI_TONE_SECTION}
[Based on the business type, location and target audience, recommend exactly ONE of these tones and justify the choice:
{tones}]

Keep each section focused and actionable (400-600 words in total).",
        category = ctx.category,
    )
}

/// Builds the idea-expansion prompt used by the idea-expansion variant.
#[must_use]
pub fn expansion_prompt(idea: &str, location: &str) -> String {
    format!(
        r"Expand this business idea into a clear, detailed description.
Cover what the business does, who it serves, what makes it unique, and how the location shapes it.
Consider the local market, demographics and opportunities in {location}.
Keep it concise but complete (2-3 paragraphs).

Business idea: {idea}
Location: {location}

Expanded business description:",
        idea = idea.trim(),
        location = location.trim(),
    )
}
