//! Pulls the image prompt proper out of stage 3 text.

use crate::prompts::IMAGE_PROMPT_MARKER;

/// Returns the text after the first marker line, as a single line.
///
/// Every non-blank line after the first line containing
/// [`IMAGE_PROMPT_MARKER`] is trimmed and joined with single spaces; repeated
/// marker lines are skipped. If there is no marker, or nothing follows it,
/// the whole text is returned unchanged.
#[must_use]
pub fn extract_image_prompt(text: &str) -> String {
    let mut lines = text.lines();
    if !lines.any(|line| line.contains(IMAGE_PROMPT_MARKER)) {
        return text.to_string();
    }

    let extracted = lines
        .filter(|line| !line.contains(IMAGE_PROMPT_MARKER))
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    if extracted.is_empty() {
        text.to_string()
    } else {
        extracted
    }
}
