//! Best-effort readers for generated stage text.
//!
//! None of these fail: model output is free text, so a missing section is a
//! diagnostic, never an error.

use regex::Regex;
use std::sync::OnceLock;

use super::{AI_TONE_SECTION, BRIEFING_SECTIONS, LANDMARKS_HEADER, LANDMARK_COUNT};
use crate::context::ToneSelection;

// `1. Zilker Park`, `2) **Lady Bird Lake** - ...`
#[allow(clippy::expect_used)]
fn numbered_item() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\s*(?:[-*]\s*)?\d{1,2}[.)]\s+(.+?)\s*$").expect("Invalid numbered item regex")
    })
}

fn item_text(line: &str) -> Option<String> {
    let caps = numbered_item().captures(line)?;
    let text = caps[1].trim_matches('*').trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Returns up to [`LANDMARK_COUNT`] numbered landmark items.
///
/// Items are read from the block after the `LOCAL HOTSPOTS/LANDMARKS FOR`
/// header. Without a header, the first numbered lines of the text are used.
#[must_use]
pub fn extract_landmarks(text: &str) -> Vec<String> {
    let header = text
        .lines()
        .position(|line| line.to_uppercase().contains(LANDMARKS_HEADER));

    match header {
        Some(idx) => {
            let mut items = Vec::with_capacity(LANDMARK_COUNT);
            for line in text.lines().skip(idx + 1) {
                if line.trim().is_empty() {
                    continue;
                }
                match item_text(line) {
                    Some(item) => items.push(item),
                    None if items.is_empty() => continue,
                    None => break,
                }
                if items.len() == LANDMARK_COUNT {
                    break;
                }
            }
            items
        }
        None => text.lines().filter_map(item_text).take(LANDMARK_COUNT).collect(),
    }
}

/// Lists the briefing section labels that do not appear in `text`.
#[must_use]
pub fn missing_briefing_sections(text: &str) -> Vec<&'static str> {
    let upper = text.to_uppercase();
    BRIEFING_SECTIONS
        .into_iter()
        .filter(|label| !upper.contains(label))
        .collect()
}

/// The first tone label mentioned in the briefing's recommended-tone section.
#[must_use]
pub fn recommended_tone(briefing: &str) -> Option<ToneSelection> {
    let lower = briefing.to_lowercase();
    let anchor = AI_TONE_SECTION.trim_end_matches(':').to_lowercase();
    let section = &lower[lower.find(&anchor)? + anchor.len()..];

    ToneSelection::ALL
        .into_iter()
        .filter_map(|tone| {
            section
                .find(&tone.label().to_lowercase())
                .map(|pos| (pos, tone))
        })
        .min_by_key(|(pos, _)| *pos)
        .map(|(_, tone)| tone)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const ENHANCEMENT: &str = "ENHANCED STRATEGIC ANALYSIS:
Austin's tech scene is growing.

LOCAL HOTSPOTS/LANDMARKS FOR AUSTIN, TX:
1. Texas State Capitol
2. **Lady Bird Lake**
3) Congress Avenue Bridge

4. Zilker Park
5. South Congress Avenue
6. Barton Springs Pool

Closing thoughts.";

    #[test]
    fn test_extract_landmarks_after_header() {
        assert_eq!(
            extract_landmarks(ENHANCEMENT),
            vec![
                "Texas State Capitol",
                "Lady Bird Lake",
                "Congress Avenue Bridge",
                "Zilker Park",
                "South Congress Avenue",
            ]
        );
    }

    #[test]
    fn test_extract_landmarks_stops_at_prose() {
        let text = "LOCAL HOTSPOTS/LANDMARKS FOR BAY AREA:\n1. Golden Gate Bridge\n2. Alcatraz\nThat is all.\n3. Not a landmark";
        assert_eq!(extract_landmarks(text), vec!["Golden Gate Bridge", "Alcatraz"]);
    }

    #[test]
    fn test_extract_landmarks_without_header() {
        let text = "Intro\n1. One\n2. Two\n- 3. Three";
        assert_eq!(extract_landmarks(text), vec!["One", "Two", "Three"]);
        assert!(extract_landmarks("no lists here").is_empty());
    }

    #[test]
    fn test_missing_briefing_sections() {
        let briefing = "THE PROBLEM:\nx\nThe Facts:\ny\nTHE OBJECTIVE:\nz";
        assert_eq!(
            missing_briefing_sections(briefing),
            vec!["THE BIG PICTURE:", "THE TARGET AUDIENCE:", "AI-RECOMMENDED TONE:"]
        );
        let complete = BRIEFING_SECTIONS.join("\n...\n");
        assert!(missing_briefing_sections(&complete).is_empty());
    }

    #[test]
    fn test_recommended_tone() {
        let briefing = "THE TARGET AUDIENCE:\nFans of Anime Style art.\n\nAI-RECOMMENDED TONE:\nI recommend Minimalist Illustration over Watercolor Art because...";
        assert_eq!(
            recommended_tone(briefing),
            Some(ToneSelection::MinimalistIllustration)
        );
        assert_eq!(recommended_tone("AI-RECOMMENDED TONE: something else"), None);
        assert_eq!(recommended_tone("Watercolor Art everywhere"), None);
    }
}
