//! The closed set of visual styles a user can pick.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::ValidationError;

/// A visual-style label that steers both text generation and the image.
///
/// The user's choice is independent of whatever tone the briefing
/// recommends; the enhancement stage is asked to blend the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToneSelection {
    /// Vibrant colors, stylized characters, dynamic compositions.
    #[serde(rename = "Anime Style")]
    AnimeStyle,
    /// Playful, colorful, family-friendly with bold outlines.
    #[serde(rename = "Cartoon Style")]
    CartoonStyle,
    /// Clean lines, simple shapes, modern aesthetic.
    #[serde(rename = "Minimalist Illustration")]
    MinimalistIllustration,
    /// Soft, flowing colors with an organic, artistic feel.
    #[serde(rename = "Watercolor Art")]
    WatercolorArt,
    /// Retro design elements, classic typography, nostalgic appeal.
    #[serde(rename = "Vintage Poster")]
    VintagePoster,
}

impl ToneSelection {
    /// Every tone, in presentation order.
    pub const ALL: [Self; 5] = [
        Self::AnimeStyle,
        Self::CartoonStyle,
        Self::MinimalistIllustration,
        Self::WatercolorArt,
        Self::VintagePoster,
    ];

    /// The display label used in prompts.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::AnimeStyle => "Anime Style",
            Self::CartoonStyle => "Cartoon Style",
            Self::MinimalistIllustration => "Minimalist Illustration",
            Self::WatercolorArt => "Watercolor Art",
            Self::VintagePoster => "Vintage Poster",
        }
    }

    /// A one-line description of the style.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::AnimeStyle => "Vibrant colors, stylized characters, dynamic compositions",
            Self::CartoonStyle => "Playful, colorful, family-friendly with bold outlines",
            Self::MinimalistIllustration => "Clean lines, simple shapes, modern aesthetic",
            Self::WatercolorArt => "Soft, flowing colors with organic, artistic feel",
            Self::VintagePoster => {
                "Retro design elements, classic typography, nostalgic appeal"
            }
        }
    }

    /// The option string shown in a style picker: `"<label> - <description>"`.
    #[must_use]
    pub fn option_text(self) -> String {
        format!("{} - {}", self.label(), self.description())
    }
}

impl fmt::Display for ToneSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ToneSelection {
    type Err = ValidationError;

    /// Accepts the bare label or a full option string; only the part before
    /// `" - "` is matched, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.split(" - ").next().unwrap_or_default().trim();
        Self::ALL
            .into_iter()
            .find(|tone| tone.label().eq_ignore_ascii_case(label))
            .ok_or_else(|| ValidationError::UnknownTone(s.to_string()))
    }
}
