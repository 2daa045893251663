//! Stage output type tagged with the stage that produced it.

use super::{ImageArtifact, StageId};
use serde::{Deserialize, Serialize};

/// The output of one pipeline stage.
///
/// Text stages produce a text blob; the final stage produces an image
/// artifact. Outputs are replaced wholesale, never edited in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StageOutput {
    /// Generated (or user-edited) text.
    Text {
        /// The stage that produced the text.
        stage: StageId,
        /// The text itself.
        text: String,
    },
    /// The generated image.
    Image {
        /// The image artifact.
        artifact: ImageArtifact,
    },
}

impl StageOutput {
    /// Creates a text output.
    #[must_use]
    pub fn text(stage: StageId, text: impl Into<String>) -> Self {
        Self::Text {
            stage,
            text: text.into(),
        }
    }

    /// Creates an image output.
    #[must_use]
    pub fn image(artifact: ImageArtifact) -> Self {
        Self::Image { artifact }
    }

    /// The stage that produced this output.
    #[must_use]
    pub fn stage(&self) -> StageId {
        match self {
            Self::Text { stage, .. } => *stage,
            Self::Image { .. } => StageId::Image,
        }
    }

    /// Returns the text, if this is a text output.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text, .. } => Some(text),
            Self::Image { .. } => None,
        }
    }

    /// Returns the artifact, if this is an image output.
    #[must_use]
    pub fn as_image(&self) -> Option<&ImageArtifact> {
        match self {
            Self::Image { artifact } => Some(artifact),
            Self::Text { .. } => None,
        }
    }

    /// Size of the payload in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Text { text, .. } => text.len(),
            Self::Image { artifact } => artifact.byte_count(),
        }
    }

    /// Returns true if the payload is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_output() {
        let output = StageOutput::text(StageId::Briefing, "THE PROBLEM: slow mornings");
        assert_eq!(output.stage(), StageId::Briefing);
        assert_eq!(output.as_text(), Some("THE PROBLEM: slow mornings"));
        assert!(output.as_image().is_none());
        assert!(!output.is_empty());
    }

    #[test]
    fn test_image_output() {
        let artifact = ImageArtifact::png(vec![1, 2, 3], "v.png", "prompt");
        let output = StageOutput::image(artifact);
        assert_eq!(output.stage(), StageId::Image);
        assert_eq!(output.len(), 3);
        assert!(output.as_text().is_none());
    }

    #[test]
    fn test_text_output_serialize() {
        let output = StageOutput::text(StageId::Enhancement, "analysis");
        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["kind"], "text");
        assert_eq!(json["stage"], "enhancement");
        assert_eq!(json["text"], "analysis");
    }
}
