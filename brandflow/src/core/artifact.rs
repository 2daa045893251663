//! The downloadable image produced by the final stage.

use serde::{Deserialize, Serialize};

/// MIME type of every generated visual.
pub const IMAGE_MIME_TYPE: &str = "image/png";

/// A generated marketing visual.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageArtifact {
    /// Raw image bytes as returned by the image endpoint.
    #[serde(skip)]
    pub bytes: Vec<u8>,

    /// MIME type for downloads.
    pub mime_type: String,

    /// Suggested download file name.
    pub file_name: String,

    /// The prompt the image was generated from.
    pub prompt: String,

    /// When the artifact was created (ISO 8601).
    pub created_at: String,
}

impl ImageArtifact {
    /// Creates a new PNG artifact.
    #[must_use]
    pub fn png(bytes: Vec<u8>, file_name: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: IMAGE_MIME_TYPE.to_string(),
            file_name: file_name.into(),
            prompt: prompt.into(),
            created_at: super::iso_timestamp(),
        }
    }

    /// Returns the byte count.
    #[must_use]
    pub fn byte_count(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true if the payload starts with the PNG signature.
    #[must_use]
    pub fn looks_like_png(&self) -> bool {
        self.bytes.starts_with(b"\x89PNG\r\n\x1a\n")
    }
}
