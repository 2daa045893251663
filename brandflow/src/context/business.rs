//! Business details captured before the first stage.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::PipelineVariant;
use crate::errors::ValidationError;

/// Number of deliverables the campaign-briefing variant requires.
pub const REQUIRED_DELIVERABLES: usize = 2;

/// A marketing-asset format. Only steers prompt wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Deliverable {
    /// Multi-slide social posts.
    SocialMediaCarousels,
    /// Single-image social ads.
    StaticSocialAds,
    /// Large-format outdoor or wall print.
    BillboardOrPoster,
    /// Email header and body visuals.
    EmailNewsletter,
    /// Printed brochure or one-pager.
    PrintBrochure,
    /// Website hero image.
    WebsiteBanner,
    /// Text-first copy deck.
    CopyDeck,
    /// Media kit.
    PressKit,
    /// In-store display mockups.
    PointOfSale,
}

impl Deliverable {
    /// Every deliverable, in presentation order.
    pub const ALL: [Self; 9] = [
        Self::SocialMediaCarousels,
        Self::StaticSocialAds,
        Self::BillboardOrPoster,
        Self::EmailNewsletter,
        Self::PrintBrochure,
        Self::WebsiteBanner,
        Self::CopyDeck,
        Self::PressKit,
        Self::PointOfSale,
    ];

    /// The display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::SocialMediaCarousels => "Social Media Carousels",
            Self::StaticSocialAds => "Static Social Ads",
            Self::BillboardOrPoster => "Billboard or Poster Design",
            Self::EmailNewsletter => "Email Newsletter Design",
            Self::PrintBrochure => "Print Brochure or One-Pager",
            Self::WebsiteBanner => "Website Banner or Hero Image",
            Self::CopyDeck => "Copy Deck",
            Self::PressKit => "Press Kit (Media Kit)",
            Self::PointOfSale => "Point-of-Sale Display Mockups",
        }
    }

    /// Visual guidance line used by the deliverable-aware image prompt.
    #[must_use]
    pub const fn visual_guidance(self) -> &'static str {
        match self {
            Self::SocialMediaCarousels => "Social Media Carousels: multi-slide ready, consistent branding",
            Self::StaticSocialAds => "Static Social Ads: platform-optimized dimensions, clear CTAs",
            Self::BillboardOrPoster => "Billboard/Poster: high-impact, readable from distance",
            Self::EmailNewsletter => "Email Newsletter: header-friendly, brand integration",
            Self::PrintBrochure => "Print Brochure: print-quality, professional layout",
            Self::WebsiteBanner => "Website Banner: web-optimized, hero image ready",
            Self::CopyDeck => "Copy Deck: text-supporting visuals",
            Self::PressKit => "Press Kit: professional, media-ready aesthetics",
            Self::PointOfSale => "Point-of-Sale: retail environment integration",
        }
    }
}

impl fmt::Display for Deliverable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Deliverable {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim();
        Self::ALL
            .into_iter()
            .find(|d| d.label().eq_ignore_ascii_case(label))
            .ok_or_else(|| ValidationError::UnknownDeliverable(s.to_string()))
    }
}

impl TryFrom<String> for Deliverable {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Deliverable> for String {
    fn from(value: Deliverable) -> Self {
        value.label().to_string()
    }
}

/// The business a run generates marketing content for.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BusinessContext {
    /// Business name. Required by the campaign-briefing variant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Business type or category.
    #[serde(default)]
    pub category: String,
    /// Free-text description of the idea.
    #[serde(default)]
    pub idea: String,
    /// City or region.
    pub location: String,
    /// Selected deliverables.
    #[serde(default)]
    pub deliverables: Vec<Deliverable>,
}

impl BusinessContext {
    /// Creates a context for the given location.
    #[must_use]
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            ..Default::default()
        }
    }

    /// Sets the business name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the business category.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Sets the idea description.
    #[must_use]
    pub fn with_idea(mut self, idea: impl Into<String>) -> Self {
        self.idea = idea.into();
        self
    }

    /// Sets the selected deliverables.
    #[must_use]
    pub fn with_deliverables(mut self, deliverables: Vec<Deliverable>) -> Self {
        self.deliverables = deliverables;
        self
    }

    /// Deliverable labels joined for prompt text.
    #[must_use]
    pub fn deliverables_text(&self) -> String {
        self.deliverables
            .iter()
            .map(|d| d.label())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Checks that every field the variant needs is populated.
    pub fn validate(&self, variant: PipelineVariant) -> Result<(), ValidationError> {
        match variant {
            PipelineVariant::CampaignBriefing => {
                require("name", self.name.as_deref().unwrap_or_default())?;
                require("category", &self.category)?;
            }
            PipelineVariant::IdeaExpansion => require("idea", &self.idea)?,
        }
        require("location", &self.location)?;

        if let Some(expected) = variant.required_deliverables() {
            if self.deliverables.len() != expected {
                return Err(ValidationError::DeliverableCount {
                    expected,
                    actual: self.deliverables.len(),
                });
            }
        }
        Ok(())
    }
}

fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::MissingField { field })
    } else {
        Ok(())
    }
}
