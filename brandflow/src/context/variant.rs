//! Pipeline variants and their per-stage token budgets.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU32;

use crate::core::StageId;

/// Which flavour of the pipeline a run follows.
///
/// Both variants have the same four stages; they differ in the stage 1 and
/// stage 2 templates, the deliverable gate, and the token budgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PipelineVariant {
    /// Named business, category and exactly two deliverables; stage 1 writes
    /// a six-section marketing briefing.
    #[default]
    CampaignBriefing,
    /// One-sentence idea; stage 1 expands it into a business description.
    IdeaExpansion,
}

impl PipelineVariant {
    /// Default completion token budgets for the three text stages.
    #[must_use]
    pub const fn default_budgets(self) -> StageBudgets {
        match self {
            Self::CampaignBriefing => StageBudgets::new(800, 800, 900),
            Self::IdeaExpansion => StageBudgets::new(1000, 600, 700),
        }
    }

    /// How many deliverables stage 1 requires, if the variant uses them.
    #[must_use]
    pub const fn required_deliverables(self) -> Option<usize> {
        match self {
            Self::CampaignBriefing => Some(super::REQUIRED_DELIVERABLES),
            Self::IdeaExpansion => None,
        }
    }

    /// File name offered for the generated visual.
    #[must_use]
    pub const fn artifact_file_name(self) -> &'static str {
        match self {
            Self::CampaignBriefing => "campaign_marketing_visual.png",
            Self::IdeaExpansion => "location_marketing_visual.png",
        }
    }
}

impl fmt::Display for PipelineVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CampaignBriefing => write!(f, "campaign_briefing"),
            Self::IdeaExpansion => write!(f, "idea_expansion"),
        }
    }
}

/// Maximum completion tokens requested by each text stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageBudgets {
    /// Stage 1 budget.
    pub briefing: NonZeroU32,
    /// Stage 2 budget.
    pub enhancement: NonZeroU32,
    /// Stage 3 budget.
    pub image_prompt: NonZeroU32,
}

impl StageBudgets {
    const fn new(briefing: u32, enhancement: u32, image_prompt: u32) -> Self {
        Self {
            briefing: non_zero(briefing),
            enhancement: non_zero(enhancement),
            image_prompt: non_zero(image_prompt),
        }
    }

    /// Budget for a text stage; `None` for the image stage.
    #[must_use]
    pub const fn for_stage(&self, stage: StageId) -> Option<NonZeroU32> {
        match stage {
            StageId::Briefing => Some(self.briefing),
            StageId::Enhancement => Some(self.enhancement),
            StageId::ImagePrompt => Some(self.image_prompt),
            StageId::Image => None,
        }
    }
}

const fn non_zero(value: u32) -> NonZeroU32 {
    match NonZeroU32::new(value) {
        Some(v) => v,
        None => NonZeroU32::MIN,
    }
}
