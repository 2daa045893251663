//! Stage identity and run state enums.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The stages of a run, in strict forward order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageId {
    /// Stage 1: marketing briefing (or idea expansion).
    Briefing,
    /// Stage 2: strategic enhancement with local landmarks.
    Enhancement,
    /// Stage 3: image-generation prompt text.
    ImagePrompt,
    /// Stage 4: the generated image.
    Image,
}

impl StageId {
    /// All stages in execution order.
    pub const ALL: [Self; 4] = [
        Self::Briefing,
        Self::Enhancement,
        Self::ImagePrompt,
        Self::Image,
    ];

    /// Zero-based position of the stage in the run.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Briefing => 0,
            Self::Enhancement => 1,
            Self::ImagePrompt => 2,
            Self::Image => 3,
        }
    }

    /// The stage whose output this stage consumes.
    #[must_use]
    pub const fn upstream(self) -> Option<Self> {
        match self {
            Self::Briefing => None,
            Self::Enhancement => Some(Self::Briefing),
            Self::ImagePrompt => Some(Self::Enhancement),
            Self::Image => Some(Self::ImagePrompt),
        }
    }

    /// Stages that run after this one.
    #[must_use]
    pub fn downstream(self) -> &'static [Self] {
        static ORDER: [StageId; 4] = StageId::ALL;
        &ORDER[self.index() + 1..]
    }

    /// Returns true if the stage calls the completion endpoint.
    #[must_use]
    pub const fn is_text(self) -> bool {
        !matches!(self, Self::Image)
    }

    /// The run state reached once this stage has output.
    #[must_use]
    pub const fn ready_state(self) -> RunState {
        match self {
            Self::Briefing => RunState::BriefingReady,
            Self::Enhancement => RunState::EnhancementReady,
            Self::ImagePrompt => RunState::ImagePromptReady,
            Self::Image => RunState::ImageReady,
        }
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Briefing => write!(f, "briefing"),
            Self::Enhancement => write!(f, "enhancement"),
            Self::ImagePrompt => write!(f, "image_prompt"),
            Self::Image => write!(f, "image"),
        }
    }
}

/// Where a run is in the forward state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    /// No stage has produced output.
    #[default]
    Idle,
    /// Stage 1 output exists.
    BriefingReady,
    /// Stage 2 output exists.
    EnhancementReady,
    /// Stage 3 output exists.
    ImagePromptReady,
    /// Stage 4 output exists.
    ImageReady,
}

impl RunState {
    /// The stage that advances the run from this state, if any.
    #[must_use]
    pub const fn next_stage(self) -> Option<StageId> {
        match self {
            Self::Idle => Some(StageId::Briefing),
            Self::BriefingReady => Some(StageId::Enhancement),
            Self::EnhancementReady => Some(StageId::ImagePrompt),
            Self::ImagePromptReady => Some(StageId::Image),
            Self::ImageReady => None,
        }
    }

    /// Returns true if the state is terminal.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::ImageReady)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::BriefingReady => write!(f, "briefing_ready"),
            Self::EnhancementReady => write!(f, "enhancement_ready"),
            Self::ImagePromptReady => write!(f, "image_prompt_ready"),
            Self::ImageReady => write!(f, "image_ready"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_order() {
        assert!(StageId::Briefing < StageId::Enhancement);
        assert!(StageId::ImagePrompt < StageId::Image);
        for (i, stage) in StageId::ALL.iter().enumerate() {
            assert_eq!(stage.index(), i);
        }
    }

    #[test]
    fn test_downstream() {
        assert_eq!(
            StageId::Enhancement.downstream(),
            &[StageId::ImagePrompt, StageId::Image]
        );
        assert!(StageId::Image.downstream().is_empty());
    }

    #[test]
    fn test_upstream_chain() {
        assert_eq!(StageId::Briefing.upstream(), None);
        assert_eq!(StageId::Image.upstream(), Some(StageId::ImagePrompt));
    }

    #[test]
    fn test_run_state_next_stage() {
        assert_eq!(RunState::Idle.next_stage(), Some(StageId::Briefing));
        assert_eq!(RunState::ImagePromptReady.next_stage(), Some(StageId::Image));
        assert_eq!(RunState::ImageReady.next_stage(), None);
        assert!(RunState::ImageReady.is_terminal());
    }

    #[test]
    fn test_stage_id_serialize() {
        let json = serde_json::to_string(&StageId::ImagePrompt).unwrap();
        assert_eq!(json, r#""image_prompt""#);

        let state: RunState = serde_json::from_str(r#""briefing_ready""#).unwrap();
        assert_eq!(state, RunState::BriefingReady);
    }
}
