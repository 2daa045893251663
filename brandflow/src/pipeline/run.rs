//! The per-session run value.

use serde::Serialize;
use uuid::Uuid;

use crate::context::{BusinessContext, PipelineVariant, RunIdentity, ToneSelection};
use crate::core::{ImageArtifact, RunState, StageId, StageOutput};
use crate::errors::ValidationError;

/// One pass through the pipeline for one business.
///
/// A stage slot is only ever filled when every earlier slot is filled, and
/// filling a slot clears every later one. The business context is fixed for
/// the life of the run.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineRun {
    identity: RunIdentity,
    variant: PipelineVariant,
    context: BusinessContext,
    tone: Option<ToneSelection>,
    outputs: [Option<StageOutput>; 4],
}

impl PipelineRun {
    pub(crate) fn new(context: BusinessContext, variant: PipelineVariant) -> Self {
        Self {
            identity: RunIdentity::new(),
            variant,
            context,
            tone: None,
            outputs: Default::default(),
        }
    }

    /// The run's identity.
    #[must_use]
    pub fn identity(&self) -> &RunIdentity {
        &self.identity
    }

    /// The run ID.
    #[must_use]
    pub fn run_id(&self) -> Uuid {
        self.identity.run_id
    }

    /// The variant this run follows.
    #[must_use]
    pub fn variant(&self) -> PipelineVariant {
        self.variant
    }

    /// The business context captured at the start of the run.
    #[must_use]
    pub fn context(&self) -> &BusinessContext {
        &self.context
    }

    /// The tone fixed by the enhancement stage, if it has run.
    #[must_use]
    pub fn tone(&self) -> Option<ToneSelection> {
        self.tone
    }

    /// Current position in the forward state machine.
    #[must_use]
    pub fn state(&self) -> RunState {
        StageId::ALL
            .into_iter()
            .take_while(|stage| self.has_output(*stage))
            .last()
            .map_or(RunState::Idle, StageId::ready_state)
    }

    /// The output of a stage, if present.
    #[must_use]
    pub fn output(&self, stage: StageId) -> Option<&StageOutput> {
        self.outputs[stage.index()].as_ref()
    }

    /// Returns true if the stage has output.
    #[must_use]
    pub fn has_output(&self, stage: StageId) -> bool {
        self.outputs[stage.index()].is_some()
    }

    /// The text output of a text stage.
    #[must_use]
    pub fn text(&self, stage: StageId) -> Option<&str> {
        self.output(stage).and_then(StageOutput::as_text)
    }

    /// Stage 1 text.
    #[must_use]
    pub fn briefing(&self) -> Option<&str> {
        self.text(StageId::Briefing)
    }

    /// Stage 2 text.
    #[must_use]
    pub fn enhancement(&self) -> Option<&str> {
        self.text(StageId::Enhancement)
    }

    /// Stage 3 text, including any user edits.
    #[must_use]
    pub fn image_prompt(&self) -> Option<&str> {
        self.text(StageId::ImagePrompt)
    }

    /// The generated image.
    #[must_use]
    pub fn image(&self) -> Option<&ImageArtifact> {
        self.output(StageId::Image).and_then(StageOutput::as_image)
    }

    /// The text a stage consumes, or `StageNotReady` if it is missing.
    pub(crate) fn upstream_text(&self, stage: StageId) -> Result<&str, ValidationError> {
        match stage.upstream() {
            None => Ok(""),
            Some(requires) => self
                .text(requires)
                .ok_or(ValidationError::StageNotReady { stage, requires }),
        }
    }

    /// Stores an output and clears every later stage. Returns the stages
    /// whose output was cleared, and the stored output.
    pub(crate) fn set_output(&mut self, output: StageOutput) -> (Vec<StageId>, &StageOutput) {
        let stage = output.stage();
        debug_assert!(stage.upstream().map_or(true, |up| self.has_output(up)));
        let cleared = self.invalidate_after(stage);
        (cleared, self.outputs[stage.index()].insert(output))
    }

    /// Clears every stage after `stage`. Returns the stages that had output.
    pub(crate) fn invalidate_after(&mut self, stage: StageId) -> Vec<StageId> {
        stage
            .downstream()
            .iter()
            .copied()
            .filter(|later| self.outputs[later.index()].take().is_some())
            .collect()
    }

    /// Fails if a different tone is already fixed for the run.
    pub(crate) fn check_tone(&self, tone: ToneSelection) -> Result<(), ValidationError> {
        match self.tone {
            Some(locked) if locked != tone => Err(ValidationError::ToneLocked {
                locked,
                requested: tone,
            }),
            _ => Ok(()),
        }
    }

    /// Fixes the tone for the run. The same tone may be given again.
    pub(crate) fn lock_tone(&mut self, tone: ToneSelection) -> Result<(), ValidationError> {
        self.check_tone(tone)?;
        self.tone = Some(tone);
        Ok(())
    }

    pub(crate) fn clear_tone(&mut self) {
        self.tone = None;
    }

    pub(crate) fn set_session_id(&mut self, session_id: Uuid) {
        self.identity.session_id = Some(session_id);
    }
}
