//! Drives a [`PipelineRun`] through its four stages.

use std::num::NonZeroU32;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::{extract_image_prompt, PipelineRun};
use crate::clients::{
    CompletionClient, CompletionRequest, ImageClient, InferenceImageClient, OpenAiCompatibleClient,
};
use crate::config::{BrandflowConfig, Capabilities};
use crate::context::{BusinessContext, PipelineVariant, StageBudgets, ToneSelection};
use crate::core::{ImageArtifact, StageEvent, StageId, StageOutput};
use crate::errors::{BrandflowError, ConfigError, ValidationError};
use crate::events::{EventSink, NoOpEventSink};
use crate::observability::SpanTimer;
use crate::prompts::{self, LANDMARK_COUNT};

/// Builder for [`Pipeline`].
///
/// Clients default to the HTTP adapters built from the configuration; tests
/// inject their own.
pub struct PipelineBuilder {
    config: BrandflowConfig,
    completion: Option<Arc<dyn CompletionClient>>,
    image: Option<Arc<dyn ImageClient>>,
    events: Option<Arc<dyn EventSink>>,
}

impl std::fmt::Debug for PipelineBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineBuilder")
            .field("config", &self.config)
            .field("has_completion_client", &self.completion.is_some())
            .field("has_image_client", &self.image.is_some())
            .field("has_event_sink", &self.events.is_some())
            .finish()
    }
}

impl PipelineBuilder {
    /// Creates a builder for the given configuration.
    #[must_use]
    pub fn new(config: BrandflowConfig) -> Self {
        Self {
            config,
            completion: None,
            image: None,
            events: None,
        }
    }

    /// Uses a custom completion client.
    #[must_use]
    pub fn with_completion_client(mut self, client: Arc<dyn CompletionClient>) -> Self {
        self.completion = Some(client);
        self
    }

    /// Uses a custom image client. The image stage is then enabled
    /// regardless of the configured token.
    #[must_use]
    pub fn with_image_client(mut self, client: Arc<dyn ImageClient>) -> Self {
        self.image = Some(client);
        self
    }

    /// Sets the event sink.
    #[must_use]
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.events = Some(sink);
        self
    }

    /// Builds the pipeline.
    pub fn build(self) -> Result<Pipeline, BrandflowError> {
        self.config.validate()?;
        let capabilities = self.config.capabilities();

        let (completion, completion_enabled) = match self.completion {
            Some(client) => (client, true),
            None => {
                let client: Arc<dyn CompletionClient> =
                    Arc::new(OpenAiCompatibleClient::new(&self.config.completion)?);
                (client, capabilities.completion)
            }
        };
        let (image, image_enabled) = match self.image {
            Some(client) => (client, true),
            None => {
                let client: Arc<dyn ImageClient> =
                    Arc::new(InferenceImageClient::new(&self.config.image)?);
                (client, capabilities.image_generation)
            }
        };
        let capabilities = Capabilities {
            completion: completion_enabled,
            image_generation: image_enabled,
        };
        for warning in capabilities.warnings() {
            warn!(warning = %warning, "Pipeline running with reduced capabilities");
        }

        Ok(Pipeline {
            completion,
            image,
            events: self.events.unwrap_or_else(|| Arc::new(NoOpEventSink)),
            model: self.config.completion.model.clone(),
            budgets: self.config.budgets,
            variant: self.config.variant,
            capabilities,
        })
    }
}

/// The stage orchestrator.
///
/// Holds nothing per run: every operation takes the run by `&mut`, so one
/// pipeline serves any number of sessions and a single run never has two
/// transitions in flight.
pub struct Pipeline {
    completion: Arc<dyn CompletionClient>,
    image: Arc<dyn ImageClient>,
    events: Arc<dyn EventSink>,
    model: String,
    budgets: Option<StageBudgets>,
    variant: PipelineVariant,
    capabilities: Capabilities,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("model", &self.model)
            .field("variant", &self.variant)
            .field("capabilities", &self.capabilities)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    /// Builds a pipeline with the HTTP clients described by `config`.
    pub fn from_config(config: BrandflowConfig) -> Result<Self, BrandflowError> {
        PipelineBuilder::new(config).build()
    }

    /// The configured default variant.
    #[must_use]
    pub fn variant(&self) -> PipelineVariant {
        self.variant
    }

    /// What this pipeline can do with its credentials.
    #[must_use]
    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// Token budgets used for runs of `variant`.
    #[must_use]
    pub fn budgets(&self, variant: PipelineVariant) -> StageBudgets {
        self.budgets.unwrap_or_else(|| variant.default_budgets())
    }

    /// Validates the context, creates a run and produces its briefing.
    ///
    /// No run is returned if validation or the first stage fails.
    pub async fn start(
        &self,
        context: BusinessContext,
        variant: PipelineVariant,
    ) -> Result<PipelineRun, BrandflowError> {
        context.validate(variant)?;
        let mut run = PipelineRun::new(context, variant);
        info!(run_id = %run.run_id(), variant = %variant, "Run created");
        self.generate_briefing(&mut run).await?;
        Ok(run)
    }

    /// Runs stage 1 for the stored context. On success the tone and every
    /// later output are cleared.
    pub async fn generate_briefing<'r>(
        &self,
        run: &'r mut PipelineRun,
    ) -> Result<&'r StageOutput, BrandflowError> {
        let text = self.complete_stage(run, StageId::Briefing, None).await?;

        if run.variant() == PipelineVariant::CampaignBriefing {
            let missing = prompts::missing_briefing_sections(&text);
            if !missing.is_empty() {
                warn!(run_id = %run.run_id(), ?missing, "Briefing is missing sections");
            }
            if let Some(tone) = prompts::recommended_tone(&text) {
                debug!(run_id = %run.run_id(), recommended_tone = %tone, "Briefing recommended a tone");
            }
        }

        run.clear_tone();
        Ok(self.commit(run, StageOutput::text(StageId::Briefing, text)).await)
    }

    /// Runs stage 2 with the user's tone, which is then fixed for the run.
    pub async fn enhance<'r>(
        &self,
        run: &'r mut PipelineRun,
        tone: ToneSelection,
    ) -> Result<&'r StageOutput, BrandflowError> {
        run.upstream_text(StageId::Enhancement)?;
        run.check_tone(tone)?;

        let text = self.complete_stage(run, StageId::Enhancement, Some(tone)).await?;

        let landmarks = prompts::extract_landmarks(&text);
        if landmarks.len() != LANDMARK_COUNT {
            warn!(
                run_id = %run.run_id(),
                found = landmarks.len(),
                expected = LANDMARK_COUNT,
                "Enhancement did not list the expected landmarks"
            );
        }

        run.lock_tone(tone)?;
        Ok(self.commit(run, StageOutput::text(StageId::Enhancement, text)).await)
    }

    /// Runs stage 3.
    pub async fn generate_image_prompt<'r>(
        &self,
        run: &'r mut PipelineRun,
    ) -> Result<&'r StageOutput, BrandflowError> {
        let text = self.complete_stage(run, StageId::ImagePrompt, None).await?;
        Ok(self.commit(run, StageOutput::text(StageId::ImagePrompt, text)).await)
    }

    /// Replaces the stage 3 text with the user's edit and clears the image.
    pub async fn edit_image_prompt<'r>(
        &self,
        run: &'r mut PipelineRun,
        text: impl Into<String>,
    ) -> Result<&'r StageOutput, BrandflowError> {
        if !run.has_output(StageId::ImagePrompt) {
            return Err(ValidationError::NothingToEdit {
                stage: StageId::ImagePrompt,
            }
            .into());
        }
        let text = text.into();
        if text.trim().is_empty() {
            return Err(ValidationError::EmptyPrompt.into());
        }
        info!(run_id = %run.run_id(), chars = text.len(), "Image prompt edited");
        Ok(self.commit(run, StageOutput::text(StageId::ImagePrompt, text)).await)
    }

    /// Runs stage 4 on the prompt extracted from the current stage 3 text.
    pub async fn generate_image<'r>(
        &self,
        run: &'r mut PipelineRun,
    ) -> Result<&'r StageOutput, BrandflowError> {
        let stage = StageId::Image;
        let source = run.upstream_text(stage)?;
        if !self.capabilities.image_generation {
            warn!(run_id = %run.run_id(), "Image generation requested without a token");
            return Err(ConfigError::MissingImageToken.into());
        }
        let prompt = extract_image_prompt(source);
        if prompt.trim().is_empty() {
            return Err(ValidationError::EmptyPrompt.into());
        }

        let run_id = run.identity().run_id_str();
        self.events.emit(&StageEvent::started(stage, &run_id)).await;
        info!(stage = %stage, run_id = %run_id, prompt_chars = prompt.len(), "Stage started");
        let timer = SpanTimer::start(stage);

        match self.image.generate_image(&prompt).await {
            Ok(bytes) => {
                let duration_ms = timer.finish();
                let artifact = ImageArtifact::png(bytes, run.variant().artifact_file_name(), prompt);
                info!(
                    stage = %stage,
                    run_id = %run_id,
                    duration_ms,
                    bytes = artifact.byte_count(),
                    "Stage completed"
                );
                self.events
                    .emit(&StageEvent::completed(stage, &run_id, duration_ms, artifact.byte_count()))
                    .await;
                Ok(self.commit(run, StageOutput::image(artifact)).await)
            }
            Err(source) => {
                let err = BrandflowError::Image(source);
                self.report_failure(stage, &run_id, &err).await;
                Err(err)
            }
        }
    }

    /// Re-runs a stage that already has output, using the stored upstream
    /// outputs. Later stages are cleared on success; on failure the run is
    /// unchanged.
    pub async fn regenerate<'r>(
        &self,
        run: &'r mut PipelineRun,
        stage: StageId,
    ) -> Result<&'r StageOutput, BrandflowError> {
        if !run.has_output(stage) {
            return Err(ValidationError::NothingToRegenerate { stage }.into());
        }
        info!(stage = %stage, run_id = %run.run_id(), "Regenerating stage");

        match stage {
            StageId::Briefing => self.generate_briefing(run).await,
            StageId::Enhancement => {
                let tone = run.tone().ok_or(ValidationError::StageNotReady {
                    stage,
                    requires: StageId::Enhancement,
                })?;
                self.enhance(run, tone).await
            }
            StageId::ImagePrompt => self.generate_image_prompt(run).await,
            StageId::Image => self.generate_image(run).await,
        }
    }

    /// Renders the prompt for a text stage and issues the completion call.
    async fn complete_stage(
        &self,
        run: &PipelineRun,
        stage: StageId,
        tone: Option<ToneSelection>,
    ) -> Result<String, BrandflowError> {
        let (prompt, max_tokens) = self.render(run, stage, tone)?;
        if !self.capabilities.completion {
            warn!(stage = %stage, run_id = %run.run_id(), "Text generation requested without an API key");
            return Err(ConfigError::MissingCompletionKey.into());
        }
        let request = CompletionRequest::new(prompt, self.model.as_str(), max_tokens);

        let run_id = run.identity().run_id_str();
        self.events.emit(&StageEvent::started(stage, &run_id)).await;
        info!(stage = %stage, run_id = %run_id, "Stage started");
        debug!(
            stage = %stage,
            prompt_chars = request.prompt.len(),
            max_tokens = max_tokens.get(),
            "Rendered stage prompt"
        );
        let timer = SpanTimer::start(stage);

        match self.completion.complete(&request).await {
            Ok(text) => {
                let duration_ms = timer.finish();
                info!(stage = %stage, run_id = %run_id, duration_ms, chars = text.len(), "Stage completed");
                self.events
                    .emit(&StageEvent::completed(stage, &run_id, duration_ms, text.len()))
                    .await;
                Ok(text)
            }
            Err(source) => {
                let err = BrandflowError::completion(stage, source);
                self.report_failure(stage, &run_id, &err).await;
                Err(err)
            }
        }
    }

    fn render(
        &self,
        run: &PipelineRun,
        stage: StageId,
        tone: Option<ToneSelection>,
    ) -> Result<(String, NonZeroU32), ValidationError> {
        let budgets = self.budgets(run.variant());
        let ctx = run.context();
        let campaign = run.variant() == PipelineVariant::CampaignBriefing;
        let upstream = run.upstream_text(stage)?;
        let locked_tone = || {
            tone.or(run.tone()).ok_or(ValidationError::StageNotReady {
                stage,
                requires: StageId::Enhancement,
            })
        };

        let rendered = match stage {
            StageId::Briefing if campaign => (prompts::briefing_prompt(ctx), budgets.briefing),
            StageId::Briefing => (
                prompts::expansion_prompt(&ctx.idea, &ctx.location),
                budgets.briefing,
            ),
            StageId::Enhancement if campaign => (
                prompts::enhancement_prompt(upstream, locked_tone()?, &ctx.location),
                budgets.enhancement,
            ),
            StageId::Enhancement => (
                prompts::idea_enhancement_prompt(upstream, locked_tone()?, &ctx.location),
                budgets.enhancement,
            ),
            StageId::ImagePrompt if !campaign => (
                prompts::basic_image_prompt_prompt(upstream, locked_tone()?, &ctx.location),
                budgets.image_prompt,
            ),
            StageId::ImagePrompt => (
                prompts::image_prompt_prompt(
                    upstream,
                    locked_tone()?,
                    &ctx.location,
                    &ctx.deliverables,
                ),
                budgets.image_prompt,
            ),
            StageId::Image => {
                return Err(ValidationError::StageNotReady {
                    stage,
                    requires: StageId::ImagePrompt,
                })
            }
        };
        Ok(rendered)
    }

    /// Stores an output, reporting any later outputs it invalidated.
    async fn commit<'r>(&self, run: &'r mut PipelineRun, output: StageOutput) -> &'r StageOutput {
        let stage = output.stage();
        let run_id = run.identity().run_id_str();
        let (cleared, stored) = run.set_output(output);
        if !cleared.is_empty() {
            info!(stage = %stage, run_id = %run_id, ?cleared, "Invalidated downstream outputs");
            self.events
                .emit(&StageEvent::invalidated(stage, &cleared, &run_id))
                .await;
        }
        stored
    }

    async fn report_failure(&self, stage: StageId, run_id: &str, err: &BrandflowError) {
        let recoverable = err.is_recoverable();
        if recoverable {
            warn!(stage = %stage, run_id = %run_id, kind = %err.kind(), error = %err, "Stage failed, retry later");
        } else {
            error!(stage = %stage, run_id = %run_id, kind = %err.kind(), error = %err, "Stage failed");
        }
        self.events
            .emit(&StageEvent::failed(stage, run_id, &err.to_string(), recoverable))
            .await;
    }
}
