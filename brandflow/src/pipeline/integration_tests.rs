//! End-to-end tests for stage orchestration.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pretty_assertions::assert_eq;

    use crate::clients::{MockCompletionClient, MockImageClient};
    use crate::config::BrandflowConfig;
    use crate::context::{Deliverable, PipelineVariant, ToneSelection};
    use crate::core::{RunState, StageEventKind, StageId, IMAGE_MIME_TYPE};
    use crate::errors::{BrandflowError, CompletionError, ConfigError, ErrorKind, ImageError, ValidationError};
    use crate::events::CollectingEventSink;
    use crate::pipeline::{PipelineBuilder, PipelineRun};
    use crate::session::SessionStore;
    use crate::testing::{
        assert_briefing_sections, assert_call_sequence, assert_cleared_after, assert_has_marker,
        assert_landmark_count, assert_run_state, coffee_shop_context, idea_context, CallLog,
        RecordedCall, ScriptedCompletionClient, TestHarness, BRIEFING_TEXT, ENHANCEMENT_TEXT,
        IMAGE_PROMPT_BODY, IMAGE_PROMPT_TEXT, PNG_BYTES, SCENARIO_TONE,
    };

    async fn run_to_image(harness: &TestHarness) -> PipelineRun {
        let pipeline = &harness.pipeline;
        let mut run = pipeline
            .start(coffee_shop_context(), PipelineVariant::CampaignBriefing)
            .await
            .unwrap();
        pipeline.enhance(&mut run, SCENARIO_TONE).await.unwrap();
        pipeline.generate_image_prompt(&mut run).await.unwrap();
        pipeline.generate_image(&mut run).await.unwrap();
        run
    }

    #[tokio::test]
    async fn test_coffee_shop_scenario_end_to_end() {
        let harness = TestHarness::scenario().unwrap();
        let pipeline = &harness.pipeline;

        let mut run = pipeline
            .start(coffee_shop_context(), PipelineVariant::CampaignBriefing)
            .await
            .unwrap();
        assert_run_state(&run, RunState::BriefingReady);
        assert_briefing_sections(run.briefing().unwrap());

        let output = pipeline.enhance(&mut run, SCENARIO_TONE).await.unwrap();
        assert_landmark_count(output.as_text().unwrap());
        assert_eq!(run.tone(), Some(ToneSelection::WatercolorArt));

        let output = pipeline.generate_image_prompt(&mut run).await.unwrap();
        assert_has_marker(output.as_text().unwrap());

        let output = pipeline.generate_image(&mut run).await.unwrap();
        let artifact = output.as_image().unwrap();
        assert!(artifact.looks_like_png());
        assert_eq!(artifact.bytes, PNG_BYTES);
        assert_eq!(artifact.mime_type, IMAGE_MIME_TYPE);
        assert_eq!(artifact.file_name, "campaign_marketing_visual.png");
        assert_eq!(artifact.prompt, IMAGE_PROMPT_BODY);
        assert_run_state(&run, RunState::ImageReady);

        let calls = harness.log.calls();
        assert_call_sequence(&calls, 3, 1);
        assert!(calls[0].prompt().contains("- Business Name: Brew & Code Coffee"));
        assert!(calls[1].prompt().contains(BRIEFING_TEXT));
        assert!(calls[1].prompt().contains("User-Selected Tone: Watercolor Art"));
        assert!(calls[2].prompt().contains(ENHANCEMENT_TEXT));
        assert!(calls[2].prompt().contains("Target Deliverables: Static Social Ads, Email Newsletter Design"));
        assert_eq!(calls[3], RecordedCall::Image(IMAGE_PROMPT_BODY.to_string()));
    }

    #[tokio::test]
    async fn test_campaign_token_budgets() {
        let harness = TestHarness::scenario().unwrap();
        run_to_image(&harness).await;

        let budgets: Vec<u32> = harness
            .completion
            .requests()
            .iter()
            .map(|r| r.max_tokens.get())
            .collect();
        assert_eq!(budgets, vec![800, 800, 900]);
    }

    #[tokio::test]
    async fn test_lifecycle_events() {
        let harness = TestHarness::scenario().unwrap();
        run_to_image(&harness).await;

        assert_eq!(harness.events.events_of_type("stage.started").len(), 4);
        assert_eq!(harness.events.events_of_type("stage.completed").len(), 4);
        assert!(harness.events.events_of_type("stage.failed").is_empty());
        assert!(harness.events.events_of_type("stage.invalidated").is_empty());

        let types = harness.events.event_types();
        assert_eq!(types[0], "stage.started");
        assert_eq!(types[1], "stage.completed");
    }

    #[tokio::test]
    async fn test_stage_cannot_skip_ahead() {
        let harness = TestHarness::scenario().unwrap();
        let pipeline = &harness.pipeline;
        let mut run = pipeline
            .start(coffee_shop_context(), PipelineVariant::CampaignBriefing)
            .await
            .unwrap();

        let err = pipeline.generate_image(&mut run).await.unwrap_err();
        assert!(matches!(
            err,
            BrandflowError::Validation(ValidationError::StageNotReady {
                stage: StageId::Image,
                requires: StageId::ImagePrompt
            })
        ));
        let err = pipeline.generate_image_prompt(&mut run).await.unwrap_err();
        assert_eq!(err.stage(), Some(StageId::ImagePrompt));

        assert_eq!(harness.log.len(), 1);
        assert_run_state(&run, RunState::BriefingReady);
    }

    #[tokio::test]
    async fn test_regenerate_enhancement_clears_downstream_only() {
        let harness = TestHarness::scenario().unwrap();
        let mut run = run_to_image(&harness).await;
        harness.completion.push_reply("ENHANCED STRATEGIC ANALYSIS:\nSecond take.");

        let output = harness
            .pipeline
            .regenerate(&mut run, StageId::Enhancement)
            .await
            .unwrap();
        assert_eq!(output.as_text(), Some("ENHANCED STRATEGIC ANALYSIS:\nSecond take."));

        assert_eq!(run.briefing(), Some(BRIEFING_TEXT));
        assert_cleared_after(&run, StageId::Enhancement);
        assert_run_state(&run, RunState::EnhancementReady);
        assert_eq!(run.tone(), Some(SCENARIO_TONE));

        let invalidated = harness.events.events_of_type("stage.invalidated");
        assert_eq!(invalidated.len(), 1);
        assert_eq!(invalidated[0].stage, StageId::Enhancement);
        assert_eq!(
            invalidated[0].kind,
            StageEventKind::Invalidated {
                stages: vec![StageId::ImagePrompt, StageId::Image]
            }
        );

        let last = harness.log.last().unwrap();
        assert!(last.prompt().contains(BRIEFING_TEXT));
        assert!(last.prompt().contains("Watercolor Art"));
    }

    #[tokio::test]
    async fn test_regenerate_image_keeps_text_stages() {
        let harness = TestHarness::scenario().unwrap();
        let mut run = run_to_image(&harness).await;
        harness.image.push_image(vec![0x89, b'P', b'N', b'G', 1, 2, 3]);

        harness.pipeline.regenerate(&mut run, StageId::Image).await.unwrap();
        assert_eq!(run.image().unwrap().byte_count(), 7);
        assert_eq!(run.image_prompt(), Some(IMAGE_PROMPT_TEXT));
        assert_eq!(run.enhancement(), Some(ENHANCEMENT_TEXT));
        assert_eq!(run.briefing(), Some(BRIEFING_TEXT));
    }

    #[tokio::test]
    async fn test_failed_regenerate_leaves_run_unchanged() {
        let harness = TestHarness::scenario().unwrap();
        let mut run = run_to_image(&harness).await;
        let before = run.clone();
        harness
            .completion
            .push_error(CompletionError::Transport("connection reset".to_string()));

        let err = harness
            .pipeline
            .regenerate(&mut run, StageId::ImagePrompt)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(err.stage(), Some(StageId::ImagePrompt));

        assert_run_state(&run, RunState::ImageReady);
        for stage in StageId::ALL {
            assert_eq!(run.output(stage), before.output(stage));
        }

        let failed = harness.events.events_of_type("stage.failed");
        assert_eq!(failed.len(), 1);
        assert!(!failed[0].is_recoverable_failure());
    }

    #[tokio::test]
    async fn test_regenerate_requires_existing_output() {
        let harness = TestHarness::scenario().unwrap();
        let mut run = harness
            .pipeline
            .start(coffee_shop_context(), PipelineVariant::CampaignBriefing)
            .await
            .unwrap();

        let err = harness
            .pipeline
            .regenerate(&mut run, StageId::ImagePrompt)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            BrandflowError::Validation(ValidationError::NothingToRegenerate {
                stage: StageId::ImagePrompt
            })
        ));
    }

    #[tokio::test]
    async fn test_deliverable_gate_blocks_start() {
        let harness = TestHarness::scenario().unwrap();
        for deliverables in [
            vec![],
            vec![Deliverable::CopyDeck],
            vec![Deliverable::CopyDeck, Deliverable::PressKit, Deliverable::WebsiteBanner],
        ] {
            let count = deliverables.len();
            let err = harness
                .pipeline
                .start(
                    coffee_shop_context().with_deliverables(deliverables),
                    PipelineVariant::CampaignBriefing,
                )
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                BrandflowError::Validation(ValidationError::DeliverableCount { expected: 2, actual })
                    if actual == count
            ));
        }
        assert!(harness.log.is_empty());
    }

    #[tokio::test]
    async fn test_tone_locked_until_new_briefing() {
        let harness = TestHarness::scenario().unwrap();
        let pipeline = &harness.pipeline;
        let mut run = pipeline
            .start(coffee_shop_context(), PipelineVariant::CampaignBriefing)
            .await
            .unwrap();
        pipeline.enhance(&mut run, SCENARIO_TONE).await.unwrap();

        let err = pipeline
            .enhance(&mut run, ToneSelection::AnimeStyle)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            BrandflowError::Validation(ValidationError::ToneLocked {
                locked: ToneSelection::WatercolorArt,
                requested: ToneSelection::AnimeStyle
            })
        ));
        assert_eq!(harness.log.len(), 2);

        harness.completion.push_reply(BRIEFING_TEXT);
        harness.completion.push_reply(ENHANCEMENT_TEXT);
        pipeline.regenerate(&mut run, StageId::Briefing).await.unwrap();
        assert_eq!(run.tone(), None);
        assert_cleared_after(&run, StageId::Briefing);

        pipeline.enhance(&mut run, ToneSelection::AnimeStyle).await.unwrap();
        assert_eq!(run.tone(), Some(ToneSelection::AnimeStyle));
    }

    #[tokio::test]
    async fn test_failed_enhancement_does_not_lock_tone() {
        let harness = TestHarness::new(BrandflowConfig::new()).unwrap();
        harness.completion.push_reply(BRIEFING_TEXT);
        harness.completion.push_error(CompletionError::Upstream {
            status: 502,
            detail: "bad gateway".to_string(),
        });
        harness.completion.push_reply(ENHANCEMENT_TEXT);

        let pipeline = &harness.pipeline;
        let mut run = pipeline
            .start(coffee_shop_context(), PipelineVariant::CampaignBriefing)
            .await
            .unwrap();
        let err = pipeline.enhance(&mut run, SCENARIO_TONE).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Upstream);
        assert_eq!(run.tone(), None);
        assert_run_state(&run, RunState::BriefingReady);

        pipeline.enhance(&mut run, ToneSelection::VintagePoster).await.unwrap();
        assert_eq!(run.tone(), Some(ToneSelection::VintagePoster));
    }

    fn text_only_harness() -> TestHarness {
        let harness = TestHarness::new(BrandflowConfig::new()).unwrap();
        harness.completion.push_reply(BRIEFING_TEXT);
        harness.completion.push_reply(ENHANCEMENT_TEXT);
        harness.completion.push_reply(IMAGE_PROMPT_TEXT);
        harness
    }

    async fn run_to_image_prompt(harness: &TestHarness) -> PipelineRun {
        let pipeline = &harness.pipeline;
        let mut run = pipeline
            .start(coffee_shop_context(), PipelineVariant::CampaignBriefing)
            .await
            .unwrap();
        pipeline.enhance(&mut run, SCENARIO_TONE).await.unwrap();
        pipeline.generate_image_prompt(&mut run).await.unwrap();
        run
    }

    #[tokio::test]
    async fn test_image_503_is_recoverable_and_500_is_not() {
        let harness = text_only_harness();
        harness.image.push_error(ImageError::ModelLoading);
        harness.image.push_error(ImageError::Upstream {
            status: 500,
            detail: "internal error".to_string(),
        });
        harness.image.push_image(PNG_BYTES);
        let mut run = run_to_image_prompt(&harness).await;

        let err = harness.pipeline.generate_image(&mut run).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ModelLoading);
        assert!(err.is_recoverable());
        assert_eq!(
            err.user_message(),
            "Image generation model is loading. Please try again shortly."
        );
        assert_run_state(&run, RunState::ImagePromptReady);

        let err = harness.pipeline.generate_image(&mut run).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Upstream);
        assert!(!err.is_recoverable());
        assert_run_state(&run, RunState::ImagePromptReady);

        harness.pipeline.generate_image(&mut run).await.unwrap();
        assert_run_state(&run, RunState::ImageReady);

        let failed = harness.events.events_of_type("stage.failed");
        assert_eq!(failed.len(), 2);
        assert!(failed[0].is_recoverable_failure());
        assert!(!failed[1].is_recoverable_failure());
        assert!(failed.iter().all(|e| e.stage == StageId::Image));

        let image_calls = harness.log.calls().into_iter().filter(RecordedCall::is_image).count();
        assert_eq!(image_calls, 3);
    }

    #[tokio::test]
    async fn test_missing_image_token_degrades_to_text_only() {
        let log = CallLog::new();
        let completion = Arc::new(
            ScriptedCompletionClient::new(log.clone())
                .with_reply(BRIEFING_TEXT)
                .with_reply(ENHANCEMENT_TEXT)
                .with_reply(IMAGE_PROMPT_TEXT),
        );
        let config = BrandflowConfig::new().with_image_token("your_hugging_face_token_here");
        let pipeline = PipelineBuilder::new(config)
            .with_completion_client(completion)
            .build()
            .unwrap();
        assert!(pipeline.capabilities().completion);
        assert!(!pipeline.capabilities().image_generation);

        let mut run = pipeline
            .start(coffee_shop_context(), PipelineVariant::CampaignBriefing)
            .await
            .unwrap();
        pipeline.enhance(&mut run, SCENARIO_TONE).await.unwrap();
        pipeline.generate_image_prompt(&mut run).await.unwrap();

        let err = pipeline.generate_image(&mut run).await.unwrap_err();
        assert!(matches!(err, BrandflowError::Config(ConfigError::MissingImageToken)));
        assert_eq!(err.stage(), Some(StageId::Image));
        assert!(err.user_message().contains("HF_TOKEN"));
        assert_run_state(&run, RunState::ImagePromptReady);
        assert_eq!(log.len(), 3);
    }

    #[tokio::test]
    async fn test_edited_image_prompt_is_sent_verbatim() {
        let harness = TestHarness::scenario().unwrap();
        harness.image.push_image(PNG_BYTES);
        let mut run = run_to_image(&harness).await;

        let edited = "A minimalist poster of a cafe under the Congress Avenue Bridge bats";
        harness
            .pipeline
            .edit_image_prompt(&mut run, edited)
            .await
            .unwrap();
        assert_eq!(run.image_prompt(), Some(edited));
        assert_cleared_after(&run, StageId::ImagePrompt);

        harness.pipeline.generate_image(&mut run).await.unwrap();
        assert_eq!(harness.log.last(), Some(RecordedCall::Image(edited.to_string())));
        assert_eq!(run.image().unwrap().prompt, edited);
    }

    #[tokio::test]
    async fn test_edit_requires_image_prompt() {
        let harness = TestHarness::scenario().unwrap();
        let mut run = harness
            .pipeline
            .start(coffee_shop_context(), PipelineVariant::CampaignBriefing)
            .await
            .unwrap();

        let err = harness
            .pipeline
            .edit_image_prompt(&mut run, "anything")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            BrandflowError::Validation(ValidationError::NothingToEdit {
                stage: StageId::ImagePrompt
            })
        ));

        harness.pipeline.enhance(&mut run, SCENARIO_TONE).await.unwrap();
        harness.pipeline.generate_image_prompt(&mut run).await.unwrap();
        let err = harness
            .pipeline
            .edit_image_prompt(&mut run, "   ")
            .await
            .unwrap_err();
        assert!(matches!(err, BrandflowError::Validation(ValidationError::EmptyPrompt)));
        assert_eq!(run.image_prompt(), Some(IMAGE_PROMPT_TEXT));
        assert_run_state(&run, RunState::ImagePromptReady);
        assert_eq!(harness.completion.remaining(), 0);
    }

    #[tokio::test]
    async fn test_idea_expansion_variant() {
        let harness = TestHarness::new(
            BrandflowConfig::new().with_variant(PipelineVariant::IdeaExpansion),
        )
        .unwrap();
        harness.completion.push_reply("Brew & Code is a coffee shop for remote workers.");
        harness.completion.push_reply(ENHANCEMENT_TEXT);
        harness.completion.push_reply(IMAGE_PROMPT_TEXT);
        harness.image.push_image(PNG_BYTES);

        let pipeline = &harness.pipeline;
        let context = idea_context().with_deliverables(vec![Deliverable::CopyDeck]);
        let mut run = pipeline
            .start(context, pipeline.variant())
            .await
            .unwrap();
        pipeline.enhance(&mut run, ToneSelection::CartoonStyle).await.unwrap();
        pipeline.generate_image_prompt(&mut run).await.unwrap();
        let output = pipeline.generate_image(&mut run).await.unwrap();
        assert_eq!(
            output.as_image().unwrap().file_name,
            "location_marketing_visual.png"
        );

        let requests = harness.completion.requests();
        let budgets: Vec<u32> = requests.iter().map(|r| r.max_tokens.get()).collect();
        assert_eq!(budgets, vec![1000, 600, 700]);
        assert!(requests[0].prompt.contains("Business idea: A coffee shop for remote workers"));
        assert!(requests[1].prompt.contains("using a cartoon style approach"));
        assert!(requests[2].prompt.contains("DETAILED IMAGE GENERATION PROMPT (500 words)"));
        assert!(!requests[2].prompt.contains("DELIVERABLE OPTIMIZATION:"));
        assert!(!requests[2].prompt.contains("Copy Deck"));
        assert!(requests.iter().all(|r| r.model == crate::config::DEFAULT_MODEL));
    }

    #[tokio::test]
    async fn test_missing_completion_key_blocks_text_stages() {
        let mut image = MockImageClient::new();
        image.expect_generate_image().times(0);
        let events = Arc::new(CollectingEventSink::new());
        let pipeline = PipelineBuilder::new(BrandflowConfig::new().with_api_key("your_openai_api_key_here"))
            .with_image_client(Arc::new(image))
            .with_event_sink(events.clone())
            .build()
            .unwrap();
        assert!(!pipeline.capabilities().completion);
        assert!(pipeline.capabilities().image_generation);

        let err = pipeline
            .start(coffee_shop_context(), PipelineVariant::CampaignBriefing)
            .await
            .unwrap_err();
        assert!(matches!(err, BrandflowError::Config(ConfigError::MissingCompletionKey)));
        assert_eq!(err.kind(), ErrorKind::Config);
        assert!(!err.is_recoverable());
        assert!(err.user_message().contains("OPENAI_API_KEY"));
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn test_idea_variant_requires_idea() {
        let harness = TestHarness::new(BrandflowConfig::new()).unwrap();
        let err = harness
            .pipeline
            .start(coffee_shop_context().with_idea(""), PipelineVariant::IdeaExpansion)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            BrandflowError::Validation(ValidationError::MissingField { field: "idea" })
        ));
    }

    #[tokio::test]
    async fn test_auth_failure_in_first_stage_produces_no_run() {
        let mut completion = MockCompletionClient::new();
        completion
            .expect_complete()
            .times(1)
            .returning(|_| Err(CompletionError::Auth("Invalid API key".to_string())));
        let mut image = MockImageClient::new();
        image.expect_generate_image().times(0);

        let pipeline = PipelineBuilder::new(BrandflowConfig::new())
            .with_completion_client(Arc::new(completion))
            .with_image_client(Arc::new(image))
            .build()
            .unwrap();

        let err = pipeline
            .start(coffee_shop_context(), PipelineVariant::CampaignBriefing)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Auth);
        assert_eq!(err.stage(), Some(StageId::Briefing));
        assert!(matches!(
            err,
            BrandflowError::Completion {
                stage: StageId::Briefing,
                source: CompletionError::Auth(_)
            }
        ));
    }

    #[tokio::test]
    async fn test_mock_image_client_receives_extracted_prompt() {
        let log = CallLog::new();
        let completion = Arc::new(
            ScriptedCompletionClient::new(log)
                .with_reply(BRIEFING_TEXT)
                .with_reply(ENHANCEMENT_TEXT)
                .with_reply(IMAGE_PROMPT_TEXT),
        );
        let mut image = MockImageClient::new();
        image
            .expect_generate_image()
            .withf(|prompt| prompt.to_string() == IMAGE_PROMPT_BODY)
            .times(1)
            .returning(|_| Ok(PNG_BYTES.to_vec()));

        let pipeline = PipelineBuilder::new(BrandflowConfig::new())
            .with_completion_client(completion)
            .with_image_client(Arc::new(image))
            .build()
            .unwrap();

        let mut run = pipeline
            .start(coffee_shop_context(), PipelineVariant::CampaignBriefing)
            .await
            .unwrap();
        pipeline.enhance(&mut run, SCENARIO_TONE).await.unwrap();
        pipeline.generate_image_prompt(&mut run).await.unwrap();
        pipeline.generate_image(&mut run).await.unwrap();
        assert_run_state(&run, RunState::ImageReady);
    }

    #[tokio::test]
    async fn test_session_store_drives_run() {
        let harness = TestHarness::scenario().unwrap();
        let store = SessionStore::new();

        let run = harness
            .pipeline
            .start(coffee_shop_context(), PipelineVariant::CampaignBriefing)
            .await
            .unwrap();
        let session_id = store.insert(run);

        let handle = store.get(session_id).unwrap();
        {
            let mut run = handle.lock().await;
            harness.pipeline.enhance(&mut run, SCENARIO_TONE).await.unwrap();
        }

        let run = handle.lock().await;
        assert_run_state(&run, RunState::EnhancementReady);
        assert_eq!(run.identity().session_id, Some(session_id));
    }
}
