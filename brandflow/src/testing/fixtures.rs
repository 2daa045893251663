//! Canned scenario data and a scripted pipeline harness.

use std::sync::Arc;

use super::mocks::{CallLog, ScriptedCompletionClient, ScriptedImageClient};
use crate::config::BrandflowConfig;
use crate::context::{BusinessContext, Deliverable, PipelineVariant, ToneSelection};
use crate::errors::BrandflowError;
use crate::events::CollectingEventSink;
use crate::pipeline::{Pipeline, PipelineBuilder};

/// A minimal valid PNG header, enough for signature checks.
pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR\x00\x00\x00\x01\x00\x00\x00\x01";

/// The tone used throughout the coffee shop scenario.
pub const SCENARIO_TONE: ToneSelection = ToneSelection::WatercolorArt;

/// Stage 1 reply with all six briefing sections.
pub const BRIEFING_TEXT: &str = "THE PROBLEM:
Remote developers in Austin lack a cafe built for focused work.

THE FACTS:
Austin has one of the fastest-growing tech workforces in the US.

THE BIG PICTURE:
A third place where coffee culture meets the coding community.

THE OBJECTIVE:
Drive first visits through social ads and build loyalty with a monthly newsletter.

THE TARGET AUDIENCE:
Software engineers, freelancers and students aged 22-40.

AI-RECOMMENDED TONE:
Minimalist Illustration, because the audience values clean, modern design.";

/// Stage 2 reply with five landmarks under the location header.
pub const ENHANCEMENT_TEXT: &str = "ENHANCED STRATEGIC ANALYSIS:
Position Brew & Code as the default workspace for Austin's tech scene.

TONE SYNTHESIS:
Blend soft watercolor washes with minimalist linework.

LOCAL HOTSPOTS/LANDMARKS FOR AUSTIN, TX:
1. Texas State Capitol
2. Lady Bird Lake
3. Congress Avenue Bridge
4. Zilker Park
5. South Congress Avenue";

/// The image prompt proper inside [`IMAGE_PROMPT_TEXT`], as extracted.
pub const IMAGE_PROMPT_BODY: &str = "A watercolor illustration of the Brew & Code Coffee storefront with the Texas State Capitol, Lady Bird Lake and Congress Avenue Bridge behind it, soft morning light, laptops glowing through the windows.";

/// Stage 3 reply ending in the marker block.
pub const IMAGE_PROMPT_TEXT: &str = "LANDMARKS IDENTIFIED:
1. Texas State Capitol
2. Lady Bird Lake
3. Congress Avenue Bridge
4. Zilker Park
5. South Congress Avenue

TONE BLEND STRATEGY:
Watercolor textures with minimalist composition.

DELIVERABLE OPTIMIZATION:
- Static Social Ads: square crop with room for a call to action
- Email Newsletter: wide header framing

DETAILED IMAGE GENERATION PROMPT (600 words):
A watercolor illustration of the Brew & Code Coffee storefront
with the Texas State Capitol, Lady Bird Lake and Congress Avenue Bridge behind it,

soft morning light, laptops glowing through the windows.";

/// The "Brew & Code Coffee" campaign context.
#[must_use]
pub fn coffee_shop_context() -> BusinessContext {
    BusinessContext::new("Austin, TX")
        .with_name("Brew & Code Coffee")
        .with_category("Cafe")
        .with_idea("A coffee shop for programmers")
        .with_deliverables(vec![Deliverable::StaticSocialAds, Deliverable::EmailNewsletter])
}

/// An idea-expansion context.
#[must_use]
pub fn idea_context() -> BusinessContext {
    BusinessContext::new("Austin, TX").with_idea("A coffee shop for remote workers")
}

/// A pipeline wired to scripted clients that share one call log.
pub struct TestHarness {
    /// The pipeline under test.
    pub pipeline: Pipeline,
    /// Scripted completion client.
    pub completion: Arc<ScriptedCompletionClient>,
    /// Scripted image client.
    pub image: Arc<ScriptedImageClient>,
    /// Call log shared by both clients.
    pub log: CallLog,
    /// Sink collecting every emitted event.
    pub events: Arc<CollectingEventSink>,
}

impl TestHarness {
    /// A harness whose clients have nothing scripted.
    pub fn new(config: BrandflowConfig) -> Result<Self, BrandflowError> {
        let log = CallLog::new();
        let completion = Arc::new(ScriptedCompletionClient::new(log.clone()));
        let image = Arc::new(ScriptedImageClient::new(log.clone()));
        let events = Arc::new(CollectingEventSink::new());

        let pipeline = PipelineBuilder::new(config)
            .with_completion_client(completion.clone())
            .with_image_client(image.clone())
            .with_event_sink(events.clone())
            .build()?;

        Ok(Self {
            pipeline,
            completion,
            image,
            log,
            events,
        })
    }

    /// A campaign harness scripted with one reply per stage.
    pub fn scenario() -> Result<Self, BrandflowError> {
        let harness = Self::new(BrandflowConfig::new().with_variant(PipelineVariant::CampaignBriefing))?;
        harness.completion.push_reply(BRIEFING_TEXT);
        harness.completion.push_reply(ENHANCEMENT_TEXT);
        harness.completion.push_reply(IMAGE_PROMPT_TEXT);
        harness.image.push_image(PNG_BYTES);
        Ok(harness)
    }
}
