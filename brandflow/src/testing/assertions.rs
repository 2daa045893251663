//! Assertions for pipeline runs and stage text.

use super::mocks::RecordedCall;
use crate::core::{RunState, StageId};
use crate::pipeline::PipelineRun;
use crate::prompts::{self, IMAGE_PROMPT_MARKER, LANDMARK_COUNT};

/// Asserts that the run is in the expected state.
pub fn assert_run_state(run: &PipelineRun, expected: RunState) {
    assert_eq!(run.state(), expected, "Expected state {expected}, got {}", run.state());
}

/// Asserts that no stage after `stage` has output.
pub fn assert_cleared_after(run: &PipelineRun, stage: StageId) {
    for later in stage.downstream() {
        assert!(
            !run.has_output(*later),
            "Expected {later} to be cleared after {stage}"
        );
    }
}

/// Asserts that a briefing contains every section label.
pub fn assert_briefing_sections(text: &str) {
    let missing = prompts::missing_briefing_sections(text);
    assert!(missing.is_empty(), "Briefing is missing sections: {missing:?}");
}

/// Asserts that text lists exactly the expected number of landmarks.
pub fn assert_landmark_count(text: &str) {
    let landmarks = prompts::extract_landmarks(text);
    assert_eq!(
        landmarks.len(),
        LANDMARK_COUNT,
        "Expected {LANDMARK_COUNT} landmarks, got {landmarks:?}"
    );
}

/// Asserts that stage 3 text carries the image prompt marker.
pub fn assert_has_marker(text: &str) {
    assert!(
        text.lines().any(|line| line.contains(IMAGE_PROMPT_MARKER)),
        "Expected a line containing '{IMAGE_PROMPT_MARKER}'"
    );
}

/// Asserts that calls went out as `completions` completion calls followed by
/// `images` image calls, with nothing interleaved.
pub fn assert_call_sequence(calls: &[RecordedCall], completions: usize, images: usize) {
    let kinds: Vec<bool> = calls.iter().map(RecordedCall::is_image).collect();
    let mut expected = vec![false; completions];
    expected.extend(std::iter::repeat(true).take(images));
    assert_eq!(kinds, expected, "Unexpected call sequence (true = image call)");
}
