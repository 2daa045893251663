//! Stage lifecycle events.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::StageId;

/// Returns the current UTC time as an ISO 8601 formatted string.
///
/// Format: `YYYY-MM-DDTHH:MM:SS.ffffff+00:00`
#[must_use]
pub fn iso_timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.6f+00:00").to_string()
}

/// What happened to a stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StageEventKind {
    /// The stage call went out.
    #[serde(rename = "stage.started")]
    Started,
    /// The stage call returned and its output was stored.
    #[serde(rename = "stage.completed")]
    Completed {
        /// Wall time of the external call.
        duration_ms: u64,
        /// Characters of text, or bytes of image.
        output_len: usize,
    },
    /// The stage call failed; the run kept its previous state.
    #[serde(rename = "stage.failed")]
    Failed {
        /// Display form of the error.
        error: String,
        /// True if the user may retry the same action.
        recoverable: bool,
    },
    /// New output for the stage cleared these later outputs.
    #[serde(rename = "stage.invalidated")]
    Invalidated {
        /// The cleared stages, in pipeline order.
        stages: Vec<StageId>,
    },
}

impl StageEventKind {
    /// The dotted event type, e.g. `stage.started`.
    #[must_use]
    pub const fn event_type(&self) -> &'static str {
        match self {
            Self::Started => "stage.started",
            Self::Completed { .. } => "stage.completed",
            Self::Failed { .. } => "stage.failed",
            Self::Invalidated { .. } => "stage.invalidated",
        }
    }
}

/// An event emitted around a stage transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageEvent {
    /// The stage the event is about.
    pub stage: StageId,
    /// The run the stage belongs to.
    pub run_id: String,
    /// When the event occurred (ISO 8601).
    pub timestamp: String,
    /// What happened.
    #[serde(flatten)]
    pub kind: StageEventKind,
}

impl StageEvent {
    fn new(stage: StageId, run_id: &str, kind: StageEventKind) -> Self {
        Self {
            stage,
            run_id: run_id.to_string(),
            timestamp: iso_timestamp(),
            kind,
        }
    }

    /// Creates a "stage.started" event.
    #[must_use]
    pub fn started(stage: StageId, run_id: &str) -> Self {
        Self::new(stage, run_id, StageEventKind::Started)
    }

    /// Creates a "stage.completed" event.
    #[must_use]
    pub fn completed(stage: StageId, run_id: &str, duration_ms: u64, output_len: usize) -> Self {
        Self::new(
            stage,
            run_id,
            StageEventKind::Completed {
                duration_ms,
                output_len,
            },
        )
    }

    /// Creates a "stage.failed" event.
    #[must_use]
    pub fn failed(stage: StageId, run_id: &str, error: &str, recoverable: bool) -> Self {
        Self::new(
            stage,
            run_id,
            StageEventKind::Failed {
                error: error.to_string(),
                recoverable,
            },
        )
    }

    /// Creates a "stage.invalidated" event for the outputs `stage` cleared.
    #[must_use]
    pub fn invalidated(stage: StageId, cleared: &[StageId], run_id: &str) -> Self {
        Self::new(
            stage,
            run_id,
            StageEventKind::Invalidated {
                stages: cleared.to_vec(),
            },
        )
    }

    /// The dotted event type.
    #[must_use]
    pub const fn event_type(&self) -> &'static str {
        self.kind.event_type()
    }

    /// Whether this is a failure the user may retry.
    #[must_use]
    pub const fn is_recoverable_failure(&self) -> bool {
        matches!(self.kind, StageEventKind::Failed { recoverable: true, .. })
    }

    /// The event as a flat JSON object, `type` first.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}
