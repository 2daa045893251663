//! Event sink trait and implementations.

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::{debug, info, Level};

use crate::core::{StageEvent, StageId};

/// Receives stage lifecycle events from the pipeline.
///
/// Sinks observe; they cannot fail a stage. `emit` is awaited at each stage
/// boundary, `try_emit` serves callers outside an async context.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Delivers an event.
    async fn emit(&self, event: &StageEvent);

    /// Delivers an event without awaiting. Must never panic.
    fn try_emit(&self, event: &StageEvent);
}

/// Discards every event. The pipeline default.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpEventSink;

#[async_trait]
impl EventSink for NoOpEventSink {
    async fn emit(&self, _event: &StageEvent) {}

    fn try_emit(&self, _event: &StageEvent) {}
}

/// Writes each event as a structured `tracing` record.
#[derive(Debug, Clone)]
pub struct LoggingEventSink {
    level: Level,
}

impl Default for LoggingEventSink {
    fn default() -> Self {
        Self { level: Level::INFO }
    }
}

impl LoggingEventSink {
    /// Creates a logging sink at the given level. Levels other than
    /// `DEBUG` log at `INFO`.
    #[must_use]
    pub fn new(level: Level) -> Self {
        Self { level }
    }

    /// Creates a debug-level logging sink.
    #[must_use]
    pub fn debug() -> Self {
        Self::new(Level::DEBUG)
    }

    fn log_event(&self, event: &StageEvent) {
        let event_type = event.event_type();
        if self.level == Level::DEBUG {
            debug!(
                event_type,
                stage = %event.stage,
                run_id = %event.run_id,
                detail = ?event.kind,
                "Stage event"
            );
        } else {
            info!(event_type, stage = %event.stage, run_id = %event.run_id, "Stage event");
        }
    }
}

#[async_trait]
impl EventSink for LoggingEventSink {
    async fn emit(&self, event: &StageEvent) {
        self.log_event(event);
    }

    fn try_emit(&self, event: &StageEvent) {
        self.log_event(event);
    }
}

/// Keeps every event in memory, in emission order.
#[derive(Debug, Default)]
pub struct CollectingEventSink {
    events: RwLock<Vec<StageEvent>>,
}

impl CollectingEventSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All collected events.
    #[must_use]
    pub fn events(&self) -> Vec<StageEvent> {
        self.events.read().clone()
    }

    /// The collected event types, in emission order.
    #[must_use]
    pub fn event_types(&self) -> Vec<&'static str> {
        self.events.read().iter().map(StageEvent::event_type).collect()
    }

    /// Events whose type starts with `type_prefix`.
    #[must_use]
    pub fn events_of_type(&self, type_prefix: &str) -> Vec<StageEvent> {
        self.events
            .read()
            .iter()
            .filter(|e| e.event_type().starts_with(type_prefix))
            .cloned()
            .collect()
    }

    /// Events about one stage.
    #[must_use]
    pub fn events_for(&self, stage: StageId) -> Vec<StageEvent> {
        self.events
            .read()
            .iter()
            .filter(|e| e.stage == stage)
            .cloned()
            .collect()
    }

    /// Number of collected events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    /// Returns true if nothing has been collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }

    /// Drops everything collected so far.
    pub fn clear(&self) {
        self.events.write().clear();
    }
}

#[async_trait]
impl EventSink for CollectingEventSink {
    async fn emit(&self, event: &StageEvent) {
        self.events.write().push(event.clone());
    }

    fn try_emit(&self, event: &StageEvent) {
        self.events.write().push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::StageEventKind;

    #[tokio::test]
    async fn test_noop_and_logging_sinks_accept_events() {
        let event = StageEvent::started(StageId::Briefing, "run-1");
        NoOpEventSink.emit(&event).await;
        NoOpEventSink.try_emit(&event);

        let sink = LoggingEventSink::debug();
        sink.emit(&event).await;
        sink.try_emit(&StageEvent::failed(StageId::Image, "run-1", "model_loading", true));
    }

    #[tokio::test]
    async fn test_collecting_sink_keeps_order() {
        let sink = CollectingEventSink::new();
        assert!(sink.is_empty());

        sink.emit(&StageEvent::started(StageId::Briefing, "run-1")).await;
        sink.try_emit(&StageEvent::completed(StageId::Briefing, "run-1", 5, 420));

        assert_eq!(sink.len(), 2);
        assert_eq!(sink.event_types(), vec!["stage.started", "stage.completed"]);
        assert!(matches!(
            sink.events()[1].kind,
            StageEventKind::Completed { output_len: 420, .. }
        ));
    }

    #[tokio::test]
    async fn test_collecting_sink_filter_and_clear() {
        let sink = CollectingEventSink::new();
        sink.emit(&StageEvent::started(StageId::Image, "run-1")).await;
        sink.emit(&StageEvent::failed(StageId::Image, "run-1", "boom", false)).await;
        sink.emit(&StageEvent::invalidated(StageId::Briefing, &[StageId::Enhancement], "run-1"))
            .await;

        assert_eq!(sink.events_of_type("stage.f").len(), 1);
        assert_eq!(sink.events_of_type("stage.").len(), 3);
        assert_eq!(sink.events_for(StageId::Image).len(), 2);

        sink.clear();
        assert!(sink.is_empty());
    }
}
