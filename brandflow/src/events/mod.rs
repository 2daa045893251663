//! Event sinks for stage lifecycle events.
//!
//! The pipeline emits a `core::StageEvent` at each stage boundary through
//! the sink it was built with. There is no process-wide sink.

mod sink;

pub use sink::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};
