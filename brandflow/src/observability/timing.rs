//! Stage timing.

use std::time::{Duration, Instant};

use crate::core::StageId;

/// Measures the external call behind one stage.
#[derive(Debug)]
pub struct SpanTimer {
    stage: StageId,
    started: Instant,
}

impl SpanTimer {
    /// Starts timing `stage`.
    #[must_use]
    pub fn start(stage: StageId) -> Self {
        Self {
            stage,
            started: Instant::now(),
        }
    }

    /// The stage being timed.
    #[must_use]
    pub fn stage(&self) -> StageId {
        self.stage
    }

    /// Time since the timer started.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Stops the timer and returns whole milliseconds, saturating.
    #[must_use]
    pub fn finish(self) -> u64 {
        u64::try_from(self.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_timer() {
        let timer = SpanTimer::start(StageId::Image);
        assert_eq!(timer.stage(), StageId::Image);
        std::thread::sleep(Duration::from_millis(10));
        assert!(timer.finish() >= 10);
    }
}
