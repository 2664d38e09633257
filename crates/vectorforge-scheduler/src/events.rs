use std::time::Instant;
use vectorforge_core::ResilienceEvent;

/// Events emitted by the batch scheduler, for observability hooks.
#[derive(Debug, Clone)]
pub enum SchedulerEvent {
    /// An item is being re-enqueued after a retryable failure.
    Retry {
        pattern_name: String,
        timestamp: Instant,
        index: usize,
        remaining_attempts: usize,
    },
    /// An item completed successfully.
    Success {
        pattern_name: String,
        timestamp: Instant,
        index: usize,
    },
    /// An item failed terminally (retries exhausted or non-retryable).
    Failure {
        pattern_name: String,
        timestamp: Instant,
        index: usize,
    },
    /// The `on_progress` callback panicked; the panic was caught and
    /// swallowed so the run continues.
    ProgressCallbackPanicked {
        pattern_name: String,
        timestamp: Instant,
    },
}

impl ResilienceEvent for SchedulerEvent {
    fn event_type(&self) -> &'static str {
        match self {
            SchedulerEvent::Retry { .. } => "Retry",
            SchedulerEvent::Success { .. } => "Success",
            SchedulerEvent::Failure { .. } => "Failure",
            SchedulerEvent::ProgressCallbackPanicked { .. } => "ProgressCallbackPanicked",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            SchedulerEvent::Retry { timestamp, .. }
            | SchedulerEvent::Success { timestamp, .. }
            | SchedulerEvent::Failure { timestamp, .. }
            | SchedulerEvent::ProgressCallbackPanicked { timestamp, .. } => *timestamp,
        }
    }

    fn pattern_name(&self) -> &str {
        match self {
            SchedulerEvent::Retry { pattern_name, .. }
            | SchedulerEvent::Success { pattern_name, .. }
            | SchedulerEvent::Failure { pattern_name, .. }
            | SchedulerEvent::ProgressCallbackPanicked { pattern_name, .. } => pattern_name,
        }
    }
}
