//! Event sink trait and implementations.

use crate::events::WorkflowEvent;
use parking_lot::RwLock;
use tracing::{error, info, warn};

/// Receives workflow events for observability, logging, or analytics.
///
/// Sinks must never fail; an event that cannot be delivered is dropped,
/// not surfaced to the workflow.
pub trait EventSink: Send + Sync {
    /// Delivers one event.
    fn emit(&self, event: &WorkflowEvent);
}

/// A sink that discards all events.
///
/// Useful when a caller wants logging fully under its own control.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpEventSink;

impl EventSink for NoOpEventSink {
    fn emit(&self, _event: &WorkflowEvent) {
        // Intentionally empty - discards all events
    }
}

/// A sink that logs events through the tracing framework.
///
/// The default sink: stage failures log at error, teardown failures and
/// skips at warn/info, everything else at info.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingEventSink;

impl LoggingEventSink {
    /// Creates a new logging sink.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LoggingEventSink {
    fn emit(&self, event: &WorkflowEvent) {
        match event {
            WorkflowEvent::WorkflowStarted {
                run_id,
                workflow,
                workspace,
            } => {
                info!(%run_id, workflow, workspace, "workflow started");
            }
            WorkflowEvent::StageStarted { stage } => {
                info!(stage, "stage started");
            }
            WorkflowEvent::StageSkipped { stage } => {
                info!(stage, "stage skipped (skip signal set)");
            }
            WorkflowEvent::StageSucceeded { stage, duration_ms } => {
                info!(stage, duration_ms, "stage succeeded");
            }
            WorkflowEvent::StageFailed {
                stage,
                duration_ms,
                error: cause,
            } => {
                error!(stage, duration_ms, error = cause, "stage failed");
            }
            WorkflowEvent::TearingDown { stage } => {
                info!(stage, "releasing teardown");
            }
            WorkflowEvent::WorkflowFinished { run_id, status } => {
                if status.is_success() {
                    info!(%run_id, %status, "workflow finished");
                } else {
                    warn!(%run_id, %status, "workflow finished");
                }
            }
        }
    }
}

/// A sink that records events for inspection in tests.
#[derive(Debug, Default)]
pub struct CollectingEventSink {
    events: RwLock<Vec<WorkflowEvent>>,
}

impl CollectingEventSink {
    /// Creates a new collecting sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all collected events in emission order.
    #[must_use]
    pub fn events(&self) -> Vec<WorkflowEvent> {
        self.events.read().clone()
    }

    /// Returns the kinds of all collected events, in order.
    #[must_use]
    pub fn kinds(&self) -> Vec<&'static str> {
        self.events.read().iter().map(WorkflowEvent::kind).collect()
    }

    /// Returns events scoped to the given stage.
    #[must_use]
    pub fn for_stage(&self, stage: &str) -> Vec<WorkflowEvent> {
        self.events
            .read()
            .iter()
            .filter(|e| e.stage() == Some(stage))
            .cloned()
            .collect()
    }

    /// Returns the number of collected events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    /// Returns true if no events have been collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }
}

impl EventSink for CollectingEventSink {
    fn emit(&self, event: &WorkflowEvent) {
        self.events.write().push(event.clone());
    }
}
