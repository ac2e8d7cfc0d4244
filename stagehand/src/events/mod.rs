//! Workflow event model and sinks.

mod sink;

pub use sink::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};

use crate::engine::WorkflowStatus;
use serde::Serialize;
use uuid::Uuid;

/// A structured observation emitted while a workflow runs.
///
/// Events make skips, failures, and the teardown release observable to
/// operators without being part of the functional contract.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkflowEvent {
    /// A workflow invocation began.
    WorkflowStarted {
        /// Unique id of this invocation.
        run_id: Uuid,
        /// Workflow name.
        workflow: String,
        /// Workspace the invocation is scoped to.
        workspace: String,
    },
    /// A stage body is about to run.
    StageStarted {
        /// The stage name.
        stage: String,
    },
    /// A stage was bypassed because its skip signal was set.
    StageSkipped {
        /// The stage name.
        stage: String,
    },
    /// A stage body returned successfully.
    StageSucceeded {
        /// The stage name.
        stage: String,
        /// Wall-clock duration of the body.
        duration_ms: f64,
    },
    /// A stage body failed.
    StageFailed {
        /// The stage name.
        stage: String,
        /// Wall-clock duration of the body.
        duration_ms: f64,
        /// The failure rendered as text.
        error: String,
    },
    /// The guaranteed teardown stage is about to be released.
    TearingDown {
        /// The teardown stage name.
        stage: String,
    },
    /// The workflow invocation reached a terminal state.
    WorkflowFinished {
        /// Unique id of this invocation.
        run_id: Uuid,
        /// The terminal status.
        status: WorkflowStatus,
    },
}

impl WorkflowEvent {
    /// Returns the stage name for stage-scoped events.
    #[must_use]
    pub fn stage(&self) -> Option<&str> {
        match self {
            Self::StageStarted { stage }
            | Self::StageSkipped { stage }
            | Self::StageSucceeded { stage, .. }
            | Self::StageFailed { stage, .. }
            | Self::TearingDown { stage } => Some(stage),
            Self::WorkflowStarted { .. } | Self::WorkflowFinished { .. } => None,
        }
    }

    /// Returns a short name for the event kind, e.g. `stage.skipped`.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::WorkflowStarted { .. } => "workflow.started",
            Self::StageStarted { .. } => "stage.started",
            Self::StageSkipped { .. } => "stage.skipped",
            Self::StageSucceeded { .. } => "stage.succeeded",
            Self::StageFailed { .. } => "stage.failed",
            Self::TearingDown { .. } => "workflow.tearing_down",
            Self::WorkflowFinished { .. } => "workflow.finished",
        }
    }
}
