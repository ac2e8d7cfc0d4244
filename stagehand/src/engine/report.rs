//! Workflow status and the invocation report.

use crate::stages::{StageOutcome, StageStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// The state machine of one workflow invocation.
///
/// `NotStarted -> Running -> TearingDown -> {Completed |
/// CompletedWithTeardownError | Failed | Cancelled}`. A stage failure or a
/// cancellation short-circuits the remaining non-teardown stages but always
/// passes through `TearingDown` before reaching a terminal state.
///
/// When more than one terminal condition applies, precedence is
/// `Failed` over `Cancelled` over `CompletedWithTeardownError`: a
/// cancelled run reports `Cancelled` even if its teardown then fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    /// No stage has started yet.
    NotStarted,
    /// Non-teardown stages are executing in order.
    Running,
    /// The guaranteed teardown stage is executing.
    TearingDown,
    /// Every stage and the teardown succeeded (or was skipped).
    Completed,
    /// All non-teardown stages succeeded but teardown failed.
    CompletedWithTeardownError,
    /// A non-teardown stage failed (teardown still ran).
    Failed,
    /// The invocation was cancelled before finishing (teardown still ran).
    Cancelled,
}

impl WorkflowStatus {
    /// Returns true if the status is terminal.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed | Self::CompletedWithTeardownError | Self::Failed | Self::Cancelled
        )
    }

    /// Returns true if the invocation achieved everything it set out to do.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotStarted => write!(f, "not_started"),
            Self::Running => write!(f, "running"),
            Self::TearingDown => write!(f, "tearing_down"),
            Self::Completed => write!(f, "completed"),
            Self::CompletedWithTeardownError => write!(f, "completed_with_teardown_error"),
            Self::Failed => write!(f, "failed"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Summary of one workflow invocation.
///
/// Returned on the non-error paths (`Completed` and `Cancelled`); error
/// paths carry the failure taxonomy instead.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowReport {
    /// Unique id of this invocation.
    pub run_id: Uuid,
    /// Workflow name.
    pub workflow: String,
    /// Workspace identifier the invocation was scoped to.
    pub workspace: String,
    /// Terminal status.
    pub status: WorkflowStatus,
    /// Per-stage outcomes in execution order, teardown last.
    pub outcomes: Vec<StageOutcome>,
    /// When the invocation began.
    pub started_at: DateTime<Utc>,
    /// When the invocation reached its terminal state.
    pub finished_at: DateTime<Utc>,
}

impl WorkflowReport {
    /// Looks up the outcome for a stage by name.
    #[must_use]
    pub fn outcome(&self, stage: &str) -> Option<&StageOutcome> {
        self.outcomes.iter().find(|o| o.stage == stage)
    }

    /// Returns the status recorded for a stage, if it exists.
    #[must_use]
    pub fn stage_status(&self, stage: &str) -> Option<StageStatus> {
        self.outcome(stage).map(|o| o.status)
    }

    /// Returns true if the invocation completed successfully.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_status_terminality() {
        assert!(WorkflowStatus::Completed.is_terminal());
        assert!(WorkflowStatus::Failed.is_terminal());
        assert!(WorkflowStatus::Cancelled.is_terminal());
        assert!(WorkflowStatus::CompletedWithTeardownError.is_terminal());
        assert!(!WorkflowStatus::Running.is_terminal());
        assert!(!WorkflowStatus::TearingDown.is_terminal());
    }

    #[test]
    fn test_only_completed_is_success() {
        assert!(WorkflowStatus::Completed.is_success());
        assert!(!WorkflowStatus::Cancelled.is_success());
        assert!(!WorkflowStatus::CompletedWithTeardownError.is_success());
    }

    #[test]
    fn test_status_display() {
        assert_eq!(
            WorkflowStatus::CompletedWithTeardownError.to_string(),
            "completed_with_teardown_error"
        );
    }

    #[test]
    fn test_report_lookup() {
        let now = Utc::now();
        let report = WorkflowReport {
            run_id: Uuid::new_v4(),
            workflow: "install".to_string(),
            workspace: "ws1".to_string(),
            status: WorkflowStatus::Completed,
            outcomes: vec![
                StageOutcome::ok("deploy", 1.0),
                StageOutcome::skipped("validate"),
            ],
            started_at: now,
            finished_at: now,
        };

        assert_eq!(report.stage_status("deploy"), Some(StageStatus::Ok));
        assert_eq!(report.stage_status("validate"), Some(StageStatus::Skipped));
        assert_eq!(report.stage_status("missing"), None);
        assert!(report.is_success());
    }
}
