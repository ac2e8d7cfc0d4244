//! Stage status and per-stage outcome records.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The engine's view of a stage at the end of an invocation.
///
/// Stages are atomic: there are no partial states, even if a body performs
/// many external calls internally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    /// The stage body ran and succeeded.
    Ok,
    /// The stage was bypassed by its skip signal.
    Skipped,
    /// The stage body ran and failed.
    Failed,
    /// The stage was never reached (an earlier stage failed or the run was
    /// cancelled).
    NotRun,
}

impl StageStatus {
    /// Returns true if the workflow may proceed past this stage.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Ok | Self::Skipped)
    }

    /// Returns true if the stage body failed.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed)
    }
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "ok"),
            Self::Skipped => write!(f, "skipped"),
            Self::Failed => write!(f, "failed"),
            Self::NotRun => write!(f, "not_run"),
        }
    }
}

/// Record of a single stage within one workflow invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageOutcome {
    /// The stage name.
    pub stage: String,
    /// Terminal status of the stage.
    pub status: StageStatus,
    /// Wall-clock duration of the body; zero for skipped/not-run stages.
    pub duration_ms: f64,
    /// Failure rendered as text, when the stage failed.
    pub error: Option<String>,
}

impl StageOutcome {
    /// Records a successful stage.
    #[must_use]
    pub fn ok(stage: impl Into<String>, duration_ms: f64) -> Self {
        Self {
            stage: stage.into(),
            status: StageStatus::Ok,
            duration_ms,
            error: None,
        }
    }

    /// Records a skipped stage.
    #[must_use]
    pub fn skipped(stage: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            status: StageStatus::Skipped,
            duration_ms: 0.0,
            error: None,
        }
    }

    /// Records a failed stage.
    #[must_use]
    pub fn failed(stage: impl Into<String>, duration_ms: f64, error: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            status: StageStatus::Failed,
            duration_ms,
            error: Some(error.into()),
        }
    }

    /// Records a stage that was never reached.
    #[must_use]
    pub fn not_run(stage: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            status: StageStatus::NotRun,
            duration_ms: 0.0,
            error: None,
        }
    }
}
