//! Error taxonomy for the stagehand harness.
//!
//! Stage bodies report opaque [`anyhow::Error`] causes; everything the
//! library itself can fail with is typed here. The engine never retries or
//! suppresses: all failures surface to the top-level caller.

use thiserror::Error;

/// Errors from the durable state store.
#[derive(Debug, Error)]
pub enum StateError {
    /// A load was attempted before any save for the workspace.
    ///
    /// Always fatal: it signals broken stage ordering and must not be
    /// papered over with a default value.
    #[error("no saved options for workspace '{workspace}'")]
    NotFound {
        /// The workspace identifier that had no saved options.
        workspace: String,
    },

    /// The underlying medium could not be read or written.
    #[error("could not read or write options for workspace '{workspace}'")]
    Persistence {
        /// The workspace identifier involved.
        workspace: String,
        /// The I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The options blob could not be encoded or decoded.
    #[error("could not encode or decode options for workspace '{workspace}'")]
    Serialization {
        /// The workspace identifier involved.
        workspace: String,
        /// The serde failure.
        #[source]
        source: serde_json::Error,
    },
}

impl StateError {
    /// Creates a not-found error for a workspace.
    #[must_use]
    pub fn not_found(workspace: impl Into<String>) -> Self {
        Self::NotFound {
            workspace: workspace.into(),
        }
    }

    /// Creates a persistence error for a workspace.
    #[must_use]
    pub fn persistence(workspace: impl Into<String>, source: std::io::Error) -> Self {
        Self::Persistence {
            workspace: workspace.into(),
            source,
        }
    }

    /// Creates a serialization error for a workspace.
    #[must_use]
    pub fn serialization(workspace: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Serialization {
            workspace: workspace.into(),
            source,
        }
    }
}

/// A stage body failed, tagged with the originating stage name.
#[derive(Debug, Error)]
#[error("stage '{stage}' failed: {source}")]
pub struct StageError {
    /// The stage whose body failed.
    pub stage: String,
    /// The underlying cause reported by the collaborator logic.
    #[source]
    pub source: anyhow::Error,
}

impl StageError {
    /// Wraps a stage body failure with its stage name.
    #[must_use]
    pub fn new(stage: impl Into<String>, source: anyhow::Error) -> Self {
        Self {
            stage: stage.into(),
            source,
        }
    }
}

/// Failure of one whole workflow invocation.
///
/// A non-teardown stage failure is always primary. A teardown failure is
/// reported as a distinct, secondary problem when a primary failure exists,
/// and as primary only when teardown is the sole failure.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// A stage failed; the teardown stage then ran and succeeded.
    #[error(transparent)]
    Stage(StageError),

    /// A stage failed and the teardown stage also failed afterwards.
    #[error("{primary}; teardown also failed: {teardown}")]
    StageThenTeardown {
        /// The original stage failure.
        primary: StageError,
        /// The secondary teardown failure.
        teardown: StageError,
    },

    /// All non-teardown stages succeeded (or were skipped) but the teardown
    /// stage failed.
    #[error("teardown failed: {0}")]
    Teardown(StageError),
}

impl WorkflowError {
    /// Returns the name of the primary failed stage.
    #[must_use]
    pub fn failed_stage(&self) -> &str {
        match self {
            Self::Stage(e) | Self::Teardown(e) => &e.stage,
            Self::StageThenTeardown { primary, .. } => &primary.stage,
        }
    }

    /// Returns the teardown failure, if the teardown stage failed.
    #[must_use]
    pub fn teardown_failure(&self) -> Option<&StageError> {
        match self {
            Self::Stage(_) => None,
            Self::Teardown(e) => Some(e),
            Self::StageThenTeardown { teardown, .. } => Some(teardown),
        }
    }
}

/// Errors raised while assembling a workflow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowBuildError {
    /// The workflow was built without a teardown stage.
    #[error("workflow '{workflow}' has no teardown stage")]
    MissingTeardown {
        /// The workflow name.
        workflow: String,
    },

    /// The workflow was given more than one teardown stage.
    #[error("workflow '{workflow}' has more than one teardown stage")]
    DuplicateTeardown {
        /// The workflow name.
        workflow: String,
    },

    /// Two stages (teardown included) share a name.
    #[error("duplicate stage name '{stage}' in workflow '{workflow}'")]
    DuplicateStage {
        /// The workflow name.
        workflow: String,
        /// The repeated stage name.
        stage: String,
    },
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A required environment variable is unset or empty.
    #[error("required environment variable '{name}' is not set")]
    MissingVar {
        /// The variable name that was looked up.
        name: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stage_err(stage: &str, msg: &str) -> StageError {
        StageError::new(stage, anyhow::anyhow!("{msg}"))
    }

    #[test]
    fn test_state_error_display() {
        let err = StateError::not_found("ws-1");
        assert_eq!(err.to_string(), "no saved options for workspace 'ws-1'");
    }

    #[test]
    fn test_stage_error_carries_stage_name() {
        let err = stage_err("deploy", "terraform apply exited 1");
        assert_eq!(err.stage, "deploy");
        assert_eq!(
            err.to_string(),
            "stage 'deploy' failed: terraform apply exited 1"
        );
    }

    #[test]
    fn test_workflow_error_primary_stage() {
        let err = WorkflowError::Stage(stage_err("deploy", "boom"));
        assert_eq!(err.failed_stage(), "deploy");
        assert!(err.teardown_failure().is_none());
    }

    #[test]
    fn test_workflow_error_chained_teardown_is_secondary() {
        let err = WorkflowError::StageThenTeardown {
            primary: stage_err("validate", "node count too low"),
            teardown: stage_err("teardown", "destroy timed out"),
        };

        assert_eq!(err.failed_stage(), "validate");
        assert_eq!(
            err.teardown_failure().map(|e| e.stage.as_str()),
            Some("teardown")
        );

        let message = err.to_string();
        assert!(message.contains("stage 'validate' failed"));
        assert!(message.contains("teardown also failed"));
    }

    #[test]
    fn test_workflow_error_teardown_only_is_primary() {
        let err = WorkflowError::Teardown(stage_err("teardown", "destroy failed"));
        assert_eq!(err.failed_stage(), "teardown");
        assert!(err.teardown_failure().is_some());
    }

    #[test]
    fn test_build_error_display() {
        let err = WorkflowBuildError::DuplicateStage {
            workflow: "install".to_string(),
            stage: "deploy".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "duplicate stage name 'deploy' in workflow 'install'"
        );
    }
}
