//! Workflow composition and the guaranteed-teardown run loop.
//!
//! A workflow is a caller-declared ordered list of stages plus exactly one
//! teardown stage. The engine runs the non-teardown stages strictly
//! sequentially, stops at the first failure, and releases the teardown
//! stage exactly once on every path out: success, failure, or
//! cancellation.

mod report;

pub use report::{WorkflowReport, WorkflowStatus};


use crate::cancellation::CancellationToken;
use crate::errors::{StageError, WorkflowBuildError, WorkflowError};
use crate::events::{EventSink, LoggingEventSink, WorkflowEvent};
use crate::gate::{RunAll, StageGate};
use crate::stages::{FnStage, Stage, StageContext, StageOutcome, StageRunner};
use chrono::Utc;
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// An ordered set of stages with one guaranteed teardown stage.
///
/// Owns the stage list and the single teardown registration for the
/// lifetime of one invocation.
pub struct Workflow {
    name: String,
    stages: Vec<Arc<dyn Stage>>,
    teardown: Arc<dyn Stage>,
    gate: Arc<dyn StageGate>,
    sink: Arc<dyn EventSink>,
    cancel: Arc<CancellationToken>,
}

impl Workflow {
    /// Returns the workflow name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the number of stages, teardown included.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stages.len() + 1
    }

    /// Returns the cancellation token for this workflow.
    #[must_use]
    pub fn cancellation(&self) -> Arc<CancellationToken> {
        self.cancel.clone()
    }

    /// Runs all non-teardown stages in declared order, then the teardown
    /// stage, exactly once.
    ///
    /// On the first stage failure the remaining non-teardown stages are
    /// recorded as not-run and the engine proceeds directly to teardown.
    /// A teardown failure never masks the original cause: it is attached
    /// as a secondary failure when a primary one exists.
    pub async fn run(&self, ctx: &StageContext) -> Result<WorkflowReport, WorkflowError> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();

        self.sink.emit(&WorkflowEvent::WorkflowStarted {
            run_id,
            workflow: self.name.clone(),
            workspace: ctx.workspace().id().to_string(),
        });

        let runner = StageRunner::new(self.gate.clone(), self.sink.clone());
        let mut outcomes: Vec<StageOutcome> = Vec::with_capacity(self.stage_count());
        let mut primary: Option<StageError> = None;
        let mut cancelled = false;

        for stage in &self.stages {
            if !cancelled && self.cancel.is_cancelled() {
                cancelled = true;
                info!(
                    workflow = %self.name,
                    reason = self.cancel.reason().as_deref().unwrap_or("unspecified"),
                    "cancellation requested; proceeding to teardown"
                );
            }

            if primary.is_some() || cancelled {
                outcomes.push(StageOutcome::not_run(stage.name()));
                continue;
            }

            let (outcome, error) = runner.run(stage.as_ref(), ctx).await;
            outcomes.push(outcome);
            if let Some(error) = error {
                warn!(stage = %error.stage, "stage failed; remaining stages will not run");
                primary = Some(error);
            }
        }

        // The teardown obligation: one structural call, reached on success,
        // failure, and cancellation alike.
        self.sink.emit(&WorkflowEvent::TearingDown {
            stage: self.teardown.name().to_string(),
        });
        let (teardown_outcome, teardown_error) = runner.run(self.teardown.as_ref(), ctx).await;
        outcomes.push(teardown_outcome);

        // Status precedence: stage failure, then cancellation, then a
        // teardown-only failure. A cancelled run stays Cancelled even when
        // teardown fails; the teardown failure is still carried by the
        // stage.failed event and the returned error.
        let status = match (&primary, &teardown_error, cancelled) {
            (Some(_), _, _) => WorkflowStatus::Failed,
            (None, _, true) => WorkflowStatus::Cancelled,
            (None, Some(_), false) => WorkflowStatus::CompletedWithTeardownError,
            (None, None, false) => WorkflowStatus::Completed,
        };
        self.sink
            .emit(&WorkflowEvent::WorkflowFinished { run_id, status });

        match (primary, teardown_error) {
            (Some(primary), Some(teardown)) => {
                Err(WorkflowError::StageThenTeardown { primary, teardown })
            }
            (Some(primary), None) => Err(WorkflowError::Stage(primary)),
            (None, Some(teardown)) => Err(WorkflowError::Teardown(teardown)),
            (None, None) => Ok(WorkflowReport {
                run_id,
                workflow: self.name.clone(),
                workspace: ctx.workspace().id().to_string(),
                status,
                outcomes,
                started_at,
                finished_at: Utc::now(),
            }),
        }
    }
}

impl std::fmt::Debug for Workflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workflow")
            .field("name", &self.name)
            .field("stage_count", &self.stage_count())
            .finish_non_exhaustive()
    }
}

/// Builder for workflows.
///
/// Stages run in the order they are added. Exactly one teardown stage must
/// be registered; stage names must be unique, teardown included.
#[must_use]
pub struct WorkflowBuilder {
    name: String,
    stages: Vec<Arc<dyn Stage>>,
    teardown: Option<Arc<dyn Stage>>,
    duplicate_teardown: bool,
    gate: Option<Arc<dyn StageGate>>,
    sink: Option<Arc<dyn EventSink>>,
    cancel: Option<Arc<CancellationToken>>,
}

impl WorkflowBuilder {
    /// Creates a builder for a named workflow.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stages: Vec::new(),
            teardown: None,
            duplicate_teardown: false,
            gate: None,
            sink: None,
            cancel: None,
        }
    }

    /// Appends a stage to the execution order.
    pub fn stage(mut self, stage: impl Stage + 'static) -> Self {
        self.stages.push(Arc::new(stage));
        self
    }

    /// Appends a stage built from an async closure.
    pub fn stage_fn<F, Fut>(self, name: impl Into<String>, body: F) -> Self
    where
        F: Fn(StageContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.stage(FnStage::new(name, body))
    }

    /// Registers the single teardown stage.
    pub fn teardown(mut self, stage: impl Stage + 'static) -> Self {
        if self.teardown.is_some() {
            self.duplicate_teardown = true;
        }
        self.teardown = Some(Arc::new(stage));
        self
    }

    /// Registers the teardown stage from an async closure.
    pub fn teardown_fn<F, Fut>(self, name: impl Into<String>, body: F) -> Self
    where
        F: Fn(StageContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.teardown(FnStage::new(name, body))
    }

    /// Sets the skip gate. Defaults to [`RunAll`]; callers wanting
    /// environment-driven skips pass `SkipSignals::from_env()` explicitly.
    pub fn gate(mut self, gate: impl StageGate + 'static) -> Self {
        self.gate = Some(Arc::new(gate));
        self
    }

    /// Sets the event sink. Defaults to [`LoggingEventSink`].
    pub fn event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Attaches a cancellation token checked between stages.
    pub fn cancellation(mut self, token: Arc<CancellationToken>) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Validates and builds the workflow.
    pub fn build(self) -> Result<Workflow, WorkflowBuildError> {
        if self.duplicate_teardown {
            return Err(WorkflowBuildError::DuplicateTeardown {
                workflow: self.name,
            });
        }

        let teardown = self
            .teardown
            .ok_or_else(|| WorkflowBuildError::MissingTeardown {
                workflow: self.name.clone(),
            })?;

        let mut seen = HashSet::new();
        for stage in self.stages.iter().chain(std::iter::once(&teardown)) {
            if !seen.insert(stage.name().to_string()) {
                return Err(WorkflowBuildError::DuplicateStage {
                    workflow: self.name,
                    stage: stage.name().to_string(),
                });
            }
        }

        Ok(Workflow {
            name: self.name,
            stages: self.stages,
            teardown,
            gate: self.gate.unwrap_or_else(|| Arc::new(RunAll)),
            sink: self.sink.unwrap_or_else(|| Arc::new(LoggingEventSink)),
            cancel: self.cancel.unwrap_or_default(),
        })
    }
}

impl std::fmt::Debug for WorkflowBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowBuilder")
            .field("name", &self.name)
            .field("stages", &self.stages.len())
            .field("has_teardown", &self.teardown.is_some())
            .finish_non_exhaustive()
    }
}
