//! Gate-aware execution of a single stage.

use crate::errors::StageError;
use crate::events::{EventSink, WorkflowEvent};
use crate::gate::StageGate;
use crate::observability::SpanTimer;
use crate::stages::{Stage, StageContext, StageOutcome};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::info;

/// Executes one named stage inside the skip gate.
///
/// The runner performs no retry and no suppression; retry policy, if any,
/// belongs to the stage body. It never touches persisted options itself.
pub struct StageRunner {
    gate: Arc<dyn StageGate>,
    sink: Arc<dyn EventSink>,
}

impl StageRunner {
    /// Creates a runner over a gate and an event sink.
    pub fn new(gate: Arc<dyn StageGate>, sink: Arc<dyn EventSink>) -> Self {
        Self { gate, sink }
    }

    /// Runs a stage, returning its outcome and, on failure, the error
    /// tagged with the stage name.
    ///
    /// A gated-off stage returns `Skipped` without invoking the body and
    /// without side effects; the skip itself is logged and evented so
    /// operators can see it happened.
    ///
    /// A panicking body is caught and converted into an ordinary stage
    /// failure. An unwind must never escape the runner: the engine relies
    /// on control returning here so the teardown stage still releases.
    pub async fn run(
        &self,
        stage: &dyn Stage,
        ctx: &StageContext,
    ) -> (StageOutcome, Option<StageError>) {
        let name = stage.name().to_string();

        if !self.gate.should_run(&name) {
            info!(stage = %name, "skip signal set; stage bypassed");
            self.sink
                .emit(&WorkflowEvent::StageSkipped { stage: name.clone() });
            return (StageOutcome::skipped(name), None);
        }

        self.sink
            .emit(&WorkflowEvent::StageStarted { stage: name.clone() });

        let timer = SpanTimer::start(&name);
        let result = match AssertUnwindSafe(stage.execute(ctx)).catch_unwind().await {
            Ok(result) => result,
            Err(payload) => Err(anyhow::anyhow!(
                "stage body panicked: {}",
                panic_message(payload.as_ref())
            )),
        };
        match result {
            Ok(()) => {
                let duration_ms = timer.finish();
                self.sink.emit(&WorkflowEvent::StageSucceeded {
                    stage: name.clone(),
                    duration_ms,
                });
                (StageOutcome::ok(name, duration_ms), None)
            }
            Err(cause) => {
                let duration_ms = timer.finish();
                let error = StageError::new(&name, cause);
                self.sink.emit(&WorkflowEvent::StageFailed {
                    stage: name.clone(),
                    duration_ms,
                    error: error.source.to_string(),
                });
                (
                    StageOutcome::failed(name, duration_ms, error.source.to_string()),
                    Some(error),
                )
            }
        }
    }
}

impl std::fmt::Debug for StageRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StageRunner").finish_non_exhaustive()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::CollectingEventSink;
    use crate::gate::{RunAll, SkipSignals};
    use crate::stages::StageStatus;
    use crate::testing::{CountingStage, FailingStage};
    use crate::workspace::Workspace;
    use pretty_assertions::assert_eq;

    fn test_context() -> StageContext {
        StageContext::new(
            Workspace::new("/tmp/stagehand-tests", "ws-runner"),
            Arc::new(crate::state::InMemoryStateStore::new()),
        )
    }

    fn runner_with_sink(gate: Arc<dyn StageGate>) -> (StageRunner, Arc<CollectingEventSink>) {
        let sink = Arc::new(CollectingEventSink::new());
        (StageRunner::new(gate, sink.clone()), sink)
    }

    #[tokio::test]
    async fn test_runs_stage_without_signal() {
        // Default-run law: absent signal always executes.
        let (runner, _sink) = runner_with_sink(Arc::new(SkipSignals::new()));
        let stage = CountingStage::new("deploy");
        let calls = stage.counter();

        let (outcome, error) = runner.run(&stage, &test_context()).await;

        assert_eq!(outcome.status, StageStatus::Ok);
        assert!(error.is_none());
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_skipped_stage_body_never_invoked() {
        let (runner, sink) = runner_with_sink(Arc::new(SkipSignals::new().skip("deploy")));
        let stage = CountingStage::new("deploy");
        let calls = stage.counter();

        let (outcome, error) = runner.run(&stage, &test_context()).await;

        assert_eq!(outcome.status, StageStatus::Skipped);
        assert!(error.is_none());
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 0);
        // The skip is observable.
        assert_eq!(sink.kinds(), vec!["stage.skipped"]);
    }

    #[tokio::test]
    async fn test_failure_is_tagged_with_stage_name() {
        let (runner, sink) = runner_with_sink(Arc::new(RunAll));
        let stage = FailingStage::new("deploy", "terraform apply exited 1");

        let (outcome, error) = runner.run(&stage, &test_context()).await;

        assert_eq!(outcome.status, StageStatus::Failed);
        let error = error.unwrap();
        assert_eq!(error.stage, "deploy");
        assert!(error.to_string().contains("stage 'deploy' failed"));
        assert_eq!(sink.kinds(), vec!["stage.started", "stage.failed"]);
    }

    #[tokio::test]
    async fn test_panicking_body_becomes_stage_failure() {
        use crate::stages::FnStage;

        let (runner, sink) = runner_with_sink(Arc::new(RunAll));
        let stage = FnStage::new("deploy", |_ctx| async move {
            panic!("index out of bounds in options parsing")
        });

        let (outcome, error) = runner.run(&stage, &test_context()).await;

        assert_eq!(outcome.status, StageStatus::Failed);
        let error = error.unwrap();
        assert_eq!(error.stage, "deploy");
        assert!(error.source.to_string().contains("stage body panicked"));
        assert!(error
            .source
            .to_string()
            .contains("index out of bounds in options parsing"));
        assert_eq!(sink.kinds(), vec!["stage.started", "stage.failed"]);
    }

    #[tokio::test]
    async fn test_success_emits_started_then_succeeded() {
        let (runner, sink) = runner_with_sink(Arc::new(RunAll));
        let stage = CountingStage::new("validate");

        let (outcome, _) = runner.run(&stage, &test_context()).await;

        assert_eq!(outcome.status, StageStatus::Ok);
        assert_eq!(sink.kinds(), vec!["stage.started", "stage.succeeded"]);
    }
}
