//! Stage trait, stage context, and function-based stages.
//!
//! Stages are the atomic units of pipeline work: "deploy", "validate",
//! "teardown". Their bodies are opaque collaborator logic; the harness only
//! requires that each either returns successfully or fails with an error it
//! can wrap.

mod result;
mod runner;

pub use result::{StageOutcome, StageStatus};
pub use runner::StageRunner;

use crate::errors::StateError;
use crate::state::{StateStore, StateStoreExt};
use crate::workspace::Workspace;
use async_trait::async_trait;
use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;
use std::future::Future;
use std::sync::Arc;

/// Everything a stage body may touch: the workspace identity and the only
/// durable channel for passing options between stages.
///
/// Skip signals and inter-stage parameters are never read from ambient
/// process state; they arrive through the gate and through this context.
#[derive(Clone)]
pub struct StageContext {
    workspace: Workspace,
    store: Arc<dyn StateStore>,
}

impl StageContext {
    /// Creates a context for one workflow invocation.
    pub fn new(workspace: Workspace, store: Arc<dyn StateStore>) -> Self {
        Self { workspace, store }
    }

    /// Returns the workspace this invocation is scoped to.
    #[must_use]
    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Returns the state store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn StateStore> {
        &self.store
    }

    /// Persists typed options for this context's workspace.
    pub fn save_options<T: Serialize>(&self, options: &T) -> Result<(), StateError> {
        self.store.save_options(&self.workspace, options)
    }

    /// Loads typed options previously saved for this context's workspace.
    ///
    /// Fails with [`StateError::NotFound`] if no stage saved options yet.
    pub fn load_options<T: DeserializeOwned>(&self) -> Result<T, StateError> {
        self.store.load_options(&self.workspace)
    }
}

impl Debug for StageContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StageContext")
            .field("workspace", &self.workspace)
            .finish_non_exhaustive()
    }
}

/// Trait for pipeline stages.
#[async_trait]
pub trait Stage: Send + Sync + Debug {
    /// Returns the name of the stage, unique within one workflow.
    fn name(&self) -> &str;

    /// Executes the collaborator logic for this stage.
    ///
    /// May block for arbitrarily long wall-clock time waiting on external
    /// processes; timeouts are the body's responsibility and surface as
    /// ordinary failures.
    async fn execute(&self, ctx: &StageContext) -> anyhow::Result<()>;
}

type BoxedBody =
    Box<dyn Fn(StageContext) -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync>;

/// A stage built from an async closure.
pub struct FnStage {
    name: String,
    body: BoxedBody,
}

impl FnStage {
    /// Creates a stage from a name and an async closure.
    pub fn new<F, Fut>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn(StageContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Self {
            name: name.into(),
            body: Box::new(move |ctx| Box::pin(body(ctx))),
        }
    }
}

impl Debug for FnStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnStage").field("name", &self.name).finish()
    }
}

#[async_trait]
impl Stage for FnStage {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, ctx: &StageContext) -> anyhow::Result<()> {
        (self.body)(ctx.clone()).await
    }
}

/// A stage that does nothing and succeeds.
#[derive(Debug, Clone)]
pub struct NoOpStage {
    name: String,
}

impl NoOpStage {
    /// Creates a new no-op stage.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl Stage for NoOpStage {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, _ctx: &StageContext) -> anyhow::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::InMemoryStateStore;
    use pretty_assertions::assert_eq;

    pub(crate) fn test_context() -> StageContext {
        StageContext::new(
            Workspace::new("/tmp/stagehand-tests", "ws-test"),
            Arc::new(InMemoryStateStore::new()),
        )
    }

    #[tokio::test]
    async fn test_fn_stage_runs_body() {
        let stage = FnStage::new("deploy", |ctx| async move {
            ctx.save_options(&serde_json::json!({"deployed": true}))?;
            Ok(())
        });

        assert_eq!(stage.name(), "deploy");

        let ctx = test_context();
        stage.execute(&ctx).await.unwrap();

        let saved: serde_json::Value = ctx.load_options().unwrap();
        assert_eq!(saved["deployed"], true);
    }

    #[tokio::test]
    async fn test_fn_stage_propagates_failure() {
        let stage = FnStage::new("deploy", |_ctx| async move {
            anyhow::bail!("terraform apply exited 1")
        });

        let err = stage.execute(&test_context()).await.unwrap_err();
        assert_eq!(err.to_string(), "terraform apply exited 1");
    }

    #[tokio::test]
    async fn test_noop_stage() {
        let stage = NoOpStage::new("noop");
        assert_eq!(stage.name(), "noop");
        stage.execute(&test_context()).await.unwrap();
    }

    #[tokio::test]
    async fn test_context_load_before_save_fails() {
        let ctx = test_context();
        let err = ctx.load_options::<serde_json::Value>().unwrap_err();
        assert!(matches!(err, StateError::NotFound { .. }));
    }
}
