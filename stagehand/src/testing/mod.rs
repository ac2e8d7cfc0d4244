//! Test doubles shared by the crate's tests and downstream harnesses.

use crate::stages::{Stage, StageContext};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// A stage that counts its invocations and succeeds.
#[derive(Debug)]
pub struct CountingStage {
    name: String,
    calls: Arc<AtomicUsize>,
}

impl CountingStage {
    /// Creates a counting stage.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Returns a handle to the call counter.
    ///
    /// Grab this before moving the stage into a workflow.
    #[must_use]
    pub fn counter(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

#[async_trait]
impl Stage for CountingStage {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, _ctx: &StageContext) -> anyhow::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// A stage that counts its invocations and always fails.
#[derive(Debug)]
pub struct FailingStage {
    name: String,
    message: String,
    calls: Arc<AtomicUsize>,
}

impl FailingStage {
    /// Creates a failing stage with the given failure message.
    #[must_use]
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Returns a handle to the call counter.
    #[must_use]
    pub fn counter(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

#[async_trait]
impl Stage for FailingStage {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, _ctx: &StageContext) -> anyhow::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        anyhow::bail!("{}", self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::InMemoryStateStore;
    use crate::workspace::Workspace;

    fn ctx() -> StageContext {
        StageContext::new(
            Workspace::new("/tmp/stagehand-tests", "ws-doubles"),
            Arc::new(InMemoryStateStore::new()),
        )
    }

    #[tokio::test]
    async fn test_counting_stage_counts() {
        let stage = CountingStage::new("deploy");
        let calls = stage.counter();

        stage.execute(&ctx()).await.unwrap();
        stage.execute(&ctx()).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failing_stage_fails_and_counts() {
        let stage = FailingStage::new("deploy", "boom");
        let calls = stage.counter();

        let err = stage.execute(&ctx()).await.unwrap_err();
        assert_eq!(err.to_string(), "boom");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
