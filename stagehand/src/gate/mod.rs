//! Per-stage skip control.
//!
//! A skip signal is an external, per-stage opt-in flag: absence always
//! means *run*. Signals are snapshotted into an explicit [`SkipSignals`]
//! object once per invocation, so mid-run changes to their source (e.g. the
//! process environment) have no effect.

use std::collections::HashSet;

/// Prefix for environment-sourced skip signals, e.g. `SKIP_deploy=true`.
pub const SKIP_ENV_PREFIX: &str = "SKIP_";

/// Decides whether a named stage should execute.
pub trait StageGate: Send + Sync {
    /// Returns true if the stage should run.
    ///
    /// Pure and side-effect-free; may be queried repeatedly.
    fn should_run(&self, stage_name: &str) -> bool;
}

/// Gate that runs every stage. The default when no signals are supplied.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunAll;

impl StageGate for RunAll {
    fn should_run(&self, _stage_name: &str) -> bool {
        true
    }
}

/// An explicit, immutable set of skip signals for one workflow invocation.
#[derive(Debug, Clone, Default)]
pub struct SkipSignals {
    skipped: HashSet<String>,
}

impl SkipSignals {
    /// Creates an empty signal set (everything runs).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a stage as skipped.
    #[must_use]
    pub fn skip(mut self, stage_name: impl Into<String>) -> Self {
        self.skipped.insert(stage_name.into());
        self
    }

    /// Snapshots `SKIP_<stage>` variables from the process environment.
    ///
    /// Only truthy values ("1", "true", "yes", case-insensitive) count as a
    /// signal. The snapshot is taken exactly once, here; later environment
    /// changes do not affect the returned value.
    #[must_use]
    pub fn from_env() -> Self {
        let skipped = std::env::vars()
            .filter(|(_, value)| is_truthy(value))
            .filter_map(|(key, _)| {
                key.strip_prefix(SKIP_ENV_PREFIX)
                    .map(std::string::ToString::to_string)
            })
            .collect();
        Self { skipped }
    }

    /// Returns true if a skip signal is set for the stage.
    #[must_use]
    pub fn is_skipped(&self, stage_name: &str) -> bool {
        self.skipped.contains(stage_name)
    }

    /// Returns the number of stages with a skip signal.
    #[must_use]
    pub fn len(&self) -> usize {
        self.skipped.len()
    }

    /// Returns true if no stage has a skip signal.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.skipped.is_empty()
    }
}

impl StageGate for SkipSignals {
    fn should_run(&self, stage_name: &str) -> bool {
        !self.is_skipped(stage_name)
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes"
    )
}
