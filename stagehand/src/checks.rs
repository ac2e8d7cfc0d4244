//! Caller-supplied post-condition thresholds.
//!
//! The success criterion for a provisioned environment (e.g. "the cluster
//! reports at least N ready nodes") is configuration, not a constant baked
//! into the harness.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A minimum-count success criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountThreshold {
    minimum: u64,
}

impl CountThreshold {
    /// Creates a threshold requiring at least `minimum`.
    #[must_use]
    pub fn at_least(minimum: u64) -> Self {
        Self { minimum }
    }

    /// Returns the required minimum.
    #[must_use]
    pub fn minimum(&self) -> u64 {
        self.minimum
    }

    /// Checks an observed count against the threshold.
    ///
    /// `what` names the counted thing for the error message, e.g.
    /// `"ready nodes"`.
    pub fn check(&self, what: &str, actual: u64) -> Result<(), ThresholdError> {
        if actual >= self.minimum {
            Ok(())
        } else {
            Err(ThresholdError {
                what: what.to_string(),
                actual,
                minimum: self.minimum,
            })
        }
    }
}

/// An observed count fell below its threshold.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{what}: expected at least {minimum}, found {actual}")]
pub struct ThresholdError {
    /// What was counted.
    pub what: String,
    /// The observed count.
    pub actual: u64,
    /// The required minimum.
    pub minimum: u64,
}
