//! Bounded polling for stage bodies awaiting an external terminal state.
//!
//! The engine itself imposes no timeout on a stage; a body that waits on a
//! slow external process (cluster provisioning, a job reaching a terminal
//! state) bounds its own wait with [`wait_until`] and reports an elapsed
//! timeout as an ordinary stage failure.

use std::time::Duration;
use tracing::debug;

/// How long and how often to poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Overall wall-clock budget for the wait.
    pub timeout: Duration,
    /// Pause between probe attempts.
    pub interval: Duration,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(300),
            interval: Duration::from_secs(5),
        }
    }
}

impl WaitOptions {
    /// Creates options with the default timeout and interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the overall timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the probe interval.
    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}

/// Polls `probe` until it reports readiness or the timeout elapses.
///
/// The probe returns `Ok(true)` when the awaited state is reached,
/// `Ok(false)` when not yet, and `Err` for a transient query failure.
/// Probe errors are retried until the budget runs out. On timeout the
/// last probe error, if any, is attached as context.
pub async fn wait_until<F, Fut>(
    description: &str,
    options: WaitOptions,
    mut probe: F,
) -> anyhow::Result<()>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = anyhow::Result<bool>>,
{
    let deadline = tokio::time::Instant::now() + options.timeout;
    let mut attempt = 0_u32;
    let mut last_error: Option<anyhow::Error> = None;

    loop {
        attempt += 1;
        match probe().await {
            Ok(true) => {
                debug!(description, attempt, "condition reached");
                return Ok(());
            }
            Ok(false) => {
                debug!(description, attempt, "not ready yet");
            }
            Err(error) => {
                debug!(description, attempt, error = %error, "probe failed; will retry");
                last_error = Some(error);
            }
        }

        if tokio::time::Instant::now() + options.interval > deadline {
            let message = format!(
                "timed out after {:?} waiting for {description} ({attempt} attempts)",
                options.timeout
            );
            return Err(match last_error {
                Some(error) => error.context(message),
                None => anyhow::anyhow!(message),
            });
        }

        tokio::time::sleep(options.interval).await;
    }
}
