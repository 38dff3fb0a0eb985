//! Whole-cycle retry.

use std::future::Future;

use tracing::{info, warn};

use super::config::RetryPolicy;
use super::error::ScrapeError;

/// Result of running an operation under a [`RetryScheduler`].
///
/// Exhausting every attempt is reported here rather than as an error, so the
/// caller decides what a failed cycle means (usually: publish nothing and
/// leave the previous output in place).
#[derive(Debug)]
pub struct RetryOutcome<T> {
    /// The successful attempt's value, if any attempt succeeded.
    pub value: Option<T>,
    /// Failures in attempt order.
    pub failures: Vec<ScrapeError>,
    /// Attempts made, including the successful one.
    pub attempts: u32,
}

impl<T> RetryOutcome<T> {
    pub fn succeeded(&self) -> bool {
        self.value.is_some()
    }
}

/// Runs an attempt up to a bounded number of times with a fixed delay.
#[derive(Debug, Clone, Default)]
pub struct RetryScheduler {
    policy: RetryPolicy,
}

impl RetryScheduler {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    /// Run `attempt` until it succeeds or the policy is exhausted.
    ///
    /// `attempt` receives the 1-based attempt number and must build all of
    /// its state from scratch; nothing carries over between attempts. The
    /// delay is only applied between attempts. A policy of zero attempts is
    /// treated as one.
    pub async fn run<T, F, Fut>(&self, mut attempt: F) -> RetryOutcome<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, ScrapeError>>,
    {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut failures = Vec::new();

        for n in 1..=max_attempts {
            match attempt(n).await {
                Ok(value) => {
                    info!(attempt = n, "Attempt succeeded");
                    return RetryOutcome {
                        value: Some(value),
                        failures,
                        attempts: n,
                    };
                }
                Err(e) => {
                    warn!(attempt = n, max_attempts, error = %e, "Attempt failed");
                    failures.push(e);
                    if n < max_attempts {
                        tokio::time::sleep(self.policy.delay).await;
                    }
                }
            }
        }

        RetryOutcome {
            value: None,
            failures,
            attempts: max_attempts,
        }
    }
}
