//! Retry logic for transient content failures.
//!
//! # Design Decisions
//! - Only transient errors (read/parse) are retried; missing files,
//!   unsupported formats and schema violations can never self-resolve
//! - Budget is `max_retries` extra attempts on top of the first
//! - Only the error from the final attempt is surfaced

use std::future::Future;
use std::time::Duration;

use crate::error::ContentError;
use crate::resilience::backoff::{calculate_backoff, BackoffStrategy};

/// Bounded retry budget with a configurable delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub delay: Duration,
    pub strategy: BackoffStrategy,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, delay: Duration, strategy: BackoffStrategy) -> Self {
        Self {
            max_retries,
            delay,
            strategy,
        }
    }

    /// Total attempts allowed, including the first.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    pub fn delay_for(&self, retry: u32) -> Duration {
        calculate_backoff(retry, self.delay.as_millis() as u64, self.strategy)
    }

    /// Run `op` until it succeeds, fails terminally, or the budget runs out.
    ///
    /// `op` receives the zero-based attempt number.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T, ContentError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, ContentError>>,
    {
        let mut attempt = 0;
        loop {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    attempt += 1;
                    let delay = self.delay_for(attempt);
                    tracing::warn!(
                        attempt,
                        max_retries = self.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Transient failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(1000), BackoffStrategy::Fixed)
    }
}
