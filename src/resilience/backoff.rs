//! Delay between retry attempts.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How the delay grows from one retry to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffStrategy {
    /// Same delay before every retry.
    #[default]
    Fixed,
    /// Delay multiplied by the retry number (1x, 2x, 3x ...).
    Incremental,
}

/// Delay before retry number `attempt` (1-based; 0 means the first try).
pub fn calculate_backoff(attempt: u32, base_ms: u64, strategy: BackoffStrategy) -> Duration {
    if attempt == 0 {
        return Duration::from_millis(0);
    }

    let delay_ms = match strategy {
        BackoffStrategy::Fixed => base_ms,
        BackoffStrategy::Incremental => base_ms.saturating_mul(attempt as u64),
    };

    Duration::from_millis(delay_ms)
}
