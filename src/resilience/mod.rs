//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Loader read + parse attempt:
//!     → On failure: retries.rs (transient? budget left?)
//!     → backoff.rs (delay before the next attempt)
//! ```
//!
//! # Design Decisions
//! - Fixed delay by default; incremental growth is opt-in
//! - No jitter

pub mod backoff;
pub mod retries;

pub use backoff::BackoffStrategy;
pub use retries::RetryPolicy;
