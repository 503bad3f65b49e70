//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load settings → Initialize schemas → Load files → Watch files
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop forwarders → cleanup() → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//!     SIGHUP → Reload every watched file
//! ```

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use signals::{ControlSignal, SignalListener};
