//! File watch subsystem.
//!
//! # Data Flow
//! ```text
//! watch(paths)
//!     → backend.rs (one OS watcher per canonical path)
//!     → raw WatchSignal channel
//!     → manager.rs (per-path debounce task)
//!     → loader reload → EventBus
//! ```
//!
//! # Design Decisions
//! - Registration is idempotent per canonical path
//! - Debounce deadline resets on every change; only the settle reloads
//! - Deletion is reported immediately and never reloads
//! - Watcher errors are reported; the watcher stays registered

pub mod backend;
pub mod manager;

pub use backend::{NotifyBackend, WatchBackend, WatchHandle, WatchSignal, WatcherMode};
pub use manager::WatchManager;
