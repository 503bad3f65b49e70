//! Content subsystem.
//!
//! # Data Flow
//! ```text
//! configuration file (.json / .toml)
//!     → path.rs (canonical cache key)
//!     → source.rs (raw read)
//!     → format.rs (parser chosen by extension)
//!     → loader.rs (retry, validate)
//!     → cache.rs (last known good content)
//! ```
//!
//! # Design Decisions
//! - Cache keys are canonical paths, so `./a.json` and `/srv/x/a.json` share one entry
//! - Content is shared as `Arc<Value>`; consumers never copy documents

pub mod cache;
pub mod format;
pub mod loader;
pub mod path;
pub mod source;

pub use cache::{CacheEntry, CacheStats, ContentCache};
pub use format::ContentFormat;
pub use loader::{file_exists, ContentLoader, LoadOptions};
pub use path::canonicalize;
pub use source::{ContentSource, FsSource};
