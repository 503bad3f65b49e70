//! Service configuration subsystem.
//!
//! # Data Flow
//! ```text
//! settings file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ServiceConfig (validated, immutable)
//!     → ContentService::new
//! ```
//!
//! # Design Decisions
//! - Settings are read once at startup; only content files hot reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{EventsConfig, FileConfig, LoaderConfig, ObservabilityConfig, ServiceConfig, WatchConfig};
