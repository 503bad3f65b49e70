//! Kiosk content service library.
//!
//! Loads configuration documents for the kiosk display, validates them
//! against JSON Schemas, caches the last good version of each file, and
//! hot-reloads them when they change on disk.

pub mod config;
pub mod content;
pub mod error;
pub mod events;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod schema;
pub mod service;
pub mod watch;

pub use config::schema::ServiceConfig;
pub use content::LoadOptions;
pub use error::ContentError;
pub use events::{ContentEvent, EventBus};
pub use lifecycle::Shutdown;
pub use schema::ValidationResult;
pub use service::ContentService;
