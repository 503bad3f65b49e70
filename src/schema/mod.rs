//! Schema subsystem.
//!
//! # Data Flow
//! ```text
//! schema directory (*.json)
//!     → registry.rs (parse, compile, index by filename stem)
//!     → SchemaRegistry (immutable, published via ArcSwap)
//!
//! Content to check:
//!     → validator.rs (lookup by key, collect every violation)
//!     → ValidationResult { valid, errors }
//! ```

pub mod registry;
pub mod validator;

pub use registry::{SchemaEntry, SchemaRegistry};
pub use validator::{validate, ValidationResult};
