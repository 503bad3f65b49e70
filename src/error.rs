//! Error taxonomy for the content service.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading schemas or configuration content.
#[derive(Debug, Error)]
pub enum ContentError {
    /// The schema directory could not be listed.
    #[error("Failed to initialize schema registry from {}: {source}", path.display())]
    Initialization {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A schema file could not be read, parsed, or compiled.
    #[error("Failed to load schema {}: {message}", path.display())]
    SchemaLoad { path: PathBuf, message: String },

    /// Target file is missing or inaccessible.
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// No parser is registered for the file extension.
    #[error("Unsupported file format: {extension} ({})", path.display())]
    UnsupportedFormat { path: PathBuf, extension: String },

    /// Reading the file failed (transient).
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file content could not be parsed (transient, the file may be mid-write).
    #[error("Failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    /// Content does not satisfy its schema.
    #[error("Validation failed for {} against '{schema_key}': {}", path.display(), errors.join("; "))]
    Validation {
        path: PathBuf,
        schema_key: String,
        errors: Vec<String>,
    },

    /// The filesystem watcher could not be created or reported a failure.
    #[error("Watch error for {}: {message}", path.display())]
    Watch { path: PathBuf, message: String },
}

impl ContentError {
    /// Whether retrying the same operation may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, ContentError::Read { .. } | ContentError::Parse { .. })
    }

    /// Violation messages for validation failures, empty otherwise.
    pub fn validation_errors(&self) -> &[String] {
        match self {
            ContentError::Validation { errors, .. } => errors,
            _ => &[],
        }
    }
}

pub type Result<T> = std::result::Result<T, ContentError>;
