//! Configuration loading from disk.
//!
//! # Algorithm
//! ```text
//! load(path, schema_key)
//!     → cache hit? return it (no I/O)
//!     → file missing?          FileNotFound       (terminal)
//!     → extension unknown?     UnsupportedFormat  (terminal)
//!     → read + parse, retried on Read/Parse errors within the budget
//!     → validate against schema_key, if any   Validation (terminal)
//!     → cache.set + content-loaded
//! ```
//!
//! A failed load never touches the cache: the last good value survives.

use std::path::Path;
use std::sync::Arc;

use arc_swap::ArcSwap;
use serde_json::Value;

use crate::content::cache::ContentCache;
use crate::content::format::ContentFormat;
use crate::content::path::canonicalize;
use crate::content::source::ContentSource;
use crate::error::{ContentError, Result};
use crate::events::{ContentEvent, EventBus};
use crate::observability::metrics;
use crate::resilience::RetryPolicy;
use crate::schema::{validate, SchemaRegistry, ValidationResult};

/// Per-call loader options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// Serve from the cache when an entry exists.
    pub use_cache: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self { use_cache: true }
    }
}

impl LoadOptions {
    pub fn bypass_cache() -> Self {
        Self { use_cache: false }
    }
}

/// Reads, parses, validates and caches configuration documents.
pub struct ContentLoader {
    cache: Arc<ContentCache>,
    schemas: Arc<ArcSwap<SchemaRegistry>>,
    events: EventBus,
    retry: RetryPolicy,
    source: Arc<dyn ContentSource>,
}

impl ContentLoader {
    pub fn new(
        cache: Arc<ContentCache>,
        schemas: Arc<ArcSwap<SchemaRegistry>>,
        events: EventBus,
        retry: RetryPolicy,
        source: Arc<dyn ContentSource>,
    ) -> Self {
        Self {
            cache,
            schemas,
            events,
            retry,
            source,
        }
    }

    /// Validate `content` against the currently published registry.
    pub fn validate(&self, content: &Value, schema_key: &str) -> ValidationResult {
        validate(&self.schemas.load(), content, schema_key)
    }

    /// Load `path`, validating against `schema_key` when given.
    pub async fn load(
        &self,
        path: &Path,
        schema_key: Option<&str>,
        options: LoadOptions,
    ) -> Result<Arc<Value>> {
        let path = canonicalize(path);

        if options.use_cache {
            if let Some(content) = self.cache.get(&path) {
                tracing::debug!(path = %path.display(), "Serving content from cache");
                metrics::record_load("cache_hit");
                return Ok(content);
            }
        }

        if !file_exists(&path).await {
            metrics::record_load("not_found");
            return Err(ContentError::FileNotFound(path));
        }

        let format = ContentFormat::from_path(&path).inspect_err(|_| {
            metrics::record_load("unsupported");
        })?;

        let target = path.as_path();
        let source = &self.source;
        let parsed = self
            .retry
            .run(move |attempt| async move {
                metrics::record_load_attempt();
                tracing::trace!(path = %target.display(), attempt, "Reading content");
                let raw = source.read(target).await.map_err(|e| ContentError::Read {
                    path: target.to_path_buf(),
                    source: e,
                })?;
                format.parse(target, &raw)
            })
            .await;

        let content = match parsed {
            Ok(content) => content,
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "Failed to load content");
                metrics::record_load("failed");
                return Err(e);
            }
        };

        if let Some(key) = schema_key {
            let result = self.validate(&content, key);
            if !result.valid {
                tracing::warn!(
                    path = %path.display(),
                    schema = key,
                    errors = ?result.errors,
                    "Content failed validation, keeping previous version"
                );
                metrics::record_load("invalid");
                self.events.emit(ContentEvent::ValidationFailed {
                    file_path: path.clone(),
                    schema_key: Some(key.to_string()),
                    error: Arc::new(ContentError::Validation {
                        path: path.clone(),
                        schema_key: key.to_string(),
                        errors: result.errors.clone(),
                    }),
                });
                return Err(ContentError::Validation {
                    path,
                    schema_key: key.to_string(),
                    errors: result.errors,
                });
            }
        }

        let content = Arc::new(content);
        let schema_key = schema_key.map(str::to_string);
        self.cache.set(path.clone(), content.clone(), schema_key.clone());
        metrics::record_load("loaded");
        tracing::info!(path = %path.display(), schema = ?schema_key, "Content loaded");

        self.events.emit(ContentEvent::ContentLoaded {
            file_path: path,
            schema_key,
            content: content.clone(),
        });

        Ok(content)
    }
}

/// Whether `path` names an existing, accessible regular file.
pub async fn file_exists(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false)
}
