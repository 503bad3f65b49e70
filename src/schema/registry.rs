//! Schema registry.
//!
//! # Responsibilities
//! - List the schema directory and parse every `.json` file
//! - Compile each document into a JSON Schema validator
//! - Index schemas by key (filename stem) in registration order
//!
//! # Design Decisions
//! - A registry is built completely or not at all; callers publish it
//!   only after `load_dir` returns `Ok`
//! - Files are registered in filename order so key listings are stable

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use jsonschema::JSONSchema;
use serde_json::Value;

use crate::error::{ContentError, Result};

/// A named, compiled JSON Schema.
pub struct SchemaEntry {
    key: String,
    document: Arc<Value>,
    compiled: JSONSchema,
}

impl SchemaEntry {
    /// Compile a schema document under the given key.
    ///
    /// `origin` is only used for error reporting.
    pub fn compile(key: impl Into<String>, document: Value, origin: &Path) -> Result<Self> {
        let compiled = JSONSchema::compile(&document).map_err(|e| ContentError::SchemaLoad {
            path: origin.to_path_buf(),
            message: e.to_string(),
        })?;

        Ok(Self {
            key: key.into(),
            document: Arc::new(document),
            compiled,
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// The raw schema document as it was read from disk.
    pub fn document(&self) -> &Arc<Value> {
        &self.document
    }

    pub(crate) fn compiled(&self) -> &JSONSchema {
        &self.compiled
    }
}

impl fmt::Debug for SchemaEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaEntry").field("key", &self.key).finish()
    }
}

/// Immutable set of schemas keyed by name.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    order: Vec<String>,
    entries: HashMap<String, SchemaEntry>,
}

impl SchemaRegistry {
    /// Create an empty registry (the state before `initialize`).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load every `.json` schema in `dir`.
    pub async fn load_dir(dir: &Path) -> Result<Self> {
        let init_err = |source| ContentError::Initialization {
            path: dir.to_path_buf(),
            source,
        };

        let mut read_dir = tokio::fs::read_dir(dir).await.map_err(init_err)?;
        let mut files: Vec<PathBuf> = Vec::new();
        while let Some(entry) = read_dir.next_entry().await.map_err(init_err)? {
            let path = entry.path();
            let is_file = entry.file_type().await.map(|t| t.is_file()).unwrap_or(false);
            if is_file && path.extension().and_then(|e| e.to_str()) == Some("json") {
                files.push(path);
            }
        }
        files.sort();

        let mut registry = Self::empty();
        for path in files {
            let key = match path.file_stem().and_then(|s| s.to_str()) {
                Some(stem) => stem.to_string(),
                None => {
                    return Err(ContentError::SchemaLoad {
                        path,
                        message: "schema filename is not valid UTF-8".into(),
                    })
                }
            };

            let raw = tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| ContentError::SchemaLoad {
                    path: path.clone(),
                    message: e.to_string(),
                })?;
            let document: Value =
                serde_json::from_str(&raw).map_err(|e| ContentError::SchemaLoad {
                    path: path.clone(),
                    message: e.to_string(),
                })?;

            registry.insert(SchemaEntry::compile(key.clone(), document, &path)?);
            tracing::debug!(schema = %key, path = %path.display(), "Schema registered");
        }

        Ok(registry)
    }

    /// Build a registry from in-memory documents, in iteration order.
    pub fn from_documents<I, K>(documents: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let mut registry = Self::empty();
        for (key, document) in documents {
            let key = key.into();
            let origin = PathBuf::from(format!("<memory:{}>", key));
            registry.insert(SchemaEntry::compile(key, document, &origin)?);
        }
        Ok(registry)
    }

    fn insert(&mut self, entry: SchemaEntry) {
        let key = entry.key.clone();
        if self.entries.insert(key.clone(), entry).is_none() {
            self.order.push(key);
        }
    }

    pub fn get(&self, key: &str) -> Option<&SchemaEntry> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Registered keys in registration order.
    pub fn keys(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
