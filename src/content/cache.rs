//! Configuration cache.
//!
//! # Responsibilities
//! - Hold the last successfully validated content per canonical path
//! - Point invalidation and full clear
//! - Report size and keys
//!
//! Callers canonicalize keys before use; the cache does no I/O.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::Serialize;
use serde_json::Value;

use crate::observability::metrics;

/// One cached document.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub content: Arc<Value>,
    pub schema_key: Option<String>,
}

/// Snapshot of the cache contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub size: usize,
    /// Cached paths, sorted.
    pub keys: Vec<PathBuf>,
}

/// Thread-safe map of canonical path -> last valid content.
#[derive(Debug, Default)]
pub struct ContentCache {
    inner: DashMap<PathBuf, CacheEntry>,
    /// Bumped by every full clear.
    generation: AtomicU64,
}

impl ContentCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &Path) -> Option<Arc<Value>> {
        self.inner.get(path).map(|r| r.value().content.clone())
    }

    pub fn entry(&self, path: &Path) -> Option<CacheEntry> {
        self.inner.get(path).map(|r| r.value().clone())
    }

    /// Insert or replace the entry for `path`.
    pub fn set(&self, path: PathBuf, content: Arc<Value>, schema_key: Option<String>) {
        self.inner.insert(path, CacheEntry { content, schema_key });
        metrics::record_cache_size(self.inner.len());
    }

    /// Remove the entry for `path`; returns whether one was present.
    pub fn invalidate(&self, path: &Path) -> bool {
        let removed = self.inner.remove(path).is_some();
        if removed {
            tracing::debug!(path = %path.display(), "Cache entry invalidated");
            metrics::record_cache_size(self.inner.len());
        }
        removed
    }

    /// Put `entry` back for `path` if the slot is still empty and the cache
    /// has not been cleared since `generation` was read.
    ///
    /// Returns whether the entry was stored.
    pub fn restore(&self, path: PathBuf, entry: CacheEntry, generation: u64) -> bool {
        // The generation is read under the slot's shard lock, which `clear`
        // must also take after bumping it.
        let restored = match self.inner.entry(path) {
            Entry::Vacant(slot) if self.generation.load(Ordering::SeqCst) == generation => {
                slot.insert(entry);
                true
            }
            _ => false,
        };
        if restored {
            metrics::record_cache_size(self.inner.len());
        }
        restored
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub fn clear(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.inner.clear();
        metrics::record_cache_size(0);
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        let mut keys: Vec<PathBuf> = self.inner.iter().map(|r| r.key().clone()).collect();
        keys.sort();
        CacheStats {
            size: keys.len(),
            keys,
        }
    }
}
