//! Content service facade.
//!
//! # Responsibilities
//! - Compose registry, cache, loader, watch manager and event bus
//! - Expose the operations display consumers call
//! - Single shutdown entry point (`cleanup`)

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;
use serde_json::Value;
use tokio::sync::broadcast;

use crate::config::ServiceConfig;
use crate::content::{
    canonicalize, file_exists, CacheStats, ContentCache, ContentLoader, ContentSource, FsSource,
    LoadOptions,
};
use crate::error::Result;
use crate::events::{ContentEvent, EventBus};
use crate::schema::{SchemaRegistry, ValidationResult};
use crate::watch::{NotifyBackend, WatchBackend, WatchManager};

/// Configuration & hot-reload service.
pub struct ContentService {
    config: ServiceConfig,
    schemas: Arc<ArcSwap<SchemaRegistry>>,
    cache: Arc<ContentCache>,
    events: EventBus,
    loader: Arc<ContentLoader>,
    watches: WatchManager,
    initialized: AtomicBool,
}

impl ContentService {
    /// Create a service reading from the filesystem with `notify` watchers.
    pub fn new(config: ServiceConfig) -> Self {
        let backend = Arc::new(NotifyBackend::new(config.watch.mode()));
        Self::with_components(config, Arc::new(FsSource), backend)
    }

    /// Create a service with explicit content source and watch backend.
    pub fn with_components(
        config: ServiceConfig,
        source: Arc<dyn ContentSource>,
        backend: Arc<dyn WatchBackend>,
    ) -> Self {
        let schemas = Arc::new(ArcSwap::from_pointee(SchemaRegistry::empty()));
        let cache = Arc::new(ContentCache::new());
        let events = EventBus::new(config.events.capacity);
        let loader = Arc::new(ContentLoader::new(
            cache.clone(),
            schemas.clone(),
            events.clone(),
            config.loader.retry_policy(),
            source,
        ));
        let watches = WatchManager::new(
            backend,
            loader.clone(),
            cache.clone(),
            events.clone(),
            config.watch.debounce(),
        );

        Self {
            config,
            schemas,
            cache,
            events,
            loader,
            watches,
            initialized: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Load schemas from the configured schema directory.
    pub async fn initialize(&self) -> Result<()> {
        let dir = self.config.schema_dir.clone();
        self.initialize_from(&dir).await
    }

    /// Load schemas from `schema_dir`.
    ///
    /// On failure the registry is left empty and the service uninitialized.
    pub async fn initialize_from(&self, schema_dir: &Path) -> Result<()> {
        match SchemaRegistry::load_dir(schema_dir).await {
            Ok(registry) => {
                if registry.is_empty() {
                    tracing::warn!(schema_dir = %schema_dir.display(), "No schemas found");
                }
                tracing::info!(
                    schema_dir = %schema_dir.display(),
                    count = registry.len(),
                    schemas = ?registry.keys(),
                    "Schema registry initialized"
                );
                self.schemas.store(Arc::new(registry));
                self.initialized.store(true, Ordering::SeqCst);
                Ok(())
            }
            Err(e) => {
                tracing::error!(schema_dir = %schema_dir.display(), error = %e, "Schema registry initialization failed");
                self.schemas.store(Arc::new(SchemaRegistry::empty()));
                self.initialized.store(false, Ordering::SeqCst);
                Err(e)
            }
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// Registered schema keys in registration order.
    pub fn available_schemas(&self) -> Vec<String> {
        self.schemas.load().keys().to_vec()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ContentEvent> {
        self.events.subscribe()
    }

    /// Load, validate and cache one file.
    pub async fn load_configuration(
        &self,
        path: &Path,
        schema_key: Option<&str>,
        options: LoadOptions,
    ) -> Result<Arc<Value>> {
        self.loader.load(path, schema_key, options).await
    }

    pub fn validate_content(&self, content: &Value, schema_key: &str) -> ValidationResult {
        self.loader.validate(content, schema_key)
    }

    /// Watch one or more files; returns the newly registered canonical paths.
    pub fn watch_files<I, P>(&self, paths: I, schema_key: Option<&str>) -> Vec<PathBuf>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        self.watches.watch(paths, schema_key)
    }

    /// Stop watching `path`, or everything when `None`.
    pub fn stop_watching(&self, path: Option<&Path>) -> usize {
        self.watches.unwatch(path)
    }

    pub fn watched_files(&self) -> Vec<(PathBuf, Option<String>)> {
        self.watches.watched()
    }

    /// Queue a reload of every watched file.
    pub fn reload_watched(&self) -> usize {
        self.watches.reload_all()
    }

    /// Store already-validated content and announce it as `content-updated`.
    pub fn notify_change(
        &self,
        path: &Path,
        content: impl Into<Arc<Value>>,
        schema_key: Option<&str>,
    ) -> Arc<Value> {
        let path = canonicalize(path);
        let content = content.into();
        let schema_key = schema_key.map(str::to_string);

        self.cache.set(path.clone(), content.clone(), schema_key.clone());
        tracing::debug!(path = %path.display(), "Content updated programmatically");
        self.events.emit(ContentEvent::ContentUpdated {
            file_path: path,
            schema_key,
            content: content.clone(),
        });
        content
    }

    pub async fn file_exists(&self, path: &Path) -> bool {
        file_exists(path).await
    }

    /// Cached content for `path`, without any I/O.
    pub fn cached(&self, path: &Path) -> Option<Arc<Value>> {
        self.cache.get(&canonicalize(path))
    }

    pub fn clear_cache_for_file(&self, path: &Path) -> bool {
        self.cache.invalidate(&canonicalize(path))
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Close every watcher, cancel pending reloads and empty the cache.
    ///
    /// Safe to call repeatedly.
    pub fn cleanup(&self) {
        let closed = self.watches.unwatch(None);
        let cleared = self.cache.len();
        self.cache.clear();
        tracing::info!(watchers_closed = closed, cache_entries_cleared = cleared, "Content service cleaned up");
    }
}
