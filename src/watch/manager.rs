//! Watch registrations and debounced reloads.
//!
//! # Per-path task
//! ```text
//! backend signal ──▶ Changed  → (re)arm debounce deadline
//!                    Removed  → disarm, drop cache entry, file-deleted
//!                    Error    → watch-error (watcher kept)
//! deadline hit ────▶ invalidate cache → loader.load → content-updated | content-error
//! ```
//!
//! Each path owns exactly one task, and the reload runs inside it, so reloads
//! for the same path never overlap. Stopping a watch aborts the task, which
//! cancels any pending debounce with it. A reload aborted part way through
//! puts the previous cache entry back when its future is dropped.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::content::{canonicalize, CacheEntry, ContentCache, ContentLoader, LoadOptions};
use crate::error::ContentError;
use crate::events::{ContentEvent, EventBus};
use crate::observability::metrics;
use crate::watch::backend::{WatchBackend, WatchHandle, WatchSignal};

struct WatchRegistration {
    handle: Box<dyn WatchHandle>,
    task: JoinHandle<()>,
    trigger: mpsc::UnboundedSender<WatchSignal>,
    schema_key: Option<String>,
}

impl WatchRegistration {
    fn close(&mut self) {
        self.task.abort();
        self.handle.close();
    }
}

/// Owns every watch registration of the service.
pub struct WatchManager {
    backend: Arc<dyn WatchBackend>,
    loader: Arc<ContentLoader>,
    cache: Arc<ContentCache>,
    events: EventBus,
    debounce: Duration,
    registrations: DashMap<PathBuf, WatchRegistration>,
}

impl WatchManager {
    pub fn new(
        backend: Arc<dyn WatchBackend>,
        loader: Arc<ContentLoader>,
        cache: Arc<ContentCache>,
        events: EventBus,
        debounce: Duration,
    ) -> Self {
        Self {
            backend,
            loader,
            cache,
            events,
            debounce,
            registrations: DashMap::new(),
        }
    }

    /// Start watching each path not already watched.
    ///
    /// Already-watched paths are skipped silently. A path whose watcher
    /// cannot be created is reported as `watch-error` and skipped. Returns
    /// the canonical paths that were newly registered.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn watch<I, P>(&self, paths: I, schema_key: Option<&str>) -> Vec<PathBuf>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut added = Vec::new();

        for path in paths {
            let path = canonicalize(path.as_ref());
            let slot = match self.registrations.entry(path.clone()) {
                Entry::Occupied(_) => {
                    tracing::debug!(path = %path.display(), "Already watching");
                    continue;
                }
                Entry::Vacant(slot) => slot,
            };

            let (tx, rx) = mpsc::unbounded_channel();
            let handle = match self.backend.watch(&path, tx.clone()) {
                Ok(handle) => handle,
                Err(e) => {
                    tracing::error!(path = %path.display(), error = %e, "Failed to start watcher");
                    self.events.emit(ContentEvent::WatchError {
                        file_path: path,
                        error: Arc::new(e),
                    });
                    continue;
                }
            };

            let reloader = Reloader {
                path: path.clone(),
                schema_key: schema_key.map(str::to_string),
                loader: self.loader.clone(),
                cache: self.cache.clone(),
                events: self.events.clone(),
                debounce: self.debounce,
            };
            let task = tokio::spawn(reloader.run(rx));

            slot.insert(WatchRegistration {
                handle,
                task,
                trigger: tx,
                schema_key: schema_key.map(str::to_string),
            });
            tracing::info!(path = %path.display(), schema = ?schema_key, "Watching file");
            added.push(path);
        }

        metrics::record_watched_files(self.registrations.len());
        added
    }

    /// Stop watching `path`, or every path when `None`.
    ///
    /// Returns how many registrations were closed; zero is not an error.
    pub fn unwatch(&self, path: Option<&Path>) -> usize {
        let closed = match path {
            Some(path) => {
                let path = canonicalize(path);
                match self.registrations.remove(&path) {
                    Some((_, mut registration)) => {
                        registration.close();
                        tracing::info!(path = %path.display(), "Stopped watching file");
                        1
                    }
                    None => 0,
                }
            }
            None => {
                let mut closed = 0;
                self.registrations.retain(|path, registration| {
                    registration.close();
                    tracing::debug!(path = %path.display(), "Stopped watching file");
                    closed += 1;
                    false
                });
                if closed > 0 {
                    tracing::info!(count = closed, "Stopped all file watchers");
                }
                closed
            }
        };

        metrics::record_watched_files(self.registrations.len());
        closed
    }

    /// Queue a debounced reload of every watched file.
    pub fn reload_all(&self) -> usize {
        let mut queued = 0;
        for registration in self.registrations.iter() {
            if registration.trigger.send(WatchSignal::Changed).is_ok() {
                queued += 1;
            }
        }
        queued
    }

    /// Watched paths with their schema keys, sorted by path.
    pub fn watched(&self) -> Vec<(PathBuf, Option<String>)> {
        let mut watched: Vec<_> = self
            .registrations
            .iter()
            .map(|r| (r.key().clone(), r.value().schema_key.clone()))
            .collect();
        watched.sort();
        watched
    }
}

impl Drop for WatchManager {
    fn drop(&mut self) {
        self.unwatch(None);
    }
}

/// State moved into a path's background task.
struct Reloader {
    path: PathBuf,
    schema_key: Option<String>,
    loader: Arc<ContentLoader>,
    cache: Arc<ContentCache>,
    events: EventBus,
    debounce: Duration,
}

impl Reloader {
    async fn run(self, mut signals: mpsc::UnboundedReceiver<WatchSignal>) {
        let mut deadline: Option<Instant> = None;

        loop {
            let signal = match deadline {
                Some(at) => tokio::select! {
                    signal = signals.recv() => signal,
                    _ = tokio::time::sleep_until(at) => {
                        deadline = None;
                        self.reload().await;
                        continue;
                    }
                },
                None => signals.recv().await,
            };

            match signal {
                Some(WatchSignal::Changed) => {
                    tracing::trace!(path = %self.path.display(), "Change detected, debouncing");
                    deadline = Some(Instant::now() + self.debounce);
                }
                Some(WatchSignal::Removed) => {
                    deadline = None;
                    self.cache.invalidate(&self.path);
                    tracing::warn!(path = %self.path.display(), "Watched file deleted");
                    self.events.emit(ContentEvent::FileDeleted {
                        file_path: self.path.clone(),
                    });
                }
                Some(WatchSignal::Error(message)) => {
                    tracing::error!(path = %self.path.display(), error = %message, "Watcher error");
                    self.events.emit(ContentEvent::WatchError {
                        file_path: self.path.clone(),
                        error: Arc::new(ContentError::Watch {
                            path: self.path.clone(),
                            message,
                        }),
                    });
                }
                None => break,
            }
        }
    }

    async fn reload(&self) {
        let mut last_known_good = LastKnownGood::take(self.cache.clone(), self.path.clone());

        match self
            .loader
            .load(&self.path, self.schema_key.as_deref(), LoadOptions::default())
            .await
        {
            Ok(content) => {
                last_known_good.discard();
                metrics::record_reload("updated");
                tracing::info!(path = %self.path.display(), "Content reloaded");
                self.events.emit(ContentEvent::ContentUpdated {
                    file_path: self.path.clone(),
                    schema_key: self.schema_key.clone(),
                    content,
                });
            }
            Err(e) => {
                metrics::record_reload("failed");
                tracing::error!(
                    path = %self.path.display(),
                    error = %e,
                    "Reload failed, keeping last known good content"
                );
                if matches!(e, ContentError::FileNotFound(_)) {
                    last_known_good.discard();
                }
                drop(last_known_good);
                self.events.emit(ContentEvent::ContentError {
                    file_path: self.path.clone(),
                    schema_key: self.schema_key.clone(),
                    error: Arc::new(e),
                });
            }
        }
    }
}

/// Cache entry held aside while its path reloads.
///
/// Dropping the guard puts the entry back, so a reload that fails or is
/// aborted mid-flight by `unwatch` leaves the previous content cached. A
/// full cache clear in the meantime wins.
struct LastKnownGood {
    cache: Arc<ContentCache>,
    path: PathBuf,
    previous: Option<CacheEntry>,
    generation: u64,
}

impl LastKnownGood {
    /// Snapshot and invalidate the entry for `path`.
    fn take(cache: Arc<ContentCache>, path: PathBuf) -> Self {
        let generation = cache.generation();
        let previous = cache.entry(&path);
        cache.invalidate(&path);
        Self {
            cache,
            path,
            previous,
            generation,
        }
    }

    /// The reload settled the entry; nothing to put back.
    fn discard(&mut self) {
        self.previous = None;
    }
}

impl Drop for LastKnownGood {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            if self.cache.restore(self.path.clone(), previous, self.generation) {
                tracing::debug!(path = %self.path.display(), "Restored last known good content");
            }
        }
    }
}
