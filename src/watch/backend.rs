//! Filesystem watcher backends.
//!
//! The watch manager only sees the narrow [`WatchBackend`] interface: one
//! handle per watched file, raw signals pushed into a channel, and an
//! explicit `close`. [`NotifyBackend`] implements it with `notify`, either
//! on the native OS API or by polling.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::event::{EventKind, ModifyKind};
use notify::{Config, Event, PollWatcher, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::error::{ContentError, Result};

/// Raw notification for one watched file, before debouncing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchSignal {
    /// The file was created, written, or replaced.
    Changed,
    /// The file no longer exists.
    Removed,
    /// The underlying watcher failed.
    Error(String),
}

/// An open OS-level watch on one file.
pub trait WatchHandle: Send {
    /// Release the underlying watcher. Must be safe to call more than once.
    fn close(&mut self);
}

/// Factory for per-file watch handles.
pub trait WatchBackend: Send + Sync + 'static {
    fn watch(
        &self,
        path: &Path,
        signals: mpsc::UnboundedSender<WatchSignal>,
    ) -> Result<Box<dyn WatchHandle>>;
}

/// Which `notify` implementation to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatcherMode {
    Native,
    Polling(Duration),
}

/// `notify`-based backend.
///
/// Watches the parent directory non-recursively and filters for the target
/// file, so editors that save by writing a temp file and renaming it over
/// the original still produce a change.
#[derive(Debug, Clone, Copy)]
pub struct NotifyBackend {
    mode: WatcherMode,
}

impl NotifyBackend {
    pub fn new(mode: WatcherMode) -> Self {
        Self { mode }
    }
}

impl Default for NotifyBackend {
    fn default() -> Self {
        Self::new(WatcherMode::Native)
    }
}

enum OsWatcher {
    Native(RecommendedWatcher),
    Polling(PollWatcher),
}

struct NotifyHandle {
    watcher: Option<OsWatcher>,
    dir: PathBuf,
}

impl WatchHandle for NotifyHandle {
    fn close(&mut self) {
        // Dropping the watcher stops its background thread.
        match self.watcher.take() {
            Some(OsWatcher::Native(mut w)) => {
                let _ = w.unwatch(&self.dir);
            }
            Some(OsWatcher::Polling(mut w)) => {
                let _ = w.unwatch(&self.dir);
            }
            None => {}
        }
    }
}

impl WatchBackend for NotifyBackend {
    fn watch(
        &self,
        path: &Path,
        signals: mpsc::UnboundedSender<WatchSignal>,
    ) -> Result<Box<dyn WatchHandle>> {
        let target = path.to_path_buf();
        let dir = target
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| target.clone());
        let watch_err = |e: notify::Error| ContentError::Watch {
            path: path.to_path_buf(),
            message: e.to_string(),
        };

        let handler = move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if !event.paths.iter().any(|p| p == &target) {
                    return;
                }
                if let Some(signal) = classify(&event.kind, &target) {
                    let _ = signals.send(signal);
                }
            }
            Err(e) => {
                let _ = signals.send(WatchSignal::Error(e.to_string()));
            }
        };

        let watcher = match self.mode {
            WatcherMode::Native => {
                let mut w = RecommendedWatcher::new(handler, Config::default()).map_err(watch_err)?;
                w.watch(&dir, RecursiveMode::NonRecursive).map_err(watch_err)?;
                OsWatcher::Native(w)
            }
            WatcherMode::Polling(interval) => {
                let mut w = PollWatcher::new(handler, Config::default().with_poll_interval(interval))
                    .map_err(watch_err)?;
                w.watch(&dir, RecursiveMode::NonRecursive).map_err(watch_err)?;
                OsWatcher::Polling(w)
            }
        };

        tracing::debug!(path = %path.display(), mode = ?self.mode, "OS watcher started");
        Ok(Box::new(NotifyHandle {
            watcher: Some(watcher),
            dir,
        }))
    }
}

/// Map a `notify` event kind to a signal for `target`.
fn classify(kind: &EventKind, target: &Path) -> Option<WatchSignal> {
    match kind {
        EventKind::Access(_) => None,
        EventKind::Remove(_) | EventKind::Modify(ModifyKind::Name(_)) => {
            // Renames are reported for both ends; the file's presence decides.
            if target.exists() {
                Some(WatchSignal::Changed)
            } else {
                Some(WatchSignal::Removed)
            }
        }
        _ => Some(WatchSignal::Changed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, CreateKind, DataChange, RemoveKind, RenameMode};

    #[test]
    fn test_classify_event_kinds() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("branding.json");

        assert_eq!(classify(&EventKind::Remove(RemoveKind::File), &file), Some(WatchSignal::Removed));
        assert_eq!(
            classify(&EventKind::Modify(ModifyKind::Name(RenameMode::From)), &file),
            Some(WatchSignal::Removed)
        );

        std::fs::write(&file, "{}").unwrap();
        assert_eq!(
            classify(&EventKind::Modify(ModifyKind::Name(RenameMode::To)), &file),
            Some(WatchSignal::Changed)
        );
        assert_eq!(
            classify(&EventKind::Modify(ModifyKind::Data(DataChange::Content)), &file),
            Some(WatchSignal::Changed)
        );
        assert_eq!(classify(&EventKind::Create(CreateKind::File), &file), Some(WatchSignal::Changed));
        assert_eq!(classify(&EventKind::Access(AccessKind::Read), &file), None);
    }

    #[tokio::test]
    async fn test_polling_backend_reports_changes() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("system.json");
        std::fs::write(&file, "{}").unwrap();
        let file = std::fs::canonicalize(&file).unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        let backend = NotifyBackend::new(WatcherMode::Polling(Duration::from_millis(50)));
        let mut handle = backend.watch(&file, tx).unwrap();

        tokio::time::sleep(Duration::from_millis(150)).await;
        std::fs::write(&file, r#"{"display": {}}"#).unwrap();

        let signal = tokio::time::timeout(Duration::from_secs(5), rx.recv()).await.unwrap();
        assert_eq!(signal, Some(WatchSignal::Changed));

        handle.close();
        handle.close();
    }
}
