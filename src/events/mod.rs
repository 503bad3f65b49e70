//! Event bus for content lifecycle notifications.
//!
//! # Data Flow
//! ```text
//! loader / watch manager / service
//!     → EventBus::emit(ContentEvent)
//!     → tokio broadcast channel
//!     → every subscriber (branding, carousel, layout consumers)
//! ```
//!
//! # Design Decisions
//! - Consumers subscribe instead of polling
//! - Emitting never fails, even with zero subscribers
//! - Slow subscribers lag and skip events rather than block producers

use std::path::PathBuf;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::broadcast;

use crate::error::ContentError;
use crate::observability::metrics;

/// Default capacity of the broadcast channel.
pub const DEFAULT_CAPACITY: usize = 256;

/// A notification about the lifecycle of one configuration file.
#[derive(Debug, Clone)]
pub enum ContentEvent {
    /// A file was loaded and validated through the loader.
    ContentLoaded {
        file_path: PathBuf,
        schema_key: Option<String>,
        content: Arc<Value>,
    },
    /// Fresh content replaced what consumers hold (watch reload or programmatic update).
    ContentUpdated {
        file_path: PathBuf,
        schema_key: Option<String>,
        content: Arc<Value>,
    },
    /// Content parsed but violated its schema.
    ValidationFailed {
        file_path: PathBuf,
        schema_key: Option<String>,
        error: Arc<ContentError>,
    },
    /// A watch-triggered reload failed.
    ContentError {
        file_path: PathBuf,
        schema_key: Option<String>,
        error: Arc<ContentError>,
    },
    /// A watched file disappeared.
    FileDeleted { file_path: PathBuf },
    /// The underlying watcher reported a failure.
    WatchError {
        file_path: PathBuf,
        error: Arc<ContentError>,
    },
}

impl ContentEvent {
    /// Wire name of the event.
    pub fn name(&self) -> &'static str {
        match self {
            ContentEvent::ContentLoaded { .. } => "content-loaded",
            ContentEvent::ContentUpdated { .. } => "content-updated",
            ContentEvent::ValidationFailed { .. } => "validation-error",
            ContentEvent::ContentError { .. } => "content-error",
            ContentEvent::FileDeleted { .. } => "file-deleted",
            ContentEvent::WatchError { .. } => "watch-error",
        }
    }

    pub fn file_path(&self) -> &PathBuf {
        match self {
            ContentEvent::ContentLoaded { file_path, .. }
            | ContentEvent::ContentUpdated { file_path, .. }
            | ContentEvent::ValidationFailed { file_path, .. }
            | ContentEvent::ContentError { file_path, .. }
            | ContentEvent::FileDeleted { file_path }
            | ContentEvent::WatchError { file_path, .. } => file_path,
        }
    }
}

/// Publish/subscribe hub shared by every component of the service.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ContentEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Subscribe to every event emitted from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<ContentEvent> {
        self.tx.subscribe()
    }

    pub fn emit(&self, event: ContentEvent) {
        metrics::record_event(event.name());
        tracing::trace!(event = event.name(), path = %event.file_path().display(), "Emitting event");
        // No subscribers is not an error.
        let _ = self.tx.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_without_subscribers_is_silent() {
        let bus = EventBus::default();
        bus.emit(ContentEvent::FileDeleted {
            file_path: PathBuf::from("/tmp/gone.json"),
        });
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_every_subscriber_receives_event() {
        let bus = EventBus::default();
        let mut a = bus.subscribe();
        let mut b = bus.subscribe();

        bus.emit(ContentEvent::FileDeleted {
            file_path: PathBuf::from("/tmp/gone.json"),
        });

        for rx in [&mut a, &mut b] {
            let event = rx.recv().await.unwrap();
            assert_eq!(event.name(), "file-deleted");
            assert_eq!(event.file_path(), &PathBuf::from("/tmp/gone.json"));
        }
    }
}
