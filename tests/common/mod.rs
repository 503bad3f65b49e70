//! Shared utilities for integration testing.
#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use kiosk_content::config::ServiceConfig;
use kiosk_content::content::ContentSource;
use kiosk_content::error::Result;
use kiosk_content::watch::{WatchBackend, WatchHandle, WatchSignal};
use kiosk_content::{ContentEvent, ContentService};
use tokio::sync::{broadcast, mpsc};

pub const DEBOUNCE_MS: u64 = 100;

/// Watch backend driven by the test instead of the OS.
#[derive(Default)]
pub struct ManualBackend {
    senders: Mutex<HashMap<PathBuf, mpsc::UnboundedSender<WatchSignal>>>,
    watch_calls: AtomicUsize,
    close_calls: Arc<AtomicUsize>,
}

impl ManualBackend {
    /// Push a raw signal as if the OS watcher had reported it.
    pub fn emit(&self, path: &Path, signal: WatchSignal) {
        let senders = self.senders.lock().unwrap();
        let tx = senders.get(path).expect("path is not watched");
        let _ = tx.send(signal);
    }

    pub fn watch_calls(&self) -> usize {
        self.watch_calls.load(Ordering::SeqCst)
    }

    pub fn close_calls(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }
}

struct ManualHandle {
    closed: bool,
    close_calls: Arc<AtomicUsize>,
}

impl WatchHandle for ManualHandle {
    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.close_calls.fetch_add(1, Ordering::SeqCst);
        }
    }
}

impl WatchBackend for ManualBackend {
    fn watch(
        &self,
        path: &Path,
        signals: mpsc::UnboundedSender<WatchSignal>,
    ) -> Result<Box<dyn WatchHandle>> {
        self.watch_calls.fetch_add(1, Ordering::SeqCst);
        self.senders.lock().unwrap().insert(path.to_path_buf(), signals);
        Ok(Box::new(ManualHandle {
            closed: false,
            close_calls: self.close_calls.clone(),
        }))
    }
}

/// Filesystem source that counts reads and can fail the first few.
#[derive(Default)]
pub struct CountingSource {
    reads: AtomicU32,
    failures_left: AtomicU32,
}

impl CountingSource {
    pub fn failing_first(failures: u32) -> Self {
        Self {
            reads: AtomicU32::new(0),
            failures_left: AtomicU32::new(failures),
        }
    }

    pub fn reads(&self) -> u32 {
        self.reads.load(Ordering::SeqCst)
    }
}

impl ContentSource for CountingSource {
    fn read<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, std::io::Result<String>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let fail = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();

        async move {
            if fail {
                Err(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "simulated transient failure",
                ))
            } else {
                tokio::fs::read_to_string(path).await
            }
        }
        .boxed()
    }
}

/// Service plus the doubles wired into it.
pub struct Harness {
    pub service: ContentService,
    pub source: Arc<CountingSource>,
    pub backend: Arc<ManualBackend>,
    pub dir: tempfile::TempDir,
}

impl Harness {
    pub fn path(&self, name: &str) -> PathBuf {
        std::fs::canonicalize(self.dir.path()).unwrap().join(name)
    }

    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.path(name);
        std::fs::write(&path, content).unwrap();
        path
    }
}

/// Build an initialized service over a temp dir holding a `test` schema.
pub async fn harness(max_retries: u32, source: CountingSource) -> Harness {
    harness_with_delay(max_retries, 10, source).await
}

/// Like [`harness`], with an explicit delay between load retries.
pub async fn harness_with_delay(max_retries: u32, retry_delay_ms: u64, source: CountingSource) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let schema_dir = dir.path().join("schemas");
    std::fs::create_dir(&schema_dir).unwrap();
    std::fs::write(
        schema_dir.join("test.json"),
        r#"{
            "type": "object",
            "required": ["value"],
            "properties": { "value": { "type": "string" } }
        }"#,
    )
    .unwrap();

    let mut config = ServiceConfig::default();
    config.schema_dir = schema_dir;
    config.loader.max_retries = max_retries;
    config.loader.retry_delay_ms = retry_delay_ms;
    config.watch.debounce_ms = DEBOUNCE_MS;

    let source = Arc::new(source);
    let backend = Arc::new(ManualBackend::default());
    let service = ContentService::with_components(config, source.clone(), backend.clone());
    service.initialize().await.unwrap();

    Harness {
        service,
        source,
        backend,
        dir,
    }
}

/// Wait for the next event named `name`, skipping others.
pub async fn wait_for(rx: &mut broadcast::Receiver<ContentEvent>, name: &str) -> ContentEvent {
    let wait = async {
        loop {
            let event = rx.recv().await.expect("event bus closed");
            if event.name() == name {
                return event;
            }
        }
    };
    tokio::time::timeout(Duration::from_secs(5), wait)
        .await
        .unwrap_or_else(|_| panic!("timed out waiting for {}", name))
}

/// Assert no event named `name` arrives within `within`.
pub async fn assert_no_event(rx: &mut broadcast::Receiver<ContentEvent>, name: &str, within: Duration) {
    let deadline = tokio::time::Instant::now() + within;
    loop {
        match tokio::time::timeout_at(deadline, rx.recv()).await {
            Err(_) => return,
            Ok(Ok(event)) => assert_ne!(event.name(), name, "unexpected {} event", name),
            Ok(Err(_)) => return,
        }
    }
}
