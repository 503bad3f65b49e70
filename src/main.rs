//! Kiosk content service daemon.
//!
//! # Architecture Overview
//!
//! ```text
//!   settings.toml ──▶ config ──▶ lifecycle::startup
//!                                      │
//!                                      ▼
//!   schemas/*.json ──▶ schema registry ◀── validator
//!                                      │
//!   branding.json ─┐                   ▼
//!   sponsors.json ─┼──▶ watch ──▶ content loader ──▶ cache
//!   system.json  ──┘   (debounce)  (retry+validate)    │
//!                                      │               │
//!                                      ▼               ▼
//!                                   event bus ──▶ display consumers
//! ```
//!
//! Runs until SIGINT/SIGTERM. SIGHUP reloads every watched file.

use std::path::PathBuf;

use clap::Parser;
use tokio::sync::broadcast::{self, error::RecvError};

use kiosk_content::config::{load_config, ServiceConfig};
use kiosk_content::lifecycle::{startup, ControlSignal, Shutdown, SignalListener};
use kiosk_content::observability::{logging, metrics};
use kiosk_content::ContentEvent;

#[derive(Parser)]
#[command(name = "kiosk-content")]
#[command(about = "Configuration and hot-reload service for the kiosk display", long_about = None)]
struct Args {
    /// Settings file (TOML). Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the schema directory from the settings file.
    #[arg(long)]
    schema_dir: Option<PathBuf>,

    /// Override the log level from the settings file.
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };
    if let Some(dir) = args.schema_dir {
        config.schema_dir = dir;
    }
    if let Some(level) = args.log_level {
        config.observability.log_level = level;
    }

    logging::init(&config.observability.log_level);
    tracing::info!("kiosk-content v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        schema_dir = %config.schema_dir.display(),
        files = config.files.len(),
        debounce_ms = config.watch.debounce_ms,
        max_retries = config.loader.max_retries,
        polling = config.watch.use_polling,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let shutdown = Shutdown::new();
    let mut signals = SignalListener::new()?;
    let service = startup::start(config).await?;
    let forwarder = tokio::spawn(log_events(service.subscribe(), shutdown.subscribe()));

    loop {
        match signals.next().await {
            ControlSignal::Reload => {
                let queued = service.reload_watched();
                tracing::info!(queued, "Reload requested");
            }
            ControlSignal::Shutdown => {
                tracing::info!("Shutdown signal received");
                break;
            }
        }
    }

    shutdown.trigger();
    service.cleanup();
    let _ = forwarder.await;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Log every content event until shutdown.
async fn log_events(
    mut events: broadcast::Receiver<ContentEvent>,
    mut shutdown: broadcast::Receiver<()>,
) {
    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => log_event(&event),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Event log fell behind");
                }
                Err(RecvError::Closed) => break,
            },
            _ = shutdown.recv() => break,
        }
    }
}

fn log_event(event: &ContentEvent) {
    let path = event.file_path().display();
    match event {
        ContentEvent::ContentLoaded { schema_key, .. } | ContentEvent::ContentUpdated { schema_key, .. } => {
            tracing::info!(event = event.name(), path = %path, schema = ?schema_key, "Content available");
        }
        ContentEvent::ValidationFailed { error, .. } | ContentEvent::ContentError { error, .. } => {
            tracing::warn!(event = event.name(), path = %path, error = %error, "Content rejected");
        }
        ContentEvent::FileDeleted { .. } => {
            tracing::warn!(event = event.name(), path = %path, "Content file removed");
        }
        ContentEvent::WatchError { error, .. } => {
            tracing::error!(event = event.name(), path = %path, error = %error, "Watcher failure");
        }
    }
}
