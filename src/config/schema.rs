//! Service configuration schema.
//!
//! All types derive Serde traits for deserialization from the TOML settings
//! file. Every section has defaults so a minimal file only names what differs.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::resilience::{BackoffStrategy, RetryPolicy};
use crate::watch::WatcherMode;

/// Root configuration for the content service.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Directory holding one JSON Schema per `.json` file.
    pub schema_dir: PathBuf,

    /// Loader retry settings.
    pub loader: LoaderConfig,

    /// File watching settings.
    pub watch: WatchConfig,

    /// Event bus settings.
    pub events: EventsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Files the daemon loads and watches at startup.
    pub files: Vec<FileConfig>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            schema_dir: PathBuf::from("schemas"),
            loader: LoaderConfig::default(),
            watch: WatchConfig::default(),
            events: EventsConfig::default(),
            observability: ObservabilityConfig::default(),
            files: Vec::new(),
        }
    }
}

/// Loader configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Extra attempts after the first failed read/parse.
    pub max_retries: u32,

    /// Delay between attempts in milliseconds.
    pub retry_delay_ms: u64,

    /// `fixed` or `incremental`.
    pub backoff: BackoffStrategy,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay_ms: 1000,
            backoff: BackoffStrategy::Fixed,
        }
    }
}

impl LoaderConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_retries,
            Duration::from_millis(self.retry_delay_ms),
            self.backoff,
        )
    }
}

/// File watching configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Quiet period after the last change before reloading, in milliseconds.
    pub debounce_ms: u64,

    /// Poll the filesystem instead of using native notifications
    /// (network mounts, some container overlays).
    pub use_polling: bool,

    /// Poll interval in milliseconds when `use_polling` is set.
    pub poll_interval_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            use_polling: false,
            poll_interval_ms: 1000,
        }
    }
}

impl WatchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn mode(&self) -> WatcherMode {
        if self.use_polling {
            WatcherMode::Polling(Duration::from_millis(self.poll_interval_ms))
        } else {
            WatcherMode::Native
        }
    }
}

/// Event bus configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EventsConfig {
    /// Events buffered per subscriber before slow ones start lagging.
    pub capacity: usize,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            capacity: crate::events::DEFAULT_CAPACITY,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

/// A configuration file to load and watch.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct FileConfig {
    /// Path to the file; relative paths resolve against the settings file's directory.
    pub path: PathBuf,

    /// Schema key to validate against.
    #[serde(default)]
    pub schema: Option<String>,
}
