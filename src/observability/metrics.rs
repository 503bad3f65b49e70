//! Metrics collection and exposition.
//!
//! # Metrics
//! - `kiosk_content_loads_total` (counter): loader outcomes by `outcome`
//! - `kiosk_content_load_attempts_total` (counter): individual read+parse attempts
//! - `kiosk_content_reloads_total` (counter): watch-triggered reloads by `outcome`
//! - `kiosk_content_events_total` (counter): emitted events by `event`
//! - `kiosk_content_cache_entries` (gauge): current cache size
//! - `kiosk_content_watched_files` (gauge): active watch registrations
//!
//! Recording is a no-op until a recorder is installed, so library users and
//! tests pay nothing for it.

use std::net::SocketAddr;

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its HTTP scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_load(outcome: &'static str) {
    counter!("kiosk_content_loads_total", "outcome" => outcome).increment(1);
}

pub fn record_load_attempt() {
    counter!("kiosk_content_load_attempts_total").increment(1);
}

pub fn record_reload(outcome: &'static str) {
    counter!("kiosk_content_reloads_total", "outcome" => outcome).increment(1);
}

pub fn record_event(event: &'static str) {
    counter!("kiosk_content_events_total", "event" => event).increment(1);
}

pub fn record_cache_size(size: usize) {
    gauge!("kiosk_content_cache_entries").set(size as f64);
}

pub fn record_watched_files(count: usize) {
    gauge!("kiosk_content_watched_files").set(count as f64);
}
