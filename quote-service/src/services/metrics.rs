//! Metrics collection for quote-service.

use metrics::counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder. Later calls are no-ops.
pub fn init_metrics() {
    if METRICS_HANDLE.get().is_some() {
        return;
    }

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    if METRICS_HANDLE.set(handle).is_err() {
        tracing::warn!("Prometheus handle was already set");
    }
}

/// Render current metrics in Prometheus text format.
pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|h| h.render())
        .unwrap_or_default()
}

pub fn record_fetch(status: &'static str) {
    counter!("quote_fetch_total", "status" => status).increment(1);
}

pub fn record_store(status: &'static str) {
    counter!("quote_store_total", "status" => status).increment(1);
}
