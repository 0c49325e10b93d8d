//! Metrics collection and exposition.
//!
//! # Metrics
//! - `mock_dispatch_total` (counter): dispatches by method, code, matched
//! - `mock_dispatch_duration_seconds` (histogram): time including handler latency
//! - `mock_route_table_size` (gauge): routes in the active table
//! - `mock_config_reloads_total` (counter): reload attempts by outcome
//!
//! Recording is a no-op until a recorder is installed, so library users and
//! tests pay nothing.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder with its own scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_dispatch(method: &str, code: i32, matched: bool, start: Instant) {
    metrics::counter!(
        "mock_dispatch_total",
        "method" => method.to_string(),
        "code" => code.to_string(),
        "matched" => matched.to_string()
    )
    .increment(1);
    metrics::histogram!("mock_dispatch_duration_seconds", "method" => method.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_route_table_size(routes: usize) {
    metrics::gauge!("mock_route_table_size").set(routes as f64);
}

pub fn record_config_reload(outcome: &'static str) {
    metrics::counter!("mock_config_reloads_total", "outcome" => outcome).increment(1);
}
