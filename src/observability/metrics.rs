//! Metrics collection and exposition.
//!
//! # Metrics
//! - `mux_dispatch_total` (counter): dispatches by outcome (route, fallback, misconfigured)
//! - `mux_dispatch_duration_seconds` (histogram): time from lookup to response
//! - `mux_routes_registered` (gauge): routes bound across every mux in the process

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus exporter and its scrape listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_dispatch(outcome: &'static str, start: Instant) {
    metrics::counter!("mux_dispatch_total", "outcome" => outcome).increment(1);
    metrics::histogram!("mux_dispatch_duration_seconds", "outcome" => outcome)
        .record(start.elapsed().as_secs_f64());
}

/// Count one successful route registration. Route tables only grow.
pub fn record_route_registered() {
    metrics::gauge!("mux_routes_registered").increment(1.0);
}
