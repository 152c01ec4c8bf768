//! Metrics collection and exposition.
//!
//! # Metrics
//! - `lens_requests_total` (counter): inbound requests by route, status
//! - `lens_request_duration_seconds` (histogram): inbound latency by route
//! - `lens_cache_lookups_total` (counter): hits/misses by cache
//! - `lens_cache_entries` (gauge): entries per cache, stale ones included
//! - `lens_retries_total` (counter): retries by failure kind
//! - `lens_rate_limit_wait_seconds` (histogram): time spent in limiters
//! - `lens_upstream_calls_total` (counter): outbound calls by upstream, outcome
//!
//! Without an installed recorder every call here is a no-op.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::resilience::ErrorKind;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(route: &str, status: u16, start: Instant) {
    metrics::counter!(
        "lens_requests_total",
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("lens_request_duration_seconds", "route" => route.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_cache_lookup(cache: &'static str, hit: bool) {
    let result = if hit { "hit" } else { "miss" };
    metrics::counter!("lens_cache_lookups_total", "cache" => cache, "result" => result).increment(1);
}

pub fn record_cache_size(cache: &'static str, entries: usize) {
    metrics::gauge!("lens_cache_entries", "cache" => cache).set(entries as f64);
}

pub fn record_retry(kind: ErrorKind) {
    metrics::counter!("lens_retries_total", "kind" => kind.as_str()).increment(1);
}

pub fn record_rate_limit_wait(waited: Duration) {
    metrics::histogram!("lens_rate_limit_wait_seconds").record(waited.as_secs_f64());
}

pub fn record_upstream_call(upstream: &'static str, outcome: &'static str) {
    metrics::counter!("lens_upstream_calls_total", "upstream" => upstream, "outcome" => outcome)
        .increment(1);
}
