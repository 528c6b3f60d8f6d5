//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by method, status, target
//! - `gateway_request_duration_seconds` (histogram): latency by target
//! - `gateway_service_health` (gauge): 1=healthy, 0=unhealthy per service
//!
//! # Design Decisions
//! - Prometheus exposition on its own listener, away from proxied traffic
//! - Label cardinality is bounded by the static route and service tables

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its exposition endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => {
            describe_counter!(
                "gateway_requests_total",
                "Total requests by method, status and target"
            );
            describe_histogram!(
                "gateway_request_duration_seconds",
                "Request latency distribution"
            );
            describe_gauge!(
                "gateway_service_health",
                "Downstream service health (1 healthy, 0 unhealthy)"
            );
            tracing::info!(address = %addr, "Metrics exporter started");
        }
        Err(err) => {
            tracing::error!(error = %err, "Failed to install metrics exporter");
        }
    }
}

/// Record one completed request.
pub fn record_request(method: &str, status: u16, target: &str, start: Instant) {
    counter!(
        "gateway_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "target" => target.to_string()
    )
    .increment(1);
    histogram!(
        "gateway_request_duration_seconds",
        "target" => target.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record the outcome of a health probe.
pub fn record_service_health(service: &str, healthy: bool) {
    gauge!(
        "gateway_service_health",
        "service" => service.to_string()
    )
    .set(if healthy { 1.0 } else { 0.0 });
}
