//! Downstream health aggregation.
//!
//! # Data Flow
//! ```text
//! GET /health
//!     → probe every registered service concurrently
//!     → aggregate: all UP → UP, otherwise DOWN
//!     → JSON report with per-service status
//! ```
//!
//! # Design Decisions
//! - Probes run per query; the gateway holds no health state
//! - A probe is healthy on any 2xx within the timeout
//! - Aggregate DOWN renders as 503 so orchestrators see it

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::Request;
use futures_util::future::join_all;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use serde::Serialize;
use tokio::time;

use crate::config::schema::HealthCheckConfig;
use crate::dispatch::ServiceRegistry;
use crate::observability::metrics;

/// Probe outcome for one service, or the aggregate over all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HealthStatus {
    Up,
    Down,
}

/// Aggregated health over all registered services.
#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub services: BTreeMap<String, HealthStatus>,
}

/// Queries downstream services for liveness.
pub struct HealthChecker {
    client: Client<HttpConnector, Body>,
    registry: Arc<ServiceRegistry>,
    config: HealthCheckConfig,
}

impl HealthChecker {
    /// Create a checker over the shared service registry.
    pub fn new(registry: Arc<ServiceRegistry>, config: HealthCheckConfig) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Self {
            client,
            registry,
            config,
        }
    }

    /// Probe every registered service and merge the results.
    pub async fn aggregate(&self) -> HealthReport {
        let names: Vec<String> = self.registry.service_names().map(String::from).collect();
        let statuses = join_all(names.iter().map(|name| self.probe(name))).await;

        let services: BTreeMap<String, HealthStatus> = names.into_iter().zip(statuses).collect();
        let status = if services.values().all(|status| *status == HealthStatus::Up) {
            HealthStatus::Up
        } else {
            HealthStatus::Down
        };

        HealthReport { status, services }
    }

    async fn probe(&self, service: &str) -> HealthStatus {
        let authority = match self.registry.next_instance(service) {
            Ok(authority) => authority,
            Err(err) => {
                tracing::warn!(service = %service, error = %err, "Health probe has no instance");
                return HealthStatus::Down;
            }
        };

        let uri = format!("http://{}{}", authority, self.config.path);
        let request = match Request::builder()
            .method("GET")
            .uri(uri)
            .header("user-agent", "gateway-health-check")
            .body(Body::empty())
        {
            Ok(request) => request,
            Err(err) => {
                tracing::error!(service = %service, error = %err, "Failed to build health probe");
                return HealthStatus::Down;
            }
        };

        let timeout = Duration::from_secs(self.config.timeout_secs);
        let healthy = match time::timeout(timeout, self.client.request(request)).await {
            Ok(Ok(response)) => {
                let success = response.status().is_success();
                if !success {
                    tracing::warn!(
                        service = %service,
                        status = %response.status(),
                        "Health probe failed: non-success status"
                    );
                }
                success
            }
            Ok(Err(err)) => {
                tracing::warn!(service = %service, error = %err, "Health probe failed: connection error");
                false
            }
            Err(_) => {
                tracing::warn!(service = %service, "Health probe failed: timeout");
                false
            }
        };

        metrics::record_service_health(service, healthy);
        if healthy {
            HealthStatus::Up
        } else {
            HealthStatus::Down
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_serializes_uppercase() {
        let mut services = BTreeMap::new();
        services.insert("user-service".to_string(), HealthStatus::Up);
        services.insert("post-service".to_string(), HealthStatus::Down);
        let report = HealthReport {
            status: HealthStatus::Down,
            services,
        };

        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains(r#""status":"DOWN""#));
        assert!(json.contains(r#""user-service":"UP""#));
    }

    #[tokio::test]
    async fn test_empty_registry_aggregates_up() {
        let checker = HealthChecker::new(
            Arc::new(ServiceRegistry::from_config(&[])),
            HealthCheckConfig::default(),
        );
        let report = checker.aggregate().await;
        assert_eq!(report.status, HealthStatus::Up);
        assert!(report.services.is_empty());
    }
}
