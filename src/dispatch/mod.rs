//! Outbound dispatch to backend services.
//!
//! # Data Flow
//! ```text
//! Route target (logical service name)
//!     → ServiceRegistry resolves the instance list
//!     → round-robin rotation picks the next instance
//!     → hyper client forwards the finalized request
//! ```
//!
//! # Design Decisions
//! - Logical names resolve from static configuration; no discovery here
//! - Rotation only; weighted or least-connection selection stays external
//! - One timeout per dispatch; retry policy intentionally absent

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::uri::{Authority, Scheme};
use axum::http::{Request, Response, Uri};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use thiserror::Error;

use crate::config::schema::ServiceConfig;

/// Dispatch failure surfaced at the router boundary.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("unknown service '{0}'")]
    UnknownService(String),

    #[error("service '{0}' has no instances")]
    NoInstances(String),

    #[error("invalid outbound URI: {0}")]
    InvalidUri(#[from] axum::http::uri::InvalidUriParts),

    #[error("upstream request failed: {0}")]
    Upstream(#[from] hyper_util::client::legacy::Error),

    #[error("upstream request timed out")]
    Timeout,
}

#[derive(Debug)]
struct Service {
    instances: Vec<Authority>,
    cursor: AtomicUsize,
}

/// Static map of logical service names to instance addresses.
#[derive(Debug, Default)]
pub struct ServiceRegistry {
    services: HashMap<String, Service>,
}

impl ServiceRegistry {
    /// Build the registry from configuration. Addresses were checked during
    /// config validation; anything unparsable here is skipped with a warning.
    pub fn from_config(configs: &[ServiceConfig]) -> Self {
        let mut services = HashMap::new();

        for config in configs {
            let instances: Vec<Authority> = config
                .instances
                .iter()
                .filter_map(|address| match address.parse::<Authority>() {
                    Ok(authority) => Some(authority),
                    Err(_) => {
                        tracing::warn!(
                            service = %config.name,
                            address = %address,
                            "Invalid instance address"
                        );
                        None
                    }
                })
                .collect();

            services.insert(
                config.name.clone(),
                Service {
                    instances,
                    cursor: AtomicUsize::new(0),
                },
            );
        }

        Self { services }
    }

    /// Names of all registered services.
    pub fn service_names(&self) -> impl Iterator<Item = &str> {
        self.services.keys().map(String::as_str)
    }

    /// Pick the next instance of a service, rotating round-robin.
    pub fn next_instance(&self, name: &str) -> Result<Authority, DispatchError> {
        let service = self
            .services
            .get(name)
            .ok_or_else(|| DispatchError::UnknownService(name.to_string()))?;

        if service.instances.is_empty() {
            return Err(DispatchError::NoInstances(name.to_string()));
        }

        let index = service.cursor.fetch_add(1, Ordering::Relaxed) % service.instances.len();
        Ok(service.instances[index].clone())
    }
}

/// Forwards finalized requests to the next instance of a target service.
///
/// This is the whole interface the router has to the outside: by the time a
/// request lands here its filter chain has already run.
pub struct Dispatcher {
    client: Client<HttpConnector, Body>,
    registry: Arc<ServiceRegistry>,
    timeout: Duration,
}

impl Dispatcher {
    /// Create a dispatcher over the shared registry.
    pub fn new(registry: Arc<ServiceRegistry>, timeout: Duration) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Self {
            client,
            registry,
            timeout,
        }
    }

    /// Forward the request to the target service.
    pub async fn dispatch(
        &self,
        target: &str,
        mut request: Request<Body>,
    ) -> Result<Response<hyper::body::Incoming>, DispatchError> {
        let authority = self.registry.next_instance(target)?;

        let mut parts = request.uri().clone().into_parts();
        parts.scheme = Some(Scheme::HTTP);
        parts.authority = Some(authority);
        *request.uri_mut() = Uri::from_parts(parts)?;

        match tokio::time::timeout(self.timeout, self.client.request(request)).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(err)) => Err(DispatchError::Upstream(err)),
            Err(_) => Err(DispatchError::Timeout),
        }
    }
}
