//! HTTP server and the gateway request pipeline.
//!
//! # Responsibilities
//! - Create the axum router with the catch-all gateway handler
//! - Wire up middleware (request id, tracing, timeout, CORS, body limit)
//! - Resolve routes and run each route's filter chain in order
//! - Hand the surviving request to the dispatcher
//! - Expose the aggregated health endpoint

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{any, get};
use axum::{Json, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::auth::ClaimsVerifier;
use crate::config::schema::GatewayConfig;
use crate::dispatch::{DispatchError, Dispatcher, ServiceRegistry};
use crate::filter::FilterAction;
use crate::health::{HealthChecker, HealthStatus};
use crate::http::cors::build_cors_layer;
use crate::http::request::{MakeGatewayRequestId, X_REQUEST_ID};
use crate::observability::metrics;
use crate::routing::router::{RouteBuildError, RouteTable};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub routes: Arc<RouteTable>,
    pub verifier: Arc<ClaimsVerifier>,
    pub dispatcher: Arc<Dispatcher>,
    pub health: Arc<HealthChecker>,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
}

impl HttpServer {
    /// Assemble the gateway from validated configuration.
    ///
    /// The route table, verifier and registry are built once here and shared
    /// read-only across all requests.
    pub fn new(config: GatewayConfig) -> Result<Self, RouteBuildError> {
        let routes = Arc::new(RouteTable::from_config(&config.routes)?);
        let verifier = Arc::new(ClaimsVerifier::new(&config.auth.jwt.key));
        let registry = Arc::new(ServiceRegistry::from_config(&config.services));
        let dispatcher = Arc::new(Dispatcher::new(
            registry.clone(),
            Duration::from_secs(config.timeouts.dispatch_secs),
        ));
        let health = Arc::new(HealthChecker::new(registry, config.health_check.clone()));

        let state = AppState {
            routes,
            verifier,
            dispatcher,
            health,
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the axum router with all middleware layers.
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let mut router = Router::new();
        if config.health_check.enabled {
            router = router.route("/health", get(health_handler));
        }
        router
            .route("/", any(gateway_handler))
            .route("/{*path}", any(gateway_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
            .layer(RequestBodyLimitLayer::new(config.listener.max_body_bytes))
            .layer(build_cors_layer(&config.cors))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeGatewayRequestId))
    }

    /// Run the server until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            route_count = self.config.routes.len(),
            "HTTP server starting"
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

/// Main gateway handler.
///
/// Resolves the route, runs its filter chain in declared order, then hands
/// the surviving request to the dispatcher.
async fn gateway_handler(State(state): State<AppState>, mut request: Request<Body>) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    // 1. Resolve route
    let Some(route) = state.routes.resolve(&method, &path) else {
        tracing::warn!(request_id = %request_id, method = %method, path = %path, "No route matched");
        metrics::record_request(method.as_str(), 404, "none", start);
        return (StatusCode::NOT_FOUND, "No matching route found").into_response();
    };

    tracing::debug!(
        request_id = %request_id,
        route = %route.id(),
        target = %route.target(),
        "Route resolved"
    );

    // 2. Run the filter chain in declared order
    for filter in route.filters() {
        match filter.apply(&mut request, &state.verifier) {
            FilterAction::Continue => {}
            FilterAction::Respond(response) => {
                tracing::debug!(
                    request_id = %request_id,
                    route = %route.id(),
                    status = %response.status(),
                    "Filter chain short-circuited"
                );
                metrics::record_request(
                    method.as_str(),
                    response.status().as_u16(),
                    route.target(),
                    start,
                );
                return response;
            }
        }
    }

    // 3. Forward to the target service
    match state.dispatcher.dispatch(route.target(), request).await {
        Ok(response) => {
            let status = response.status();
            metrics::record_request(method.as_str(), status.as_u16(), route.target(), start);
            let (parts, body) = response.into_parts();
            Response::from_parts(parts, Body::new(body))
        }
        Err(err @ (DispatchError::UnknownService(_) | DispatchError::NoInstances(_))) => {
            tracing::warn!(
                request_id = %request_id,
                target = %route.target(),
                error = %err,
                "No service instance available"
            );
            metrics::record_request(method.as_str(), 503, route.target(), start);
            (StatusCode::SERVICE_UNAVAILABLE, "No available service instance").into_response()
        }
        Err(err) => {
            tracing::error!(
                request_id = %request_id,
                target = %route.target(),
                error = %err,
                "Upstream dispatch failed"
            );
            metrics::record_request(method.as_str(), 502, route.target(), start);
            (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
        }
    }
}

/// Operator-facing health surface, aggregated over downstream services.
async fn health_handler(State(state): State<AppState>) -> Response {
    let report = state.health.aggregate().await;
    let status = match report.status {
        HealthStatus::Up => StatusCode::OK,
        HealthStatus::Down => StatusCode::SERVICE_UNAVAILABLE,
    };
    (status, Json(report)).into_response()
}
