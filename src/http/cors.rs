//! CORS policy.
//!
//! # Responsibilities
//! - Build the CORS layer from configuration
//!
//! # Design Decisions
//! - A `"*"` entry combined with credentials mirrors the request instead of
//!   sending a literal wildcard, which browsers reject

use axum::http::{HeaderName, HeaderValue, Method};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, Any, CorsLayer};

use crate::config::schema::CorsConfig;

/// Build the CORS layer from configuration.
pub fn build_cors_layer(config: &CorsConfig) -> CorsLayer {
    let mut layer = CorsLayer::new();

    if config.allowed_origins.iter().any(|origin| origin == "*") {
        if config.allow_credentials {
            layer = layer.allow_origin(AllowOrigin::mirror_request());
        } else {
            layer = layer.allow_origin(Any);
        }
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|origin| HeaderValue::from_str(origin).ok())
            .collect();
        layer = layer.allow_origin(origins);
    }

    if config.allowed_methods.iter().any(|method| method == "*") {
        if config.allow_credentials {
            layer = layer.allow_methods(AllowMethods::mirror_request());
        } else {
            layer = layer.allow_methods(Any);
        }
    } else {
        let methods: Vec<Method> = config
            .allowed_methods
            .iter()
            .filter_map(|method| method.parse().ok())
            .collect();
        layer = layer.allow_methods(methods);
    }

    if config.allowed_headers.iter().any(|header| header == "*") {
        if config.allow_credentials {
            layer = layer.allow_headers(AllowHeaders::mirror_request());
        } else {
            layer = layer.allow_headers(Any);
        }
    } else {
        let headers: Vec<HeaderName> = config
            .allowed_headers
            .iter()
            .filter_map(|header| header.parse().ok())
            .collect();
        layer = layer.allow_headers(headers);
    }

    let exposed: Vec<HeaderName> = config
        .exposed_headers
        .iter()
        .filter_map(|header| header.parse().ok())
        .collect();
    if !exposed.is_empty() {
        layer = layer.expose_headers(exposed);
    }

    if config.allow_credentials {
        layer = layer.allow_credentials(true);
    }

    layer
}
