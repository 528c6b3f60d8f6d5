//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity (routes reference existing services)
//! - Validate patterns, methods, filters and addresses
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use axum::http::header::HeaderName;
use axum::http::uri::Authority;
use axum::http::Method;
use regex::Regex;
use thiserror::Error;

use crate::config::schema::{FilterConfig, GatewayConfig};
use crate::routing::matcher::PathPattern;

/// A single semantic problem found in the configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("invalid bind address '{0}'")]
    InvalidBindAddress(String),

    #[error("invalid metrics address '{0}'")]
    InvalidMetricsAddress(String),

    #[error("duplicate service name '{0}'")]
    DuplicateService(String),

    #[error("service '{service}': invalid instance address '{address}'")]
    InvalidInstance { service: String, address: String },

    #[error("duplicate route id '{0}'")]
    DuplicateRoute(String),

    #[error("route '{route}' has no path patterns")]
    EmptyPatterns { route: String },

    #[error("route '{route}': invalid pattern '{pattern}': {reason}")]
    InvalidPattern {
        route: String,
        pattern: String,
        reason: String,
    },

    #[error("route '{route}': invalid method '{method}'")]
    InvalidMethod { route: String, method: String },

    #[error("route '{route}': invalid header name '{name}'")]
    InvalidHeaderName { route: String, name: String },

    #[error("route '{route}': invalid rewrite pattern '{pattern}': {reason}")]
    InvalidRewrite {
        route: String,
        pattern: String,
        reason: String,
    },

    #[error("route '{route}' requires authentication but auth.jwt.key is empty")]
    MissingJwtKey { route: String },

    #[error("route '{route}': unknown target service '{target}'")]
    UnknownTarget { route: String, target: String },
}

/// Validate a configuration, collecting every semantic error.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    let mut service_names: HashSet<&str> = HashSet::new();
    for service in &config.services {
        if !service_names.insert(service.name.as_str()) {
            errors.push(ValidationError::DuplicateService(service.name.clone()));
        }
        for instance in &service.instances {
            if instance.parse::<Authority>().is_err() {
                errors.push(ValidationError::InvalidInstance {
                    service: service.name.clone(),
                    address: instance.clone(),
                });
            }
        }
    }

    let mut route_ids: HashSet<&str> = HashSet::new();
    for route in &config.routes {
        if !route_ids.insert(route.id.as_str()) {
            errors.push(ValidationError::DuplicateRoute(route.id.clone()));
        }

        if route.patterns.is_empty() {
            errors.push(ValidationError::EmptyPatterns {
                route: route.id.clone(),
            });
        }
        for pattern in &route.patterns {
            if let Err(err) = PathPattern::compile(pattern) {
                errors.push(ValidationError::InvalidPattern {
                    route: route.id.clone(),
                    pattern: pattern.clone(),
                    reason: err.to_string(),
                });
            }
        }

        if let Some(methods) = &route.methods {
            for method in methods {
                if method.parse::<Method>().is_err() {
                    errors.push(ValidationError::InvalidMethod {
                        route: route.id.clone(),
                        method: method.clone(),
                    });
                }
            }
        }

        for filter in &route.filters {
            match filter {
                FilterConfig::RemoveRequestHeader { name } => {
                    if HeaderName::from_bytes(name.as_bytes()).is_err() {
                        errors.push(ValidationError::InvalidHeaderName {
                            route: route.id.clone(),
                            name: name.clone(),
                        });
                    }
                }
                FilterConfig::RewritePath { pattern, .. } => {
                    if let Err(err) = Regex::new(pattern) {
                        errors.push(ValidationError::InvalidRewrite {
                            route: route.id.clone(),
                            pattern: pattern.clone(),
                            reason: err.to_string(),
                        });
                    }
                }
                FilterConfig::Authenticate => {
                    if config.auth.jwt.key.is_empty() {
                        errors.push(ValidationError::MissingJwtKey {
                            route: route.id.clone(),
                        });
                    }
                }
            }
        }

        if !service_names.contains(route.target.as_str()) {
            errors.push(ValidationError::UnknownTarget {
                route: route.id.clone(),
                target: route.target.clone(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
