//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address, body limits).
    pub listener: ListenerConfig,

    /// Authentication settings (token signing key).
    pub auth: AuthConfig,

    /// CORS policy applied to every response.
    pub cors: CorsConfig,

    /// Route definitions, evaluated in declaration order.
    pub routes: Vec<RouteConfig>,

    /// Backend service definitions resolved by logical name.
    pub services: Vec<ServiceConfig>,

    /// Downstream health probe settings.
    pub health_check: HealthCheckConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_body_bytes: 2 * 1024 * 1024,
        }
    }
}

/// Authentication configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AuthConfig {
    /// JWT settings.
    pub jwt: JwtConfig,
}

/// JWT verification settings. The key is the symmetric secret tokens are
/// signed with; it never leaves the claims verifier.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct JwtConfig {
    /// Symmetric signing key (config path `auth.jwt.key`).
    pub key: String,
}

/// CORS policy configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Origins allowed to call the gateway. `"*"` allows any.
    pub allowed_origins: Vec<String>,

    /// Allowed HTTP methods. `"*"` allows any.
    pub allowed_methods: Vec<String>,

    /// Allowed request headers. `"*"` allows any.
    pub allowed_headers: Vec<String>,

    /// Response headers exposed to browsers.
    pub exposed_headers: Vec<String>,

    /// Whether credentialed requests are allowed.
    pub allow_credentials: bool,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["http://localhost:3000".to_string()],
            allowed_methods: vec![
                "HEAD".to_string(),
                "GET".to_string(),
                "POST".to_string(),
                "PUT".to_string(),
                "DELETE".to_string(),
                "PATCH".to_string(),
                "OPTIONS".to_string(),
            ],
            allowed_headers: vec!["*".to_string()],
            exposed_headers: vec![
                "Authorization".to_string(),
                "Authorization-refresh".to_string(),
            ],
            allow_credentials: true,
        }
    }
}

/// Route definition mapping requests to a target service.
///
/// Routes are evaluated in the order they appear; the first route whose
/// patterns (and optional method set) match wins.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Unique route identifier for logging/metrics.
    pub id: String,

    /// Path patterns; a trailing `/**` matches the base path and anything
    /// below it, a pattern with named capture groups is treated as a regex.
    pub patterns: Vec<String>,

    /// HTTP methods this route accepts; absent means any method.
    #[serde(default)]
    pub methods: Option<Vec<String>>,

    /// Filters applied to matching requests, in declaration order.
    #[serde(default)]
    pub filters: Vec<FilterConfig>,

    /// Logical name of the target service.
    pub target: String,
}

/// A single filter entry in a route's chain.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FilterConfig {
    /// Strip a request header before forwarding.
    RemoveRequestHeader {
        /// Header name to remove.
        name: String,
    },
    /// Rewrite the request path via regex substitution with named groups.
    RewritePath {
        /// Regex matched against the request path.
        pattern: String,
        /// Replacement, may reference named groups as `${name}`.
        replacement: String,
    },
    /// Enforce bearer-token authentication.
    Authenticate,
}

/// Backend service definition.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceConfig {
    /// Logical service name referenced by route targets.
    pub name: String,

    /// Instance addresses (e.g., "127.0.0.1:3000" or "user-service:8080").
    pub instances: Vec<String>,
}

/// Downstream health probe configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthCheckConfig {
    /// Enable the aggregated health endpoint.
    pub enabled: bool,

    /// Path probed on each service instance.
    pub path: String,

    /// Probe timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "/health".to_string(),
            timeout_secs: 5,
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,

    /// Timeout for a single dispatch to a backend service in seconds.
    pub dispatch_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 30,
            dispatch_secs: 10,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_parses() {
        let config: GatewayConfig = toml::from_str("").unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert!(config.routes.is_empty());
        assert!(config.auth.jwt.key.is_empty());
    }

    #[test]
    fn test_full_route_parses() {
        let config: GatewayConfig = toml::from_str(
            r#"
            [auth.jwt]
            key = "secret"

            [[services]]
            name = "user-service"
            instances = ["127.0.0.1:3001"]

            [[routes]]
            id = "user_service_route"
            patterns = ["/users/**"]
            methods = ["POST"]
            target = "user-service"

            [[routes.filters]]
            type = "authenticate"

            [[routes.filters]]
            type = "remove_request_header"
            name = "cookie"

            [[routes.filters]]
            type = "rewrite_path"
            pattern = "/api-docs/users/(?<rem>.*)"
            replacement = "/${rem}"
            "#,
        )
        .unwrap();

        assert_eq!(config.auth.jwt.key, "secret");
        let route = &config.routes[0];
        assert_eq!(route.id, "user_service_route");
        assert_eq!(route.methods.as_deref(), Some(&["POST".to_string()][..]));
        assert_eq!(route.filters.len(), 3);
        assert!(matches!(route.filters[0], FilterConfig::Authenticate));
    }
}
