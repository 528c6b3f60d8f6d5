//! Route table lookup.
//!
//! # Responsibilities
//! - Store compiled routes
//! - Look up the first matching route for a request
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Routes evaluated in declaration order; first match wins
//! - Explicit no-match rather than a silent default

use std::collections::HashSet;

use axum::http::Method;
use thiserror::Error;

use crate::config::schema::RouteConfig;
use crate::filter::{Filter, FilterBuildError};
use crate::routing::matcher::{PathPattern, PatternError};

/// Route table construction failure.
#[derive(Debug, Error)]
pub enum RouteBuildError {
    #[error("duplicate route id '{0}'")]
    DuplicateId(String),

    #[error("route '{route}': {source}")]
    Pattern {
        route: String,
        #[source]
        source: PatternError,
    },

    #[error("route '{route}': invalid method '{method}'")]
    Method { route: String, method: String },

    #[error("route '{route}': {source}")]
    Filter {
        route: String,
        #[source]
        source: FilterBuildError,
    },
}

/// A compiled route: path patterns, optional method set, ordered filters
/// and the logical target service.
#[derive(Debug)]
pub struct Route {
    id: String,
    patterns: Vec<PathPattern>,
    methods: Option<Vec<Method>>,
    filters: Vec<Filter>,
    target: String,
}

impl Route {
    /// Route identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Filters in declaration order.
    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    /// Logical name of the target service.
    pub fn target(&self) -> &str {
        &self.target
    }

    fn matches(&self, method: &Method, path: &str) -> bool {
        if let Some(methods) = &self.methods {
            if !methods.contains(method) {
                return false;
            }
        }
        self.patterns.iter().any(|pattern| pattern.matches(path))
    }
}

/// Ordered, immutable collection of routes.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    /// Compile the route table from configuration, preserving order.
    pub fn from_config(configs: &[RouteConfig]) -> Result<Self, RouteBuildError> {
        let mut routes = Vec::with_capacity(configs.len());
        let mut seen: HashSet<&str> = HashSet::new();

        for config in configs {
            if !seen.insert(config.id.as_str()) {
                return Err(RouteBuildError::DuplicateId(config.id.clone()));
            }

            let patterns = config
                .patterns
                .iter()
                .map(|pattern| PathPattern::compile(pattern))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|source| RouteBuildError::Pattern {
                    route: config.id.clone(),
                    source,
                })?;

            let methods = match &config.methods {
                Some(names) => Some(
                    names
                        .iter()
                        .map(|name| {
                            name.parse::<Method>().map_err(|_| RouteBuildError::Method {
                                route: config.id.clone(),
                                method: name.clone(),
                            })
                        })
                        .collect::<Result<Vec<_>, _>>()?,
                ),
                None => None,
            };

            let filters = config
                .filters
                .iter()
                .map(Filter::from_config)
                .collect::<Result<Vec<_>, _>>()
                .map_err(|source| RouteBuildError::Filter {
                    route: config.id.clone(),
                    source,
                })?;

            routes.push(Route {
                id: config.id.clone(),
                patterns,
                methods,
                filters,
                target: config.target.clone(),
            });
        }

        Ok(Self { routes })
    }

    /// Return the first route matching the request, or None.
    pub fn resolve(&self, method: &Method, path: &str) -> Option<&Route> {
        self.routes.iter().find(|route| route.matches(method, path))
    }

    /// Number of routes in the table.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Whether the table holds no routes.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::FilterConfig;

    fn route_config(id: &str, patterns: &[&str], target: &str) -> RouteConfig {
        RouteConfig {
            id: id.to_string(),
            patterns: patterns.iter().map(|p| p.to_string()).collect(),
            methods: None,
            filters: vec![],
            target: target.to_string(),
        }
    }

    #[test]
    fn test_first_matching_route_wins() {
        let table = RouteTable::from_config(&[
            route_config("posts", &["/posts/**"], "post-service"),
            route_config("catch_all", &["/**"], "fallback-service"),
        ])
        .unwrap();

        let route = table.resolve(&Method::GET, "/posts/1").unwrap();
        assert_eq!(route.id(), "posts");

        let route = table.resolve(&Method::GET, "/anything").unwrap();
        assert_eq!(route.id(), "catch_all");
    }

    #[test]
    fn test_registration_order_beats_specificity() {
        let table = RouteTable::from_config(&[
            route_config("broad", &["/**"], "fallback-service"),
            route_config("posts", &["/posts/**"], "post-service"),
        ])
        .unwrap();

        // The broader route was registered first, so it wins.
        let route = table.resolve(&Method::GET, "/posts/1").unwrap();
        assert_eq!(route.id(), "broad");
    }

    #[test]
    fn test_method_predicate_restricts_route() {
        let mut config = route_config("signup", &["/sign-up", "/login"], "user-service");
        config.methods = Some(vec!["POST".to_string()]);
        let table = RouteTable::from_config(&[config]).unwrap();

        assert!(table.resolve(&Method::POST, "/login").is_some());
        assert!(table.resolve(&Method::GET, "/login").is_none());
    }

    #[test]
    fn test_any_pattern_in_route_matches() {
        let table = RouteTable::from_config(&[route_config(
            "posts",
            &["/posts/**", "/comments/**", "/reviews/**"],
            "post-service",
        )])
        .unwrap();

        assert!(table.resolve(&Method::GET, "/comments/7").is_some());
        assert!(table.resolve(&Method::GET, "/reviews").is_some());
        assert!(table.resolve(&Method::GET, "/issues/7").is_none());
    }

    #[test]
    fn test_no_match_returns_none() {
        let table =
            RouteTable::from_config(&[route_config("users", &["/users/**"], "user-service")])
                .unwrap();
        assert!(table.resolve(&Method::GET, "/posts/1").is_none());
    }

    #[test]
    fn test_duplicate_route_id_is_rejected() {
        let result = RouteTable::from_config(&[
            route_config("users", &["/users/**"], "user-service"),
            route_config("users", &["/users/public/**"], "user-service"),
        ]);
        assert!(matches!(result, Err(RouteBuildError::DuplicateId(_))));
    }

    #[test]
    fn test_filters_compile_in_order() {
        let mut config = route_config("users", &["/users/**"], "user-service");
        config.filters = vec![
            FilterConfig::Authenticate,
            FilterConfig::RemoveRequestHeader {
                name: "cookie".to_string(),
            },
        ];
        let table = RouteTable::from_config(&[config]).unwrap();
        let route = table.resolve(&Method::GET, "/users/1").unwrap();
        assert_eq!(route.filters().len(), 2);
        assert!(matches!(route.filters()[0], Filter::Authenticate));
    }
}
