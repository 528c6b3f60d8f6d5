//! Request filter chain.
//!
//! # Data Flow
//! ```text
//! Matched route
//!     → filters run strictly in declared order
//!     → each filter continues with the (possibly mutated) request
//!       or terminates the chain with a response
//!     → surviving request goes to dispatch
//! ```
//!
//! # Design Decisions
//! - Filters are a declarative enum compiled from config, not a DSL
//! - Header stripping and path rewriting mutate and continue
//! - Authentication terminates the chain on failure, mutates only on success

use axum::body::Body;
use axum::http::header::HeaderName;
use axum::http::{HeaderValue, Request, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use regex::Regex;
use thiserror::Error;

use crate::auth::{authenticate, ClaimsVerifier, X_GATEWAY_USER_ID};
use crate::config::schema::FilterConfig;
use crate::http::error::{auth_error_response, error_response};

/// Filter compilation failure.
#[derive(Debug, Error)]
pub enum FilterBuildError {
    #[error("invalid header name '{0}'")]
    HeaderName(String),

    #[error("invalid rewrite pattern '{pattern}': {source}")]
    RewritePattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Outcome of a single filter application.
pub enum FilterAction {
    /// Pass the request to the next filter (or dispatch).
    Continue,
    /// Terminate the chain with this response.
    Respond(Response),
}

/// A single request transformation step within a route's chain.
#[derive(Debug, Clone)]
pub enum Filter {
    /// Strip a request header before forwarding.
    RemoveRequestHeader(HeaderName),
    /// Rewrite the request path via regex substitution.
    RewritePath {
        pattern: Regex,
        replacement: String,
    },
    /// Enforce bearer-token authentication and inject the identity header.
    Authenticate,
}

impl Filter {
    /// Compile a filter from its configuration entry.
    pub fn from_config(config: &FilterConfig) -> Result<Self, FilterBuildError> {
        match config {
            FilterConfig::RemoveRequestHeader { name } => {
                let name = HeaderName::from_bytes(name.as_bytes())
                    .map_err(|_| FilterBuildError::HeaderName(name.clone()))?;
                Ok(Filter::RemoveRequestHeader(name))
            }
            FilterConfig::RewritePath {
                pattern,
                replacement,
            } => {
                let pattern =
                    Regex::new(pattern).map_err(|source| FilterBuildError::RewritePattern {
                        pattern: pattern.clone(),
                        source,
                    })?;
                Ok(Filter::RewritePath {
                    pattern,
                    replacement: replacement.clone(),
                })
            }
            FilterConfig::Authenticate => Ok(Filter::Authenticate),
        }
    }

    /// Apply this filter to the request.
    pub fn apply(&self, request: &mut Request<Body>, verifier: &ClaimsVerifier) -> FilterAction {
        match self {
            Filter::RemoveRequestHeader(name) => {
                request.headers_mut().remove(name);
                FilterAction::Continue
            }
            Filter::RewritePath {
                pattern,
                replacement,
            } => rewrite_path(request, pattern, replacement),
            Filter::Authenticate => match authenticate(request.headers(), verifier) {
                Ok(identity) => match HeaderValue::from_str(&identity.subject) {
                    Ok(value) => {
                        request.headers_mut().insert(X_GATEWAY_USER_ID, value);
                        FilterAction::Continue
                    }
                    Err(_) => {
                        FilterAction::Respond(error_response(999, "invalid subject in token"))
                    }
                },
                Err(err) => FilterAction::Respond(auth_error_response(&err)),
            },
        }
    }
}

/// Substitute the request path, keeping any query string intact.
fn rewrite_path(request: &mut Request<Body>, pattern: &Regex, replacement: &str) -> FilterAction {
    let path = request.uri().path().to_string();
    let rewritten = pattern.replace(&path, replacement);

    let path_and_query = match request.uri().query() {
        Some(query) => format!("{rewritten}?{query}"),
        None => rewritten.into_owned(),
    };

    let mut parts = request.uri().clone().into_parts();
    parts.path_and_query = match path_and_query.parse() {
        Ok(path_and_query) => Some(path_and_query),
        Err(err) => {
            tracing::error!(path = %path, error = %err, "Path rewrite produced an invalid path");
            return FilterAction::Respond(
                (StatusCode::INTERNAL_SERVER_ERROR, "Path rewrite failed").into_response(),
            );
        }
    };

    match Uri::from_parts(parts) {
        Ok(uri) => {
            *request.uri_mut() = uri;
            FilterAction::Continue
        }
        Err(err) => {
            tracing::error!(path = %path, error = %err, "Path rewrite produced an invalid URI");
            FilterAction::Respond(
                (StatusCode::INTERNAL_SERVER_ERROR, "Path rewrite failed").into_response(),
            )
        }
    }
}
