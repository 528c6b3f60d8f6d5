//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum setup, middleware, gateway handler)
//!     → routing (first-match route lookup)
//!     → filter chain (strip headers, authenticate, rewrite)
//!     → dispatch (forward to the target service)
//!     → error.rs (structured body when the chain fails)
//! ```

pub mod cors;
pub mod error;
pub mod request;
pub mod server;

pub use request::{MakeGatewayRequestId, X_REQUEST_ID};
pub use server::HttpServer;
