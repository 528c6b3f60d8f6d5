//! Edge API gateway library.

pub mod auth;
pub mod config;
pub mod dispatch;
pub mod filter;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::schema::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
