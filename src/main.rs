//! Edge API gateway.
//!
//! The front door of a microservice deployment: matches inbound requests
//! against an ordered route table, runs each route's filter chain (header
//! stripping, bearer-token authentication, path rewriting), and forwards
//! the surviving request to the target backend service.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌────────────────────────────────────────────────┐
//!                    │                 API GATEWAY                    │
//!                    │                                                │
//!   Client Request   │  ┌────────┐   ┌─────────┐   ┌──────────────┐  │
//!   ─────────────────┼─▶│  http  │──▶│ routing │──▶│ filter chain │  │
//!                    │  │ server │   │  table  │   │ auth/rewrite │  │
//!                    │  └────────┘   └─────────┘   └──────┬───────┘  │
//!                    │                                    │          │
//!                    │                                    ▼          │
//!   Client Response  │  ┌────────┐                 ┌──────────────┐  │
//!   ◀────────────────┼──│ error  │◀────────────────│   dispatch   │◀─┼── Backend
//!                    │  │ bodies │                 │  (registry)  │  │   Service
//!                    │  └────────┘                 └──────────────┘  │
//!                    │                                                │
//!                    │  config · health · observability · lifecycle   │
//!                    └────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use api_gateway::config::loader::load_config;
use api_gateway::observability::{logging, metrics};
use api_gateway::{GatewayConfig, HttpServer, Shutdown};

#[derive(Debug, Parser)]
#[command(name = "api-gateway", about = "Edge API gateway with JWT authentication")]
struct Args {
    /// Path to the TOML configuration file. Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };

    logging::init(&config.observability);

    tracing::info!(
        bind_address = %config.listener.bind_address,
        route_count = config.routes.len(),
        service_count = config.services.len(),
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => {
                tracing::error!(
                    metrics_address = %config.observability.metrics_address,
                    "Failed to parse metrics address"
                );
            }
        }
    }

    let shutdown = Shutdown::new();
    shutdown.listen_for_ctrl_c();

    let server = HttpServer::new(config)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
