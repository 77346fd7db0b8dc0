//! Session Gateway
//!
//! An HTTP front door that decides, per request, whether the caller holds an
//! authenticated session, and throttles the login form against brute force.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────────┐
//!                      │                 SESSION GATEWAY                   │
//!                      │                                                   │
//!   Client Request     │  ┌──────────┐  ┌─────────────┐  ┌──────────────┐ │
//!   ───────────────────┼─▶│ encoding │─▶│ request_log │─▶│access_control│ │
//!                      │  └──────────┘  └─────────────┘  └──────┬───────┘ │
//!                      │                                        │         │
//!                      │              Allow ┌───────────────────┤         │
//!                      │                    ▼                   ▼         │
//!                      │        ┌──────────────────┐   ┌──────────────┐   │
//!                      │        │ login / logout / │   │ 302 → login  │   │
//!                      │        │ pages / admin    │   │ 403 denied   │   │
//!                      │        └────────┬─────────┘   └──────────────┘   │
//!                      │                 ▼                                │
//!                      │        ┌──────────────────┐                      │
//!                      │        │  session store   │◀── background sweep  │
//!                      │        └──────────────────┘                      │
//!                      └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use session_gateway::config::{load_config, GatewayConfig};
use session_gateway::lifecycle::{signals, Shutdown};
use session_gateway::observability::{logging, metrics};
use session_gateway::HttpServer;

#[derive(Parser)]
#[command(name = "session-gateway")]
#[command(about = "Session-based access-control gateway", long_about = None)]
struct Args {
    /// Path to the TOML configuration file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };

    logging::init_logging(&config.observability);
    tracing::info!("session-gateway v{} starting", env!("CARGO_PKG_VERSION"));

    match &args.config {
        Some(path) => tracing::info!(path = %path.display(), "Configuration loaded"),
        None => tracing::warn!("No --config given, using built-in defaults"),
    }
    tracing::info!(
        bind_address = %config.listener.bind_address,
        session_timeout_secs = config.session.timeout_secs,
        max_login_attempts = config.login.max_attempts,
        exclude_patterns = %config.security.exclude_patterns,
        admin_prefix = %config.security.admin_prefix,
        default_encoding = %config.http.default_encoding,
        users = config.users.len(),
        "Effective configuration"
    );
    if config.users.is_empty() {
        tracing::warn!("No users configured, every login attempt will fail");
    }

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(shutdown.clone());

    let server = HttpServer::new(config);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
