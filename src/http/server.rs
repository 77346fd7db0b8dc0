//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build shared state (config, session store, gate, auth handler)
//! - Compose the request pipeline around the route table
//! - Bind server to listener and serve until shutdown
//! - Run the background session sweep

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use crate::auth::credentials::{CredentialVerifier, StaticCredentials};
use crate::auth::handler::AuthHandler;
use crate::config::GatewayConfig;
use crate::http::pipeline;
use crate::security::gate::SecurityGate;
use crate::session::{SessionCookie, SessionStore};

/// Application state injected into handlers and middleware.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub store: Arc<SessionStore>,
    pub gate: Arc<SecurityGate>,
    pub auth: Arc<AuthHandler>,
    pub cookie: SessionCookie,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: GatewayConfig, verifier: Arc<dyn CredentialVerifier>) -> Self {
        let config = Arc::new(config);
        let store = Arc::new(SessionStore::new(Duration::from_secs(
            config.session.timeout_secs,
        )));
        let gate = Arc::new(SecurityGate::from_config(&config.security, store.clone()));
        let auth = Arc::new(AuthHandler::from_config(&config, store.clone(), verifier));
        let cookie = SessionCookie::from_config(&config.session);

        Self {
            config,
            store,
            gate,
            auth,
            cookie,
            started_at: Instant::now(),
        }
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }
}

/// HTTP server for the session gateway.
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    /// Create a server that checks credentials against the configured users.
    pub fn new(config: GatewayConfig) -> Self {
        let verifier = Arc::new(StaticCredentials::from_config(&config.users));
        Self::with_verifier(config, verifier)
    }

    /// Create a server with a custom credential source.
    pub fn with_verifier(config: GatewayConfig, verifier: Arc<dyn CredentialVerifier>) -> Self {
        let state = AppState::new(config, verifier);
        let router = pipeline::build_router(state.clone());
        Self { router, state }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// The fully layered router, for driving requests without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let sweep_secs = self.state.config.session.sweep_interval_secs;
        if sweep_secs > 0 {
            let store = self.state.store.clone();
            let stop = shutdown.resubscribe();
            tokio::spawn(sweep_sessions(store, Duration::from_secs(sweep_secs), stop));
        }

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await?;

        tracing::info!(
            uptime_secs = self.state.uptime().as_secs(),
            "HTTP server stopped"
        );
        Ok(())
    }
}

/// Periodically drop sessions that have already expired.
async fn sweep_sessions(
    store: Arc<SessionStore>,
    every: Duration,
    mut shutdown: broadcast::Receiver<()>,
) {
    let mut ticker = tokio::time::interval(every);
    // The first tick completes immediately.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let removed = store.purge_expired();
                if removed > 0 {
                    tracing::debug!(removed, remaining = store.len(), "Swept expired sessions");
                }
            }
            _ = shutdown.recv() => break,
        }
    }
    tracing::debug!("Session sweep stopped");
}
