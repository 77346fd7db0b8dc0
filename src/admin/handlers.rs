use axum::{extract::State, Json};
use serde::Serialize;

use crate::http::server::AppState;

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub uptime_secs: u64,
}

#[derive(Debug, Serialize)]
pub struct SessionSummary {
    /// Records held, including expired ones the sweep has not reached.
    pub total: usize,
    pub live: usize,
    pub authenticated: usize,
    pub max_login_attempts: u32,
    pub timeout_secs: u64,
}

pub async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        uptime_secs: state.uptime().as_secs(),
    })
}

pub async fn get_sessions(State(state): State<AppState>) -> Json<SessionSummary> {
    let (live, authenticated) = state.store.summary();
    Json(SessionSummary {
        total: state.store.len(),
        live,
        authenticated,
        max_login_attempts: state.auth.max_attempts(),
        timeout_secs: state.store.default_timeout().as_secs(),
    })
}
