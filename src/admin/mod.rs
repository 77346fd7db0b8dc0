//! Operator API. Mounted under the admin prefix, so the security gate's
//! admin-role rule is what protects it.

pub mod handlers;

use axum::{routing::get, Router};

use self::handlers::*;
use crate::http::server::AppState;

pub fn setup_admin_router(admin_prefix: &str) -> Router<AppState> {
    let prefix = admin_prefix.trim_end_matches('/');
    Router::new()
        .route(&format!("{prefix}/status"), get(get_status))
        .route(&format!("{prefix}/sessions"), get(get_sessions))
}
