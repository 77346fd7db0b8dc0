//! Request pipeline composition.
//!
//! ```text
//! request-id → trace → timeout → propagate-id
//!     → encoding → request_log → access_control → route
//! ```
//!
//! Axum wraps earlier layers with later ones, so the layers below are listed
//! innermost first.

use std::time::Duration;

use axum::{middleware::from_fn_with_state, routing::get, Router};
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::admin::setup_admin_router;
use crate::auth::routes::{login_page, login_submit, logout};
use crate::http::middleware::{
    access_control_middleware, encoding_middleware, request_log_middleware,
};
use crate::http::pages;
use crate::http::server::AppState;

/// Build the route table and wrap it in the full pipeline.
#[allow(deprecated)]
pub fn build_router(state: AppState) -> Router {
    let config = state.config.clone();
    let login = &config.login;

    let mut routes = Router::new()
        .route(&login.path, get(login_page).post(login_submit))
        .route(&login.logout_path, get(logout).post(logout))
        .route("/api/public/health", get(pages::health))
        .route("/", get(pages::home));
    if login.success_path != "/" {
        routes = routes.route(&login.success_path, get(pages::dashboard));
    }

    routes
        .merge(setup_admin_router(&config.security.admin_prefix))
        .fallback(pages::not_found)
        .layer(from_fn_with_state(state.clone(), access_control_middleware))
        .layer(from_fn_with_state(state.clone(), request_log_middleware))
        .layer(from_fn_with_state(state.clone(), encoding_middleware))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.timeouts.request_secs,
        )))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .with_state(state)
}
