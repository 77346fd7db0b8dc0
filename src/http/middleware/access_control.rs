//! Access-control middleware.
//! Runs the security gate and turns its decision into a response.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

use crate::http::response::{forbidden, found, with_cookie, GatewayError};
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::security::gate::AuthDecision;
use crate::security::headers::apply_security_headers;

pub async fn access_control_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let path = req.uri().path().to_string();
    let session_id = state.cookie.extract(req.headers());

    let authorization = match state.gate.authorize(&path, session_id.as_deref()) {
        Ok(authorization) => authorization,
        Err(e) => return GatewayError::from(e).into_response(),
    };
    metrics::record_auth_decision(authorization.decision.as_str());

    match authorization.decision {
        AuthDecision::Allow => {
            if let Some(principal) = authorization.principal {
                req.extensions_mut().insert(principal);
            }
            let mut response = next.run(req).await;
            apply_security_headers(response.headers_mut());
            response
        }
        AuthDecision::RedirectToLogin { original_url } => {
            warn!(
                path = %path,
                decision = "redirect_to_login",
                original_url = %original_url,
                "Unauthenticated access, redirecting to login"
            );
            let response = found(&state.config.login.path);
            match authorization.issued_session {
                Some(id) => with_cookie(response, state.cookie.issue(&id)),
                None => response,
            }
        }
        AuthDecision::Forbidden { reason } => {
            let username = authorization.principal.map(|p| p.username);
            warn!(
                path = %path,
                decision = "forbidden",
                username = ?username,
                reason = %reason,
                "Access denied"
            );
            forbidden()
        }
    }
}
