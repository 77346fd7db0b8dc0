//! Response construction and error mapping.
//!
//! # Responsibilities
//! - Map gateway errors to HTTP status codes
//! - Build the redirect and denial responses the gate emits
//!
//! # Design Decisions
//! - Denials are responses, not errors: only faults reach `GatewayError`
//! - Internal faults log the triggering condition and return a generic 500

use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::session::SessionError;

/// Faults surfaced by gateway handlers.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("malformed input: {0}")]
    MalformedInput(String),
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        match self {
            GatewayError::MalformedInput(reason) => {
                tracing::debug!(reason = %reason, "Rejected malformed input");
                (StatusCode::BAD_REQUEST, reason).into_response()
            }
            GatewayError::Session(e) => {
                tracing::error!(error = %e, "Session store failure");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

/// `302 Found` to `location`.
pub fn found(location: &str) -> Response {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::FOUND;
    match HeaderValue::from_str(location) {
        Ok(value) => {
            response.headers_mut().insert(header::LOCATION, value);
        }
        Err(_) => {
            tracing::warn!(location = %location, "Unrepresentable redirect target, using /");
            response
                .headers_mut()
                .insert(header::LOCATION, HeaderValue::from_static("/"));
        }
    }
    response
}

/// `403 Forbidden` with a human-readable reason.
pub fn forbidden() -> Response {
    (
        StatusCode::FORBIDDEN,
        "You don't have permission to access this resource",
    )
        .into_response()
}

/// Attach a `Set-Cookie` header.
pub fn with_cookie(mut response: Response, cookie: HeaderValue) -> Response {
    response.headers_mut().append(header::SET_COOKIE, cookie);
    response
}
