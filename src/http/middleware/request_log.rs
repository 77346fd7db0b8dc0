//! Request timing and logging.
//!
//! The completion line is written from a drop guard, so it fires exactly once
//! whether the inner stages return a response, short-circuit, or are
//! cancelled by the timeout layer.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{header, Method, Request},
    middleware::Next,
    response::Response,
};

use crate::http::server::AppState;
use crate::observability::metrics;

pub async fn request_log_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let url = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());
    let request_id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();
    let remote = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    tracing::info!(
        request_id = %request_id,
        method = %req.method(),
        url = %url,
        remote = %remote,
        "Incoming request"
    );
    if let Some(agent) = req.headers().get(header::USER_AGENT).and_then(|v| v.to_str().ok()) {
        tracing::debug!(request_id = %request_id, user_agent = %agent, "Client agent");
    }

    let mut completion = CompletionLog {
        request_id,
        method: req.method().clone(),
        url,
        start: Instant::now(),
        slow_threshold: Duration::from_millis(state.config.observability.slow_request_ms),
        status: None,
    };

    let response = next.run(req).await;
    completion.status = Some(response.status().as_u16());
    response
}

struct CompletionLog {
    request_id: String,
    method: Method,
    url: String,
    start: Instant,
    slow_threshold: Duration,
    status: Option<u16>,
}

impl Drop for CompletionLog {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed();
        let duration_ms = elapsed.as_millis() as u64;

        match self.status {
            Some(status) => tracing::info!(
                request_id = %self.request_id,
                method = %self.method,
                url = %self.url,
                status,
                duration_ms,
                "Request completed"
            ),
            None => tracing::warn!(
                request_id = %self.request_id,
                method = %self.method,
                url = %self.url,
                duration_ms,
                "Request aborted before a response was produced"
            ),
        }

        if elapsed > self.slow_threshold {
            tracing::warn!(
                request_id = %self.request_id,
                url = %self.url,
                duration_ms,
                threshold_ms = self.slow_threshold.as_millis() as u64,
                "Slow request"
            );
        }

        metrics::record_request(self.method.as_str(), self.status, self.start);
    }
}
