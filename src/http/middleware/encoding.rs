//! Character-encoding normalization.
//!
//! Applies the configured default charset to requests and responses that do
//! not declare one. An explicit charset is never overridden. Bodies are
//! decoded and produced as UTF-8, so only UTF-8 compatible charsets are
//! accepted as the default or on submitted forms.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, HeaderValue, Request},
    middleware::Next,
    response::Response,
};

use crate::http::server::AppState;

/// Charset in effect for a request body, attached as a request extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestEncoding {
    pub charset: String,
    /// Whether the client declared it rather than inheriting the default.
    pub explicit: bool,
}

pub async fn encoding_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let default = state.config.http.default_encoding.as_str();

    let encoding = match declared_charset(req.headers()) {
        Some(charset) => RequestEncoding {
            charset,
            explicit: true,
        },
        None => RequestEncoding {
            charset: default.to_string(),
            explicit: false,
        },
    };
    apply_default_charset(req.headers_mut(), default);
    req.extensions_mut().insert(encoding);

    let mut response = next.run(req).await;
    apply_default_charset(response.headers_mut(), default);
    response
}

impl RequestEncoding {
    pub fn is_supported(&self) -> bool {
        is_supported_charset(&self.charset)
    }
}

/// Charsets whose bytes decode correctly as UTF-8.
pub fn is_supported_charset(charset: &str) -> bool {
    ["utf-8", "utf8", "us-ascii", "ascii"]
        .iter()
        .any(|known| charset.trim().eq_ignore_ascii_case(known))
}

/// The `charset` parameter of the `Content-Type` header, if any.
pub fn declared_charset(headers: &HeaderMap) -> Option<String> {
    let content_type = headers.get(header::CONTENT_TYPE)?.to_str().ok()?;
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.trim().split_once('=')?;
        name.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches('"').to_string())
            .filter(|v| !v.is_empty())
    })
}

/// Append `charset` to a textual or form `Content-Type` that lacks one.
pub fn apply_default_charset(headers: &mut HeaderMap, charset: &str) {
    if declared_charset(headers).is_some() {
        return;
    }
    let Some(content_type) = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
    else {
        return;
    };
    let media_type = content_type.trim_start().to_ascii_lowercase();
    if !media_type.starts_with("text/")
        && !media_type.starts_with("application/x-www-form-urlencoded")
    {
        return;
    }
    if let Ok(value) = HeaderValue::from_str(&format!("{content_type}; charset={charset}")) {
        headers.insert(header::CONTENT_TYPE, value);
    }
}
