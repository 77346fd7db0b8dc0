//! Session token transport over cookies.

use axum::http::{header, HeaderMap, HeaderValue};

use crate::config::SessionConfig;

/// Builds and reads the session cookie.
#[derive(Debug, Clone)]
pub struct SessionCookie {
    name: String,
    secure: bool,
}

impl SessionCookie {
    pub fn new(name: impl Into<String>, secure: bool) -> Self {
        Self {
            name: name.into(),
            secure,
        }
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(&config.cookie_name, config.cookie_secure)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Extract the session token from the request's `Cookie` headers.
    pub fn extract(&self, headers: &HeaderMap) -> Option<String> {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .find_map(|pair| {
                let (name, value) = pair.trim().split_once('=')?;
                (name == self.name && !value.is_empty()).then(|| value.to_string())
            })
    }

    /// `Set-Cookie` value issuing `session_id`.
    pub fn issue(&self, session_id: &str) -> HeaderValue {
        let mut cookie = format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax",
            self.name, session_id
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        to_header(cookie)
    }

    /// `Set-Cookie` value that makes the client drop the token.
    pub fn clear(&self) -> HeaderValue {
        to_header(format!(
            "{}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax",
            self.name
        ))
    }
}

fn to_header(cookie: String) -> HeaderValue {
    // Names come from validated config and ids are hex, so this only falls
    // back when a cookie name carries control characters.
    HeaderValue::from_str(&cookie).unwrap_or_else(|_| HeaderValue::from_static(""))
}
