//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::auth::credentials::Role;

/// Root configuration for the session gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Session lifetime and cookie settings.
    pub session: SessionConfig,

    /// Login endpoint and throttle settings.
    pub login: LoginConfig,

    /// Exclusion rules and role enforcement.
    pub security: SecurityConfig,

    /// Request/response encoding defaults.
    pub http: HttpConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Accounts accepted by the bundled credential verifier.
    pub users: Vec<UserConfig>,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Session store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Inactivity timeout in seconds, also applied after a successful login.
    pub timeout_secs: u64,

    /// Name of the cookie carrying the session token.
    pub cookie_name: String,

    /// Mark the session cookie `Secure` (HTTPS only).
    pub cookie_secure: bool,

    /// Interval of the expired-session sweep in seconds (0 = disabled).
    pub sweep_interval_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 1800,
            cookie_name: "SESSIONID".to_string(),
            cookie_secure: false,
            sweep_interval_secs: 300,
        }
    }
}

/// Login endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoginConfig {
    /// Failed attempts per session before lockout.
    pub max_attempts: u32,

    /// Path serving the login form.
    pub path: String,

    /// Path that destroys the current session.
    pub logout_path: String,

    /// Landing page after login when no original URL was recorded.
    pub success_path: String,
}

impl Default for LoginConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            path: "/login".to_string(),
            logout_path: "/logout".to_string(),
            success_path: "/users/dashboard".to_string(),
        }
    }
}

/// Authorization configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Comma-separated exact paths or `prefix/*` patterns exempt from checks.
    pub exclude_patterns: String,

    /// Paths under this prefix require the admin role.
    pub admin_prefix: String,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            exclude_patterns: "/login,/public/*,/api/public/*,/favicon.ico".to_string(),
            admin_prefix: "/admin".to_string(),
        }
    }
}

/// HTTP protocol defaults.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Character encoding applied when a request or response declares none.
    pub default_encoding: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            default_encoding: "UTF-8".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,

    /// Requests slower than this are logged at warn level.
    pub slow_request_ms: u64,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
            slow_request_ms: 1000,
        }
    }
}

/// A single account for the bundled verifier.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UserConfig {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GatewayConfig::default();
        assert_eq!(config.login.max_attempts, 3);
        assert_eq!(config.session.timeout_secs, 1800);
        assert_eq!(config.http.default_encoding, "UTF-8");
        assert!(config.users.is_empty());
    }

    #[test]
    fn test_partial_toml() {
        let config: GatewayConfig = toml::from_str(
            r#"
            [login]
            max_attempts = 5

            [[users]]
            username = "admin"
            password = "admin123"
            role = "admin"

            [[users]]
            username = "user"
            password = "user123"
            "#,
        )
        .unwrap();

        assert_eq!(config.login.max_attempts, 5);
        assert_eq!(config.login.path, "/login");
        assert_eq!(config.users.len(), 2);
        assert_eq!(config.users[0].role, Role::Admin);
        assert_eq!(config.users[1].role, Role::User);
    }
}
