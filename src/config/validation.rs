//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (attempts > 0, timeouts > 0)
//! - Check that the login page is reachable without a session
//! - Only UTF-8 compatible default encodings
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;

use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::http::middleware::encoding::is_supported_charset;
use crate::security::matcher::ExclusionRules;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("login.max_attempts must be greater than zero")]
    ZeroMaxAttempts,

    #[error("session.timeout_secs must be greater than zero")]
    ZeroSessionTimeout,

    #[error("http.default_encoding must not be empty")]
    EmptyEncoding,

    #[error("http.default_encoding {0:?} is not UTF-8 compatible")]
    UnsupportedEncoding(String),

    #[error("exclusion pattern {0:?} must start with '/'")]
    InvalidPattern(String),

    #[error("{field} must start with '/', got {value:?}")]
    RelativePath { field: &'static str, value: String },

    #[error("login.path and login.logout_path must differ, both are {0:?}")]
    SharedLoginPath(String),

    #[error("login path {0:?} is not covered by security.exclude_patterns")]
    LoginNotExcluded(String),

    #[error("user entry with empty username")]
    EmptyUsername,

    #[error("duplicate user {0:?}")]
    DuplicateUser(String),
}

/// Validate a parsed configuration, collecting every error found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.login.max_attempts == 0 {
        errors.push(ValidationError::ZeroMaxAttempts);
    }
    if config.session.timeout_secs == 0 {
        errors.push(ValidationError::ZeroSessionTimeout);
    }
    let encoding = config.http.default_encoding.trim();
    if encoding.is_empty() {
        errors.push(ValidationError::EmptyEncoding);
    } else if !is_supported_charset(encoding) {
        errors.push(ValidationError::UnsupportedEncoding(encoding.to_string()));
    }

    for pattern in config
        .security
        .exclude_patterns
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
    {
        if !pattern.starts_with('/') {
            errors.push(ValidationError::InvalidPattern(pattern.to_string()));
        }
    }

    let paths = [
        ("login.path", &config.login.path),
        ("login.logout_path", &config.login.logout_path),
        ("login.success_path", &config.login.success_path),
        ("security.admin_prefix", &config.security.admin_prefix),
    ];
    for (field, value) in paths {
        if !value.starts_with('/') {
            errors.push(ValidationError::RelativePath {
                field,
                value: value.clone(),
            });
        }
    }

    if config.login.path == config.login.logout_path {
        errors.push(ValidationError::SharedLoginPath(config.login.path.clone()));
    }

    let rules = ExclusionRules::parse(&config.security.exclude_patterns);
    if !rules.matches(&config.login.path) {
        errors.push(ValidationError::LoginNotExcluded(config.login.path.clone()));
    }

    let mut seen = HashSet::new();
    for user in &config.users {
        if user.username.is_empty() {
            errors.push(ValidationError::EmptyUsername);
        } else if !seen.insert(user.username.as_str()) {
            errors.push(ValidationError::DuplicateUser(user.username.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
