//! Credential verification.
//!
//! The gateway only needs a yes/no answer and the caller's role; where
//! credentials live is up to the implementation behind [`CredentialVerifier`].

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::schema::UserConfig;

/// Role recorded on an authenticated session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source of truth for username/password checks.
pub trait CredentialVerifier: Send + Sync {
    /// Returns the account's role when the credentials are valid.
    fn verify(&self, username: &str, password: &str) -> Option<Role>;
}

/// In-memory accounts loaded from configuration.
#[derive(Default)]
pub struct StaticCredentials {
    accounts: HashMap<String, (String, Role)>,
}

impl StaticCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(users: &[UserConfig]) -> Self {
        users.iter().fold(Self::new(), |creds, u| {
            creds.with_user(&u.username, &u.password, u.role)
        })
    }

    pub fn with_user(mut self, username: &str, password: &str, role: Role) -> Self {
        self.accounts
            .insert(username.to_string(), (password.to_string(), role));
        self
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

impl CredentialVerifier for StaticCredentials {
    fn verify(&self, username: &str, password: &str) -> Option<Role> {
        let (expected, role) = self.accounts.get(username)?;
        constant_time_eq(expected.as_bytes(), password.as_bytes()).then_some(*role)
    }
}

// Length is not hidden; content comparison does not short-circuit.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

impl fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("accounts", &self.accounts.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds() -> StaticCredentials {
        StaticCredentials::new()
            .with_user("admin", "admin123", Role::Admin)
            .with_user("user", "user123", Role::User)
    }

    #[test]
    fn test_verify() {
        let creds = creds();
        assert_eq!(creds.verify("admin", "admin123"), Some(Role::Admin));
        assert_eq!(creds.verify("user", "user123"), Some(Role::User));
        assert_eq!(creds.verify("user", "admin123"), None);
        assert_eq!(creds.verify("user", "user1234"), None);
        assert_eq!(creds.verify("nobody", ""), None);
    }

    #[test]
    fn test_from_config() {
        let creds = StaticCredentials::from_config(&[UserConfig {
            username: "ops".into(),
            password: "pw".into(),
            role: Role::Admin,
        }]);
        assert_eq!(creds.len(), 1);
        assert_eq!(creds.verify("ops", "pw"), Some(Role::Admin));
    }

    #[test]
    fn test_debug_hides_passwords() {
        let out = format!("{:?}", creds());
        assert!(!out.contains("admin123"));
    }
}
