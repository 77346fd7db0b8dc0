//! Per-request authorization.
//!
//! # Decision Order
//! ```text
//! path excluded?                 → Allow
//! no session / no username?      → remember path, RedirectToLogin
//! admin prefix and role ≠ admin? → Forbidden
//! otherwise                      → Allow
//! ```
//!
//! Recording the original URL is the only state change a check can make,
//! and it may create the session that carries it.

use std::fmt;
use std::sync::Arc;

use crate::auth::credentials::Role;
use crate::config::SecurityConfig;
use crate::security::matcher::ExclusionRules;
use crate::session::{SessionResult, SessionStore};

/// Outcome of authorizing one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthDecision {
    Allow,
    RedirectToLogin { original_url: String },
    Forbidden { reason: String },
}

impl AuthDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthDecision::Allow => "allow",
            AuthDecision::RedirectToLogin { .. } => "redirect_to_login",
            AuthDecision::Forbidden { .. } => "forbidden",
        }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, AuthDecision::Allow)
    }
}

impl fmt::Display for AuthDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authenticated caller, attached to requests the gate lets through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub session_id: String,
    pub username: String,
    pub role: Role,
}

/// Decision plus what the HTTP layer needs to act on it.
#[derive(Debug, Clone)]
pub struct Authorization {
    pub decision: AuthDecision,
    /// Known caller, if the request carried an authenticated session.
    pub principal: Option<Principal>,
    /// Set when the check created a session the client must learn about.
    pub issued_session: Option<String>,
}

impl Authorization {
    fn allow(principal: Option<Principal>) -> Self {
        Self {
            decision: AuthDecision::Allow,
            principal,
            issued_session: None,
        }
    }
}

/// Composes exclusion rules, the session store and the admin rule.
pub struct SecurityGate {
    rules: ExclusionRules,
    admin_prefix: String,
    store: Arc<SessionStore>,
}

impl SecurityGate {
    pub fn new(rules: ExclusionRules, admin_prefix: impl Into<String>, store: Arc<SessionStore>) -> Self {
        Self {
            rules,
            admin_prefix: admin_prefix.into(),
            store,
        }
    }

    pub fn from_config(config: &SecurityConfig, store: Arc<SessionStore>) -> Self {
        Self::new(
            ExclusionRules::parse(&config.exclude_patterns),
            config.admin_prefix.clone(),
            store,
        )
    }

    pub fn rules(&self) -> &ExclusionRules {
        &self.rules
    }

    pub fn is_excluded(&self, path: &str) -> bool {
        self.rules.matches(path)
    }

    /// Decide whether `path` may be served to the holder of `session_id`.
    pub fn authorize(&self, path: &str, session_id: Option<&str>) -> SessionResult<Authorization> {
        if self.rules.matches(path) {
            return Ok(Authorization::allow(None));
        }

        // Touching and recording the destination happen under one lock.
        let (id, created, principal) = self.store.update_or_create(session_id, |session| {
            session.touch();
            match &session.username {
                Some(username) => Some(Principal {
                    session_id: session.id().to_string(),
                    username: username.clone(),
                    role: session.role.unwrap_or_default(),
                }),
                None => {
                    session.original_url = Some(path.to_string());
                    None
                }
            }
        })?;

        let Some(principal) = principal else {
            return Ok(Authorization {
                decision: AuthDecision::RedirectToLogin {
                    original_url: path.to_string(),
                },
                principal: None,
                issued_session: created.then_some(id),
            });
        };

        if path.starts_with(&self.admin_prefix) && !principal.role.is_admin() {
            return Ok(Authorization {
                decision: AuthDecision::Forbidden {
                    reason: "insufficient role".to_string(),
                },
                principal: Some(principal),
                issued_session: None,
            });
        }

        Ok(Authorization::allow(Some(principal)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn gate() -> (SecurityGate, Arc<SessionStore>) {
        let store = Arc::new(SessionStore::new(Duration::from_secs(1800)));
        let gate = SecurityGate::new(
            ExclusionRules::parse("/login,/public/*"),
            "/admin",
            store.clone(),
        );
        (gate, store)
    }

    fn login(store: &SessionStore, role: Role) -> String {
        let (id, _, _) = store
            .update_or_create(None, |s| s.authenticate("alice", role))
            .unwrap();
        id
    }

    #[test]
    fn test_excluded_path_without_session() {
        let (gate, store) = gate();
        let auth = gate.authorize("/public/style.css", None).unwrap();

        assert_eq!(auth.decision, AuthDecision::Allow);
        assert!(auth.issued_session.is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_excluded_path_ignores_session_state() {
        let (gate, store) = gate();
        let id = login(&store, Role::User);

        for session in [None, Some("bogus"), Some(id.as_str())] {
            let auth = gate.authorize("/login", session).unwrap();
            assert_eq!(auth.decision, AuthDecision::Allow);
        }
    }

    #[test]
    fn test_anonymous_redirects_and_records_url() {
        let (gate, store) = gate();
        let auth = gate.authorize("/users/list", None).unwrap();

        assert_eq!(
            auth.decision,
            AuthDecision::RedirectToLogin {
                original_url: "/users/list".into()
            }
        );
        let id = auth.issued_session.expect("session created");
        let session = store.get(&id).unwrap().unwrap();
        assert_eq!(session.original_url.as_deref(), Some("/users/list"));
    }

    #[test]
    fn test_existing_anonymous_session_is_reused() {
        let (gate, store) = gate();
        let (session, _) = store.get_or_create(None).unwrap();

        let auth = gate.authorize("/reports", Some(session.id())).unwrap();
        assert!(matches!(auth.decision, AuthDecision::RedirectToLogin { .. }));
        assert!(auth.issued_session.is_none());
        assert_eq!(
            store.get(session.id()).unwrap().unwrap().original_url.as_deref(),
            Some("/reports")
        );
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_admin_requires_admin_role() {
        let (gate, store) = gate();
        let user = login(&store, Role::User);
        let admin = login(&store, Role::Admin);

        let denied = gate.authorize("/admin/status", Some(&user)).unwrap();
        assert_eq!(
            denied.decision,
            AuthDecision::Forbidden {
                reason: "insufficient role".into()
            }
        );
        assert_eq!(denied.principal.unwrap().username, "alice");

        let allowed = gate.authorize("/admin/status", Some(&admin)).unwrap();
        assert_eq!(allowed.decision, AuthDecision::Allow);
        assert_eq!(allowed.principal.unwrap().role, Role::Admin);
    }

    #[test]
    fn test_authenticated_user_allowed() {
        let (gate, store) = gate();
        let id = login(&store, Role::User);

        let auth = gate.authorize("/users/dashboard", Some(&id)).unwrap();
        assert!(auth.decision.is_allowed());
        assert_eq!(auth.principal.unwrap().session_id, id);
    }

    #[test]
    fn test_expired_session_redirects() {
        let store = Arc::new(SessionStore::new(Duration::from_millis(20)));
        let gate = SecurityGate::new(ExclusionRules::parse("/login"), "/admin", store.clone());
        let id = login(&store, Role::Admin);
        std::thread::sleep(Duration::from_millis(40));

        let auth = gate.authorize("/admin", Some(&id)).unwrap();
        assert!(matches!(auth.decision, AuthDecision::RedirectToLogin { .. }));
        assert!(auth.issued_session.is_some());
        assert_ne!(auth.issued_session.as_deref(), Some(id.as_str()));
    }
}
