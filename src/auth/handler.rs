//! Login and logout logic, independent of HTTP.
//!
//! A login attempt runs the credential check first, then applies its result
//! to the session in one locked step: reset and authenticate on success,
//! count the failure otherwise. A lockout destroys the session inside that
//! same step, so no concurrent attempt can observe it as still live.

use std::sync::Arc;
use std::time::Duration;

use url::Url;

use crate::auth::credentials::{CredentialVerifier, Role};
use crate::config::{GatewayConfig, LoginConfig};
use crate::observability::metrics;
use crate::security::throttle::{LoginOutcome, LoginThrottle};
use crate::session::store::short;
use crate::session::{SessionResult, SessionStore};

/// What the HTTP layer should do after a login attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginAction {
    /// Credentials accepted; send the client to `location` with the rotated id.
    Redirect { location: String, session_id: String },
    /// Credentials rejected; show the form again.
    Retry {
        remaining: u32,
        session_id: String,
        /// The session was created by this attempt and needs a cookie.
        issued: bool,
    },
    /// Attempt budget exhausted; the session no longer exists.
    LockedOut,
}

impl LoginAction {
    pub fn outcome(&self) -> LoginOutcome {
        match self {
            LoginAction::Redirect { .. } => LoginOutcome::Success,
            LoginAction::Retry { remaining, .. } => LoginOutcome::RetryAllowed(*remaining),
            LoginAction::LockedOut => LoginOutcome::LockedOut,
        }
    }
}

pub struct AuthHandler {
    store: Arc<SessionStore>,
    verifier: Arc<dyn CredentialVerifier>,
    throttle: LoginThrottle,
    session_timeout: Duration,
    login: LoginConfig,
}

impl AuthHandler {
    pub fn new(
        store: Arc<SessionStore>,
        verifier: Arc<dyn CredentialVerifier>,
        throttle: LoginThrottle,
        session_timeout: Duration,
        login: LoginConfig,
    ) -> Self {
        Self {
            store,
            verifier,
            throttle,
            session_timeout,
            login,
        }
    }

    pub fn from_config(
        config: &GatewayConfig,
        store: Arc<SessionStore>,
        verifier: Arc<dyn CredentialVerifier>,
    ) -> Self {
        Self::new(
            store,
            verifier,
            LoginThrottle::new(config.login.max_attempts),
            Duration::from_secs(config.session.timeout_secs),
            config.login.clone(),
        )
    }

    pub fn max_attempts(&self) -> u32 {
        self.throttle.max_attempts()
    }

    /// Process one submitted username/password pair.
    pub fn login(
        &self,
        session_id: Option<&str>,
        username: &str,
        password: &str,
    ) -> SessionResult<LoginAction> {
        tracing::info!(username = %username, "Login attempt");

        let role = self.verifier.verify(username, password);
        let throttle = self.throttle;
        let timeout = self.session_timeout;
        // Ok carries the granted role and recorded destination; Err the
        // throttle's verdict on a failed check.
        let (id, created, result) = self.store.update_or_create(session_id, |session| {
            session.touch();
            match role {
                Some(role) => {
                    throttle.reset(session);
                    session.authenticate(username, role);
                    session.set_max_inactive(timeout);
                    Ok((role, session.original_url.take()))
                }
                None => {
                    let outcome = throttle.evaluate(session);
                    if outcome == LoginOutcome::LockedOut {
                        session.invalidate();
                    }
                    Err(outcome)
                }
            }
        })?;
        let outcome = match &result {
            Ok(_) => LoginOutcome::Success,
            Err(outcome) => *outcome,
        };
        metrics::record_login_outcome(outcome.as_str());

        match result {
            Ok((role, original_url)) => {
                let session_id = self.establish_session(&id, username, role)?;
                tracing::info!(
                    username = %username,
                    session_id = %short(&session_id),
                    "Login successful"
                );
                Ok(LoginAction::Redirect {
                    location: self.redirect_target(original_url),
                    session_id,
                })
            }
            Err(LoginOutcome::RetryAllowed(remaining)) => {
                tracing::warn!(username = %username, remaining, "Login failed");
                Ok(LoginAction::Retry {
                    remaining,
                    session_id: id,
                    issued: created,
                })
            }
            Err(_) => {
                tracing::error!(
                    username = %username,
                    session_id = %short(&id),
                    "Maximum login attempts exceeded, session destroyed"
                );
                Ok(LoginAction::LockedOut)
            }
        }
    }

    /// Move an authenticated session to a fresh id. If the record vanished
    /// after it was authenticated, start a new authenticated session instead
    /// of handing out a dead id.
    fn establish_session(&self, id: &str, username: &str, role: Role) -> SessionResult<String> {
        if let Some(rotated) = self.store.rotate(id)? {
            return Ok(rotated);
        }
        tracing::warn!(
            session_id = %short(id),
            username = %username,
            "Session ended during login, issuing a new one"
        );
        let timeout = self.session_timeout;
        let (fresh, _, _) = self.store.update_or_create(None, |session| {
            session.authenticate(username, role);
            session.set_max_inactive(timeout);
        })?;
        Ok(fresh)
    }

    /// Destroy the caller's session. Returns whether one existed.
    pub fn logout(&self, session_id: Option<&str>) -> SessionResult<bool> {
        let Some(id) = session_id else {
            return Ok(false);
        };
        let username = self
            .store
            .get(id)?
            .and_then(|session| session.username);
        let removed = self.store.invalidate(id)?;
        if removed {
            tracing::info!(username = ?username, session_id = %short(id), "Logged out");
        }
        Ok(removed)
    }

    /// Where to go after login: the recorded destination if it is a local
    /// path other than the login/logout endpoints, else the success page.
    fn redirect_target(&self, original_url: Option<String>) -> String {
        original_url
            .filter(|target| is_local_path(target))
            .filter(|target| *target != self.login.path && *target != self.login.logout_path)
            .unwrap_or_else(|| self.login.success_path.clone())
    }
}

const LOCAL_ORIGIN: &str = "http://gateway.invalid/";

fn is_local_path(target: &str) -> bool {
    if !target.starts_with('/') || target.starts_with("//") || target.contains('\\') {
        return false;
    }
    let Ok(base) = Url::parse(LOCAL_ORIGIN) else {
        return false;
    };
    base.join(target)
        .map(|resolved| resolved.origin() == base.origin())
        .unwrap_or(false)
}
