//! Typed session record.

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use crate::auth::credentials::Role;

/// Server-side state for one client, keyed by an opaque token.
///
/// A session without `username` is anonymous.
#[derive(Debug, Clone)]
pub struct Session {
    id: String,
    pub username: Option<String>,
    pub role: Option<Role>,
    /// Consecutive failed logins; 0 means none recorded.
    pub login_attempts: u32,
    /// Milliseconds since the Unix epoch of the last successful login.
    pub login_timestamp: Option<u64>,
    /// Where an anonymous request was headed before being sent to login.
    pub original_url: Option<String>,
    created_at: Instant,
    last_accessed_at: Instant,
    max_inactive: Duration,
    invalidated: bool,
}

impl Session {
    pub fn new(id: impl Into<String>, max_inactive: Duration) -> Self {
        let now = Instant::now();
        Self {
            id: id.into(),
            username: None,
            role: None,
            login_attempts: 0,
            login_timestamp: None,
            original_url: None,
            created_at: now,
            last_accessed_at: now,
            max_inactive,
            invalidated: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub(crate) fn set_id(&mut self, id: String) {
        self.id = id;
    }

    pub fn is_authenticated(&self) -> bool {
        self.username.is_some()
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    pub fn last_accessed_at(&self) -> Instant {
        self.last_accessed_at
    }

    pub fn max_inactive(&self) -> Duration {
        self.max_inactive
    }

    pub fn set_max_inactive(&mut self, timeout: Duration) {
        self.max_inactive = timeout;
    }

    /// Expired once the idle time exceeds the inactivity timeout.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.last_accessed_at) > self.max_inactive
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    /// Destroy the session. The store drops it once the caller's lock is
    /// released, and every later lookup treats it as absent.
    pub fn invalidate(&mut self) {
        self.invalidated = true;
    }

    pub fn is_invalidated(&self) -> bool {
        self.invalidated
    }

    pub fn touch(&mut self) {
        self.last_accessed_at = Instant::now();
    }

    /// Record a successful login. Callers clear the attempt counter first.
    pub fn authenticate(&mut self, username: &str, role: Role) {
        self.username = Some(username.to_string());
        self.role = Some(role);
        self.login_timestamp = Some(epoch_millis());
    }
}

pub(crate) fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
