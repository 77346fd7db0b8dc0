//! Concurrent session storage.
//!
//! # Responsibilities
//! - Own every session record
//! - Serialize mutations per session id
//! - Expire idle sessions lazily on access
//!
//! # Design Decisions
//! - `DashMap` shards the id → record index, so there is no store-wide lock
//! - Each record sits behind its own `Mutex`; the shard lock is only held
//!   long enough to clone the record's `Arc`
//! - Callers receive clones, never references into the store
//! - Removal marks the record invalidated, so a request still holding the
//!   old `Arc` observes the session as gone
//! - A closure may invalidate the record it is mutating; the store evicts
//!   it before anyone else can lock it as live
//! - Ids are generated here; a client-supplied token that does not resolve
//!   is never adopted

use std::sync::{Arc, Mutex, MutexGuard, TryLockError};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use uuid::Uuid;

use crate::observability::metrics;
use crate::session::record::Session;
use crate::session::{SessionError, SessionResult};

type Slot = Arc<Mutex<Session>>;

/// Thread-safe store of session records keyed by session id.
pub struct SessionStore {
    sessions: DashMap<String, Slot>,
    default_timeout: Duration,
}

impl SessionStore {
    /// Create an empty store whose new sessions idle out after `default_timeout`.
    pub fn new(default_timeout: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            default_timeout,
        }
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Look up a live session. Absent, expired and invalidated all yield `None`.
    pub fn get(&self, id: &str) -> SessionResult<Option<Session>> {
        self.with_live(id, |session| session.clone())
    }

    /// Resolve `id` to a live session or create a fresh one.
    ///
    /// Returns the session and whether it was created by this call.
    pub fn get_or_create(&self, id: Option<&str>) -> SessionResult<(Session, bool)> {
        let (_, created, session) = self.update_or_create(id, |session| session.clone())?;
        Ok((session, created))
    }

    /// Atomic read-modify-write on a live session.
    pub fn update<R>(
        &self,
        id: &str,
        f: impl FnOnce(&mut Session) -> R,
    ) -> SessionResult<Option<R>> {
        self.with_live(id, f)
    }

    /// Like [`update`](Self::update), creating a fresh session when `id`
    /// does not resolve. Returns the effective id and whether it is new.
    pub fn update_or_create<R>(
        &self,
        id: Option<&str>,
        f: impl FnOnce(&mut Session) -> R,
    ) -> SessionResult<(String, bool, R)> {
        let f = match id {
            Some(id) => match self.try_live(id, f)? {
                Ok(result) => return Ok((id.to_string(), false, result)),
                Err(f) => f,
            },
            None => f,
        };

        let new_id = generate_id();
        let mut session = Session::new(new_id.clone(), self.default_timeout);
        let result = f(&mut session);
        if session.is_invalidated() {
            return Ok((new_id, true, result));
        }
        self.sessions.insert(new_id.clone(), Arc::new(Mutex::new(session)));
        metrics::record_session_count(self.sessions.len());
        tracing::debug!(session_id = %short(&new_id), "Session created");
        Ok((new_id, true, result))
    }

    /// Refresh the last-access time. Returns false if the session is gone.
    pub fn touch(&self, id: &str) -> SessionResult<bool> {
        Ok(self.with_live(id, Session::touch)?.is_some())
    }

    /// Override the inactivity timeout of one session.
    pub fn set_max_inactive_interval(&self, id: &str, timeout: Duration) -> SessionResult<bool> {
        Ok(self
            .with_live(id, |session| session.set_max_inactive(timeout))?
            .is_some())
    }

    /// Remove a session. Idempotent; returns whether anything was removed.
    pub fn invalidate(&self, id: &str) -> SessionResult<bool> {
        let Some((_, slot)) = self.sessions.remove(id) else {
            return Ok(false);
        };
        metrics::record_session_count(self.sessions.len());
        lock(&slot, id)?.invalidate();
        tracing::debug!(session_id = %short(id), "Session invalidated");
        Ok(true)
    }

    /// Move a live session to a newly generated id, keeping its contents.
    pub fn rotate(&self, id: &str) -> SessionResult<Option<String>> {
        let Some(slot) = self.slot(id) else {
            return Ok(None);
        };
        let mut session = lock(&slot, id)?;
        if session.is_invalidated() || session.is_expired() {
            drop(session);
            self.evict(id, &slot)?;
            return Ok(None);
        }

        let new_id = generate_id();
        session.set_id(new_id.clone());
        self.sessions.insert(new_id.clone(), slot.clone());
        self.sessions.remove_if(id, |_, current| Arc::ptr_eq(current, &slot));
        tracing::debug!(from = %short(id), to = %short(&new_id), "Session id rotated");
        Ok(Some(new_id))
    }

    /// Drop records that are already expired. Records locked by an in-flight
    /// request are left for the next sweep.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.sessions.len();
        self.sessions.retain(|id, slot| match slot.try_lock() {
            Ok(mut session) => {
                let dead = session.is_invalidated() || session.is_expired_at(now);
                if dead {
                    session.invalidate();
                }
                !dead
            }
            Err(TryLockError::WouldBlock) => true,
            Err(TryLockError::Poisoned(_)) => {
                tracing::warn!(session_id = %short(id), "Dropping session with poisoned lock");
                false
            }
        });
        let removed = before.saturating_sub(self.sessions.len());
        if removed > 0 {
            metrics::record_session_count(self.sessions.len());
        }
        removed
    }

    /// Number of records held, expired ones included until evicted.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Count of (live, authenticated) sessions, skipping records that are
    /// locked at the moment.
    pub fn summary(&self) -> (usize, usize) {
        let now = Instant::now();
        let mut live = 0;
        let mut authenticated = 0;
        for r in self.sessions.iter() {
            if let Ok(session) = r.value().try_lock() {
                if !session.is_invalidated() && !session.is_expired_at(now) {
                    live += 1;
                    if session.is_authenticated() {
                        authenticated += 1;
                    }
                }
            }
        }
        (live, authenticated)
    }

    fn slot(&self, id: &str) -> Option<Slot> {
        self.sessions.get(id).map(|r| r.value().clone())
    }

    fn with_live<R>(&self, id: &str, f: impl FnOnce(&mut Session) -> R) -> SessionResult<Option<R>> {
        Ok(self.try_live(id, f)?.ok())
    }

    /// Run `f` on the live session, or hand `f` back untouched if there is none.
    fn try_live<R, F>(&self, id: &str, f: F) -> SessionResult<Result<R, F>>
    where
        F: FnOnce(&mut Session) -> R,
    {
        let Some(slot) = self.slot(id) else {
            return Ok(Err(f));
        };
        let mut session = lock(&slot, id)?;
        if session.is_invalidated() {
            return Ok(Err(f));
        }
        if session.is_expired() {
            drop(session);
            self.evict(id, &slot)?;
            tracing::debug!(session_id = %short(id), "Session expired");
            return Ok(Err(f));
        }
        let result = f(&mut session);
        let destroyed = session.is_invalidated();
        drop(session);
        if destroyed {
            self.evict(id, &slot)?;
            tracing::debug!(session_id = %short(id), "Session invalidated");
        }
        Ok(Ok(result))
    }

    fn evict(&self, id: &str, slot: &Slot) -> SessionResult<()> {
        lock(slot, id)?.invalidate();
        if self
            .sessions
            .remove_if(id, |_, current| Arc::ptr_eq(current, slot))
            .is_some()
        {
            metrics::record_session_count(self.sessions.len());
        }
        Ok(())
    }
}

fn lock<'a>(slot: &'a Slot, id: &str) -> SessionResult<MutexGuard<'a, Session>> {
    slot.lock().map_err(|_| SessionError::LockPoisoned {
        id: short(id).to_string(),
    })
}

fn generate_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Leading characters of a session id, enough to correlate logs without
/// leaking the full token.
pub(crate) fn short(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}
