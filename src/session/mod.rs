//! Session subsystem.
//!
//! # Data Flow
//! ```text
//! Cookie header
//!     → cookie.rs (extract token)
//!     → store.rs (resolve token → live record, per-id lock)
//!     → record.rs (typed attributes: username, role, attempts, ...)
//!     → Set-Cookie on create / rotate / invalidate
//! ```
//!
//! # Design Decisions
//! - One store instance, injected through application state
//! - Expiry is checked when a record is read, not by timers
//! - Lock poisoning surfaces as an error rather than a panic

pub mod cookie;
pub mod record;
pub mod store;

use thiserror::Error;

pub use cookie::SessionCookie;
pub use record::Session;
pub use store::SessionStore;

/// Errors raised by the session store.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A handler panicked while holding this session's lock.
    #[error("session {id} is unavailable: lock poisoned")]
    LockPoisoned { id: String },
}

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;
