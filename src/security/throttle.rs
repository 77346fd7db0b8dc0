//! Failed-login throttling.
//!
//! # States
//! - `0..max_attempts` failures: login may be retried
//! - `max_attempts` failures: terminal, the session is destroyed
//!
//! # State Transitions
//! ```text
//! n failures --wrong credentials--> n+1 failures
//! n failures --correct credentials--> 0 failures
//! n+1 == max_attempts              --> LockedOut (caller invalidates)
//! ```
//!
//! The counter lives on the session record. Callers run [`LoginThrottle::evaluate`]
//! inside the store's per-session lock so the increment is atomic.

use crate::session::Session;

/// Result of a login attempt as seen by the throttle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    Success,
    /// Credentials were wrong; this many attempts remain.
    RetryAllowed(u32),
    /// Attempt budget exhausted; the session must be invalidated.
    LockedOut,
}

impl LoginOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoginOutcome::Success => "success",
            LoginOutcome::RetryAllowed(_) => "retry",
            LoginOutcome::LockedOut => "locked_out",
        }
    }
}

/// Attempt counter policy.
#[derive(Debug, Clone, Copy)]
pub struct LoginThrottle {
    max_attempts: u32,
}

impl LoginThrottle {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Record one failed credential check.
    pub fn evaluate(&self, session: &mut Session) -> LoginOutcome {
        let attempts = session.login_attempts.saturating_add(1);
        session.login_attempts = attempts;
        if attempts >= self.max_attempts {
            LoginOutcome::LockedOut
        } else {
            LoginOutcome::RetryAllowed(self.max_attempts - attempts)
        }
    }

    /// Clear the counter after a successful credential check.
    pub fn reset(&self, session: &mut Session) {
        session.login_attempts = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn session() -> Session {
        Session::new("s", Duration::from_secs(1800))
    }

    #[test]
    fn test_three_strikes() {
        let throttle = LoginThrottle::new(3);
        let mut session = session();

        assert_eq!(throttle.evaluate(&mut session), LoginOutcome::RetryAllowed(2));
        assert_eq!(throttle.evaluate(&mut session), LoginOutcome::RetryAllowed(1));
        assert_eq!(throttle.evaluate(&mut session), LoginOutcome::LockedOut);
        assert_eq!(session.login_attempts, 3);
    }

    #[test]
    fn test_increment_from_any_count() {
        let throttle = LoginThrottle::new(5);
        for k in 0..4 {
            let mut session = session();
            session.login_attempts = k;
            assert_eq!(
                throttle.evaluate(&mut session),
                LoginOutcome::RetryAllowed(5 - (k + 1))
            );
            assert_eq!(session.login_attempts, k + 1);
        }
    }

    #[test]
    fn test_reset_restores_full_budget() {
        let throttle = LoginThrottle::new(3);
        let mut session = session();
        throttle.evaluate(&mut session);
        throttle.evaluate(&mut session);

        throttle.reset(&mut session);
        assert_eq!(session.login_attempts, 0);
        assert_eq!(throttle.evaluate(&mut session), LoginOutcome::RetryAllowed(2));
    }

    #[test]
    fn test_single_attempt_budget() {
        let throttle = LoginThrottle::new(1);
        assert_eq!(throttle.evaluate(&mut session()), LoginOutcome::LockedOut);
        // Zero is clamped so a misconfiguration cannot underflow.
        assert_eq!(LoginThrottle::new(0).max_attempts(), 1);
    }
}
