//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → matcher.rs (excluded path? skip everything)
//!     → gate.rs (session lookup, role check → AuthDecision)
//!     → headers.rs (hardening headers on allowed responses)
//!
//! Login form submission:
//!     → throttle.rs (count failures, decide lockout)
//! ```
//!
//! # Design Decisions
//! - Fail closed: anything not excluded needs an authenticated session
//! - Gate and throttle hold no state of their own; the session store does
//! - No trust in client input: unknown session tokens are replaced

pub mod gate;
pub mod headers;
pub mod matcher;
pub mod throttle;

pub use gate::{AuthDecision, Authorization, Principal, SecurityGate};
pub use matcher::{ExclusionRule, ExclusionRules};
pub use throttle::{LoginOutcome, LoginThrottle};
