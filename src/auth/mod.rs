//! Authentication subsystem.
//!
//! # Data Flow
//! ```text
//! POST /login (username, password)
//!     → routes.rs (form parsing, cookie in/out, page rendering)
//!     → handler.rs (verify → throttle → mutate session)
//!     → credentials.rs (CredentialVerifier capability)
//! ```

pub mod credentials;
pub mod handler;
pub mod routes;

pub use credentials::{CredentialVerifier, Role, StaticCredentials};
pub use handler::{AuthHandler, LoginAction};
