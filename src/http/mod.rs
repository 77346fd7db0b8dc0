//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (shared state, serve loop, session sweep)
//!     → pipeline.rs (tower-http layers + gateway middleware)
//!     → middleware/ (encoding → request_log → access_control)
//!     → pages.rs / auth::routes / admin (terminal handlers)
//!     → response.rs (error mapping, redirects)
//! ```

pub mod middleware;
pub mod pages;
pub mod pipeline;
pub mod response;
pub mod server;

pub use response::GatewayError;
pub use server::{AppState, HttpServer};
