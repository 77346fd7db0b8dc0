//! Request pipeline stages, outermost first:
//! encoding → request_log → access_control → handler.

pub mod access_control;
pub mod encoding;
pub mod request_log;

pub use access_control::access_control_middleware;
pub use encoding::{encoding_middleware, RequestEncoding};
pub use request_log::request_log_middleware;
