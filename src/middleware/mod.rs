//! Middleware: authentication, request tracing, security headers.

pub mod auth;
mod security;
mod tracing;

pub use self::auth::{AuthenticatedLender, JwtSecret};
pub use self::security::security_headers;
pub use self::tracing::request_tracing;
