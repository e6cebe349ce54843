//! Middleware components for the HTTP server

pub mod auth;
pub mod cors;
pub mod logging;
pub mod rate_limit;
pub mod security;

pub use auth::require_admin;
pub use cors::cors_layer_from_config;
pub use logging::with_request_tracing;
pub use rate_limit::{rate_limit_middleware, RateLimiter};
pub use security::{require_https_middleware, with_security_headers, TransportPolicy};
