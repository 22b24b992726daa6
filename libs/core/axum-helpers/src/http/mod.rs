//! HTTP middleware module.
//!
//! - CORS configuration (from `CORS_ALLOWED_ORIGIN`)
//! - Security headers

pub mod cors;
pub mod security;

pub use cors::cors_layer_from_env;
pub use security::security_headers;
