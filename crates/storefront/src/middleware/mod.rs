//! HTTP middleware stack for the storefront gateway.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors, bind a hub per request)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. CORS (browser front end on another origin)
//!
//! Authentication is not a layer: handlers take [`RequireAuth`] or
//! [`OptionalAuth`] and forward the bearer credential themselves.

pub mod auth;
pub mod request_id;

pub use auth::{OptionalAuth, RequireAuth};
pub use request_id::request_id_middleware;
