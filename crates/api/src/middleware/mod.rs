//! HTTP middleware and extractors.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. CORS (allowed origins from config)
//! 5. Rate limiting (governor, binary only)

pub mod identity;
pub mod rate_limit;
pub mod request_id;

pub use identity::CurrentCaller;
pub use rate_limit::api_rate_limiter;
pub use request_id::request_id_middleware;
