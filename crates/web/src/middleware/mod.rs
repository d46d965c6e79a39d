//! HTTP middleware stack.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Session layer (tower-sessions with in-memory store)
//! 5. Body limit for uploads

pub mod auth;
pub mod request_id;
pub mod session;

pub use auth::{
    CurrentSession, RequireAuth, clear_auth, load_restaurants, set_auth, store_restaurants,
};
pub use request_id::{RequestId, request_id_middleware};
pub use session::create_session_layer;
