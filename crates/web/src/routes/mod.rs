//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                             - Root: disconnected, landing or dashboard
//! GET  /health                       - Liveness
//! GET  /health/ready                 - Backend reachability
//!
//! # Auth
//! POST /auth/login                   - Login action
//! POST /auth/signup                  - Signup, then login
//! POST /auth/demo                    - Login with the demo chef account
//! POST /auth/logout                  - Logout action
//!
//! # Restaurants (requires auth)
//! GET  /restaurants                  - Grid fragment (refetches the list)
//! POST /restaurants                  - Create (multipart; form + grid fragments)
//! POST /restaurants/preview          - Cover photo preview fragment
//! GET  /restaurants/preview/clear    - Empty preview fragment
//! GET  /restaurants/{id}/delete      - Delete confirmation page
//! POST /restaurants/{id}/delete      - Delete action
//! ```

pub mod auth;
pub mod health;
pub mod home;
pub mod restaurants;

use axum::{
    Router,
    body::Body,
    extract::DefaultBodyLimit,
    http::{HeaderMap, Request},
    middleware::from_fn,
    routing::{get, post},
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::middleware::auth::HX_REQUEST;
use crate::middleware::{create_session_layer, request_id_middleware};
use crate::state::AppState;

/// Whether a request came from HTMX rather than a plain form post.
pub(crate) fn is_htmx(headers: &HeaderMap) -> bool {
    headers.contains_key(HX_REQUEST)
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/signup", post(auth::signup))
        .route("/demo", post(auth::demo))
        .route("/logout", post(auth::logout))
}

/// Create the restaurant routes router.
pub fn restaurant_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(restaurants::grid).post(restaurants::create))
        .route("/preview", post(restaurants::preview))
        .route("/preview/clear", get(restaurants::clear_preview))
        .route(
            "/{id}/delete",
            get(restaurants::confirm_delete).post(restaurants::delete),
        )
}

/// Create all page and fragment routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::root))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/auth", auth_routes())
        .nest("/restaurants", restaurant_routes())
}

/// Build the full application: routes, static assets, sessions, request
/// IDs and tracing.
///
/// Sentry layers are added by the binary on top of this.
pub fn app(state: AppState) -> Router {
    let config = state.config();
    let session_layer = create_session_layer(config);
    let static_dir = ServeDir::new(&config.static_dir);
    let body_limit = DefaultBodyLimit::max(config.max_upload_bytes);

    Router::new()
        .merge(routes())
        .nest_service("/static", static_dir)
        .layer(body_limit)
        .layer(session_layer)
        .layer(from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = tracing::field::Empty,
            )
        }))
        .with_state(state)
}
