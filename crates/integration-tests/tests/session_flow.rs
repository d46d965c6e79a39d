//! Session lifecycle through the root page: connectivity, login, signup,
//! stale tokens and logout.

use axum::http::StatusCode;
use foodiefinds_core::Role;
use foodiefinds_integration_tests::{BackendCall, Operation, TEST_PASSWORD, TestApp};
use foodiefinds_web::manifest::FakeBackend;

// ============================================================================
// Connectivity
// ============================================================================

#[tokio::test]
async fn test_unreachable_backend_shows_disconnected_page() {
    let mut app = TestApp::new(FakeBackend::unreachable());

    let page = app.get("/").await;

    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("Backend connection failed. Please ensure the backend is running."));
    assert!(page.body.contains("Disconnected"));
    assert!(!page.body.contains("Welcome to FoodieFinds"));
    assert_eq!(app.backend.calls().await, vec![BackendCall::ProbeHealth]);
}

#[tokio::test]
async fn test_unreachable_backend_never_looks_up_stored_user() {
    let mut app = TestApp::new(FakeBackend::new());
    app.login_as("Chef Mario", "mario@example.com", Role::Chef).await;
    app.backend.set_reachable(false).await;
    let lookups_before = app
        .backend
        .count_calls(|c| matches!(c, BackendCall::CurrentUser))
        .await;

    let page = app.get("/").await;

    assert!(page.body.contains("Backend connection failed"));
    let lookups_after = app
        .backend
        .count_calls(|c| matches!(c, BackendCall::CurrentUser))
        .await;
    assert_eq!(lookups_before, lookups_after);
}

#[tokio::test]
async fn test_connection_lost_during_lookup_keeps_stored_session() {
    let mut app = TestApp::new(FakeBackend::new());
    app.login_as("Chef Mario", "mario@example.com", Role::Chef).await;
    app.backend.drop_connection(Operation::CurrentUser).await;

    let page = app.get("/").await;
    assert!(page.body.contains("Backend connection failed"));
    assert!(page.body.contains("Disconnected"));
    assert!(!page.body.contains("Welcome to FoodieFinds"));

    app.backend.recover(Operation::CurrentUser).await;
    let page = app.get("/").await;
    assert!(page.body.contains("Chef Mario"));
    assert!(page.body.contains("Logout"));
}

#[tokio::test]
async fn test_anonymous_visitor_sees_landing_without_user_lookup() {
    let mut app = TestApp::new(FakeBackend::new());

    let page = app.get("/").await;

    assert!(page.body.contains("Welcome to FoodieFinds"));
    assert!(page.body.contains("Connected"));
    assert!(page.body.contains("Login as Demo Chef"));
    assert!(page.body.contains("http://backend.test/admin"));
    assert_eq!(app.backend.calls().await, vec![BackendCall::ProbeHealth]);
}

#[tokio::test]
async fn test_signup_mode_shows_signup_form() {
    let mut app = TestApp::new(FakeBackend::new());

    let page = app.get("/?mode=signup").await;

    assert!(page.body.contains("Full Name"));
    assert!(page.body.contains("I am a..."));
    assert!(page.body.contains("Already have an account?"));
}

#[tokio::test]
async fn test_health_endpoints() {
    let mut up = TestApp::new(FakeBackend::new());
    let mut down = TestApp::new(FakeBackend::unreachable());

    let live = up.get("/health").await;
    assert_eq!(live.status, StatusCode::OK);
    assert_eq!(live.body, "ok");

    assert_eq!(up.get("/health/ready").await.status, StatusCode::OK);
    assert_eq!(down.get("/health/ready").await.status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_static_assets_are_served() {
    let mut app = TestApp::new(FakeBackend::new());

    let css = app.get("/static/css/main.css").await;

    assert_eq!(css.status, StatusCode::OK);
    assert!(css.body.contains(".restaurant-grid"));
}

// ============================================================================
// Login
// ============================================================================

#[tokio::test]
async fn test_login_renders_dashboard() {
    let mut app = TestApp::new(FakeBackend::new());
    app.login_as("Chef Mario", "mario@example.com", Role::Chef).await;
    assert!(app.has_cookie());

    let page = app.get("/").await;

    assert!(page.body.contains("Chef Mario"));
    assert!(page.body.contains("Logout"));
    assert!(page.body.contains("Add a New Restaurant"));
    assert!(page.body.contains("hx-get=\"/restaurants\""));
}

#[tokio::test]
async fn test_customer_dashboard_has_no_restaurant_form() {
    let mut app = TestApp::new(FakeBackend::new());
    app.login_as("Carla", "carla@example.com", Role::Customer).await;

    let page = app.get("/").await;

    assert!(page.body.contains("Carla"));
    assert!(page.body.contains("Customer"));
    assert!(!page.body.contains("Add a New Restaurant"));
}

#[tokio::test]
async fn test_failed_login_redirects_with_alert() {
    let mut app = TestApp::new(FakeBackend::new());
    app.backend
        .add_user("Chef Mario", "mario@example.com", TEST_PASSWORD, Role::Chef)
        .await;

    let response = app
        .post_form("/auth/login", &[("email", "mario@example.com"), ("password", "wrong")])
        .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/?error=login_failed"));
    assert!(!app.has_cookie());

    let page = app.get("/?error=login_failed").await;
    assert!(page.body.contains("Login failed. Please check your credentials."));
    assert!(page.body.contains("Welcome to FoodieFinds"));
}

#[tokio::test]
async fn test_demo_login_uses_configured_account() {
    let mut app = TestApp::new(FakeBackend::new());
    app.backend
        .add_user("Demo Chef", "chef@example.com", "password", Role::Chef)
        .await;

    let response = app.post_form("/auth/demo", &[]).await;

    assert_eq!(response.location(), Some("/"));
    assert!(
        app.backend
            .calls()
            .await
            .contains(&BackendCall::Login {
                email: "chef@example.com".to_string()
            })
    );
    assert!(app.get("/").await.body.contains("Demo Chef"));
}

#[tokio::test]
async fn test_login_while_logged_in_is_refused() {
    let mut app = TestApp::new(FakeBackend::new());
    app.login_as("Chef Mario", "mario@example.com", Role::Chef).await;
    let logins_before = app
        .backend
        .count_calls(|c| matches!(c, BackendCall::Login { .. }))
        .await;

    let response = app
        .post_form("/auth/login", &[("email", "mario@example.com"), ("password", TEST_PASSWORD)])
        .await;

    assert_eq!(response.location(), Some("/"));
    let logins_after = app
        .backend
        .count_calls(|c| matches!(c, BackendCall::Login { .. }))
        .await;
    assert_eq!(logins_before, logins_after);
}

// ============================================================================
// Signup
// ============================================================================

#[tokio::test]
async fn test_signup_creates_account_then_logs_in() {
    let mut app = TestApp::new(FakeBackend::new());

    let response = app
        .post_form(
            "/auth/signup",
            &[
                ("name", "Carla"),
                ("email", "carla@example.com"),
                ("password", "secret"),
                ("role", "customer"),
            ],
        )
        .await;

    assert_eq!(response.location(), Some("/"));
    assert_eq!(
        app.backend.calls().await,
        vec![
            BackendCall::Signup {
                email: "carla@example.com".to_string(),
                role: Role::Customer,
            },
            BackendCall::Login {
                email: "carla@example.com".to_string()
            },
            BackendCall::CurrentUser,
        ]
    );
    assert!(app.get("/").await.body.contains("Carla"));
}

#[tokio::test]
async fn test_duplicate_signup_returns_to_signup_form() {
    let mut app = TestApp::new(FakeBackend::new());
    app.backend
        .add_user("Carla", "carla@example.com", TEST_PASSWORD, Role::Customer)
        .await;

    let response = app
        .post_form(
            "/auth/signup",
            &[
                ("name", "Carla Again"),
                ("email", "carla@example.com"),
                ("password", "secret"),
                ("role", "chef"),
            ],
        )
        .await;

    assert_eq!(response.location(), Some("/?mode=signup&error=signup_failed"));
    let page = app.get("/?mode=signup&error=signup_failed").await;
    assert!(page.body.contains("Signup failed. The email might already be in use."));
    assert!(page.body.contains("Full Name"));
}

// ============================================================================
// Stale sessions and logout
// ============================================================================

#[tokio::test]
async fn test_rejected_token_is_dropped() {
    let mut app = TestApp::new(FakeBackend::new());
    app.login_as("Chef Mario", "mario@example.com", Role::Chef).await;
    app.backend.fail(Operation::CurrentUser).await;

    let page = app.get("/").await;
    assert!(page.body.contains("Welcome to FoodieFinds"));
    assert!(page.body.contains("Connected"));

    // the stored token is gone, so the next load does not try it again
    let lookups = app
        .backend
        .count_calls(|c| matches!(c, BackendCall::CurrentUser))
        .await;
    app.get("/").await;
    assert_eq!(
        app.backend
            .count_calls(|c| matches!(c, BackendCall::CurrentUser))
            .await,
        lookups
    );
}

#[tokio::test]
async fn test_logout_returns_to_landing() {
    let mut app = TestApp::new(FakeBackend::new());
    app.login_as("Chef Mario", "mario@example.com", Role::Chef).await;

    let response = app.post_form("/auth/logout", &[]).await;

    assert_eq!(response.location(), Some("/"));
    assert!(app.backend.calls().await.contains(&BackendCall::Logout));
    let page = app.get("/").await;
    assert!(page.body.contains("Welcome to FoodieFinds"));
    assert!(!page.body.contains("Chef Mario"));
}

#[tokio::test]
async fn test_sessions_are_per_browser() {
    let mut mario = TestApp::new(FakeBackend::new());
    mario.login_as("Chef Mario", "mario@example.com", Role::Chef).await;
    let mut stranger = mario.new_browser();

    assert!(stranger.get("/").await.body.contains("Welcome to FoodieFinds"));
    assert!(mario.get("/").await.body.contains("Chef Mario"));
}

#[tokio::test]
async fn test_protected_routes_require_login() {
    let mut app = TestApp::new(FakeBackend::new());

    let page = app.get("/restaurants").await;
    assert_eq!(page.status, StatusCode::SEE_OTHER);
    assert_eq!(page.location(), Some("/"));

    let fragment = app.htmx_get("/restaurants").await;
    assert_eq!(fragment.status, StatusCode::UNAUTHORIZED);
    assert_eq!(fragment.header("hx-redirect"), Some("/"));

    assert!(
        !app.backend
            .calls()
            .await
            .iter()
            .any(|c| matches!(c, BackendCall::FindRestaurants(_)))
    );
}
